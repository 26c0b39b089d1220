use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wardrobe_cli::{Cli, Command, World, execute, run_batch};
use {wardrobe_collection as _, wardrobe_query as _};

fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	let world = World::load(&cli.world)?;
	let api = world.build()?;
	info!(world = %cli.world.display(), "ready");

	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	match &cli.command {
		Command::Batch { file } => {
			let script = std::fs::read_to_string(file).with_context(|| format!("failed to read batch file {}", file.display()))?;
			run_batch(&api, &script, &mut out)?;
		}
		command => {
			let value = execute(&api, command)?;
			serde_json::to_writer(&mut out, &value)?;
			writeln!(out)?;
		}
	}
	Ok(())
}
