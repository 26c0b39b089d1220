//! Command dispatch.

use std::io::Write;

use clap::Parser;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use wardrobe_assign::{ActorHandle, ChangedItemsError};
use wardrobe_query::CollectionApi;

use crate::cli::{BatchLine, Command};

/// Errors raised while executing commands.
#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	ChangedItems(#[from] ChangedItemsError),
	#[error("failed to serialize output: {0}")]
	Json(#[from] serde_json::Error),
	#[error("failed to write output: {0}")]
	Io(#[from] std::io::Error),
	#[error("batch line {line}: {source}")]
	BatchLine {
		line: usize,
		#[source]
		source: clap::Error,
	},
	#[error("batch line {0}: batches cannot be nested")]
	NestedBatch(usize),
	#[error("batch commands must be run through run_batch")]
	UnexpectedBatch,
}

/// Executes a single non-batch command and returns its JSON output.
///
/// [`Command::Batch`] is rejected; see [`run_batch`].
pub fn execute(api: &CollectionApi, command: &Command) -> Result<Value, CliError> {
	debug!(?command, "executing");
	let out = match command {
		Command::List => serde_json::to_value(api.list_collections())?,
		Command::ChangedItems { id } => serde_json::to_value(api.changed_items(*id)?)?,
		Command::Purpose { purpose } => serde_json::to_value(api.purpose_assignment(*purpose))?,
		Command::Entity { handle } => serde_json::to_value(api.entity_assignment(ActorHandle(*handle)))?,
		Command::Find { name } => serde_json::to_value(api.find_by_name(name))?,
		Command::SetPurpose {
			purpose,
			collection,
			allow_create,
			allow_delete,
		} => serde_json::to_value(api.set_purpose_assignment(*purpose, *collection, *allow_create, *allow_delete))?,
		Command::SetEntity {
			handle,
			collection,
			allow_create,
			allow_delete,
		} => serde_json::to_value(api.set_entity_assignment(ActorHandle(*handle), *collection, *allow_create, *allow_delete))?,
		Command::Batch { .. } => return Err(CliError::UnexpectedBatch),
	};
	Ok(out)
}

/// Runs one command per line of `script`, writing one JSON line per command.
///
/// Blank lines and lines starting with `#` are skipped. Arguments are split on
/// whitespace. Execution stops at the first malformed line.
pub fn run_batch(api: &CollectionApi, script: &str, out: &mut impl Write) -> Result<(), CliError> {
	for (idx, raw) in script.lines().enumerate() {
		let line = idx + 1;
		let text = raw.trim();
		if text.is_empty() || text.starts_with('#') {
			continue;
		}
		let parsed = BatchLine::try_parse_from(text.split_whitespace()).map_err(|source| CliError::BatchLine { line, source })?;
		if matches!(parsed.command, Command::Batch { .. }) {
			return Err(CliError::NestedBatch(line));
		}
		let value = execute(api, &parsed.command)?;
		serde_json::to_writer(&mut *out, &value)?;
		writeln!(out)?;
	}
	Ok(())
}
