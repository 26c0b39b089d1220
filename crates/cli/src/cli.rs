use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wardrobe_assign::Purpose;
use wardrobe_collection::CollectionId;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "wardrobe")]
#[command(about = "Inspect and edit active collection assignments")]
#[command(version)]
pub struct Cli {
	/// World file describing collections, actors and initial assignments
	#[arg(long, short, value_name = "PATH")]
	pub world: PathBuf,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// List all collections as id -> name
	List,
	/// Show the items changed by a collection
	ChangedItems {
		/// Collection id
		id: CollectionId,
	},
	/// Show the collection bound to a purpose
	Purpose {
		/// Purpose name or raw tag (e.g. `current`, `0xE2`)
		#[arg(value_parser = parse_purpose_tag)]
		purpose: u8,
	},
	/// Show the effective collection of an actor
	Entity {
		/// Actor handle
		handle: u16,
	},
	/// Find collection ids by name, ignoring case
	Find {
		name: String,
	},
	/// Assign or clear the collection of a purpose
	SetPurpose {
		/// Purpose name or raw tag
		#[arg(value_parser = parse_purpose_tag)]
		purpose: u8,
		/// Collection id; omit to clear the assignment
		collection: Option<CollectionId>,
		/// Allow creating an assignment where none exists
		#[arg(long)]
		allow_create: bool,
		/// Allow removing an existing assignment
		#[arg(long)]
		allow_delete: bool,
	},
	/// Assign or clear the individual collection of an actor
	SetEntity {
		/// Actor handle
		handle: u16,
		/// Collection id; omit to clear the assignment
		collection: Option<CollectionId>,
		/// Allow creating an assignment where none exists
		#[arg(long)]
		allow_create: bool,
		/// Allow removing an existing assignment
		#[arg(long)]
		allow_delete: bool,
	},
	/// Run one command per line from a file against the same world
	Batch {
		file: PathBuf,
	},
}

/// One line of a batch file.
#[derive(Parser, Debug)]
#[command(name = "batch", no_binary_name = true)]
pub struct BatchLine {
	#[command(subcommand)]
	pub command: Command,
}

/// Accepts a purpose name (any case, `_` and `-` ignored) or a raw tag in decimal or `0x` hex.
///
/// Unknown numeric tags pass through so the engine can report them.
pub fn parse_purpose_tag(s: &str) -> Result<u8, String> {
	if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
		return u8::from_str_radix(hex, 16).map_err(|e| format!("invalid purpose tag '{s}': {e}"));
	}
	if let Ok(tag) = s.parse::<u8>() {
		return Ok(tag);
	}
	Purpose::from_name(s).map(Purpose::tag).ok_or_else(|| format!("unknown purpose '{s}'"))
}
