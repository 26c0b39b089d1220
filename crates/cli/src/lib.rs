//! Command-line host for collection assignment.
//!
//! Loads a world file describing collections, actors and initial bindings,
//! then runs one command (or a batch of commands) against it, printing one
//! JSON document per command.

pub mod cli;
pub mod run;
pub mod world;

pub use cli::{Cli, Command};
pub use run::{CliError, execute, run_batch};
pub use world::{World, WorldError};
