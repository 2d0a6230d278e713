//! Command-line interface for track-curator.
//!
//! Curates a music folder, gathers quarantined tracks into one place and
//! inspects single files.

mod commands;

pub use commands::{Cli, Commands, CurateArgs, run_command};
