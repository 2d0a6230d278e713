//! Track Curator - keeps a folder of audio files tidy.
//!
//! Every track under a folder is classified by tag completeness and
//! bitrate. Complete tracks get normalized tags, a cover when they lack
//! one, and a canonical `Artist - Title` file name; incomplete ones are
//! moved into a quarantine folder. Re-running on a curated folder is a
//! no-op.

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod organizer;
pub mod pipeline;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let directive = if args.verbose {
        "track_curator=debug"
    } else {
        "track_curator=info"
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    cli::run_command(&args)
}
