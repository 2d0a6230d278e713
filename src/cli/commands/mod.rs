//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `curate`: Full curation run over a folder
//! - `consolidate`: Gather per-directory quarantine folders
//! - `inspect`: Show what the curator sees in one file
//! - `settings`: Show or initialise the config file

mod consolidate;
mod curate;
mod inspect;
mod settings;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config;
use crate::pipeline::DEFAULT_QUARANTINE_FOLDER;

pub use consolidate::cmd_consolidate;
pub use curate::cmd_curate;
pub use inspect::cmd_inspect;
pub use settings::cmd_config;

/// Track Curator CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TRACK_CURATOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify, tag, rename and quarantine every track under a folder
    Curate(CurateArgs),
    /// Move the contents of every quarantine folder into one directory
    Consolidate {
        /// Library root to search for quarantine folders
        root: PathBuf,
        /// Directory that receives the quarantined tracks
        #[arg(short, long)]
        target: PathBuf,
        /// Name of the per-directory quarantine folders
        #[arg(long, default_value = DEFAULT_QUARANTINE_FOLDER)]
        folder_name: String,
        /// Dry run - show what would be done without actually moving files
        #[arg(long)]
        dry_run: bool,
    },
    /// Show tags, bitrate and classification of one file
    Inspect {
        /// Path to the audio file
        path: PathBuf,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Options of the `curate` command. Unset options fall back to the
/// config file.
#[derive(Args, Debug)]
pub struct CurateArgs {
    /// Library root to curate
    pub root: PathBuf,

    /// Where artist and title come from
    #[arg(long, value_enum)]
    pub naming: Option<NamingArg>,

    /// Proper-case artist and title taken from file names
    #[arg(long)]
    pub proper_case: bool,

    /// Quarantine into this single directory instead of per-folder `missing` folders
    #[arg(long, conflicts_with = "no_quarantine")]
    pub quarantine_to: Option<PathBuf>,

    /// Leave incomplete tracks where they are
    #[arg(long)]
    pub no_quarantine: bool,

    /// Quarantine tracks whose tags cannot be read instead of skipping them
    #[arg(long)]
    pub quarantine_unreadable: bool,

    /// When to download cover art
    #[arg(long, value_enum)]
    pub covers: Option<CoversArg>,

    /// What happens to the files of complete tracks
    #[arg(long, value_enum)]
    pub placement: Option<PlacementArg>,

    /// Subfolder used by `--placement subfolder`
    #[arg(long, default_value = "done")]
    pub subfolder_name: String,

    /// Minimum bitrate in bits per second
    #[arg(long)]
    pub quality_floor: Option<u32>,

    /// Cover art catalog API root
    #[arg(long, env = "TRACK_CURATOR_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Dry run - show what would be done without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    Tags,
    Filename,
    TagsThenFilename,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CoversArg {
    WhenMissing,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlacementArg {
    Rename,
    Subfolder,
    Untouched,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Curate(args) => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            cmd_curate(&rt, &config, args)
        }
        Commands::Consolidate {
            root,
            target,
            folder_name,
            dry_run,
        } => cmd_consolidate(root, target, folder_name, *dry_run),
        Commands::Inspect { path } => cmd_inspect(path, &config.curation),
        Commands::Config { init } => cmd_config(&config, cli.config.as_deref(), *init),
    }
}
