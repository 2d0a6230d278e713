//! Curation command.

use anyhow::Context;
use tokio::runtime::Runtime;

use super::{CoversArg, CurateArgs, NamingArg, PlacementArg};
use crate::catalog::DeezerClient;
use crate::config::Config;
use crate::metadata::LoftyTagStore;
use crate::pipeline::{
    CoverPolicy, CurationConfig, CurationPipeline, NamingSource, Placement, QuarantinePolicy,
    RunSummary,
};

/// Curate every track under a folder
pub fn cmd_curate(rt: &Runtime, config: &Config, args: &CurateArgs) -> anyhow::Result<()> {
    let curation = args.apply(config.curation.clone());
    let base_url = args
        .catalog_url
        .clone()
        .unwrap_or_else(|| config.catalog.base_url.clone());
    let catalog = DeezerClient::with_settings(base_url, config.catalog.timeout());

    let mut pipeline = CurationPipeline::new(curation, LoftyTagStore, catalog);

    println!("Curating {}", args.root.display());
    if pipeline.config().dry_run {
        println!("\n[DRY RUN MODE - No files will be changed]\n");
    }
    let summary = rt
        .block_on(pipeline.run(&args.root))
        .with_context(|| format!("Cannot curate {}", args.root.display()))?;

    print_summary(&summary);
    Ok(())
}

impl CurateArgs {
    /// Overlay the command-line options on a configured base.
    pub fn apply(&self, mut config: CurationConfig) -> CurationConfig {
        if let Some(naming) = self.naming {
            config.naming = match naming {
                NamingArg::Tags => NamingSource::Tags,
                NamingArg::Filename => NamingSource::Filename,
                NamingArg::TagsThenFilename => NamingSource::TagsThenFilename,
            };
        }
        if self.proper_case {
            config.proper_case = true;
        }
        if let Some(target) = &self.quarantine_to {
            config.quarantine = QuarantinePolicy::Consolidated {
                target: target.clone(),
            };
        }
        if self.no_quarantine {
            config.quarantine = QuarantinePolicy::Disabled;
        }
        if self.quarantine_unreadable {
            config.quarantine_unreadable = true;
        }
        if let Some(covers) = self.covers {
            config.covers = match covers {
                CoversArg::WhenMissing => CoverPolicy::WhenMissing,
                CoversArg::Always => CoverPolicy::Always,
                CoversArg::Never => CoverPolicy::Never,
            };
        }
        if let Some(placement) = self.placement {
            config.placement = match placement {
                PlacementArg::Rename => Placement::RenameInPlace,
                PlacementArg::Subfolder => Placement::Subfolder {
                    folder_name: self.subfolder_name.clone(),
                },
                PlacementArg::Untouched => Placement::Untouched,
            };
        }
        if let Some(floor) = self.quality_floor {
            config.quality_floor_bps = floor;
        }
        config.dry_run = self.dry_run;
        config
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\nCompleted: {} tracks in {} folders",
        summary.tracks, summary.directories
    );
    println!("  ✓ Kept:        {}", summary.kept);
    println!("    renamed:     {}", summary.renamed);
    println!("    tags fixed:  {}", summary.tags_updated);
    println!("    covers:      {}", summary.covers_added);
    println!("  ⚠ Quarantined: {}", summary.quarantined);
    println!("  ✗ Skipped:     {}", summary.skipped);
}
