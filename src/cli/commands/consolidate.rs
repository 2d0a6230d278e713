//! Quarantine consolidation command.

use anyhow::Context;
use std::path::Path;

use crate::organizer::{Relocator, consolidate_quarantine};

/// Move every quarantined track under `root` into `target`
pub fn cmd_consolidate(
    root: &Path,
    target: &Path,
    folder_name: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    println!("Gathering '{}' folders under {}", folder_name, root.display());
    println!("Target: {}", target.display());

    if dry_run {
        println!("\n[DRY RUN MODE - No files will be moved]\n");
    }

    let mut relocator = if dry_run {
        Relocator::dry_run()
    } else {
        Relocator::new()
    };
    let report = consolidate_quarantine(root, folder_name, target, &mut relocator)
        .with_context(|| format!("Cannot consolidate {}", root.display()))?;

    for (from, to) in &report.moved {
        let verb = if dry_run { "WOULD MOVE" } else { "MOVED" };
        println!("{}: {} -> {}", verb, from.display(), to.display());
    }
    for (path, error) in &report.failed {
        eprintln!("ERROR moving {}: {}", path.display(), error);
    }

    println!(
        "\nCompleted: {} moved, {} errors, {} folders removed",
        report.moved.len(),
        report.failed.len(),
        report.folders_removed
    );
    Ok(())
}
