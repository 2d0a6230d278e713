//! Gather per-directory quarantine folders into one target directory.
//!
//! Finds every folder named like the quarantine folder under a root,
//! moves each file it holds into a single target directory (with the
//! usual collision suffixing) and removes the folder once it is empty.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{Relocator, resolve_path};
use crate::error::{Error, Result, ResultExt};

/// What a consolidation run did.
#[derive(Debug, Default)]
pub struct ConsolidationReport {
    /// (from, to) for every file moved
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Files that could not be moved, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Quarantine folders removed because they ended up empty
    pub folders_removed: usize,
}

/// Move the contents of every `folder_name` directory under `root` into
/// `target`.
///
/// Per-file failures are recorded in the report and never stop the run.
/// Fails only when `root` itself cannot be read.
pub fn consolidate_quarantine(
    root: &Path,
    folder_name: &str,
    target: &Path,
    relocator: &mut Relocator,
) -> Result<ConsolidationReport> {
    if !root.is_dir() {
        return Err(Error::not_found(root));
    }
    fs::read_dir(root).with_context(format!("reading {}", root.display()))?;

    // Walked paths and the target must share one spelling to be compared
    let root = fs::canonicalize(root).with_context(format!("resolving {}", root.display()))?;
    let target = resolve_path(target);

    let folders = find_quarantine_folders(&root, folder_name, &target);
    tracing::info!(count = folders.len(), root = %root.display(), "Found quarantine folders");

    let mut report = ConsolidationReport::default();
    for folder in folders {
        consolidate_folder(&folder, &target, relocator, &mut report);
    }
    Ok(report)
}

fn find_quarantine_folders(root: &Path, folder_name: &str, target: &Path) -> Vec<PathBuf> {
    let mut folders = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.path() == target {
            walker.skip_current_dir();
            continue;
        }
        if entry.file_name() == folder_name {
            folders.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    folders
}

fn consolidate_folder(
    folder: &Path,
    target: &Path,
    relocator: &mut Relocator,
    report: &mut ConsolidationReport,
) {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(folder = %folder.display(), error = %e, "Cannot read quarantine folder");
            report.failed.push((folder.to_path_buf(), e.to_string()));
            return;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            report.failed.push((path, "file name is not valid UTF-8".to_string()));
            continue;
        };

        match relocator.relocate(&path, target, &name) {
            Ok(relocated) => {
                tracing::info!(from = %path.display(), to = %relocated.path.display(), "Moved");
                report.moved.push((path, relocated.path));
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to move");
                report.failed.push((path, e.to_string()));
            }
        }
    }

    if relocator.is_dry_run() {
        return;
    }
    let empty = fs::read_dir(folder)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if empty {
        match fs::remove_dir(folder) {
            Ok(()) => {
                tracing::info!(folder = %folder.display(), "Removed empty folder");
                report.folders_removed += 1;
            }
            Err(e) => tracing::warn!(folder = %folder.display(), error = %e, "Could not remove folder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{file_names, write_marker_file};
    use tempfile::tempdir;

    #[test]
    fn test_consolidates_nested_folders() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("music");
        let target = temp.path().join("pending");
        let a = root.join("a/missing");
        let b = root.join("b/c/missing");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        write_marker_file(&a, "track.mp3", "from a");
        write_marker_file(&b, "track.mp3", "from b");
        write_marker_file(&b, "other.mp3", "other");
        write_marker_file(&root.join("a"), "kept.mp3", "kept");

        let mut relocator = Relocator::new();
        let report = consolidate_quarantine(&root, "missing", &target, &mut relocator).unwrap();

        assert_eq!(report.moved.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(report.folders_removed, 2);
        assert_eq!(
            file_names(&target),
            vec!["other.mp3", "track.mp3", "track_1.mp3"]
        );
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(root.join("a/kept.mp3").exists());
    }

    #[test]
    fn test_target_inside_root_is_not_consolidated_into_itself() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let target = root.join("missing");
        std::fs::create_dir_all(&target).unwrap();
        write_marker_file(&target, "already.mp3", "x");
        let nested = root.join("album/missing");
        std::fs::create_dir_all(&nested).unwrap();
        write_marker_file(&nested, "new.mp3", "y");

        let mut relocator = Relocator::new();
        let report = consolidate_quarantine(root, "missing", &target, &mut relocator).unwrap();

        assert_eq!(report.moved.len(), 1);
        assert_eq!(file_names(&target), vec!["already.mp3", "new.mp3"]);
    }

    #[test]
    fn test_relative_spelling_of_target_is_still_skipped() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("music");
        let target = root.join("missing");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::create_dir_all(root.join("album")).unwrap();
        write_marker_file(&target, "already.mp3", "x");

        let spelled = root.join("album").join("..").join("missing");
        let mut relocator = Relocator::new();
        let report =
            consolidate_quarantine(&root.join("."), "missing", &spelled, &mut relocator).unwrap();

        assert!(report.moved.is_empty());
        assert_eq!(report.folders_removed, 0);
        assert_eq!(file_names(&target), vec!["already.mp3"]);
    }

    #[test]
    fn test_dry_run_moves_nothing() {
        let temp = tempdir().unwrap();
        let folder = temp.path().join("x/missing");
        std::fs::create_dir_all(&folder).unwrap();
        write_marker_file(&folder, "t.mp3", "t");

        let mut relocator = Relocator::dry_run();
        let report =
            consolidate_quarantine(temp.path(), "missing", &temp.path().join("out"), &mut relocator)
                .unwrap();

        assert_eq!(report.moved.len(), 1);
        assert_eq!(report.folders_removed, 0);
        assert!(folder.join("t.mp3").exists());
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = tempdir().unwrap();
        let mut relocator = Relocator::new();
        let result = consolidate_quarantine(
            &temp.path().join("nope"),
            "missing",
            temp.path(),
            &mut relocator,
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
