//! Directory enumeration for curation runs.
//!
//! Walks a root recursively and yields audio files grouped by directory:
//! within each directory every file is yielded before any subdirectory is
//! entered, so a caller can keep per-directory state until the directory
//! changes. Listings are read before their entries are yielded, which
//! means files renamed while processing a directory are not seen again.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Extensions curated when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Recursive, directory-grouped walk over a library root.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_names: Vec<String>,
    excluded_paths: Vec<PathBuf>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            excluded_names: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }

    /// Only yield files with one of these extensions (case-insensitive).
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Never descend into directories with this name.
    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.excluded_names.push(name.into());
        self
    }

    /// Never descend into this directory.
    ///
    /// Matched against walked paths as spelled, so it must be resolved the
    /// same way as the root.
    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    /// Audio files under the root, files before subdirectories, each
    /// level sorted by name.
    ///
    /// Unreadable entries are logged and skipped.
    pub fn entries(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by(files_first)
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(move |path| is_audio_file(path, &self.extensions))
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let by_name = entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.excluded_names.iter().any(|n| n == name));
        by_name || self.excluded_paths.iter().any(|p| p == entry.path())
    }
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    let key = |e: &DirEntry| e.file_type().is_dir();
    key(a)
        .cmp(&key(b))
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Check if a path has one of the given extensions (case-insensitive).
pub fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
