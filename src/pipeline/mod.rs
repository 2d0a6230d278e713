//! The curation pipeline.
//!
//! Walks a library root and drives every audio file through
//!
//! ```text
//! Discovered -> Read -> Classified -> Enriched -> Finalized (kept)
//!                   \            \-> Quarantined
//!                    \-> Skipped / Quarantined (unreadable)
//! ```
//!
//! Tracks are processed one at a time, each one to completion before the
//! next is started. A failure on one track becomes that track's outcome
//! and never aborts the run; only an unreadable root does.
//!
//! Per-directory state (the lazily created quarantine folder) lives in a
//! [`DirectoryContext`] that is replaced whenever the walk moves on to
//! another directory.

mod config;
mod outcome;

pub use config::{
    CoverPolicy, CurationConfig, DEFAULT_ALBUM, DEFAULT_QUARANTINE_FOLDER, NamingSource,
    Placement, QuarantinePolicy,
};
pub use outcome::{QuarantineReason, RunSummary, SkipReason, TrackOutcome};

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{self, CatalogApi};
use crate::classifier::{Classification, classify};
use crate::error::{Error, Result, ResultExt};
use crate::metadata::TagStore;
use crate::model::{EnrichedTagSet, TrackTags};
use crate::naming;
use crate::organizer::{Relocator, resolve_path};
use crate::scanner::Scanner;

/// State shared by the tracks of one directory.
#[derive(Debug)]
pub struct DirectoryContext {
    path: PathBuf,
    quarantine: Option<PathBuf>,
}

impl DirectoryContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quarantine: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory's quarantine folder, created on first use.
    fn quarantine_folder(&mut self, folder_name: &str, dry_run: bool) -> std::io::Result<PathBuf> {
        if let Some(folder) = &self.quarantine {
            return Ok(folder.clone());
        }
        let folder = self.path.join(folder_name);
        if !dry_run && !folder.is_dir() {
            fs::create_dir(&folder)?;
            tracing::info!(folder = %folder.display(), "Created quarantine folder");
        }
        self.quarantine = Some(folder.clone());
        Ok(folder)
    }
}

/// Runs curation over a directory tree.
pub struct CurationPipeline<S, C> {
    config: CurationConfig,
    store: S,
    catalog: C,
    relocator: Relocator,
    /// Consolidated quarantine target in resolved form, set by [`run`](Self::run)
    quarantine_target: Option<PathBuf>,
}

impl<S, C> CurationPipeline<S, C>
where
    S: TagStore,
    C: CatalogApi,
{
    pub fn new(config: CurationConfig, store: S, catalog: C) -> Self {
        let relocator = if config.dry_run {
            Relocator::dry_run()
        } else {
            Relocator::new()
        };
        Self {
            config,
            store,
            catalog,
            relocator,
            quarantine_target: None,
        }
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    /// Curate every audio file under `root`.
    ///
    /// Fails only when `root` is missing or cannot be listed.
    pub async fn run(&mut self, root: &Path) -> Result<RunSummary> {
        if !root.is_dir() {
            return Err(Error::not_found(root));
        }
        fs::read_dir(root).with_context(format!("reading {}", root.display()))?;
        let root = fs::canonicalize(root).with_context(format!("resolving {}", root.display()))?;
        self.quarantine_target = self.prepare_quarantine_target();

        tracing::info!(
            root = %root.display(),
            dry_run = self.config.dry_run,
            "Starting curation run"
        );

        let scanner = self.scanner(&root);
        let mut summary = RunSummary::default();
        let mut current: Option<DirectoryContext> = None;

        for path in scanner.entries() {
            let dir = path.parent().unwrap_or(&root);
            let mut context = match current.take() {
                Some(context) if context.path() == dir => context,
                _ => {
                    summary.directories += 1;
                    tracing::debug!(dir = %dir.display(), "Entering directory");
                    DirectoryContext::new(dir)
                }
            };

            let outcome = self.process_track(&path, &mut context).await;
            log_outcome(&path, &outcome);
            summary.record(&outcome);
            current = Some(context);
        }

        tracing::info!(
            tracks = summary.tracks,
            kept = summary.kept,
            renamed = summary.renamed,
            quarantined = summary.quarantined,
            skipped = summary.skipped,
            "Curation run finished"
        );
        Ok(summary)
    }

    fn scanner(&self, root: &Path) -> Scanner {
        let mut scanner = Scanner::new(root).extensions(&self.config.extensions);
        if let Some(name) = self.config.quarantine_folder_name() {
            scanner = scanner.exclude_name(name);
        }
        if let Some(name) = self.config.placement_folder_name() {
            scanner = scanner.exclude_name(name);
        }
        if let Some(target) = &self.quarantine_target {
            scanner = scanner.exclude_path(target.clone());
        }
        scanner
    }

    /// Create the consolidated target and resolve it, so the walk
    /// recognizes it however it was spelled.
    fn prepare_quarantine_target(&self) -> Option<PathBuf> {
        let QuarantinePolicy::Consolidated { target } = &self.config.quarantine else {
            return None;
        };
        if !self.config.dry_run
            && let Err(e) = fs::create_dir_all(target)
        {
            tracing::warn!(dir = %target.display(), error = %e, "Cannot create quarantine target");
        }
        Some(resolve_path(target))
    }

    /// Drive one track to its terminal state.
    pub async fn process_track(
        &mut self,
        path: &Path,
        context: &mut DirectoryContext,
    ) -> TrackOutcome {
        let (tags, bitrate, read_error) = match self.store.read_track(path) {
            Ok(track) => {
                let Some(tags) = self.resolve_names(path, track.tags) else {
                    return TrackOutcome::Skipped(SkipReason::NoSeparator);
                };
                (Some(tags), track.bitrate, None)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read metadata");
                (None, None, Some(e.to_string()))
            }
        };

        let classification = classify(tags.as_ref(), bitrate, self.config.quality_floor_bps);
        tracing::debug!(path = %path.display(), ?classification, ?bitrate, "Classified");

        match (classification, tags) {
            (Classification::Complete, Some(tags)) => self.keep(path, &tags, context).await,
            (Classification::Incomplete(reason), _) => {
                self.quarantine(path, context, reason.into())
            }
            (Classification::Unparseable | Classification::Complete, _) => {
                if self.config.quarantine_unreadable {
                    return self.quarantine(path, context, QuarantineReason::Unreadable);
                }
                TrackOutcome::Skipped(SkipReason::UnreadableMetadata(
                    read_error.unwrap_or_default(),
                ))
            }
        }
    }

    /// Apply the naming source. `None` when the file name was required but
    /// has no `Artist - Title` shape.
    fn resolve_names(&self, path: &Path, mut tags: TrackTags) -> Option<TrackTags> {
        let from_file_name = match self.config.naming {
            NamingSource::Tags => false,
            NamingSource::Filename => true,
            NamingSource::TagsThenFilename => {
                tags.artist_trimmed().is_none() || tags.title_trimmed().is_none()
            }
        };
        if !from_file_name {
            return Some(tags);
        }

        let parsed = path.file_stem().and_then(|s| s.to_str()).and_then(|stem| {
            if self.config.proper_case {
                naming::parse_proper_case(stem)
            } else {
                naming::parse(stem)
            }
        });

        match parsed {
            Some(name) => {
                tags.artist = Some(name.artist);
                tags.title = Some(name.title);
                tags.performers.clear();
                Some(tags)
            }
            None if self.config.naming == NamingSource::Filename => None,
            // Left incomplete; classification quarantines it
            None => Some(tags),
        }
    }

    async fn keep(
        &mut self,
        path: &Path,
        tags: &TrackTags,
        context: &mut DirectoryContext,
    ) -> TrackOutcome {
        let (Some(primary), Some(title)) = (tags.artist_trimmed(), tags.title_trimmed()) else {
            return self.quarantine(path, context, QuarantineReason::MissingMetadata);
        };

        let artist = if self.config.merge_performers {
            naming::merge_artists(primary, &tags.performers)
        } else {
            primary.to_string()
        };
        let album = tags
            .album
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(self.config.default_album.as_str());

        let text = EnrichedTagSet {
            title: Some(title.to_string()),
            artist: Some(artist.clone()),
            album: Some(album.to_string()),
            year: Some(tags.year.map(|y| y.to_string()).unwrap_or_default()),
            cover: None,
        };
        let wants_cover = match self.config.covers {
            CoverPolicy::WhenMissing => tags.picture_count == 0,
            CoverPolicy::Always => true,
            CoverPolicy::Never => false,
        };

        let mut tags_written = 0;
        let mut cover_added = false;

        if self.config.dry_run {
            tracing::info!(path = %path.display(), artist = %artist, title, wants_cover, "Would normalize tags");
        } else {
            let cover = if wants_cover {
                catalog::fetch_cover(&self.catalog, primary, title).await
            } else {
                None
            };

            match self.store.write_tags(path, &text) {
                Ok(result) => tags_written += result.fields_updated,
                Err(e) => return TrackOutcome::Skipped(SkipReason::WriteFailed(e.to_string())),
            }

            if let Some(cover) = cover {
                match self.store.write_tags(path, &EnrichedTagSet::cover_only(cover)) {
                    Ok(result) => {
                        cover_added = result.changed();
                        tags_written += result.fields_updated;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to embed cover")
                    }
                }
            }
        }

        let destination = match &self.config.placement {
            Placement::Untouched => {
                return TrackOutcome::Kept {
                    path: path.to_path_buf(),
                    renamed: false,
                    cover_added,
                    tags_written,
                };
            }
            Placement::RenameInPlace => context.path().to_path_buf(),
            Placement::Subfolder { folder_name } => context.path().join(folder_name),
        };

        let extension = path.extension().and_then(|e| e.to_str());
        let file_name = naming::canonical_file_name(&artist, title, extension);

        match self.relocator.relocate(path, &destination, &file_name) {
            Ok(relocated) => TrackOutcome::Kept {
                path: relocated.path,
                renamed: relocated.moved,
                cover_added,
                tags_written,
            },
            Err(e) => TrackOutcome::Skipped(SkipReason::RenameFailed(e.to_string())),
        }
    }

    fn quarantine(
        &mut self,
        path: &Path,
        context: &mut DirectoryContext,
        reason: QuarantineReason,
    ) -> TrackOutcome {
        let folder = match &self.config.quarantine {
            QuarantinePolicy::Disabled => {
                return TrackOutcome::Skipped(SkipReason::QuarantineDisabled(reason));
            }
            QuarantinePolicy::Consolidated { target } => self
                .quarantine_target
                .clone()
                .unwrap_or_else(|| target.clone()),
            QuarantinePolicy::PerDirectory { folder_name } => {
                match context.quarantine_folder(folder_name, self.config.dry_run) {
                    Ok(folder) => folder,
                    Err(e) => {
                        return TrackOutcome::Skipped(SkipReason::QuarantineFailed(e.to_string()));
                    }
                }
            }
        };

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return TrackOutcome::Skipped(SkipReason::InvalidFileName);
        };

        match self.relocator.relocate(path, &folder, name) {
            Ok(relocated) => TrackOutcome::Quarantined {
                path: relocated.path,
                reason,
            },
            Err(e) => TrackOutcome::Skipped(SkipReason::QuarantineFailed(e.to_string())),
        }
    }
}

fn log_outcome(path: &Path, outcome: &TrackOutcome) {
    match outcome {
        TrackOutcome::Kept {
            path: to,
            renamed,
            cover_added,
            tags_written,
        } => tracing::info!(
            from = %path.display(),
            to = %to.display(),
            renamed,
            cover_added,
            tags_written,
            "Kept"
        ),
        TrackOutcome::Quarantined { path: to, reason } => tracing::info!(
            from = %path.display(),
            to = %to.display(),
            %reason,
            "Quarantined"
        ),
        TrackOutcome::Skipped(reason) => {
            tracing::warn!(path = %path.display(), %reason, "Skipped")
        }
    }
}
