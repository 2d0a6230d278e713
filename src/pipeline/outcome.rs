//! Per-track outcomes and the run summary.

use std::fmt;
use std::path::PathBuf;

use crate::classifier::IncompleteReason;

/// Why a track was set aside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineReason {
    MissingMetadata,
    /// Bitrate in bits per second, `None` when it could not be measured
    LowBitrate(Option<u32>),
    Unreadable,
}

impl From<IncompleteReason> for QuarantineReason {
    fn from(reason: IncompleteReason) -> Self {
        match reason {
            IncompleteReason::MissingMetadata => Self::MissingMetadata,
            IncompleteReason::LowBitrate(bps) => Self::LowBitrate(bps),
        }
    }
}

impl fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetadata => fmt::Display::fmt(&IncompleteReason::MissingMetadata, f),
            Self::LowBitrate(bps) => fmt::Display::fmt(&IncompleteReason::LowBitrate(*bps), f),
            Self::Unreadable => write!(f, "unreadable metadata"),
        }
    }
}

/// Why a track was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Tag container could not be parsed
    UnreadableMetadata(String),
    /// Filename naming was requested but the name has no `-`
    NoSeparator,
    /// Incomplete, but quarantine is disabled
    QuarantineDisabled(QuarantineReason),
    QuarantineFailed(String),
    WriteFailed(String),
    RenameFailed(String),
    /// File name is not valid UTF-8
    InvalidFileName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableMetadata(e) => write!(f, "unreadable metadata: {e}"),
            Self::NoSeparator => write!(f, "no 'Artist - Title' separator in file name"),
            Self::QuarantineDisabled(reason) => write!(f, "{reason} (quarantine disabled)"),
            Self::QuarantineFailed(e) => write!(f, "quarantine failed: {e}"),
            Self::WriteFailed(e) => write!(f, "tag write failed: {e}"),
            Self::RenameFailed(e) => write!(f, "rename failed: {e}"),
            Self::InvalidFileName => write!(f, "file name is not valid UTF-8"),
        }
    }
}

/// Terminal state of one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Complete track, tags normalized
    Kept {
        /// Final location
        path: PathBuf,
        /// Whether the file was renamed or moved
        renamed: bool,
        cover_added: bool,
        /// Tag fields changed on disk
        tags_written: usize,
    },
    Quarantined {
        /// Location inside the quarantine folder
        path: PathBuf,
        reason: QuarantineReason,
    },
    Skipped(SkipReason),
}

/// Counts over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tracks: usize,
    pub kept: usize,
    pub renamed: usize,
    pub covers_added: usize,
    /// Kept tracks whose tags changed
    pub tags_updated: usize,
    pub quarantined: usize,
    pub skipped: usize,
    /// Directories containing at least one candidate file
    pub directories: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &TrackOutcome) {
        self.tracks += 1;
        match outcome {
            TrackOutcome::Kept {
                renamed,
                cover_added,
                tags_written,
                ..
            } => {
                self.kept += 1;
                self.renamed += usize::from(*renamed);
                self.covers_added += usize::from(*cover_added);
                self.tags_updated += usize::from(*tags_written > 0);
            }
            TrackOutcome::Quarantined { .. } => self.quarantined += 1,
            TrackOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Files renamed, moved or quarantined.
    pub fn relocations(&self) -> usize {
        self.renamed + self.quarantined
    }
}
