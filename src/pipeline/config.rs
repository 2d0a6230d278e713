//! Options for a curation run.
//!
//! Every behavioural variant of a run is a field here; nothing is decided
//! by which entry point happened to be invoked. The struct doubles as the
//! `[curation]` section of the config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_QUALITY_FLOOR_BPS;

/// Where a track's artist and title come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingSource {
    /// Tag values only
    #[default]
    Tags,
    /// Always parsed from `Artist - Title` in the file name
    Filename,
    /// Tags when both are present, otherwise the file name
    TagsThenFilename,
}

/// Where incomplete tracks go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum QuarantinePolicy {
    /// A folder of this name next to the track, created on first use
    PerDirectory { folder_name: String },
    /// One directory for the whole run
    Consolidated { target: PathBuf },
    /// Leave incomplete tracks where they are
    Disabled,
}

impl Default for QuarantinePolicy {
    fn default() -> Self {
        Self::PerDirectory {
            folder_name: DEFAULT_QUARANTINE_FOLDER.to_string(),
        }
    }
}

/// When to look up cover art.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverPolicy {
    /// Only for tracks without any embedded picture
    #[default]
    WhenMissing,
    /// For every kept track, replacing the front cover
    Always,
    Never,
}

/// What happens to a kept track's file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Placement {
    /// Rename to `Artist - Title.ext` in its directory
    #[default]
    RenameInPlace,
    /// Move under the canonical name into a subfolder of its directory
    Subfolder { folder_name: String },
    /// Rewrite tags only
    Untouched,
}

pub const DEFAULT_QUARANTINE_FOLDER: &str = "missing";
pub const DEFAULT_ALBUM: &str = "Unknown";

/// Effective configuration of a curation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Minimum bitrate in bits per second for a track to be kept
    pub quality_floor_bps: u32,
    pub naming: NamingSource,
    /// Proper-case artist/title recovered from file names
    pub proper_case: bool,
    pub quarantine: QuarantinePolicy,
    /// Quarantine tracks whose tags cannot be read instead of skipping them
    pub quarantine_unreadable: bool,
    pub covers: CoverPolicy,
    pub placement: Placement,
    /// Album written when the track has none
    pub default_album: String,
    /// Fold extra performers into the written artist
    pub merge_performers: bool,
    /// File extensions to curate, case-insensitive
    pub extensions: Vec<String>,
    /// Report what would happen without network, writes or moves
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            quality_floor_bps: DEFAULT_QUALITY_FLOOR_BPS,
            naming: NamingSource::default(),
            proper_case: false,
            quarantine: QuarantinePolicy::default(),
            quarantine_unreadable: false,
            covers: CoverPolicy::default(),
            placement: Placement::default(),
            default_album: DEFAULT_ALBUM.to_string(),
            merge_performers: true,
            extensions: vec!["mp3".to_string()],
            dry_run: false,
        }
    }
}

impl CurationConfig {
    /// Name of the per-directory quarantine folder, if that policy is active.
    pub fn quarantine_folder_name(&self) -> Option<&str> {
        match &self.quarantine {
            QuarantinePolicy::PerDirectory { folder_name } => Some(folder_name),
            _ => None,
        }
    }

    /// Name of the per-directory placement subfolder, if that placement is active.
    pub fn placement_folder_name(&self) -> Option<&str> {
        match &self.placement {
            Placement::Subfolder { folder_name } => Some(folder_name),
            _ => None,
        }
    }
}
