//! Track classification.
//!
//! Decides whether a track is usable as-is or must be set aside:
//!
//! - `Complete` - artist, title and bitrate present, bitrate at or above the floor
//! - `Incomplete` - missing artist/title, unknown bitrate, or below the floor
//! - `Unparseable` - the tag container could not be read at all
//!
//! Classification is a pure function of the tags and bitrate. It never
//! looks at the file's location or at anything a previous run did.

use std::fmt;

use crate::model::TrackTags;

/// Minimum acceptable audio bitrate, in bits per second.
pub const DEFAULT_QUALITY_FLOOR_BPS: u32 = 320_000;

/// Why a track failed the completeness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    /// Artist or title is absent or blank
    MissingMetadata,
    /// Bitrate unknown or below the quality floor
    LowBitrate(Option<u32>),
}

impl fmt::Display for IncompleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetadata => write!(f, "missing artist/title"),
            Self::LowBitrate(Some(bps)) => write!(f, "low bitrate ({}kbps)", bps / 1000),
            Self::LowBitrate(None) => write!(f, "unknown bitrate"),
        }
    }
}

/// Outcome of classifying one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Complete,
    Incomplete(IncompleteReason),
    Unparseable,
}

/// Classify a track.
///
/// `tags` is `None` when the metadata read failed. Missing metadata is
/// reported in preference to a low bitrate when both apply.
pub fn classify(tags: Option<&TrackTags>, bitrate: Option<u32>, floor_bps: u32) -> Classification {
    let Some(tags) = tags else {
        return Classification::Unparseable;
    };

    if tags.artist_trimmed().is_none() || tags.title_trimmed().is_none() {
        return Classification::Incomplete(IncompleteReason::MissingMetadata);
    }

    match bitrate {
        Some(bps) if bps >= floor_bps => Classification::Complete,
        other => Classification::Incomplete(IncompleteReason::LowBitrate(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(artist: Option<&str>, title: Option<&str>) -> TrackTags {
        TrackTags {
            artist: artist.map(String::from),
            title: title.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_at_exact_floor() {
        let t = tags(Some("Artist"), Some("Title"));
        assert_eq!(
            classify(Some(&t), Some(320_000), DEFAULT_QUALITY_FLOOR_BPS),
            Classification::Complete
        );
    }

    #[test]
    fn test_low_bitrate_is_incomplete() {
        let t = tags(Some("Artist"), Some("Title"));
        assert_eq!(
            classify(Some(&t), Some(128_000), DEFAULT_QUALITY_FLOOR_BPS),
            Classification::Incomplete(IncompleteReason::LowBitrate(Some(128_000)))
        );
    }

    #[test]
    fn test_unknown_bitrate_is_incomplete() {
        let t = tags(Some("Artist"), Some("Title"));
        assert_eq!(
            classify(Some(&t), None, DEFAULT_QUALITY_FLOOR_BPS),
            Classification::Incomplete(IncompleteReason::LowBitrate(None))
        );
    }

    #[test]
    fn test_missing_fields_are_incomplete() {
        for t in [
            tags(None, Some("Title")),
            tags(Some("Artist"), None),
            tags(Some(""), Some("Title")),
            tags(Some("Artist"), Some("   ")),
            tags(None, None),
        ] {
            assert_eq!(
                classify(Some(&t), Some(320_000), DEFAULT_QUALITY_FLOOR_BPS),
                Classification::Incomplete(IncompleteReason::MissingMetadata),
                "tags: {:?}",
                t
            );
        }
    }

    #[test]
    fn test_missing_metadata_wins_over_low_bitrate() {
        let t = tags(None, Some("Title"));
        assert_eq!(
            classify(Some(&t), Some(64_000), DEFAULT_QUALITY_FLOOR_BPS),
            Classification::Incomplete(IncompleteReason::MissingMetadata)
        );
    }

    #[test]
    fn test_unreadable_is_unparseable() {
        assert_eq!(
            classify(None, Some(320_000), DEFAULT_QUALITY_FLOOR_BPS),
            Classification::Unparseable
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            IncompleteReason::LowBitrate(Some(128_000)).to_string(),
            "low bitrate (128kbps)"
        );
        assert_eq!(IncompleteReason::MissingMetadata.to_string(), "missing artist/title");
    }
}
