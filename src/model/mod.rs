//! Core data models for a curation run.
//!
//! Defines the entities that flow through the pipeline: [`Track`] (one
//! audio file being processed), [`TrackTags`] (what its tag container
//! says), [`EnrichedTagSet`] (what we intend to write back) and
//! [`CoverImage`] (artwork fetched from the catalog).
//!
//! None of these are persisted; a `Track` lives only while its file is
//! being processed.

use std::path::PathBuf;

/// One audio file under curation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Where the tags were read from
    pub path: PathBuf,
    /// Parsed tag fields
    pub tags: TrackTags,
    /// Audio bitrate in bits per second, if the stream could be measured
    pub bitrate: Option<u32>,
}

/// Tag fields read from a file's metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    /// Additional performers beyond the primary artist, in file order
    pub performers: Vec<String>,
    /// Number of embedded pictures of any type
    pub picture_count: usize,
}

impl TrackTags {
    /// Artist with surrounding whitespace removed, or `None` if blank.
    pub fn artist_trimmed(&self) -> Option<&str> {
        non_blank(self.artist.as_deref())
    }

    /// Title with surrounding whitespace removed, or `None` if blank.
    pub fn title_trimmed(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Raw image returned by the cover art catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Image bytes (JPEG or PNG)
    pub data: Vec<u8>,
    /// MIME type reported by the server
    pub mime_type: String,
}

/// Tag values the pipeline intends to write.
///
/// Every field is optional: a write only touches the fields that are
/// `Some`, so textual and image updates can be issued as separate calls
/// without clobbering each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedTagSet {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Textual year. An empty string means "no year" and never clears one.
    pub year: Option<String>,
    pub cover: Option<CoverImage>,
}

impl EnrichedTagSet {
    /// A set that only carries a cover image.
    pub fn cover_only(cover: CoverImage) -> Self {
        Self {
            cover: Some(cover),
            ..Default::default()
        }
    }

    /// Whether the set carries any textual field.
    pub fn has_text(&self) -> bool {
        self.title.is_some() || self.artist.is_some() || self.album.is_some() || self.year.is_some()
    }

    /// Whether the set carries nothing at all.
    pub fn is_empty(&self) -> bool {
        !self.has_text() && self.cover.is_none()
    }
}
