//! Audio file metadata reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access.
//!
//! # Features
//! - Read artist, title, album, year, extra performers and picture count
//! - Measure the audio bitrate (reported in bits per second)
//! - Merge a partial tag set into the file's existing tag container
//!
//! Writes are read-modify-write merges: only the fields present in the
//! [`EnrichedTagSet`] are assigned, everything else in the container is
//! left alone. A write that would not change anything does not touch the
//! file.

use std::borrow::Cow;
use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};

use crate::error::{Error, Result};
use crate::model::{CoverImage, EnrichedTagSet, Track, TrackTags};

/// Result of a write operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of fields that were updated
    pub fields_updated: usize,
}

impl WriteResult {
    pub fn changed(&self) -> bool {
        self.fields_updated > 0
    }
}

/// Access to a track's tag container.
///
/// The pipeline only talks to tags through this trait so tests can
/// substitute an in-memory store.
pub trait TagStore {
    /// Read tags and bitrate. Fails when the container cannot be parsed.
    fn read_track(&self, path: &Path) -> Result<Track>;

    /// Merge `tags` into the file's existing tag container.
    fn write_tags(&self, path: &Path, tags: &EnrichedTagSet) -> Result<WriteResult>;
}

impl<T: TagStore + ?Sized> TagStore for &T {
    fn read_track(&self, path: &Path) -> Result<Track> {
        (**self).read_track(path)
    }

    fn write_tags(&self, path: &Path, tags: &EnrichedTagSet) -> Result<WriteResult> {
        (**self).write_tags(path, tags)
    }
}

/// [`TagStore`] backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagStore;

impl TagStore for LoftyTagStore {
    fn read_track(&self, path: &Path) -> Result<Track> {
        read(path)
    }

    fn write_tags(&self, path: &Path, tags: &EnrichedTagSet) -> Result<WriteResult> {
        write(path, tags)
    }
}

pub fn read(path: &Path) -> Result<Track> {
    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("failed to open file for probing: {e}")))?
        .read()
        .map_err(|e| Error::metadata(path, format!("failed to read file metadata: {e}")))?;

    // lofty reports kbps; zero means the stream could not be measured
    let bitrate = tagged_file
        .properties()
        .audio_bitrate()
        .filter(|kbps| *kbps > 0)
        .map(|kbps| kbps.saturating_mul(1000));

    // Get the primary tag, or fall back to the first available tag
    let tags = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .map(tags_from)
        .unwrap_or_default();

    Ok(Track {
        path: path.to_path_buf(),
        tags,
        bitrate,
    })
}

fn tags_from(tag: &Tag) -> TrackTags {
    // Multi-valued artist frames: the first value is the primary artist,
    // the rest are treated as additional performers.
    let mut performers: Vec<String> = tag
        .get_strings(&ItemKey::TrackArtist)
        .skip(1)
        .map(str::to_string)
        .collect();
    performers.extend(tag.get_strings(&ItemKey::Performer).map(str::to_string));

    TrackTags {
        artist: tag.artist().map(|s| s.to_string()),
        title: tag.title().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        year: tag.year(),
        performers,
        picture_count: tag.pictures().len(),
    }
}

/// Merge a partial tag set into an audio file.
pub fn write(path: &Path, tags: &EnrichedTagSet) -> Result<WriteResult> {
    if tags.is_empty() {
        return Ok(WriteResult::default());
    }

    let mut tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("failed to open file for writing: {e}")))?
        .read()
        .map_err(|e| Error::metadata(path, format!("failed to read file for tag writing: {e}")))?;

    // Get the primary tag type for this format, or create one
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let Some(tag) = tagged_file.tag_mut(tag_type) else {
        return Err(Error::metadata(path, "format has no writable tag"));
    };

    let mut fields_updated = 0;

    if let Some(title) = &tags.title
        && differs(tag.title(), title)
    {
        tag.set_title(title.clone());
        fields_updated += 1;
    }

    if let Some(artist) = &tags.artist
        && differs(tag.artist(), artist)
    {
        tag.set_artist(artist.clone());
        fields_updated += 1;
    }

    if let Some(album) = &tags.album
        && differs(tag.album(), album)
    {
        tag.set_album(album.clone());
        fields_updated += 1;
    }

    // An empty year means "unknown" and never clears an existing one
    if let Some(year) = tags.year.as_deref().and_then(parse_year)
        && tag.year() != Some(year)
    {
        tag.set_year(year);
        fields_updated += 1;
    }

    if let Some(cover) = &tags.cover
        && set_front_cover(tag, cover)
    {
        fields_updated += 1;
    }

    if fields_updated > 0 {
        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::metadata(path, format!("failed to write tags to file: {e}")))?;
    }

    Ok(WriteResult { fields_updated })
}

fn differs(current: Option<Cow<'_, str>>, new: &str) -> bool {
    current.as_deref() != Some(new)
}

/// Leading four digits of a textual year ("1999", "1999-05-01").
fn parse_year(text: &str) -> Option<u32> {
    text.trim().get(..4).and_then(|y| y.parse().ok())
}

/// Replace the front cover. Returns false when the same image is already there.
fn set_front_cover(tag: &mut Tag, cover: &CoverImage) -> bool {
    let unchanged = tag
        .pictures()
        .iter()
        .any(|p| p.pic_type() == PictureType::CoverFront && p.data() == cover.data.as_slice());
    if unchanged {
        return false;
    }

    tag.remove_picture_type(PictureType::CoverFront);
    tag.push_picture(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(mime_type(&cover.mime_type)),
        None,
        cover.data.clone(),
    ));
    true
}

fn mime_type(mime: &str) -> MimeType {
    match mime {
        "image/png" => MimeType::Png,
        "image/gif" => MimeType::Gif,
        "image/bmp" => MimeType::Bmp,
        "image/tiff" => MimeType::Tiff,
        _ => MimeType::Jpeg, // Default assumption
    }
}
