//! Test utilities and fixtures for track-curator tests.
//!
//! Provides a generator for minimal but valid MPEG-1 Layer III files so
//! the lofty-backed reader and writer can be exercised without shipping
//! binary fixtures, plus a few small helpers shared by module tests.
//!
//! # Example
//!
//! ```ignore
//! use track_curator::test_utils::write_mpeg_file;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("song.mp3");
//! write_mpeg_file(&path, 320);
//! ```

use std::path::{Path, PathBuf};

use crate::model::CoverImage;

/// Number of frames written by [`write_mpeg_file`].
const FRAME_COUNT: usize = 40;

const SAMPLE_RATE: u32 = 44_100;

/// MPEG-1 Layer III bitrate index for a kbps value.
fn bitrate_index(kbps: u32) -> u8 {
    match kbps {
        32 => 1,
        40 => 2,
        48 => 3,
        56 => 4,
        64 => 5,
        80 => 6,
        96 => 7,
        112 => 8,
        128 => 9,
        160 => 10,
        192 => 11,
        224 => 12,
        256 => 13,
        320 => 14,
        other => panic!("{} kbps is not a valid MPEG-1 Layer III bitrate", other),
    }
}

/// Bytes of an untagged constant-bitrate MPEG stream.
///
/// Every frame is a valid header (MPEG-1, Layer III, no CRC, 44.1kHz,
/// mono, no padding) followed by silence.
pub fn mpeg_bytes(kbps: u32) -> Vec<u8> {
    let header = [0xFF, 0xFB, bitrate_index(kbps) << 4, 0xC0];
    let frame_len = (144_000 * kbps / SAMPLE_RATE) as usize;

    let mut data = Vec::with_capacity(frame_len * FRAME_COUNT);
    for _ in 0..FRAME_COUNT {
        data.extend_from_slice(&header);
        data.resize(data.len() + frame_len - header.len(), 0);
    }
    data
}

/// Write an untagged MPEG file at the given bitrate.
pub fn write_mpeg_file(path: &Path, kbps: u32) {
    std::fs::write(path, mpeg_bytes(kbps)).expect("Failed to write MPEG fixture");
}

/// Write a small placeholder file whose content identifies it.
pub fn write_marker_file(dir: &Path, name: &str, marker: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, marker).expect("Failed to write marker file");
    path
}

/// A tiny JPEG-looking payload (SOI + APP0 marker + EOI).
pub fn fake_jpeg() -> CoverImage {
    CoverImage {
        data: vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00,
            0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
        ],
        mime_type: "image/jpeg".to_string(),
    }
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mpeg_bytes_frame_layout() {
        let data = mpeg_bytes(320);
        assert_eq!(data.len(), 1044 * FRAME_COUNT);
        assert_eq!(&data[..3], &[0xFF, 0xFB, 0xE0]);
        assert_eq!(&data[1044..1047], &[0xFF, 0xFB, 0xE0]);
    }

    #[test]
    fn test_low_bitrate_header() {
        let data = mpeg_bytes(128);
        assert_eq!(data[2], 0x90);
        assert_eq!(data.len(), 417 * FRAME_COUNT);
    }

    #[test]
    fn test_file_names_sorted() {
        let dir = tempdir().unwrap();
        write_marker_file(dir.path(), "b.mp3", "b");
        write_marker_file(dir.path(), "a.mp3", "a");
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        assert_eq!(file_names(dir.path()), vec!["a.mp3", "b.mp3"]);
    }
}
