//! Single-file inspection command.

use anyhow::Context;
use std::path::Path;

use crate::classifier::{Classification, classify};
use crate::metadata;
use crate::model::Track;
use crate::naming;
use crate::pipeline::CurationConfig;

/// Print what a curation run would see in one file
pub fn cmd_inspect(path: &Path, curation: &CurationConfig) -> anyhow::Result<()> {
    let track =
        metadata::read(path).with_context(|| format!("Cannot read tags of {}", path.display()))?;

    for line in describe(&track) {
        println!("{}", line);
    }

    let classification = classify(Some(&track.tags), track.bitrate, curation.quality_floor_bps);
    println!("Status:      {}", describe_classification(&classification));

    let parsed = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(naming::parse);
    match parsed {
        Some(name) => println!("File name:   {} / {}", name.artist, name.title),
        None => println!("File name:   (no 'Artist - Title' pattern)"),
    }
    Ok(())
}

fn describe(track: &Track) -> Vec<String> {
    let tags = &track.tags;
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();
    vec![
        format!("File:        {}", track.path.display()),
        format!("Artist:      {}", or_dash(tags.artist.as_deref())),
        format!("Title:       {}", or_dash(tags.title.as_deref())),
        format!("Album:       {}", or_dash(tags.album.as_deref())),
        format!(
            "Year:        {}",
            tags.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "Performers:  {}",
            if tags.performers.is_empty() {
                "-".to_string()
            } else {
                tags.performers.join(", ")
            }
        ),
        format!("Pictures:    {}", tags.picture_count),
        format!(
            "Bitrate:     {}",
            track
                .bitrate
                .map(|bps| format!("{} kbps", bps / 1000))
                .unwrap_or_else(|| "unknown".to_string())
        ),
    ]
}

fn describe_classification(classification: &Classification) -> String {
    match classification {
        Classification::Complete => "✓ complete".to_string(),
        Classification::Incomplete(reason) => format!("⚠ incomplete: {}", reason),
        Classification::Unparseable => "✗ unreadable".to_string(),
    }
}
