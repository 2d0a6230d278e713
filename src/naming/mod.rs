//! File name heuristics.
//!
//! Recovers `(artist, title)` from names shaped like `Artist - Title`,
//! optionally prefixed with a DJ-style `128 BPM` marker, and builds the
//! canonical `Artist - Title.ext` name a curated track is renamed to.
//!
//! Everything here is pure string manipulation; no I/O.

/// Artist/title pair recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub artist: String,
    pub title: String,
}

/// Parse a file name (without extension) into artist and title.
///
/// Strips a leading `<digits> BPM` marker, then splits at the first `-`.
/// Returns `None` when there is no separator or either side is blank.
pub fn parse(stem: &str) -> Option<ParsedName> {
    let clean = strip_bpm_prefix(stem.trim()).trim();
    let (artist, title) = clean.split_once('-')?;
    let artist = artist.trim();
    let title = title.trim();

    if artist.is_empty() || title.is_empty() {
        return None;
    }

    Some(ParsedName {
        artist: artist.to_string(),
        title: title.to_string(),
    })
}

/// Like [`parse`], with both fields rendered by [`proper_case`].
pub fn parse_proper_case(stem: &str) -> Option<ParsedName> {
    parse(stem).map(|name| ParsedName {
        artist: proper_case(&name.artist),
        title: proper_case(&name.title),
    })
}

/// Remove a leading `<digits><ws>*BPM<ws>*` marker (case-insensitive).
///
/// The input is returned unchanged when the marker is not present.
fn strip_bpm_prefix(name: &str) -> &str {
    let digits = name.len() - name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return name;
    }

    let rest = name[digits..].trim_start();
    match rest.get(..3) {
        Some(marker) if marker.eq_ignore_ascii_case("bpm") => rest[3..].trim_start(),
        _ => name,
    }
}

/// Lower-case the text, then capitalize the first letter of each word.
///
/// Words are separated by single spaces; runs of spaces are preserved.
pub fn proper_case(text: &str) -> String {
    text.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Join the primary artist with additional performers.
///
/// Semicolons are treated like commas, names are trimmed, and a name
/// already present (case-insensitive) is not repeated, so applying this
/// to its own output changes nothing.
pub fn merge_artists(primary: &str, performers: &[String]) -> String {
    let mut names: Vec<&str> = Vec::new();

    let candidates = std::iter::once(primary)
        .chain(performers.iter().map(String::as_str))
        .flat_map(|entry| entry.split([',', ';']))
        .map(str::trim)
        .filter(|name| !name.is_empty());

    for name in candidates {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name);
        }
    }

    names.join(", ")
}

/// Build the canonical `Artist - Title.ext` file name.
///
/// The extension is lower-cased; characters that are invalid in file
/// names are replaced.
pub fn canonical_file_name(artist: &str, title: &str, extension: Option<&str>) -> String {
    let stem = format!(
        "{} - {}",
        sanitize_filename(artist.trim()),
        sanitize_filename(title.trim())
    );
    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stem, ext.to_lowercase()),
        _ => stem,
    }
}

/// Sanitizes a filename by removing/replacing invalid characters
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect()
}
