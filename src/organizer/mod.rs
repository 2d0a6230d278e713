//! Collision-safe file relocation.
//!
//! Moves a track to a destination directory under a desired name without
//! ever overwriting anything:
//!
//! - If the name is taken, `_1`, `_2`, ... is appended to the stem
//!   (extension preserved) until a free name is found.
//! - The destination is opened with create-new semantics, so a file that
//!   appears between the check and the copy is never clobbered.
//! - Bytes are copied first and the source is deleted only after the copy
//!   succeeded. A failed copy leaves the source untouched.
//!
//! Copy-then-delete is used even within one directory: it behaves the same
//! across mount points, where a plain rename fails.

mod consolidate;

pub use consolidate::{ConsolidationReport, consolidate_quarantine};

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Highest numeric suffix tried before giving up.
const MAX_SUFFIX: u32 = 10_000;

/// Relocation errors
#[derive(Debug, thiserror::Error)]
pub enum RelocationError {
    #[error("Source file not found: {0}")]
    SourceMissing(PathBuf),

    #[error("Invalid destination name: {0:?}")]
    InvalidName(String),

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Copied to {to} but failed to remove {from}: {source}")]
    RemoveSource {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No free name for {name} in {dir}")]
    Exhausted { dir: PathBuf, name: String },
}

/// Where a track ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocated {
    /// Final path of the track
    pub path: PathBuf,
    /// False when the track was already at the desired location
    pub moved: bool,
}

/// Moves files with the collision rule described in the module docs.
///
/// In dry-run mode nothing on disk is touched; chosen names are reserved
/// in memory so two tracks planned in the same run never share one.
#[derive(Debug, Default)]
pub struct Relocator {
    dry_run: bool,
    reserved: HashSet<PathBuf>,
}

impl Relocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A relocator that only plans moves.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            reserved: HashSet::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Move `source` into `destination_dir` as `desired_name`, or the first
    /// free suffixed variant of it.
    pub fn relocate(
        &mut self,
        source: &Path,
        destination_dir: &Path,
        desired_name: &str,
    ) -> Result<Relocated, RelocationError> {
        validate_name(desired_name)?;

        if !source.is_file() {
            return Err(RelocationError::SourceMissing(source.to_path_buf()));
        }

        if is_settled(source, destination_dir, desired_name) {
            return Ok(Relocated {
                path: source.to_path_buf(),
                moved: false,
            });
        }

        if self.dry_run {
            let path = self.plan(destination_dir, desired_name)?;
            self.reserved.insert(path.clone());
            return Ok(Relocated { path, moved: true });
        }

        fs::create_dir_all(destination_dir).map_err(|e| RelocationError::CreateDir {
            path: destination_dir.to_path_buf(),
            source: e,
        })?;

        let (path, dest_file) = self.open_free_destination(destination_dir, desired_name)?;
        copy_then_delete(source, &path, dest_file)?;

        Ok(Relocated { path, moved: true })
    }

    /// First free destination for `desired_name`, without creating it.
    pub fn plan(&self, destination_dir: &Path, desired_name: &str) -> Result<PathBuf, RelocationError> {
        validate_name(desired_name)?;
        (0..=MAX_SUFFIX)
            .map(|n| destination_dir.join(candidate_name(desired_name, n)))
            .find(|candidate| !self.is_taken(candidate))
            .ok_or_else(|| RelocationError::Exhausted {
                dir: destination_dir.to_path_buf(),
                name: desired_name.to_string(),
            })
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.reserved.contains(path) || fs::symlink_metadata(path).is_ok()
    }

    /// Create the first free destination file. Names that turn out to be
    /// taken at open time are skipped like any other collision.
    fn open_free_destination(
        &self,
        destination_dir: &Path,
        desired_name: &str,
    ) -> Result<(PathBuf, File), RelocationError> {
        for n in 0..=MAX_SUFFIX {
            let candidate = destination_dir.join(candidate_name(desired_name, n));
            if self.is_taken(&candidate) {
                continue;
            }
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(RelocationError::CreateDestination {
                        path: candidate,
                        source: e,
                    });
                }
            }
        }

        Err(RelocationError::Exhausted {
            dir: destination_dir.to_path_buf(),
            name: desired_name.to_string(),
        })
    }
}

/// Whether `source` already sits in `destination_dir` under `desired_name`
/// or one of its suffixed variants (an earlier run resolved a collision).
/// Directories are compared by their resolved form, so `./pending` and
/// `/music/pending` name the same place.
fn is_settled(source: &Path, destination_dir: &Path, desired_name: &str) -> bool {
    let Some(parent) = source.parent() else {
        return false;
    };
    if parent != destination_dir && resolve_path(parent) != resolve_path(destination_dir) {
        return false;
    }
    let Some(current) = source.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    current == desired_name || is_suffixed_variant(current, desired_name)
}

/// `path` with `.`, `..` and symlinks resolved when it exists, otherwise
/// made absolute against the working directory.
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// True for `stem_<n>.ext` when `desired_name` is `stem.ext`, n >= 1.
fn is_suffixed_variant(name: &str, desired_name: &str) -> bool {
    let desired = Path::new(desired_name);
    let current = Path::new(name);
    if desired.extension() != current.extension() {
        return false;
    }
    let (Some(desired_stem), Some(stem)) = (
        desired.file_stem().and_then(|s| s.to_str()),
        current.file_stem().and_then(|s| s.to_str()),
    ) else {
        return false;
    };
    stem.strip_prefix(desired_stem)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|n| n.parse::<u32>().ok())
        .is_some_and(|n| n >= 1)
}

/// `name` for n = 0, otherwise `stem_n.ext`.
pub fn candidate_name(desired_name: &str, n: u32) -> String {
    if n == 0 {
        return desired_name.to_string();
    }
    let path = Path::new(desired_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(desired_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", stem, n),
    }
}

fn validate_name(name: &str) -> Result<(), RelocationError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        return Err(RelocationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Stream `source` into the freshly created `dest_file`, then delete the
/// source. On copy failure the partial destination is removed.
fn copy_then_delete(source: &Path, dest: &Path, mut dest_file: File) -> Result<(), RelocationError> {
    let copy_err = |e: io::Error| RelocationError::Copy {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    };

    let copied = File::open(source)
        .and_then(|mut reader| io::copy(&mut reader, &mut dest_file))
        .and_then(|_| dest_file.sync_all());
    drop(dest_file);

    if let Err(e) = copied {
        let _ = fs::remove_file(dest);
        return Err(copy_err(e));
    }

    // Permissions are cosmetic; a failure here does not undo the copy
    if let Ok(meta) = fs::metadata(source)
        && let Err(e) = fs::set_permissions(dest, meta.permissions())
    {
        tracing::debug!(path = %dest.display(), error = %e, "Could not copy permissions");
    }

    fs::remove_file(source).map_err(|e| RelocationError::RemoveSource {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_candidate_names() {
        assert_eq!(candidate_name("track.mp3", 0), "track.mp3");
        assert_eq!(candidate_name("track.mp3", 1), "track_1.mp3");
        assert_eq!(candidate_name("track.mp3", 2), "track_2.mp3");
        assert_eq!(candidate_name("Artist - Title.mp3", 3), "Artist - Title_3.mp3");
        assert_eq!(candidate_name("noext", 1), "noext_1");
    }

    #[test]
    fn test_relocate_moves_file() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("song.mp3");
        std::fs::write(&source, b"fake mp3 content").unwrap();
        let dest_dir = temp.path().join("missing");

        let mut relocator = Relocator::new();
        let result = relocator.relocate(&source, &dest_dir, "song.mp3").unwrap();

        assert!(result.moved);
        assert_eq!(result.path, dest_dir.join("song.mp3"));
        assert!(!source.exists());
        assert_eq!(std::fs::read(&result.path).unwrap(), b"fake mp3 content");
    }

    #[test]
    fn test_collisions_get_numeric_suffixes() {
        let temp = tempdir().unwrap();
        let dest_dir = temp.path().join("dest");
        std::fs::create_dir(&dest_dir).unwrap();
        std::fs::write(dest_dir.join("track.mp3"), b"original").unwrap();

        let mut relocator = Relocator::new();
        let mut finals = Vec::new();
        for (i, dir) in ["a", "b"].iter().enumerate() {
            let src_dir = temp.path().join(dir);
            std::fs::create_dir(&src_dir).unwrap();
            let src = src_dir.join("track.mp3");
            std::fs::write(&src, format!("copy {}", i)).unwrap();
            finals.push(relocator.relocate(&src, &dest_dir, "track.mp3").unwrap().path);
        }

        assert_eq!(finals[0], dest_dir.join("track_1.mp3"));
        assert_eq!(finals[1], dest_dir.join("track_2.mp3"));
        assert_eq!(std::fs::read(dest_dir.join("track.mp3")).unwrap(), b"original");
        assert_eq!(std::fs::read(&finals[1]).unwrap(), b"copy 1");
    }

    #[test]
    fn test_rename_in_place_to_same_name_is_noop() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("Artist - Title.mp3");
        std::fs::write(&source, b"data").unwrap();

        let mut relocator = Relocator::new();
        let result = relocator
            .relocate(&source, temp.path(), "Artist - Title.mp3")
            .unwrap();

        assert!(!result.moved);
        assert_eq!(result.path, source);
        assert!(source.exists());
    }

    #[test]
    fn test_suffixed_variant_is_settled() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("Artist - Title.mp3"), b"other").unwrap();
        let source = temp.path().join("Artist - Title_1.mp3");
        std::fs::write(&source, b"mine").unwrap();

        let mut relocator = Relocator::new();
        let result = relocator
            .relocate(&source, temp.path(), "Artist - Title.mp3")
            .unwrap();

        assert!(!result.moved);
        assert_eq!(result.path, source);
    }

    #[test]
    fn test_suffixed_variant_detection() {
        assert!(is_suffixed_variant("track_1.mp3", "track.mp3"));
        assert!(is_suffixed_variant("track_12.mp3", "track.mp3"));
        assert!(!is_suffixed_variant("track_0.mp3", "track.mp3"));
        assert!(!is_suffixed_variant("track_x.mp3", "track.mp3"));
        assert!(!is_suffixed_variant("track_1.flac", "track.mp3"));
        assert!(!is_suffixed_variant("tracks_1.mp3", "track.mp3"));
    }

    #[test]
    fn test_rename_in_place_avoids_sibling() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("01 track.mp3");
        std::fs::write(&source, b"new").unwrap();
        std::fs::write(temp.path().join("Artist - Title.mp3"), b"old").unwrap();

        let mut relocator = Relocator::new();
        let result = relocator
            .relocate(&source, temp.path(), "Artist - Title.mp3")
            .unwrap();

        assert_eq!(result.path, temp.path().join("Artist - Title_1.mp3"));
        assert_eq!(std::fs::read(temp.path().join("Artist - Title.mp3")).unwrap(), b"old");
    }

    #[test]
    fn test_missing_source_is_error() {
        let temp = tempdir().unwrap();
        let mut relocator = Relocator::new();
        let err = relocator
            .relocate(&temp.path().join("gone.mp3"), temp.path(), "x.mp3")
            .unwrap_err();
        assert!(matches!(err, RelocationError::SourceMissing(_)));
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("a.mp3");
        std::fs::write(&source, b"data").unwrap();

        let mut relocator = Relocator::new();
        for name in ["", "..", "sub/dir.mp3"] {
            let err = relocator.relocate(&source, temp.path(), name).unwrap_err();
            assert!(matches!(err, RelocationError::InvalidName(_)));
        }
        assert!(source.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_leaves_source_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let source = temp.path().join("song.mp3");
        std::fs::write(&source, b"precious").unwrap();
        let locked = temp.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();

        // Root ignores directory permissions; nothing to check then
        let writable = locked.join(".writable");
        if std::fs::write(&writable, b"").is_ok() {
            let _ = std::fs::remove_file(&writable);
            return;
        }

        let mut relocator = Relocator::new();
        let result = relocator.relocate(&source, &locked, "song.mp3");

        assert!(result.is_err());
        assert_eq!(std::fs::read(&source).unwrap(), b"precious");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();
    }

    #[test]
    fn test_destination_dir_that_is_a_file_fails_cleanly() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("song.mp3");
        std::fs::write(&source, b"precious").unwrap();
        let blocker = temp.path().join("missing");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut relocator = Relocator::new();
        let err = relocator.relocate(&source, &blocker, "song.mp3").unwrap_err();

        assert!(matches!(err, RelocationError::CreateDir { .. }));
        assert_eq!(std::fs::read(&source).unwrap(), b"precious");
        assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");
    }

    #[test]
    fn test_failed_copy_removes_partial_destination() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("song.mp3");
        std::fs::write(&source, b"precious").unwrap();
        let dest = temp.path().join("Artist - Song.mp3");
        std::fs::write(&dest, b"").unwrap();
        // Read-only handle: every write fails, whatever the user's privileges
        let dest_file = File::open(&dest).unwrap();

        let err = copy_then_delete(&source, &dest, dest_file).unwrap_err();

        assert!(matches!(err, RelocationError::Copy { .. }));
        assert!(!dest.exists());
        assert_eq!(std::fs::read(&source).unwrap(), b"precious");
    }

    #[test]
    fn test_differently_spelled_destination_is_settled() {
        let temp = tempdir().unwrap();
        let pending = temp.path().join("pending");
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        std::fs::create_dir(&pending).unwrap();
        let source = pending.join("untagged.mp3");
        std::fs::write(&source, b"data").unwrap();

        let spelled = temp.path().join("sub").join("..").join(".").join("pending");
        let mut relocator = Relocator::new();
        let result = relocator.relocate(&source, &spelled, "untagged.mp3").unwrap();

        assert!(!result.moved);
        assert_eq!(result.path, source);
        assert_eq!(std::fs::read_dir(&pending).unwrap().count(), 1);
    }

    #[test]
    fn test_dry_run_reserves_names_without_touching_disk() {
        let temp = tempdir().unwrap();
        let dest_dir = temp.path().join("missing");
        let a = temp.path().join("a.mp3");
        let b = temp.path().join("b.mp3");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let mut relocator = Relocator::dry_run();
        let first = relocator.relocate(&a, &dest_dir, "track.mp3").unwrap();
        let second = relocator.relocate(&b, &dest_dir, "track.mp3").unwrap();

        assert_eq!(first.path, dest_dir.join("track.mp3"));
        assert_eq!(second.path, dest_dir.join("track_1.mp3"));
        assert!(a.exists() && b.exists());
        assert!(!dest_dir.exists());
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Suffixed names keep the extension and never equal the original
        #[test]
        fn suffix_preserves_extension(
            stem in "[a-zA-Z0-9 ]{1,20}",
            ext in prop::sample::select(vec!["mp3", "flac", "ogg"]),
            n in 1u32..1000,
        ) {
            let name = format!("{}.{}", stem, ext);
            let candidate = candidate_name(&name, n);
            let expected_suffix = format!("_{}.{}", n, ext);
            prop_assert!(candidate.ends_with(&expected_suffix));
            prop_assert_ne!(candidate, name);
        }
    }
}
