//! Filesystem operations
//!
//! Handles directory creation and merge-copying of directory trees.

use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory tree; a missing directory is not an error
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}

/// Move `from` to `to` (same filesystem)
pub fn rename(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    std::fs::rename(from, to).map_err(|e| FilesystemError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })
}

/// Merge the contents of `src` into `dest`
///
/// Directories are merged recursively (union of both trees). Files at the
/// same relative path are overwritten; anything else already in `dest` is
/// kept. Returns the number of files copied.
///
/// The file at relative path `marker`, if given, is copied only after
/// everything else has been placed, so its presence in `dest` means the
/// merge finished.
pub fn merge_tree(src: &Path, dest: &Path, marker: Option<&Path>) -> Result<usize, FilesystemError> {
    create_dir_all(dest)?;
    let mut copied = 0;
    let mut held_back = None;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| FilesystemError::Walk {
            path: src.to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| FilesystemError::Walk {
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else if marker == Some(relative) {
            held_back = Some((entry.path().to_path_buf(), target));
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    if let Some((from, to)) = held_back {
        copy_file(&from, &to)?;
        copied += 1;
    }

    debug!(from = %src.display(), to = %dest.display(), files = copied, "Merged directory tree");
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map_err(|e| FilesystemError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(())
}
