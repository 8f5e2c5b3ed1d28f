//! Archive extraction
//!
//! Expands zip archives into a directory, keeping unix permissions so
//! extracted launchers stay executable.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ExtractError;

/// Extract a zip archive into `dest`
///
/// `dest` is created if needed and may already contain unrelated files.
/// Entries whose names would escape `dest` are rejected. Returns the number
/// of files written.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let file = fs::File::open(archive_path).map_err(|e| ExtractError::Open {
        path: archive_path.to_path_buf(),
        error: e.to_string(),
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractError::Open {
        path: archive_path.to_path_buf(),
        error: e.to_string(),
    })?;

    fs::create_dir_all(dest).map_err(|e| ExtractError::Io {
        path: dest.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ExtractError::Entry {
            path: archive_path.to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry.enclosed_name().ok_or_else(|| ExtractError::Entry {
            path: archive_path.to_path_buf(),
            error: format!("unsafe entry name '{}'", entry.name()),
        })?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ExtractError::Io {
                path: out_path.clone(),
                error: e.to_string(),
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ExtractError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }
        let mut out = fs::File::create(&out_path).map_err(|e| ExtractError::Io {
            path: out_path.clone(),
            error: e.to_string(),
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|e| ExtractError::Entry {
            path: archive_path.to_path_buf(),
            error: format!("{}: {e}", out_path.display()),
        })?;
        written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                if let Err(e) = fs::set_permissions(&out_path, fs::Permissions::from_mode(mode)) {
                    tracing::warn!("Failed to set permissions on {}: {e}", out_path.display());
                }
            }
        }
    }

    debug!(archive = %archive_path.display(), dest = %dest.display(), files = written, "Extracted archive");
    Ok(written)
}


#[cfg(test)]
mod tests {
    use super::test_support::write_zip;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_zip_creates_destination() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("a.zip");
        write_zip(&zip_path, &[("cmdline-tools/", ""), ("cmdline-tools/NOTICE", "notice")]);

        let dest = temp.path().join("out/extract");
        let written = extract_zip(&zip_path, &dest).unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read_to_string(dest.join("cmdline-tools/NOTICE")).unwrap(),
            "notice"
        );
    }

    #[test]
    fn test_extract_zip_into_non_empty_directory() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("a.zip");
        write_zip(&zip_path, &[("file.txt", "new")]);

        let dest = temp.path().join("dest");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("other.txt"), "existing").unwrap();
        std::fs::write(dest.join("file.txt"), "old").unwrap();

        extract_zip(&zip_path, &dest).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("other.txt")).unwrap(), "existing");
        assert_eq!(std::fs::read_to_string(dest.join("file.txt")).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_zip_keeps_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("a.zip");
        write_zip(&zip_path, &[("bin/sdkmanager", "#!/bin/sh\n")]);

        let dest = temp.path().join("dest");
        extract_zip(&zip_path, &dest).unwrap();

        let mode = std::fs::metadata(dest.join("bin/sdkmanager")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }

    #[test]
    fn test_extract_malformed_archive_fails() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("broken.zip");
        std::fs::write(&zip_path, b"this is not a zip file").unwrap();

        let result = extract_zip(&zip_path, &temp.path().join("dest"));
        assert!(matches!(result, Err(ExtractError::Open { .. })));
    }

    #[test]
    fn test_extract_missing_archive_fails() {
        let temp = TempDir::new().unwrap();
        let result = extract_zip(&temp.path().join("absent.zip"), &temp.path().join("dest"));
        assert!(matches!(result, Err(ExtractError::Open { .. })));
    }
}
