//! Finding the newest snapshot in an input directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{DualcheckError, Result};

/// Return the most recently modified regular file in `dir`.
///
/// Ties on modification time go to the file whose name sorts last. Hidden
/// files (leading `.`) are ignored.
pub fn latest_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(DualcheckError::NotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| DualcheckError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| DualcheckError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() || is_hidden(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match &best {
            None => true,
            Some((t, p)) => modified > *t || (modified == *t && path > *p),
        };
        if newer {
            best = Some((modified, path));
        }
    }

    best.map(|(_, p)| p).ok_or_else(|| {
        DualcheckError::NoSourceData(format!("no files found in '{}'", dir.display()))
    })
}

/// All regular, non-hidden files in `dir`, sorted by name.
pub fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| DualcheckError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && !is_hidden(p))
        .collect();
    files.sort();
    Ok(files)
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    #[test]
    fn test_latest_file_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("z_older.csv");
        let newer = dir.path().join("a_newer.csv");
        File::create(&older).unwrap();
        File::create(&newer).unwrap();

        let now = SystemTime::now();
        File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(now - Duration::from_secs(3600))
            .unwrap();
        File::options()
            .write(true)
            .open(&newer)
            .unwrap()
            .set_modified(now)
            .unwrap();

        assert_eq!(latest_file(dir.path()).unwrap(), newer);
    }

    #[test]
    fn test_latest_file_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            latest_file(dir.path()),
            Err(DualcheckError::NoSourceData(_))
        ));
    }

    #[test]
    fn test_hidden_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join(".DS_Store")).unwrap();
        File::create(dir.path().join("data.csv")).unwrap();
        assert_eq!(list_files(dir.path()).unwrap(), vec![dir.path().join("data.csv")]);
    }
}
