//! Event-driven watching of an input directory.
//!
//! Files are reported once their write activity has settled for the
//! debounce period, so a snapshot that is still being copied is not picked
//! up half-written.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, SystemTime};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{
    new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use tracing::{debug, error, info};

use crate::error::{DualcheckError, Result};

use super::discovery::is_hidden;

/// Size and modification time of a file when it was last handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        meta.is_file().then(|| Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Watches one directory (non-recursively) for settled snapshot files.
pub struct DirectoryWatcher {
    #[allow(dead_code)]
    debouncer: Debouncer<RecommendedWatcher>,
    events: Receiver<DebounceEventResult>,
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
    handed_out: HashMap<PathBuf, FileStamp>,
}

impl DirectoryWatcher {
    /// Start watching `dir`. Events are delivered after `settle` of quiet.
    pub fn new(dir: impl Into<PathBuf>, settle: Duration) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DualcheckError::NotFound(dir));
        }
        // Backends report canonical paths.
        let dir = dir.canonicalize().map_err(|e| DualcheckError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let (tx, events) = mpsc::channel();
        let mut debouncer = new_debouncer(settle, move |result: DebounceEventResult| {
            // The receiver only goes away when the watcher is dropped.
            let _ = tx.send(result);
        })
        .map_err(|e| DualcheckError::Watch(format!("Failed to create file watcher: {}", e)))?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                DualcheckError::Watch(format!("Failed to watch '{}': {}", dir.display(), e))
            })?;

        info!(dir = %dir.display(), settle_ms = settle.as_millis() as u64, "watching directory");
        Ok(Self {
            debouncer,
            events,
            dir,
            pending: VecDeque::new(),
            handed_out: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record a file as already handled in its current state.
    ///
    /// It is reported again only after it changes.
    pub fn mark_seen(&mut self, path: &Path) {
        if let Some(stamp) = FileStamp::of(path) {
            self.handed_out.insert(path.to_path_buf(), stamp);
        }
    }

    /// Next settled file, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` when nothing settled in time. Watcher backend
    /// errors are logged and do not end the watch.
    pub fn next_file(&mut self, timeout: Duration) -> Result<Option<PathBuf>> {
        if let Some(path) = self.pending.pop_front() {
            return Ok(Some(path));
        }

        match self.events.recv_timeout(timeout) {
            Ok(Ok(events)) => {
                for event in events {
                    if !matches!(event.kind, DebouncedEventKind::Any) {
                        continue;
                    }
                    self.consider(event.path);
                }
                Ok(self.pending.pop_front())
            }
            Ok(Err(e)) => {
                error!(dir = %self.dir.display(), error = %e, "file watcher error");
                Ok(None)
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(DualcheckError::Watch(format!(
                "File watcher for '{}' stopped",
                self.dir.display()
            ))),
        }
    }

    fn consider(&mut self, path: PathBuf) {
        if is_hidden(&path) || path.parent() != Some(self.dir.as_path()) {
            return;
        }

        let Some(stamp) = FileStamp::of(&path) else {
            // Deleted or renamed away; forget it so a new file of the same
            // name is picked up.
            self.handed_out.remove(&path);
            return;
        };

        if self.handed_out.get(&path) == Some(&stamp) || self.pending.contains(&path) {
            debug!(file = %path.display(), "unchanged since last handled");
            return;
        }

        self.handed_out.insert(path.clone(), stamp);
        self.pending.push_back(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const SETTLE: Duration = Duration::from_millis(100);

    fn wait_for_file(watcher: &mut DirectoryWatcher) -> Option<PathBuf> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Some(path) = watcher.next_file(Duration::from_millis(200)).unwrap() {
                return Some(path);
            }
        }
        None
    }

    #[test]
    fn test_rejects_missing_dir() {
        assert!(matches!(
            DirectoryWatcher::new("/definitely/not/here", SETTLE),
            Err(DualcheckError::NotFound(_))
        ));
    }

    #[test]
    fn test_reports_new_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = DirectoryWatcher::new(dir.path(), SETTLE).unwrap();
        let watched = watcher.dir().to_path_buf();

        fs::write(dir.path().join("snapshot.csv"), "a,b\n1,2\n").unwrap();
        fs::write(dir.path().join(".partial"), "x").unwrap();

        let path = wait_for_file(&mut watcher).expect("no event for new file");
        assert_eq!(path.file_name().unwrap(), "snapshot.csv");
        assert_eq!(path.parent(), Some(watched.as_path()));

        // Nothing else settles: the hidden file is ignored and the snapshot
        // has not changed.
        assert_eq!(watcher.next_file(Duration::from_millis(500)).unwrap(), None);
    }

    #[test]
    fn test_unchanged_marked_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = DirectoryWatcher::new(dir.path(), SETTLE).unwrap();
        let path = watcher.dir().join("existing.csv");
        fs::write(&path, "a\n1\n").unwrap();

        watcher.mark_seen(&path);
        watcher.consider(path.clone());
        assert!(watcher.pending.is_empty());

        fs::write(&path, "a\n1\n2\n").unwrap();
        watcher.consider(path.clone());
        assert_eq!(watcher.pending.pop_front(), Some(path));
    }
}
