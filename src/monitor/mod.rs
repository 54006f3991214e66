//! Source-drift detection, independent of any scan: a single global
//! monitoring slot holding per-file content hashes for one package.
//! Checks are polled by the caller; each detected change replaces the
//! baseline, so the delta is consumed by the call that observes it.
//! At-least-once semantics: a crash between diff and persist may replay
//! the same delta on the next poll.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::core::error::TrackerError;
use crate::core::hash::hash_file;
use crate::core::store::{ensure_package, StateStore};
use crate::core::time::{now_utc, unix_now};

const MONITOR_FILE: &str = "monitor.json";
const MONITOR_LOG_FILE: &str = "monitor-log.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorState {
    pub plugin: String,
    pub root: String,
    pub checksums: BTreeMap<String, String>,
    pub last_check: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorDelta {
    pub changed: bool,
    /// Changed and added files by relative path; files gone from the tree
    /// carry a trailing " (deleted)" marker.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub message: String,
}

pub struct Monitor<'a> {
    store: &'a StateStore,
    extensions: Vec<String>,
    log_limit: usize,
}

impl<'a> Monitor<'a> {
    pub fn new(store: &'a StateStore, extensions: Vec<String>, log_limit: usize) -> Self {
        Self {
            store,
            extensions,
            log_limit,
        }
    }

    pub fn active(&self) -> Option<MonitorState> {
        self.store.read(MONITOR_FILE)
    }

    /// Compute a fresh baseline for the package. Only one package is
    /// monitored at a time; starting a new session replaces any previous
    /// baseline.
    pub fn start(&self, package: &str, root: &Path) -> Result<MonitorState, TrackerError> {
        ensure_package(package)?;
        let checksums = self.walk_checksums(root)?;
        let state = MonitorState {
            plugin: package.to_string(),
            root: root.to_string_lossy().replace('\\', "/"),
            last_check: unix_now(),
            checksums,
        };
        self.store.write(MONITOR_FILE, &Some(state.clone()))?;
        self.log(&format!(
            "monitoring started for {} ({} files)",
            package,
            state.checksums.len()
        ))?;
        Ok(state)
    }

    /// The slot file is deleted, not nulled: stopping leaves no state
    /// behind.
    pub fn stop(&self) -> Result<bool, TrackerError> {
        match self.active() {
            Some(state) => {
                self.store.remove(MONITOR_FILE)?;
                self.log(&format!("monitoring stopped for {}", state.plugin))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Recompute and diff against the baseline. Returns `None` when no
    /// session is active or nothing drifted; on drift, the baseline is
    /// replaced so an immediate second call reports nothing.
    pub fn check_changes(&self) -> Result<Option<MonitorDelta>, TrackerError> {
        let Some(mut state) = self.active() else {
            return Ok(None);
        };

        let current = self.walk_checksums(Path::new(&state.root))?;
        let mut files = Vec::new();

        for (path, hash) in &current {
            match state.checksums.get(path) {
                Some(old) if old == hash => {}
                // Modified, or newly appeared: both count as changed.
                _ => files.push(path.clone()),
            }
        }
        for path in state.checksums.keys() {
            if !current.contains_key(path) {
                files.push(format!("{} (deleted)", path));
            }
        }

        state.last_check = unix_now();
        if files.is_empty() {
            self.store.write(MONITOR_FILE, &Some(state))?;
            return Ok(None);
        }

        state.checksums = current;
        self.store.write(MONITOR_FILE, &Some(state))?;
        self.log(&format!("change detected: {} file(s)", files.len()))?;
        Ok(Some(MonitorDelta { changed: true, files }))
    }

    pub fn activity_log(&self) -> Vec<LogEntry> {
        self.store.read(MONITOR_LOG_FILE)
    }

    fn log(&self, message: &str) -> Result<(), TrackerError> {
        let mut entries: Vec<LogEntry> = self.store.read(MONITOR_LOG_FILE);
        entries.push(LogEntry {
            time: now_utc().to_rfc3339(),
            message: message.to_string(),
        });
        if entries.len() > self.log_limit {
            let excess = entries.len() - self.log_limit;
            entries.drain(..excess);
        }
        self.store.write(MONITOR_LOG_FILE, &entries)
    }

    /// Streaming hash of every matching source file under the root, keyed
    /// by forward-slash relative path.
    fn walk_checksums(&self, root: &Path) -> Result<BTreeMap<String, String>, TrackerError> {
        let mut out = BTreeMap::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            if !self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            let hash = hash_file(path).map_err(|e| TrackerError::Storage(e.to_string()))?;
            out.insert(rel, hash);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn monitor<'a>(store: &'a StateStore) -> Monitor<'a> {
        Monitor::new(store, vec!["php".to_string()], 100)
    }

    #[test]
    fn second_check_with_no_edits_reports_nothing() {
        let data = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fs::write(pkg.path().join("index.php"), b"<?php echo 1;").unwrap();

        let state = StateStore::new(data.path()).unwrap();
        let mon = monitor(&state);
        mon.start("plugin-a", pkg.path()).unwrap();

        fs::write(pkg.path().join("index.php"), b"<?php echo 2;").unwrap();
        let delta = mon.check_changes().unwrap().unwrap();
        assert!(delta.changed);
        assert_eq!(delta.files, vec!["index.php"]);

        assert!(mon.check_changes().unwrap().is_none());
    }

    #[test]
    fn deleted_files_carry_a_marker_and_added_count_as_changed() {
        let data = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fs::write(pkg.path().join("old.php"), b"<?php").unwrap();

        let state = StateStore::new(data.path()).unwrap();
        let mon = monitor(&state);
        mon.start("plugin-a", pkg.path()).unwrap();

        fs::remove_file(pkg.path().join("old.php")).unwrap();
        fs::write(pkg.path().join("new.php"), b"<?php").unwrap();
        let delta = mon.check_changes().unwrap().unwrap();
        assert!(delta.files.contains(&"new.php".to_string()));
        assert!(delta.files.contains(&"old.php (deleted)".to_string()));
    }

    #[test]
    fn non_source_files_are_not_hashed() {
        let data = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fs::write(pkg.path().join("index.php"), b"<?php").unwrap();
        fs::write(pkg.path().join("readme.txt"), b"hello").unwrap();

        let state = StateStore::new(data.path()).unwrap();
        let mon = monitor(&state);
        let baseline = mon.start("plugin-a", pkg.path()).unwrap();
        assert_eq!(baseline.checksums.len(), 1);
        assert!(baseline.checksums.contains_key("index.php"));
    }

    #[test]
    fn starting_replaces_the_previous_session() {
        let data = tempfile::tempdir().unwrap();
        let pkg_a = tempfile::tempdir().unwrap();
        let pkg_b = tempfile::tempdir().unwrap();
        fs::write(pkg_a.path().join("a.php"), b"a").unwrap();
        fs::write(pkg_b.path().join("b.php"), b"b").unwrap();

        let state = StateStore::new(data.path()).unwrap();
        let mon = monitor(&state);
        mon.start("plugin-a", pkg_a.path()).unwrap();
        mon.start("plugin-b", pkg_b.path()).unwrap();
        let active = mon.active().unwrap();
        assert_eq!(active.plugin, "plugin-b");
        assert!(active.checksums.contains_key("b.php"));
    }

    #[test]
    fn stop_deletes_the_slot_file() {
        let data = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fs::write(pkg.path().join("a.php"), b"a").unwrap();

        let state = StateStore::new(data.path()).unwrap();
        let mon = monitor(&state);
        mon.start("plugin-a", pkg.path()).unwrap();
        assert!(data.path().join("monitor.json").exists());
        assert!(mon.stop().unwrap());
        assert!(!data.path().join("monitor.json").exists());
        assert!(mon.active().is_none());
    }

    #[test]
    fn check_without_a_session_is_not_an_error() {
        let data = tempfile::tempdir().unwrap();
        let state = StateStore::new(data.path()).unwrap();
        let mon = monitor(&state);
        assert!(mon.check_changes().unwrap().is_none());
        assert!(!mon.stop().unwrap());
    }

    #[test]
    fn activity_log_is_capped() {
        let data = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fs::write(pkg.path().join("a.php"), b"a").unwrap();

        let state = StateStore::new(data.path()).unwrap();
        let mon = Monitor::new(&state, vec!["php".to_string()], 3);
        for i in 0..5 {
            fs::write(pkg.path().join("a.php"), format!("v{}", i)).unwrap();
            mon.start("plugin-a", pkg.path()).unwrap();
        }
        let log = mon.activity_log();
        assert_eq!(log.len(), 3);
    }
}
