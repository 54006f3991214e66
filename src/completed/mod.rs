//! Tracks which (file, line, code) triples a human has marked resolved and
//! flags findings matching a completed identity as rediscovered
//! regressions. The completed set is never pruned automatically: a
//! rediscovered finding keeps surfacing until the user re-marks it or the
//! root cause stays fixed long enough that it stops appearing in scans.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::TrackerError;
use crate::core::finding::{Finding, IssueKind};
use crate::core::hash::completion_key;
use crate::core::store::{ensure_package, StateStore};
use crate::core::time::unix_now;

const COMPLETED_FILE: &str = "completed.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedIssue {
    pub file: String,
    pub line: u32,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    pub completed_at: i64,
}

/// package -> completion key -> record
pub type CompletedMap = BTreeMap<String, BTreeMap<String, CompletedIssue>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rediscovered {
    pub file: String,
    pub line: u32,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
}

pub struct CompletedStore<'a> {
    store: &'a StateStore,
}

impl<'a> CompletedStore<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    fn load(&self) -> CompletedMap {
        self.store.read(COMPLETED_FILE)
    }

    /// Idempotent: re-marking the same triple only refreshes the
    /// timestamp and attribution.
    pub fn mark_complete(
        &self,
        package: &str,
        file: &str,
        line: u32,
        code: &str,
        by: Option<String>,
    ) -> Result<String, TrackerError> {
        ensure_package(package)?;
        let mut map = self.load();
        let key = completion_key(file, line, code);
        map.entry(package.to_string()).or_default().insert(
            key.clone(),
            CompletedIssue {
                file: file.to_string(),
                line,
                code: code.to_string(),
                completed_by: by,
                completed_at: unix_now(),
            },
        );
        self.store.write(COMPLETED_FILE, &map)?;
        Ok(key)
    }

    pub fn list(&self, package: &str) -> Vec<CompletedIssue> {
        self.load()
            .get(package)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn lookup(&self, package: &str, finding: &Finding) -> Option<CompletedIssue> {
        let key = completion_key(&finding.file, finding.line, &finding.code);
        self.load().get(package)?.get(&key).cloned()
    }

    /// Every current finding whose completion key is in the package's
    /// completed set. Missing set reads as empty, never an error, and
    /// matches stay in the set.
    pub fn find_rediscovered(
        &self,
        package: &str,
        errors: &[Finding],
        warnings: &[Finding],
    ) -> Vec<Rediscovered> {
        let map = self.load();
        let Some(entries) = map.get(package) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for (kind, list) in [(IssueKind::Error, errors), (IssueKind::Warning, warnings)] {
            for finding in list {
                let key = completion_key(&finding.file, finding.line, &finding.code);
                if entries.contains_key(&key) {
                    out.push(Rediscovered {
                        file: finding.file.clone(),
                        line: finding.line,
                        code: finding.code.clone(),
                        kind,
                    });
                }
            }
        }
        out
    }
}
