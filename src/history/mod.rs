//! Scan history per package: the most recent records newest-first, plus
//! identity-based set diffing between the current findings and the last
//! stored scan.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::error::TrackerError;
use crate::core::finding::{Finding, IssueKind};
use crate::core::ident::IssueId;
use crate::core::store::{ensure_package, StateStore};
use crate::core::time::unix_now;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanCounts {
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub timestamp: i64,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub counts: ScanCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanHistory {
    pub history: Vec<ScanRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub new_errors: Vec<Finding>,
    pub new_warnings: Vec<Finding>,
    pub fixed_errors: Vec<Finding>,
    pub fixed_warnings: Vec<Finding>,
    pub is_first_scan: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub total_scans: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_counts: Option<ScanCounts>,
    pub trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_scan: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<i64>,
}

/// Diff against the last scan, keyed by synthesized issue identity rather
/// than full equality so message and column drift between tool versions
/// does not manufacture churn. Absent last scan: everything is new.
pub fn compare_scans(
    current_errors: &[Finding],
    current_warnings: &[Finding],
    last_scan: Option<&ScanRecord>,
) -> Comparison {
    let Some(last) = last_scan else {
        return Comparison {
            new_errors: current_errors.to_vec(),
            new_warnings: current_warnings.to_vec(),
            fixed_errors: Vec::new(),
            fixed_warnings: Vec::new(),
            is_first_scan: true,
        };
    };

    let (new_errors, fixed_errors) =
        diff_by_identity(current_errors, &last.errors, IssueKind::Error);
    let (new_warnings, fixed_warnings) =
        diff_by_identity(current_warnings, &last.warnings, IssueKind::Warning);

    Comparison {
        new_errors,
        new_warnings,
        fixed_errors,
        fixed_warnings,
        is_first_scan: false,
    }
}

fn diff_by_identity(
    current: &[Finding],
    previous: &[Finding],
    kind: IssueKind,
) -> (Vec<Finding>, Vec<Finding>) {
    let current_ids: BTreeSet<IssueId> = current.iter().map(|f| IssueId::of(kind, f)).collect();
    let previous_ids: BTreeSet<IssueId> = previous.iter().map(|f| IssueId::of(kind, f)).collect();

    let new = current
        .iter()
        .filter(|f| !previous_ids.contains(&IssueId::of(kind, f)))
        .cloned()
        .collect();
    let fixed = previous
        .iter()
        .filter(|f| !current_ids.contains(&IssueId::of(kind, f)))
        .cloned()
        .collect();
    (new, fixed)
}

pub struct HistoryStore<'a> {
    store: &'a StateStore,
    limit: usize,
}

impl<'a> HistoryStore<'a> {
    pub fn new(store: &'a StateStore, limit: usize) -> Self {
        Self { store, limit }
    }

    fn file(package: &str) -> String {
        format!("history-{}.json", package)
    }

    pub fn load(&self, package: &str) -> ScanHistory {
        self.store.read(&Self::file(package))
    }

    pub fn last_scan(&self, package: &str) -> Option<ScanRecord> {
        self.load(package).history.into_iter().next()
    }

    /// Prepend a new record and truncate to the retention window.
    pub fn save_scan(
        &self,
        package: &str,
        errors: Vec<Finding>,
        warnings: Vec<Finding>,
    ) -> Result<ScanRecord, TrackerError> {
        ensure_package(package)?;
        let record = ScanRecord {
            timestamp: unix_now(),
            counts: ScanCounts {
                errors: errors.len(),
                warnings: warnings.len(),
            },
            errors,
            warnings,
        };
        let mut history = self.load(package);
        history.history.insert(0, record.clone());
        history.history.truncate(self.limit);
        self.store.write(&Self::file(package), &history)?;
        Ok(record)
    }

    /// Trend compares the newest record against the oldest *retained*
    /// record, the tail of the window, not the previous scan. A coarse
    /// long-window signal, preserved as such.
    pub fn statistics(&self, package: &str) -> Statistics {
        let history = self.load(package);
        let newest = history.history.first();
        let oldest = history.history.last();

        let trend = match (newest, oldest) {
            (Some(new), Some(old)) if history.history.len() > 1 => {
                let latest_total = new.counts.errors + new.counts.warnings;
                let oldest_total = old.counts.errors + old.counts.warnings;
                if latest_total < oldest_total {
                    Trend::Improving
                } else if latest_total > oldest_total {
                    Trend::Declining
                } else {
                    Trend::Stable
                }
            }
            _ => Trend::None,
        };

        Statistics {
            total_scans: history.history.len(),
            latest_counts: newest.map(|r| r.counts.clone()),
            trend,
            first_scan: oldest.map(|r| r.timestamp),
            last_scan: newest.map(|r| r.timestamp),
        }
    }
}
