//! Scan processing: suppress -> diff -> persist -> rediscover -> score ->
//! snapshot. One synchronous pass per completed analysis run; every store
//! involved degrades to empty state when absent, so a partially-updated
//! data dir never aborts a run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::completed::{CompletedStore, Rediscovered};
use crate::config::AppConfig;
use crate::core::error::TrackerError;
use crate::core::finding::{Finding, IssueKind, RawReport};
use crate::core::group::flatten;
use crate::core::ident::IssueId;
use crate::core::store::{ensure_package, StateStore};
use crate::core::time::now_utc;
use crate::history::{compare_scans, Comparison, HistoryStore};
use crate::rules::{matching_rule, IgnoreScope, RuleMap, RuleStore};
use crate::score::{score, Readiness};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub comparison: Comparison,
    pub readiness: Readiness,
    pub rediscovered: Vec<Rediscovered>,
    pub ignored: usize,
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: String,
    pub plugin: String,
    pub readiness: Readiness,
    pub ignored_paths: Vec<IgnoredPath>,
    pub results: BTreeMap<String, Vec<SnapshotIssue>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IgnoredPath {
    pub path: String,
    pub reason: crate::rules::IgnoreReason,
    pub added_by: Option<String>,
    pub added_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotIssue {
    pub issue_id: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    pub severity: u8,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub line: u32,
    pub column: u32,
    pub ignored: bool,
    pub ignored_by: Option<String>,
    pub resolved: bool,
    pub resolved_by: Option<String>,
}

/// Process one raw engine report for a package. Suppressed findings are
/// excluded from diffing, history, rediscovery, and scoring, but stay in
/// the snapshot carrying their flags.
pub fn process_scan(
    store: &StateStore,
    cfg: &AppConfig,
    package: &str,
    raw: &RawReport,
) -> Result<ScanOutcome, TrackerError> {
    ensure_package(package)?;
    let rules = RuleStore::new(store).all();

    let (errors, ignored_errors) = partition(flatten(&raw.errors), &rules);
    let (warnings, ignored_warnings) = partition(flatten(&raw.warnings), &rules);
    let ignored = ignored_errors.len() + ignored_warnings.len();
    debug!(
        package,
        errors = errors.len(),
        warnings = warnings.len(),
        ignored,
        "report filtered"
    );

    let history = HistoryStore::new(store, cfg.history_limit);
    let last = history.last_scan(package);
    let comparison = compare_scans(&errors, &warnings, last.as_ref());
    history.save_scan(package, errors.clone(), warnings.clone())?;

    let completed = CompletedStore::new(store);
    let rediscovered = completed.find_rediscovered(package, &errors, &warnings);
    let readiness = score(errors.len(), warnings.len());

    let snapshot = build_snapshot(
        package,
        &readiness,
        &rules,
        &completed,
        [
            (IssueKind::Error, errors, false),
            (IssueKind::Warning, warnings, false),
            (IssueKind::Error, ignored_errors, true),
            (IssueKind::Warning, ignored_warnings, true),
        ],
    );
    let snapshot_file = format!("results-{}.json", package);
    store.write(&snapshot_file, &snapshot)?;

    info!(
        package,
        score = readiness.overall,
        new_errors = comparison.new_errors.len(),
        fixed_errors = comparison.fixed_errors.len(),
        rediscovered = rediscovered.len(),
        "scan processed"
    );

    Ok(ScanOutcome {
        comparison,
        readiness,
        rediscovered,
        ignored,
        snapshot_path: store.path(&snapshot_file),
    })
}

/// Split into (kept, suppressed). Findings with an empty file carry no
/// actionable location and are dropped outright.
fn partition(flat: Vec<Finding>, rules: &RuleMap) -> (Vec<Finding>, Vec<Finding>) {
    let mut kept = Vec::new();
    let mut suppressed = Vec::new();
    for finding in flat {
        if finding.file.is_empty() {
            continue;
        }
        if matching_rule(&finding.file, &finding.code, rules).is_some() {
            suppressed.push(finding);
        } else {
            kept.push(finding);
        }
    }
    (kept, suppressed)
}

fn build_snapshot(
    package: &str,
    readiness: &Readiness,
    rules: &RuleMap,
    completed: &CompletedStore<'_>,
    batches: [(IssueKind, Vec<Finding>, bool); 4],
) -> Snapshot {
    let ignored_paths = rules
        .values()
        .filter(|r| matches!(r.scope, IgnoreScope::Directory | IgnoreScope::File))
        .map(|r| IgnoredPath {
            path: r.path.clone(),
            reason: r.reason,
            added_by: r.added_by.clone(),
            added_at: r.created,
        })
        .collect();

    let mut results: BTreeMap<String, Vec<SnapshotIssue>> = BTreeMap::new();
    for (kind, findings, ignored) in batches {
        for finding in findings {
            let ignored_by = if ignored {
                matching_rule(&finding.file, &finding.code, rules)
                    .and_then(|r| r.added_by.clone())
            } else {
                None
            };
            let resolved = completed.lookup(package, &finding);
            results
                .entry(finding.file.clone())
                .or_default()
                .push(SnapshotIssue {
                    issue_id: IssueId::of(kind, &finding).to_string(),
                    message: finding.message,
                    code: finding.code,
                    link: finding.link,
                    docs: finding.docs,
                    severity: finding.severity,
                    kind,
                    line: finding.line,
                    column: finding.column,
                    ignored,
                    ignored_by,
                    resolved: resolved.is_some(),
                    resolved_by: resolved.and_then(|c| c.completed_by),
                });
        }
    }

    Snapshot {
        generated_at: now_utc().to_rfc3339(),
        plugin: package.to_string(),
        readiness: readiness.clone(),
        ignored_paths,
        results,
    }
}
