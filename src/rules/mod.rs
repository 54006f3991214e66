//! Suppression rules scoped to a directory subtree, a single file, or a
//! (path, code) pair. Rules are keyed by a deterministic id derived from
//! their content, so re-adding an identical rule overwrites instead of
//! duplicating.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::TrackerError;
use crate::core::hash::sha256_hex;
use crate::core::store::StateStore;
use crate::core::time::unix_now;

const RULES_FILE: &str = "rules.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreScope {
    Directory,
    File,
    Code,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreReason {
    Vendor,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IgnoreRule {
    pub scope: IgnoreScope,
    /// Normalized to forward slashes, no leading separator.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub reason: IgnoreReason,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    pub created: i64,
}

pub type RuleMap = BTreeMap<String, IgnoreRule>;

impl IgnoreRule {
    pub fn new(
        scope: IgnoreScope,
        path: &str,
        code: Option<String>,
        reason: IgnoreReason,
        note: &str,
        added_by: Option<String>,
    ) -> Result<Self, TrackerError> {
        if path.trim().is_empty() {
            return Err(TrackerError::InvalidRule("empty path".to_string()));
        }
        if scope == IgnoreScope::Code && code.as_deref().map_or(true, |c| c.trim().is_empty()) {
            return Err(TrackerError::InvalidRule(
                "code scope requires a code".to_string(),
            ));
        }
        Ok(Self {
            scope,
            path: normalize_path(path),
            code,
            reason,
            note: note.to_string(),
            added_by,
            created: unix_now(),
        })
    }

    /// Content-derived key: identical (scope, path, code) always maps to
    /// the same id, making duplicate submission idempotent.
    pub fn id(&self) -> String {
        let buf = format!(
            "{:?}|{}|{}",
            self.scope,
            self.path,
            self.code.as_deref().unwrap_or("")
        );
        sha256_hex(buf.as_bytes())
    }

    fn matches(&self, file: &str, code: &str) -> bool {
        match self.scope {
            IgnoreScope::Directory => subtree_match(&self.path, file),
            IgnoreScope::File => file == self.path,
            IgnoreScope::Code => {
                let path_hit = file == self.path || subtree_match(&self.path, file);
                path_hit && self.code.as_deref() == Some(code)
            }
        }
    }
}

/// Path-prefix test with a trailing-separator boundary: `vendor` suppresses
/// `vendor/foo.php` but not `vendor-extra/foo.php`. The historical
/// implementation used a raw starts-with comparison; the boundary form
/// keeps the "ignore whole subtree" intent without the false positives.
fn subtree_match(rule_path: &str, file: &str) -> bool {
    let mut prefix = rule_path.to_string();
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    file.starts_with(&prefix)
}

pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches('/')
        .trim_end_matches('/')
        .to_string()
}

pub fn should_ignore(file: &str, code: &str, rules: &RuleMap) -> bool {
    let file = normalize_path(file);
    rules.values().any(|rule| rule.matches(&file, code))
}

/// Returns the rule matching the finding, if any, for `ignored_by`
/// attribution in the results snapshot.
pub fn matching_rule<'a>(file: &str, code: &str, rules: &'a RuleMap) -> Option<&'a IgnoreRule> {
    let file = normalize_path(file);
    rules.values().find(|rule| rule.matches(&file, code))
}

/// Fixed candidate probe for bundled third-party directories. Existence
/// checks only, no heuristics.
pub fn detect_vendor_dirs(package_root: &Path) -> Vec<String> {
    const CANDIDATES: [&str; 8] = [
        "vendor",
        "vendors",
        "library",
        "libraries",
        "includes/vendor",
        "includes/vendors",
        "includes/library",
        "includes/libraries",
    ];
    CANDIDATES
        .iter()
        .filter(|c| package_root.join(c).is_dir())
        .map(|c| c.to_string())
        .collect()
}

pub struct RuleStore<'a> {
    store: &'a StateStore,
}

impl<'a> RuleStore<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    pub fn all(&self) -> RuleMap {
        self.store.read(RULES_FILE)
    }

    pub fn add(&self, rule: IgnoreRule) -> Result<String, TrackerError> {
        let mut rules = self.all();
        let id = rule.id();
        rules.insert(id.clone(), rule);
        self.store.write(RULES_FILE, &rules)?;
        Ok(id)
    }

    pub fn remove(&self, rule_id: &str) -> Result<bool, TrackerError> {
        let mut rules = self.all();
        let removed = rules.remove(rule_id).is_some();
        if removed {
            self.store.write(RULES_FILE, &rules)?;
        }
        Ok(removed)
    }

    /// Shallow merge onto existing rules; imported ids win on conflict.
    pub fn import(&self, incoming: RuleMap) -> Result<usize, TrackerError> {
        let mut rules = self.all();
        let count = incoming.len();
        rules.extend(incoming);
        self.store.write(RULES_FILE, &rules)?;
        Ok(count)
    }

    pub fn export(&self) -> RuleMap {
        self.all()
    }
}
