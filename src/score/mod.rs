//! Heuristic readiness score. Intentionally simple and reproduced exactly:
//! downstream tooling stores the number as an opaque quality signal, so the
//! 10/5 weighting and the floor at zero are behavior, not tuning.

use serde::{Deserialize, Serialize};

use crate::core::group::FindingSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessStatus {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Readiness {
    pub overall: u32,
    pub errors: usize,
    pub warnings: usize,
    pub status: ReadinessStatus,
}

pub fn score(error_count: usize, warning_count: usize) -> Readiness {
    let penalty = error_count as i64 * 10 + warning_count as i64 * 5;
    let overall = (100 - penalty).max(0) as u32;
    Readiness {
        overall,
        errors: error_count,
        warnings: warning_count,
        status: status_for(overall),
    }
}

fn status_for(overall: u32) -> ReadinessStatus {
    if overall >= 90 {
        ReadinessStatus::Excellent
    } else if overall >= 75 {
        ReadinessStatus::Good
    } else if overall >= 50 {
        ReadinessStatus::Fair
    } else {
        ReadinessStatus::NeedsWork
    }
}

/// Score either result shape; normalized to flat at the boundary before
/// counting, never inspected for shape downstream.
pub fn score_sets(errors: FindingSet, warnings: FindingSet) -> Readiness {
    score(errors.into_flat().len(), warnings.into_flat().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::finding::Finding;
    use crate::core::group::group;

    #[test]
    fn clean_scan_is_excellent() {
        let r = score(0, 0);
        assert_eq!(r.overall, 100);
        assert_eq!(r.status, ReadinessStatus::Excellent);
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(score(1, 0).overall, 90);
        assert_eq!(score(1, 0).status, ReadinessStatus::Excellent);
        assert_eq!(score(2, 0).overall, 80);
        assert_eq!(score(2, 0).status, ReadinessStatus::Good);
        assert_eq!(score(5, 0).overall, 50);
        assert_eq!(score(5, 0).status, ReadinessStatus::Fair);
        assert_eq!(score(5, 1).status, ReadinessStatus::NeedsWork);
    }

    #[test]
    fn floor_at_zero_never_negative() {
        let r = score(10, 0);
        assert_eq!(r.overall, 0);
        assert_eq!(r.status, ReadinessStatus::NeedsWork);
        assert_eq!(score(1000, 1000).overall, 0);
    }

    #[test]
    fn warnings_weigh_half_an_error() {
        assert_eq!(score(0, 2).overall, score(1, 0).overall);
    }

    #[test]
    fn scores_grouped_and_flat_identically() {
        let flat: Vec<Finding> = (0..3)
            .map(|i| Finding {
                file: "a.php".to_string(),
                line: i + 1,
                column: 1,
                code: "X".to_string(),
                message: "m".to_string(),
                severity: 5,
                link: None,
                docs: None,
            })
            .collect();
        let grouped = group(&flat);
        let a = score_sets(FindingSet::Flat(flat), FindingSet::Flat(vec![]));
        let b = score_sets(FindingSet::Grouped(grouped), FindingSet::Flat(vec![]));
        assert_eq!(a, b);
        assert_eq!(a.overall, 70);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ReadinessStatus::NeedsWork).unwrap();
        assert_eq!(json, "\"needs-work\"");
    }
}
