use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::finding::Finding;

/// Hierarchical result shape: file -> line -> column -> findings.
/// Multiple findings may share a (file, line, column) bucket; order within
/// a bucket is preserved.
pub type Grouped = BTreeMap<String, BTreeMap<u32, BTreeMap<u32, Vec<Finding>>>>;

/// Either shape a caller may hand over. Historical callers pass both; the
/// boundary normalizes to flat before counting or diffing instead of
/// inspecting the value at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingSet {
    Flat(Vec<Finding>),
    Grouped(Grouped),
}

impl FindingSet {
    pub fn into_flat(self) -> Vec<Finding> {
        match self {
            FindingSet::Flat(list) => list,
            FindingSet::Grouped(map) => flatten(&map),
        }
    }
}

/// Group a flat list into the hierarchical shape. Findings with an empty
/// file are dropped: they carry no actionable location (usually an engine
/// artifact of failed path resolution).
pub fn group(flat: &[Finding]) -> Grouped {
    let mut out: Grouped = BTreeMap::new();
    for finding in flat {
        if finding.file.is_empty() {
            continue;
        }
        out.entry(finding.file.clone())
            .or_default()
            .entry(finding.line)
            .or_default()
            .entry(finding.column)
            .or_default()
            .push(finding.clone());
    }
    out
}

/// Inverse of `group`. Bucket iteration order follows the sorted map keys,
/// so cross-bucket ordering may differ from the original flat input;
/// within a bucket the original order is kept.
pub fn flatten(grouped: &Grouped) -> Vec<Finding> {
    let mut out = Vec::new();
    for lines in grouped.values() {
        for cols in lines.values() {
            for bucket in cols.values() {
                out.extend(bucket.iter().cloned());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, line: u32, column: u32, code: &str) -> Finding {
        Finding {
            file: file.to_string(),
            line,
            column,
            code: code.to_string(),
            message: format!("{} at {}:{}", code, file, line),
            severity: 5,
            link: None,
            docs: None,
        }
    }

    #[test]
    fn round_trip_is_multiset_equal() {
        let input = vec![
            finding("b.php", 2, 1, "X.One"),
            finding("a.php", 1, 4, "X.Two"),
            finding("a.php", 1, 4, "X.Three"),
            finding("a.php", 9, 0, "X.Four"),
        ];
        let mut back = flatten(&group(&input));
        let mut expected = input.clone();
        let key = |f: &Finding| (f.file.clone(), f.line, f.column, f.code.clone());
        back.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(back, expected);
    }

    #[test]
    fn bucket_order_is_preserved() {
        let input = vec![
            finding("a.php", 1, 4, "First"),
            finding("a.php", 1, 4, "Second"),
        ];
        let grouped = group(&input);
        let bucket = &grouped["a.php"][&1][&4];
        assert_eq!(bucket[0].code, "First");
        assert_eq!(bucket[1].code, "Second");
    }

    #[test]
    fn empty_file_findings_are_dropped() {
        let input = vec![finding("", 1, 1, "X.One"), finding("a.php", 1, 1, "X.Two")];
        let grouped = group(&input);
        assert_eq!(flatten(&grouped).len(), 1);
    }

    #[test]
    fn finding_set_normalizes_both_shapes() {
        let flat = vec![finding("a.php", 1, 1, "X"), finding("a.php", 2, 1, "Y")];
        let grouped = group(&flat);
        assert_eq!(FindingSet::Flat(flat).into_flat().len(), 2);
        assert_eq!(FindingSet::Grouped(grouped).into_flat().len(), 2);
    }
}
