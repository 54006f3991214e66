use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::finding::{Finding, IssueKind};

/// Stable identity token for a finding, synthesized because findings carry
/// no natural primary key across tool runs. Derived from the file basename
/// and line only: insensitive to column and message drift between tool
/// versions, distinct enough in practice that a collision only degrades
/// diff quality, never correctness. Non-cryptographic by design.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId(String);

impl IssueId {
    pub fn new(kind: IssueKind, file: &str, line: u32) -> Self {
        let basename = basename(file);
        let token = rolling_hash(format!("{}{}", basename, line).as_bytes());
        IssueId(format!("{}{:08x}", kind.prefix(), token))
    }

    pub fn of(kind: IssueKind, finding: &Finding) -> Self {
        Self::new(kind, &finding.file, finding.line)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// djb2-style 32-bit rolling hash. Fast, deterministic, wide enough for
/// the 8-hex-char token format.
fn rolling_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 5381;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_deterministic() {
        let a = IssueId::new(IssueKind::Error, "src/admin/index.php", 42);
        let b = IssueId::new(IssueKind::Error, "src/admin/index.php", 42);
        assert_eq!(a, b);
    }

    #[test]
    fn identity_ignores_directory() {
        let a = IssueId::new(IssueKind::Error, "src/admin/index.php", 42);
        let b = IssueId::new(IssueKind::Error, "other/place/index.php", 42);
        assert_eq!(a, b);
    }

    #[test]
    fn errors_and_warnings_get_distinct_prefixes() {
        let e = IssueId::new(IssueKind::Error, "index.php", 7);
        let w = IssueId::new(IssueKind::Warning, "index.php", 7);
        assert!(e.as_str().starts_with("E-"));
        assert!(w.as_str().starts_with("W-"));
        assert_eq!(&e.as_str()[2..], &w.as_str()[2..]);
    }

    #[test]
    fn different_locations_differ() {
        let a = IssueId::new(IssueKind::Error, "index.php", 10);
        let b = IssueId::new(IssueKind::Error, "index.php", 11);
        let c = IssueId::new(IssueKind::Error, "admin.php", 10);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn token_is_fixed_width_lowercase_hex() {
        let id = IssueId::new(IssueKind::Warning, "a.php", 1);
        let hex_part = &id.as_str()[2..];
        assert_eq!(hex_part.len(), 8);
        assert!(hex_part
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
