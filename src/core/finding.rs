use serde::{Deserialize, Serialize};

/// A single static-analysis result at a file/line/column, as emitted by the
/// external analysis engine. Immutable: the tracker derives identity and
/// flags alongside it but never rewrites message, code, or severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub code: String,
    pub message: String,
    /// Ordinal 1-10, lower is more severe.
    pub severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

/// Whether a finding came in on the error or the warning side of a report.
/// Drives the identity prefix and the snapshot `type` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
}

impl IssueKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IssueKind::Error => "E-",
            IssueKind::Warning => "W-",
        }
    }
}

/// Raw report shape consumed from the analysis engine:
/// errors and warnings, each grouped file -> line -> column -> findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub errors: crate::core::group::Grouped,
    #[serde(default)]
    pub warnings: crate::core::group::Grouped,
}
