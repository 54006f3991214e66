//! Presence checks for expected package artifacts. Pure filesystem probes,
//! independent of any scan result.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureReport {
    pub readme: bool,
    pub license: bool,
    pub translations: bool,
    pub missing: Vec<String>,
}

const README_CANDIDATES: [&str; 4] = ["readme.txt", "readme.md", "README.md", "README.txt"];
const LICENSE_CANDIDATES: [&str; 4] = ["license.txt", "LICENSE", "LICENSE.txt", "COPYING"];
const TRANSLATION_DIRS: [&str; 2] = ["languages", "lang"];

pub fn validate_structure(package_root: &Path) -> StructureReport {
    let readme = README_CANDIDATES
        .iter()
        .any(|c| package_root.join(c).is_file());
    let license = LICENSE_CANDIDATES
        .iter()
        .any(|c| package_root.join(c).is_file());
    let translations = TRANSLATION_DIRS.iter().any(|d| {
        let dir = package_root.join(d);
        dir.is_dir()
            && std::fs::read_dir(&dir)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false)
    });

    let mut missing = Vec::new();
    if !readme {
        missing.push("readme".to_string());
    }
    if !license {
        missing.push("license".to_string());
    }
    if !translations {
        missing.push("translations".to_string());
    }

    StructureReport {
        readme,
        license,
        translations,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_package_misses_everything() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_structure(dir.path());
        assert!(!report.readme);
        assert_eq!(report.missing, vec!["readme", "license", "translations"]);
    }

    #[test]
    fn complete_package_passes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"readme").unwrap();
        fs::write(dir.path().join("LICENSE"), b"GPL").unwrap();
        fs::create_dir(dir.path().join("languages")).unwrap();
        fs::write(dir.path().join("languages/plugin-en.po"), b"").unwrap();
        let report = validate_structure(dir.path());
        assert!(report.readme && report.license && report.translations);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn empty_translations_dir_does_not_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("languages")).unwrap();
        let report = validate_structure(dir.path());
        assert!(!report.translations);
    }
}
