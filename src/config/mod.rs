use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::TrackerError;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the per-concern JSON state files.
    pub data_dir: String,
    /// Retained scan records per package, newest first.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Retained monitor activity log entries.
    #[serde(default = "default_monitor_log_limit")]
    pub monitor_log_limit: usize,
    /// File extensions hashed by the checksum monitor.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
}

fn default_history_limit() -> usize {
    10
}

fn default_monitor_log_limit() -> usize {
    100
}

fn default_source_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, TrackerError> {
    let default_path = Path::new("config/scanledger.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(default_config());
    }

    let content = fs::read_to_string(path).map_err(|e| TrackerError::Config(e.to_string()))?;
    let cfg: AppConfig =
        toml::from_str(&content).map_err(|e| TrackerError::Config(e.to_string()))?;
    Ok(cfg)
}

fn default_config() -> AppConfig {
    AppConfig {
        data_dir: "data".to_string(),
        history_limit: default_history_limit(),
        monitor_log_limit: default_monitor_log_limit(),
        source_extensions: default_source_extensions(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config(Some("does/not/exist.toml")).unwrap();
        assert_eq!(cfg.history_limit, 10);
        assert_eq!(cfg.monitor_log_limit, 100);
        assert_eq!(cfg.source_extensions, vec!["php".to_string()]);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, "data_dir = \"/tmp/sl\"\n").unwrap();
        let cfg = load_config(path.to_str()).unwrap();
        assert_eq!(cfg.data_dir, "/tmp/sl");
        assert_eq!(cfg.history_limit, 10);
    }
}
