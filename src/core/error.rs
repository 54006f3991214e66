use std::io;

#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("invalid package: {0}")]
    InvalidPackage(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}
