//! Error type shared by configuration loading and date handling.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read config at {path:?}.")]
    ReadConfig { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config at {path:?}.")]
    ParseConfig { path: PathBuf, source: serde_json::Error },
    #[error("{message}")]
    Validation { message: String },
    #[error("Invalid calendar date {input:?}; expected YYYY-MM-DD.")]
    InvalidDate { input: String },
    #[error("Timestamp {timestamp} cannot be represented as a calendar date.")]
    TimestampOutOfRange { timestamp: i64 },
}
