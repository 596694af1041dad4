use std::path::PathBuf;

use thiserror::Error;

/// Every failure the dashboard core can surface.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("year {year} is outside the configured range {first}..={last}")]
    YearOutOfRange { year: u16, first: u16, last: u16 },

    #[error("invalid configuration: {field} ({reason})")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("data audit found {count} issue(s)")]
    AuditFailed { count: usize },
}

pub type Result<T> = std::result::Result<T, HarvestError>;
