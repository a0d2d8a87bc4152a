//! Error types for the remapping core.

use thiserror::Error;

/// A command the engine refused. The state it was applied to is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Translation id is not of the form `translation_{row}`.
    #[error("malformed translation id '{raw}'")]
    MalformedTranslationId { raw: String },

    /// Translation id names a row outside the dataset.
    #[error("row {row} is out of range for a dataset of {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    /// Dictionary or output command issued before any successful fetch.
    #[error("dataset has not been loaded")]
    DatasetNotLoaded,
}

/// Failure reported by a dataset loader.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("{0}")]
    Http(String),

    #[error("invalid dataset: {0}")]
    Parse(String),

    #[error("invalid record at index {index}: {reason}")]
    Record { index: usize, reason: String },

    #[error("no dataset source configured")]
    NoSource,
}

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be one of compact, json; got '{value}'")]
    InvalidLogFormat { var: &'static str, value: String },
}
