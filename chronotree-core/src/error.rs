//! Error types
//!
//! The core performs no I/O of its own, so the taxonomy is narrow: datasets
//! can be malformed, a crawl can fail to start, and configuration can fail
//! to load. Everything else (dangling cross-references, missing years,
//! unknown keywords, repeated cancellation) is absorbed rather than reported.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset document is not valid JSON or does not match the schema.
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two nodes in the same tree share an id.
    #[error("duplicate node id `{0}`")]
    DuplicateId(String),

    /// A node has an empty id.
    #[error("node `{label}` has an empty id")]
    EmptyId {
        /// Label of the offending node, to help locate it.
        label: String,
    },
}

/// Failure to start a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The dataset source produced an unusable dataset.
    #[error("dataset for `{keyword}` is unusable: {source}")]
    Dataset {
        /// The keyword that was being resolved.
        keyword: String,
        /// The underlying dataset failure.
        source: DatasetError,
    },

    /// `start_crawl` was called outside of a tokio runtime.
    #[error("crawl must be started from within a tokio runtime")]
    NoRuntime,
}

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config `{path}`: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config document is not valid JSON or does not match the schema.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The config parsed but describes an impossible geometry or schedule.
    #[error("invalid config: {0}")]
    Invalid(String),
}
