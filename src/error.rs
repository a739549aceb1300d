//! Error types for fetching, decoding and summarising GHCN-Daily data.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhcndError {
    #[error("Station `{station_id}` not found in station metadata")]
    NotFound { station_id: String },

    #[error("Invalid station id `{station_id}`")]
    InvalidStationId { station_id: String },

    #[error("Malformed record: {reason} in line `{line}`")]
    MalformedRecord { line: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    #[error("Local file missing after fetch: {path}")]
    MissingLocalFile { path: PathBuf },

    #[error("Insufficient date range for station `{station_id}`: {reason}")]
    InsufficientRange { station_id: String, reason: String },

    #[error("Invalid date `{input}`, expected YYYYMMDD")]
    InvalidDate { input: String },

    #[error("Invalid season start month {month}, expected 1-12")]
    InvalidSeason { month: u32 },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Failed to render chart: {reason}")]
    Render { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl GhcndError {
    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        GhcndError::MalformedRecord {
            line: line.trim_end().to_string(),
            reason: reason.into(),
        }
    }

    pub fn insufficient_range(station_id: &str, reason: impl Into<String>) -> Self {
        GhcndError::InsufficientRange {
            station_id: station_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GhcndError>;
