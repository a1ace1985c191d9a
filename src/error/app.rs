use std::path::PathBuf;

use thiserror::Error;

use super::{ConfigError, CriteriaError, HttpError, ValidationError};

/// Everything that can stop a run before or after the load phase. Failed
/// requests never surface here; they are outcomes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Failed to encode summary: {source}")]
    SummaryEncode {
        #[from]
        source: serde_json::Error,
    },
    #[error("Failed to write summary to '{path}': {source}")]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open log file '{path}': {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Criteria error: {0}")]
    Criteria(#[from] CriteriaError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        Self::Validation(error.into())
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        Self::Config(error.into())
    }

    pub fn http<E>(error: E) -> Self
    where
        E: Into<HttpError>,
    {
        Self::Http(error.into())
    }
}
