//! Error types shared by the load runner, the smoke checks and the
//! configuration layer.
//!
//! Per-request failures are not errors: they are classified into
//! [`Outcome`](crate::outcome::Outcome) records and reported. `LoadError`
//! covers what stops an operation from running at all.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid header value for {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Metrics export error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("Task error: {0}")]
    Task(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            LoadError::Http(_) => "http",
            LoadError::Json(_) => "serialization",
            LoadError::Io(_) => "io",
            LoadError::Config(_) => "configuration",
            LoadError::InvalidHeader { .. } => "protocol",
            LoadError::Metrics(_) => "metrics",
            LoadError::Logging(_) => "logging",
            LoadError::Task(_) => "runtime",
        }
    }
}

impl From<tokio::task::JoinError> for LoadError {
    fn from(error: tokio::task::JoinError) -> Self {
        LoadError::Task(error.to_string())
    }
}

impl From<log::SetLoggerError> for LoadError {
    fn from(error: log::SetLoggerError) -> Self {
        LoadError::Logging(error.to_string())
    }
}
