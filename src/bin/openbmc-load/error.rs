//! CLI Error types and handling

use openbmc_load::LoadError;
use std::fmt;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    NoCommand,
    UnknownCommand(String),
    ParseError { field: String, message: String },
    ConfigurationError(String),
    IoError(String),
    RunError(String),
    FailureRatioExceeded { observed: f64, max: f64 },
    SmokeChecksFailed { failed: usize, total: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NoCommand => {
                write!(f, "No command provided. Use --help to see available commands")
            }
            CliError::UnknownCommand(cmd) => {
                write!(f, "Unknown command '{}'. Use --help to see available commands", cmd)
            }
            CliError::ParseError { field, message } => {
                write!(f, "Parse error ({}): {}", field, message)
            }
            CliError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CliError::IoError(msg) => write!(f, "IO error: {}", msg),
            CliError::RunError(msg) => write!(f, "Run error: {}", msg),
            CliError::FailureRatioExceeded { observed, max } => write!(
                f,
                "Failure ratio {:.2}% exceeds the allowed {:.2}%",
                observed * 100.0,
                max * 100.0
            ),
            CliError::SmokeChecksFailed { failed, total } => {
                write!(f, "{} of {} smoke checks failed", failed, total)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Config(msg) => CliError::ConfigurationError(msg),
            LoadError::Json(e) => CliError::ConfigurationError(e.to_string()),
            LoadError::Io(e) => CliError::IoError(e.to_string()),
            other => CliError::RunError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError(err.to_string())
    }
}
