use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Diagnostic used when a 200 response is missing the fields a task expects.
pub const CONTRACT_FAILURE: &str = "unexpected response body";

/// Pass/fail label of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Outcome::Failure(reason.into())
    }

    /// Failure carrying the literal status code, e.g. `HTTP 503`
    pub fn http_status(status: u16) -> Self {
        Outcome::Failure(format!("HTTP {}", status))
    }

    pub fn contract_violation() -> Self {
        Outcome::Failure(CONTRACT_FAILURE.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure(reason) => write!(f, "failure: {}", reason),
        }
    }
}

/// One classified request, as reported to the metrics aggregator
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub name: &'static str,
    pub status: Option<u16>,
    pub latency: Duration,
    pub outcome: Outcome,
}
