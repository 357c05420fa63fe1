use crate::client::{AUTH_TOKEN_HEADER, HttpResponse, RedfishClient, SessionHeaders};
use crate::config::Credentials;
use crate::error::LoadResult;
use crate::outcome::{Outcome, RequestRecord};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

pub const SESSIONS_PATH: &str = "/redfish/v1/SessionService/Sessions";

/// Request name under which session creation is reported
pub const CREATE_SESSION: &str = "Create Session";

#[derive(Serialize)]
struct SessionRequest<'a> {
    #[serde(rename = "UserName")]
    user_name: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

/// How session creation ended. Only `Authenticated` attaches a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    /// 200/201 without a token header
    MissingToken { status: u16 },
    /// Token header present but not a valid header value
    InvalidToken { status: u16, message: String },
    Rejected { status: u16 },
    Unreachable(String),
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthOutcome::Authenticated => write!(f, "authenticated"),
            AuthOutcome::MissingToken { status } => {
                write!(f, "HTTP {} without {} header", status, AUTH_TOKEN_HEADER)
            }
            AuthOutcome::InvalidToken { status, message } => {
                write!(f, "HTTP {} with unusable {}: {}", status, AUTH_TOKEN_HEADER, message)
            }
            AuthOutcome::Rejected { status } => write!(f, "authentication failed: HTTP {}", status),
            AuthOutcome::Unreachable(message) => write!(f, "authentication failed: {}", message),
        }
    }
}

/// Result of a user's initialization step
#[derive(Debug, Clone)]
pub struct SessionAuth {
    pub headers: SessionHeaders,
    pub outcome: AuthOutcome,
    pub record: RequestRecord,
}

pub fn is_session_created(status: u16) -> bool {
    status == 200 || status == 201
}

/// Raw session creation call
pub async fn create_session(
    client: &RedfishClient,
    credentials: &Credentials,
) -> LoadResult<HttpResponse> {
    let body = SessionRequest {
        user_name: &credentials.username,
        password: &credentials.password,
    };
    client
        .post_json(SESSIONS_PATH, &body, &SessionHeaders::anonymous())
        .await
}

/// Log in once and derive the header overlay for the rest of the user's
/// lifetime. Never fails: on any problem the overlay stays empty and the
/// diagnostic is carried in `outcome`.
pub async fn authenticate(client: &RedfishClient, credentials: &Credentials) -> SessionAuth {
    let started = Instant::now();
    let response = match create_session(client, credentials).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Authentication error: {}", e);
            return SessionAuth {
                headers: SessionHeaders::anonymous(),
                outcome: AuthOutcome::Unreachable(e.to_string()),
                record: RequestRecord {
                    name: CREATE_SESSION,
                    status: None,
                    latency: started.elapsed(),
                    outcome: Outcome::failure(format!("transport error: {}", e)),
                },
            };
        }
    };

    let status = response.status;
    let (headers, outcome) = session_from_response(&response);
    match &outcome {
        AuthOutcome::Authenticated => {
            info!("Session created for '{}' (HTTP {})", credentials.username, status)
        }
        AuthOutcome::Rejected { .. } => warn!("Authentication error: HTTP {}", status),
        other => warn!("Session for '{}' unusable: {}", credentials.username, other),
    }

    let record_outcome = if is_session_created(status) {
        Outcome::Success
    } else {
        Outcome::http_status(status)
    };

    SessionAuth {
        headers,
        outcome,
        record: RequestRecord {
            name: CREATE_SESSION,
            status: Some(status),
            latency: response.latency,
            outcome: record_outcome,
        },
    }
}

/// Map a session creation response to the header overlay it grants
pub fn session_from_response(response: &HttpResponse) -> (SessionHeaders, AuthOutcome) {
    let status = response.status;
    if !is_session_created(status) {
        return (SessionHeaders::anonymous(), AuthOutcome::Rejected { status });
    }

    let Some(token) = response.headers.get(AUTH_TOKEN_HEADER) else {
        return (SessionHeaders::anonymous(), AuthOutcome::MissingToken { status });
    };

    let token = match token.to_str() {
        Ok(token) => token,
        Err(e) => {
            return (
                SessionHeaders::anonymous(),
                AuthOutcome::InvalidToken {
                    status,
                    message: e.to_string(),
                },
            );
        }
    };

    match SessionHeaders::with_token(token) {
        Ok(headers) => {
            debug!("Captured {} from HTTP {}", AUTH_TOKEN_HEADER, status);
            (headers, AuthOutcome::Authenticated)
        }
        Err(e) => (
            SessionHeaders::anonymous(),
            AuthOutcome::InvalidToken {
                status,
                message: e.to_string(),
            },
        ),
    }
}
