//! Thin Redfish HTTP client.
//!
//! Requests never read hidden per-user state: the headers a user attaches
//! travel explicitly as a [`SessionHeaders`] value on every call.

use crate::config::TargetConfig;
use crate::error::{LoadError, LoadResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Header carrying the Redfish session token, in both directions.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Header overlay fixed when a user finishes authenticating.
#[derive(Debug, Clone, Default)]
pub struct SessionHeaders {
    headers: HeaderMap,
}

impl SessionHeaders {
    /// No token attached
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> LoadResult<Self> {
        let mut value = HeaderValue::from_str(token).map_err(|e| LoadError::InvalidHeader {
            name: AUTH_TOKEN_HEADER.to_string(),
            message: e.to_string(),
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-auth-token"), value);
        Ok(Self { headers })
    }

    pub fn token(&self) -> Option<&str> {
        self.headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
    }

    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(AUTH_TOKEN_HEADER)
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Fully read response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub latency: Duration,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct RedfishClient {
    http: reqwest::Client,
    base_url: String,
}

impl RedfishClient {
    pub fn new(target: &TargetConfig) -> LoadResult<Self> {
        // Lab BMCs ship self-signed certificates; verification is only on when asked for.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!target.verify_tls)
            .timeout(target.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: target.host.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, session: &SessionHeaders) -> LoadResult<HttpResponse> {
        let request = self
            .http
            .get(self.url(path))
            .headers(session.header_map().clone());
        Self::execute(request).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        session: &SessionHeaders,
    ) -> LoadResult<HttpResponse> {
        let request = self
            .http
            .post(self.url(path))
            .headers(session.header_map().clone())
            .json(body);
        Self::execute(request).await
    }

    async fn execute(request: reqwest::RequestBuilder) -> LoadResult<HttpResponse> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
            latency: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_headers_are_empty() {
        let session = SessionHeaders::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.header_map().is_empty());
    }

    #[test]
    fn test_with_token() {
        let session = SessionHeaders::with_token("abc123").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("abc123"));
        assert_eq!(session.header_map().len(), 1);
        assert_eq!(session.header_map()["x-auth-token"], "abc123");
    }

    #[test]
    fn test_with_token_rejects_invalid_value() {
        let result = SessionHeaders::with_token("abc\n123");
        assert!(matches!(result, Err(LoadError::InvalidHeader { .. })));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let target = TargetConfig {
            host: "https://localhost:2443/".to_string(),
            ..TargetConfig::default()
        };
        let client = RedfishClient::new(&target).unwrap();
        assert_eq!(
            client.url("/redfish/v1/Systems/system"),
            "https://localhost:2443/redfish/v1/Systems/system"
        );
    }
}
