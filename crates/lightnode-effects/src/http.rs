//! Shared HTTP plumbing

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use lightnode_core::{ApiConfig, ProveError, QueryError, SubmitError, VerifyError};

use crate::errors::HandlerError;

/// Build the client shared by every HTTP handler
///
/// Every request carries the configured timeout and a JSON content type; the
/// bearer token is attached only when one is configured.
pub fn build_client(api: &ApiConfig) -> Result<reqwest::Client, HandlerError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if !api.auth_token.is_empty() {
        let value = HeaderValue::from_str(&format!("Bearer {}", api.auth_token)).map_err(|e| {
            HandlerError::InvalidHeader {
                message: e.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(api.timeout())
        .build()
        .map_err(|e| HandlerError::HttpClient {
            message: e.to_string(),
        })
}

/// Join a base URL and a path with exactly one slash between them
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Failure of one HTTP exchange, before it is mapped to a boundary error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    /// Connection, timeout or body read failure
    Transport(String),
    /// Non-success status
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
    /// The body was not the expected JSON
    Decode(String),
}

/// Send `request` and return the body of a 2xx response
pub(crate) async fn execute(request: reqwest::RequestBuilder) -> Result<String, HttpFailure> {
    let response = request.send().await.map_err(transport_failure)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_failure)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(HttpFailure::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Decode a JSON body
pub(crate) fn decode<R: DeserializeOwned>(body: &str) -> Result<R, HttpFailure> {
    serde_json::from_str(body).map_err(|e| HttpFailure::Decode(e.to_string()))
}

fn transport_failure(err: reqwest::Error) -> HttpFailure {
    if err.is_timeout() {
        HttpFailure::Transport(format!("request timed out: {err}"))
    } else {
        HttpFailure::Transport(err.to_string())
    }
}

impl From<HttpFailure> for QueryError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Transport(message) => QueryError::Transport { message },
            HttpFailure::Status { status, body } => QueryError::Status { status, body },
            HttpFailure::Decode(message) => QueryError::Malformed { message },
        }
    }
}

impl From<HttpFailure> for ProveError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Transport(message) => ProveError::Transport { message },
            HttpFailure::Status { status, body } => ProveError::Status { status, body },
            HttpFailure::Decode(message) => ProveError::Malformed { message },
        }
    }
}

impl From<HttpFailure> for VerifyError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Transport(message) => VerifyError::Transport { message },
            HttpFailure::Status { status, body } => VerifyError::Status { status, body },
            HttpFailure::Decode(message) => VerifyError::Malformed { message },
        }
    }
}

impl From<HttpFailure> for SubmitError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Transport(message) => SubmitError::Transport { message },
            HttpFailure::Status { status, body } => SubmitError::Rejected { status, body },
            HttpFailure::Decode(message) => SubmitError::NotAccepted { message },
        }
    }
}
