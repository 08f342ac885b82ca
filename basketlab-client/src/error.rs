//! Structured errors for talking to the backtest service.
//!
//! Payloads are plain strings so the errors can cross the worker channel and
//! be shown in both the CLI and the TUI error history.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("service unreachable: {0}")]
    Network(String),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Longest body excerpt kept in a `Status` error.
    pub const BODY_EXCERPT: usize = 200;

    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(Self::BODY_EXCERPT) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body.to_string(),
        };
        ServiceError::Status { status, body }
    }

    /// True for failures that mean the payload was malformed rather than missing.
    pub fn is_decode(&self) -> bool {
        matches!(self, ServiceError::Decode(_))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else if e.is_builder() {
            ServiceError::Client(e.to_string())
        } else {
            ServiceError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_is_trimmed_and_capped() {
        let long = "x".repeat(500);
        match ServiceError::status(500, &long) {
            ServiceError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), ServiceError::BODY_EXCERPT + 1);
                assert!(body.ends_with('…'));
            }
            other => panic!("expected Status, got {other:?}"),
        }
        assert_eq!(
            ServiceError::status(404, "  {\"detail\":\"No data found\"}\n"),
            ServiceError::Status { status: 404, body: "{\"detail\":\"No data found\"}".into() }
        );
    }

    #[test]
    fn json_errors_are_decode_errors() {
        let err: ServiceError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.is_decode());
        assert!(err.to_string().starts_with("unexpected response payload"));
    }
}
