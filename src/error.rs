//! Error types for the catalog client.

use serde_json::error::Category;
use thiserror::Error;

/// Result type for client operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// A single GET request that did not produce a response body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },
}

impl TransportError {
    /// The URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            TransportError::Unreachable { url, .. }
            | TransportError::Timeout { url }
            | TransportError::BadStatus { url, .. } => url,
        }
    }
}

/// A payload that could not be turned into a typed record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::UnexpectedShape(err),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Malformed(err),
        }
    }
}

/// Errors surfaced by [`crate::client::DexClient`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(DecodeError::from(err), DecodeError::Malformed(_)));
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{\"id\": 1").unwrap_err();
        assert!(matches!(DecodeError::from(err), DecodeError::Malformed(_)));
    }

    #[test]
    fn test_wrong_shape_is_unexpected_shape() {
        let err = serde_json::from_str::<Vec<u32>>("{\"id\": 1}").unwrap_err();
        assert!(matches!(
            DecodeError::from(err),
            DecodeError::UnexpectedShape(_)
        ));
    }

    #[test]
    fn test_transport_error_url_and_message() {
        let err = TransportError::BadStatus {
            url: "https://example.test/1".to_string(),
            status: 503,
        };
        assert_eq!(err.url(), "https://example.test/1");
        assert_eq!(err.to_string(), "https://example.test/1 returned HTTP 503");

        let fetch: FetchError = err.into();
        assert!(fetch.is_transport());
        assert!(!fetch.is_decode());
    }
}
