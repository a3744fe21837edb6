//! Single-request HTTP transport.
//!
//! [`Transport`] is the seam the client is generic over, so tests can swap in
//! an in-memory implementation. [`HttpTransport`] is the reqwest-backed one.

use crate::config::ClientConfig;
use crate::error::{FetchError, TransportError};
use std::future::Future;
use tracing::debug;

/// Performs one GET per call. No retries: a failure is final for that request.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok(body.to_vec())
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = err.status() {
        TransportError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        TransportError::Unreachable {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
