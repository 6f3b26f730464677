//! Oracle query seam and its HTTP implementation.
//!
//! The prober talks to the oracle through the [`OracleClient`] trait so that
//! tests can substitute scripted replies and failure sequences without a
//! network. The production implementation issues one GET per query against
//! the configured endpoint, carrying the candidate and a constant
//! date-of-birth as query parameters, and decodes the integer `code` field
//! from the JSON body.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::types::Candidate;

/// Default oracle endpoint.
pub const DEFAULT_ORACLE_URL: &str = "https://auth.roblox.com/v1/usernames/validate";

/// Constant date-of-birth sent with every query.
pub const ORACLE_BIRTHDAY: &str = "2000-01-01";

/// Fixed per-request timeout, independent of the retry loop's sleeps.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A decoded, well-formed oracle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OracleReply {
    /// Integer availability code: 0 available, 1 taken, 2 censored.
    pub code: i64,
}

/// Errors from a single oracle query attempt.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Connection or timeout failure before any usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The oracle answered with a non-success HTTP status.
    #[error("oracle returned HTTP {0}")]
    Status(u16),

    /// The response body was malformed or lacked an integer `code` field.
    #[error("decode error: {0}")]
    Decode(String),
}

impl OracleError {
    /// Whether the prober should retry this attempt.
    ///
    /// Transport failures and non-success statuses are retried; a response
    /// that arrived but cannot be decoded is terminal for the candidate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Transport(_) | OracleError::Status(_))
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Transport(err.to_string())
    }
}

/// Executes one availability query against the oracle.
///
/// Implementations perform exactly one attempt per call; retry and backoff
/// belong to the prober.
pub trait OracleClient {
    fn query(
        &self,
        candidate: &Candidate,
    ) -> impl Future<Output = Result<OracleReply, OracleError>> + Send;
}

/// Production oracle client over a bound `reqwest` transport.
///
/// Each worker constructs its own `HttpOracle` around the transport it was
/// handed at startup, so the proxy binding holds for the worker's lifetime.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ORACLE_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl OracleClient for HttpOracle {
    async fn query(&self, candidate: &Candidate) -> Result<OracleReply, OracleError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("Username", candidate.as_str()),
                ("Birthday", ORACLE_BIRTHDAY),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| OracleError::Decode(err.to_string()))?;

        let code = body
            .get("code")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| OracleError::Decode("missing integer `code` field".to_string()))?;

        Ok(OracleReply { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_status_errors_are_retryable() {
        assert!(OracleError::Transport("connection refused".into()).is_retryable());
        assert!(OracleError::Status(502).is_retryable());
    }

    #[test]
    fn decode_errors_are_terminal() {
        assert!(!OracleError::Decode("not json".into()).is_retryable());
    }

    #[test]
    fn reply_decodes_from_json_body() {
        let reply: OracleReply = serde_json::from_str(r#"{"code": 2}"#).unwrap();
        assert_eq!(reply.code, 2);
    }
}
