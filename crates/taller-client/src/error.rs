//! # Client Error Types
//!
//! Failures while fetching report inputs from the console API.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / url::ParseError                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ClientError (this module) ← Adds the URL and categorization           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow::Error (taller-report) ← Adds command context                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Non-zero exit, message on stderr, no report printed                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to the console API.
///
/// Any of these aborts the whole fetch; a report is never built from a
/// partial snapshot.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL (or a path joined onto it) is not a URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be sent or the connection broke.
    ///
    /// ## When This Occurs
    /// - Backend not running
    /// - DNS failure
    /// - Connection reset mid-response
    #[error("Request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    /// The request did not finish within the configured timeout.
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The backend answered with a non-2xx status.
    #[error("Request to {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ClientError {
    /// Categorizes a reqwest error raised for `url`.
    ///
    /// ```text
    /// is_timeout()  → ClientError::Timeout
    /// is_decode()   → ClientError::Decode
    /// is_status()   → ClientError::UnexpectedStatus
    /// other         → ClientError::RequestFailed
    /// ```
    pub fn from_reqwest(url: &str, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            ClientError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ClientError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            ClientError::RequestFailed {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Creates an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        ClientError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
