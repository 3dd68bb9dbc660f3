//! Error types for pulse-gateway.

use bytes::Bytes;
use thiserror::Error;

/// The main error type for pulse-gateway.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ────────────────────────────────────────────────────────────
    /// Connection or transport failure below the HTTP layer.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Malformed request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server returned something that is not a usable HTTP response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Mid-stream failure while reading a streaming body.
    #[error("Stream error: {0}")]
    Stream(String),

    // ── Protocol ─────────────────────────────────────────────────────────────
    /// The server rejected the request. Retry policy is the caller's call.
    #[error("HTTP error {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body as received.
        body: Bytes,
    },

    /// The server rejected the caller's credentials (401 or 403).
    #[error("Unauthorized")]
    Unauthorized,

    // ── Decoding ─────────────────────────────────────────────────────────────
    /// A payload did not match the expected structure.
    #[error("Decoding error: {0}")]
    Decoding(#[from] serde_json::Error),

    // ── Configuration ────────────────────────────────────────────────────────
    /// Client was misconfigured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if this error indicates the caller's credentials were rejected.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }

    /// The HTTP status code behind this error, if one exists.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience type alias.
pub type Result<T> = std::result::Result<T, Error>;
