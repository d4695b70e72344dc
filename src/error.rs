//! Error types shared by every backend client.
//!
//! The clients never log or retry; each variant carries enough context for the
//! caller to decide what to do.

use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The client cannot honor the call with its current configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A mode this client does not implement, e.g. streaming replies.
    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Upstream replied with a body the normalizer cannot interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Rejected during validated construction of a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out after {}s", after.as_secs_f32())]
    Timeout { url: String, after: Duration },

    #[error("connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// Non-2xx status. The body is kept verbatim for diagnostics.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// HTTP status code, if the upstream answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl TransportError {
    /// Classify a reqwest failure for `url`, sent with the given timeout.
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                after: timeout,
            }
        } else if err.is_connect() {
            TransportError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            TransportError::Request(err)
        }
    }
}
