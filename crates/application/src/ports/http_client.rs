//! HTTP Client port

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use authprobe_domain::{ProbeError, ProbeErrorKind, ProbeRequest};
use thiserror::Error;

/// Response as received on the wire, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Body bytes, fully read
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }
}

/// Errors an HTTP adapter can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Underlying message
        message: String,
    },

    /// Nothing is listening on the target port.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the bound.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Bound that elapsed
        timeout_ms: u64,
    },

    /// The request body could not be sent.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Maps this error to its display category.
    #[must_use]
    pub const fn to_error_kind(&self) -> ProbeErrorKind {
        match self {
            Self::InvalidUrl(_) => ProbeErrorKind::InvalidUrl,
            Self::DnsError { .. } => ProbeErrorKind::DnsError,
            Self::ConnectionRefused { .. } => ProbeErrorKind::ConnectionRefused,
            Self::ConnectionFailed(_) => ProbeErrorKind::ConnectionFailed,
            Self::Timeout { .. } => ProbeErrorKind::Timeout,
            Self::InvalidBody(_) => ProbeErrorKind::InvalidBody,
            Self::Other(_) => ProbeErrorKind::Unknown,
        }
    }

    /// Converts this error into the error recorded on a probe result.
    #[must_use]
    pub fn to_probe_error(&self) -> ProbeError {
        ProbeError::new(self.to_error_kind(), self.to_string())
    }
}

/// Port for executing HTTP requests.
///
/// Implementations send the request exactly once, read the whole body and
/// honour `request.timeout`. They never retry.
pub trait HttpClient: Send + Sync {
    /// Executes a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    fn execute(
        &self,
        request: &ProbeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, HttpClientError>> + Send + '_>>;
}
