//! Probe result type
//!
//! A probe result is produced exactly once per request and never mutated.
//! It carries either a response (status, headers, body) or the error that
//! stopped the request from completing.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::ProbeErrorKind;

/// HTTP status code with semantic helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Returns true if this is a 2xx success status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns the canonical reason phrase for the codes an auth gateway returns.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// Response body, parsed as JSON when possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseBody {
    /// Body parsed as a JSON document.
    Json(serde_json::Value),
    /// Body that was not valid JSON, kept verbatim.
    Text(String),
}

impl ResponseBody {
    /// Parses raw bytes, falling back to (lossy UTF-8) text when they are not JSON.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).map_or_else(
            |_| Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            Self::Json,
        )
    }

    /// Returns the JSON document, if the body parsed as JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns true if the body parsed as JSON.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Returns a top-level JSON field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.as_json().and_then(|json| json.get(name))
    }

    /// Returns a top-level JSON field as a string.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(serde_json::Value::as_str)
    }

    /// Returns the body rendered on a single line.
    #[must_use]
    pub fn compact(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Returns the body rendered for reading: pretty JSON or the raw text.
    #[must_use]
    pub fn pretty(&self) -> String {
        match self {
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Text(text) => text.clone(),
        }
    }

    /// Returns the compact rendering truncated to `max_chars` characters.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let compact = self.compact();
        if compact.chars().count() > max_chars {
            let head: String = compact.chars().take(max_chars).collect();
            format!("{head}...")
        } else {
            compact
        }
    }
}

/// Why a probe produced no response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeError {
    /// Error category
    pub kind: ProbeErrorKind,
    /// Human-readable message
    pub message: String,
}

impl ProbeError {
    /// Creates a probe error.
    #[must_use]
    pub fn new(kind: ProbeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a timeout error for the given bound.
    #[must_use]
    pub fn timeout(bound: Duration) -> Self {
        Self::new(
            ProbeErrorKind::Timeout,
            format!("no response within {} ms", bound.as_millis()),
        )
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.message)
    }
}

/// Outcome of one probe request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// `host:port/path` the probe was sent to
    pub endpoint: String,
    /// Status code, absent when no response arrived
    pub status: Option<u16>,
    /// Response headers (names as received)
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Parsed body, absent when no response arrived
    pub body: Option<ResponseBody>,
    /// Error that prevented a response
    pub error: Option<ProbeError>,
    /// Time from dispatch to completion
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ProbeResult {
    /// Creates a result from a received response.
    #[must_use]
    pub fn from_response(
        endpoint: impl Into<String>,
        status: u16,
        headers: HashMap<String, String>,
        body: &[u8],
        duration: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: Some(status),
            headers,
            body: Some(ResponseBody::parse(body)),
            error: None,
            duration,
        }
    }

    /// Creates a result for a request that produced no response.
    ///
    /// Status, headers and body stay empty: a failed probe never returns
    /// partial data.
    #[must_use]
    pub fn from_error(endpoint: impl Into<String>, error: ProbeError, duration: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: None,
            headers: HashMap::new(),
            body: None,
            error: Some(error),
            duration,
        }
    }

    /// Returns true if a response arrived with a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| StatusCode(s).is_success())
    }

    /// Returns true if the probe timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|e| e.kind == ProbeErrorKind::Timeout)
    }

    /// Returns the status as a `StatusCode`, if a response arrived.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.map(StatusCode)
    }

    /// Returns the status for display, or the error kind when there is none.
    #[must_use]
    pub fn status_display(&self) -> String {
        match (self.status_code(), &self.error) {
            (Some(code), _) => code.to_string(),
            (None, Some(error)) if error.kind == ProbeErrorKind::Timeout => "TIMEOUT".to_string(),
            (None, _) => "ERROR".to_string(),
        }
    }

    /// Returns a human-readable duration string (e.g., "124 ms").
    #[must_use]
    pub fn duration_display(&self) -> String {
        let millis = self.duration.as_millis();
        if millis < 1000 {
            format!("{millis} ms")
        } else {
            format!("{:.2} s", self.duration.as_secs_f64())
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_body_is_parsed() {
        let result = ProbeResult::from_response(
            "localhost:8000/auth/v1/signup",
            200,
            HashMap::new(),
            br#"{"id":"42","email":"test@example.com"}"#,
            Duration::from_millis(12),
        );

        assert!(result.is_success());
        let body = result.body.as_ref().map(ResponseBody::is_json);
        assert_eq!(body, Some(true));
        assert_eq!(
            result.body.as_ref().and_then(|b| b.str_field("id")),
            Some("42")
        );
    }

    #[test]
    fn non_json_body_kept_as_text_with_status() {
        let result = ProbeResult::from_response(
            "localhost:8000/rest/v1/profiles",
            502,
            HashMap::new(),
            b"<html>Bad Gateway</html>",
            Duration::from_millis(3),
        );

        assert_eq!(result.status, Some(502));
        assert!(result.error.is_none());
        assert_eq!(
            result.body,
            Some(ResponseBody::Text("<html>Bad Gateway</html>".to_string()))
        );
        assert_eq!(result.status_display(), "502 Bad Gateway");
    }

    #[test]
    fn error_result_carries_no_data() {
        let result = ProbeResult::from_error(
            "localhost:9999/health",
            ProbeError::timeout(Duration::from_secs(3)),
            Duration::from_secs(3),
        );

        assert!(result.is_timeout());
        assert!(!result.is_success());
        assert_eq!(result.status, None);
        assert_eq!(result.body, None);
        assert!(result.headers.is_empty());
        assert_eq!(result.status_display(), "TIMEOUT");
        assert_eq!(result.duration_display(), "3.00 s");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = ResponseBody::Json(json!({"name": "ééééé"}));
        assert_eq!(body.preview(10), "{\"name\":\"é...");
        assert_eq!(ResponseBody::Text("short".into()).preview(10), "short");
    }
}
