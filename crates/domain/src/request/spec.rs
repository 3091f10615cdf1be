//! Probe request record and its builder

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::header::{
    API_KEY_HEADER, AUTHORIZATION_HEADER, CONTENT_LENGTH_HEADER, CONTENT_TYPE_HEADER, Headers,
};
use super::{HttpMethod, RequestBody};
use crate::config::{DEFAULT_REQUEST_TIMEOUT, ServiceEndpoint};
use crate::error::{DomainError, DomainResult};
use crate::session::SessionToken;

/// A fully built probe request.
///
/// Created fresh for every call and never reused. The builder fills in the
/// `apikey`, `Authorization`, `Content-Type` and `Content-Length` headers, so
/// a built request is exactly what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// URL scheme
    pub scheme: String,
    /// Target host
    pub host: String,
    /// Target port
    pub port: u16,
    /// Absolute path, starting with `/`
    pub path: String,
    /// Encoded query string, without the leading `?`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Headers sent with the request
    pub headers: Headers,
    /// Serialized body; empty when the request has none
    #[serde(default)]
    pub body: Vec<u8>,
    /// Bound after which the request is abandoned
    pub timeout: Duration,
}

impl ProbeRequest {
    /// Starts building a request to `path` on `endpoint`.
    #[must_use]
    pub fn builder(
        method: HttpMethod,
        endpoint: &ServiceEndpoint,
        path: impl Into<String>,
    ) -> ProbeRequestBuilder {
        ProbeRequestBuilder {
            method,
            endpoint: endpoint.clone(),
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: RequestBody::None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Returns the full request URL.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.query {
            Some(query) => format!("{}://{}:{}{}?{query}", self.scheme, self.host, self.port, self.path),
            None => format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path),
        }
    }

    /// Returns `host:port/path?query`, the label used in reports.
    #[must_use]
    pub fn endpoint_label(&self) -> String {
        match &self.query {
            Some(query) => format!("{}:{}{}?{query}", self.host, self.port, self.path),
            None => format!("{}:{}{}", self.host, self.port, self.path),
        }
    }

    /// Returns true if the request carries a body.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// Builder for [`ProbeRequest`].
#[derive(Debug, Clone)]
pub struct ProbeRequestBuilder {
    method: HttpMethod,
    endpoint: ServiceEndpoint,
    path: String,
    query: Vec<(String, String)>,
    headers: Headers,
    body: RequestBody,
    timeout: Duration,
}

impl ProbeRequestBuilder {
    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets an arbitrary header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sends the `apikey` header when a key is available.
    #[must_use]
    pub fn api_key(mut self, key: Option<&str>) -> Self {
        if let Some(key) = key {
            self.headers.set(API_KEY_HEADER, key);
        }
        self
    }

    /// Sends a bearer `Authorization` header when a token was supplied.
    #[must_use]
    pub fn bearer(mut self, token: Option<&SessionToken>) -> Self {
        if let Some(token) = token {
            self.headers.set(AUTHORIZATION_HEADER, token.bearer());
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the wait bound.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, the query cannot be
    /// encoded or the body cannot be serialized.
    pub fn build(self) -> DomainResult<ProbeRequest> {
        if !self.path.starts_with('/') {
            return Err(DomainError::InvalidUrl(format!(
                "path must start with '/': {}",
                self.path
            )));
        }

        let query = if self.query.is_empty() {
            None
        } else {
            Some(
                serde_urlencoded::to_string(&self.query)
                    .map_err(|e| DomainError::InvalidQuery(e.to_string()))?,
            )
        };

        let mut headers = self.headers;
        let body = self.body.to_bytes()?;
        if let Some(content_type) = self.body.content_type() {
            if !headers.contains(CONTENT_TYPE_HEADER) {
                headers.set(CONTENT_TYPE_HEADER, content_type);
            }
            headers.set(CONTENT_LENGTH_HEADER, body.len().to_string());
        }

        Ok(ProbeRequest {
            method: self.method,
            scheme: self.endpoint.scheme,
            host: self.endpoint.host,
            port: self.endpoint.port,
            path: self.path,
            query,
            headers,
            body,
            timeout: self.timeout,
        })
    }
}
