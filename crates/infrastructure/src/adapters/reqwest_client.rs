//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Requests go out exactly as built: the headers on the `ProbeRequest`
//! (including `Content-Length`) are copied verbatim, redirects are not
//! followed and system proxies are bypassed, since every target is local.

use std::collections::HashMap;
use std::error::Error as _;
use std::future::Future;
use std::pin::Pin;

use authprobe_application::ports::{HttpClient, HttpClientError, RawResponse};
use authprobe_domain::request::{HttpMethod, ProbeRequest};
use reqwest::{Client, Method, Url};
use tracing::trace;

/// User agent sent with every probe.
const USER_AGENT: &str = concat!("authprobe/", env!("CARGO_PKG_VERSION"));

/// HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client for local probes.
    ///
    /// Configuration:
    /// - HTTP/1.1 only
    /// - Redirects: not followed
    /// - Proxies: ignored
    /// - User-Agent: `authprobe/<version>`
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .http1_only()
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, host: &str, port: u16, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error_chain(error);
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
                return HttpClientError::DnsError {
                    host: host.to_string(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host.to_string(),
                    port,
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_body() || error.is_request() {
            return HttpClientError::ConnectionFailed(error_chain(error));
        }

        HttpClientError::Other(error_chain(error))
    }
}

/// Joins an error and its sources into one line.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &ProbeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, HttpClientError>> + Send + '_>> {
        // Clone what we need to move into the async block
        let method = request.method;
        let url = request.url();
        let host = request.host.clone();
        let port = request.port;
        let headers = request.headers.clone();
        let body = request.body.clone();
        let timeout = request.timeout;

        Box::pin(async move {
            let parsed_url =
                Url::parse(&url).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {url}")))?;
            #[allow(clippy::cast_possible_truncation)]
            let timeout_ms = timeout.as_millis() as u64;

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), parsed_url)
                .timeout(timeout);

            for header in headers.iter() {
                builder = builder.header(&header.name, &header.value);
            }
            if !body.is_empty() {
                builder = builder.body(body);
            }

            trace!(%url, "sending request");
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, &host, port, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| Self::map_error(&e, &host, port, timeout_ms))?
                .to_vec();

            Ok(RawResponse {
                status,
                headers: response_headers,
                body,
            })
        })
    }
}
