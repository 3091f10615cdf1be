//! Execute Probe Use Case
//!
//! Sends one probe request and turns whatever happens into a
//! [`ProbeResult`]. Nothing escapes this boundary as an error: a refused
//! connection, an unreadable body or an elapsed bound are all recorded on
//! the result.

use std::sync::Arc;

use authprobe_domain::{ProbeError, ProbeRequest, ProbeResult};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ports::HttpClient;

/// Use case for executing a single probe.
///
/// # Example
///
/// ```ignore
/// let probe = ExecuteProbe::new(Arc::new(ReqwestHttpClient::new()?));
/// let result = probe.execute(&request).await;
/// println!("{}", result.status_display());
/// ```
pub struct ExecuteProbe<C: HttpClient> {
    client: Arc<C>,
}

impl<C: HttpClient> Clone for ExecuteProbe<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: HttpClient> ExecuteProbe<C> {
    /// Creates a new `ExecuteProbe` use case with the given HTTP client.
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Returns the shared client.
    #[must_use]
    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    /// Sends the request once and waits at most `request.timeout`.
    ///
    /// The bound is enforced here as well as in the adapter, so a client
    /// that ignores it still cannot stall a run.
    pub async fn execute(&self, request: &ProbeRequest) -> ProbeResult {
        let endpoint = request.endpoint_label();
        debug!(method = %request.method, url = %request.url(), "sending probe");

        let start = Instant::now();
        let outcome = tokio::time::timeout(request.timeout, self.client.execute(request)).await;
        let duration = start.elapsed();

        match outcome {
            Ok(Ok(raw)) => {
                debug!(%endpoint, status = raw.status, ?duration, "probe answered");
                ProbeResult::from_response(endpoint, raw.status, raw.headers, &raw.body, duration)
            }
            Ok(Err(error)) => {
                warn!(%endpoint, %error, "probe failed");
                ProbeResult::from_error(endpoint, error.to_probe_error(), duration)
            }
            Err(_) => {
                warn!(%endpoint, timeout = ?request.timeout, "probe timed out");
                ProbeResult::from_error(endpoint, ProbeError::timeout(request.timeout), duration)
            }
        }
    }
}
