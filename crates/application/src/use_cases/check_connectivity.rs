//! Check Connectivity Use Case
//!
//! Dispatches several probes at once and waits for every one of them.
//! Completions arrive in any order; the report lists results in request
//! order and always holds exactly one result per request.

use std::time::Duration;

use authprobe_domain::{ProbeError, ProbeErrorKind, ProbeRequest, ProbeResult};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::ports::HttpClient;
use crate::use_cases::ExecuteProbe;

/// Merged outcome of a concurrent probe group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    /// One result per request, in request order
    pub results: Vec<ProbeResult>,
    /// Number of results with a 2xx status
    pub success_count: usize,
}

impl ConnectivityReport {
    fn new(results: Vec<ProbeResult>) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count();
        Self {
            results,
            success_count,
        }
    }

    /// Returns true if at least one probe succeeded.
    #[must_use]
    pub const fn any_succeeded(&self) -> bool {
        self.success_count > 0
    }
}

/// Use case for concurrent health probes.
pub struct CheckConnectivity<C: HttpClient + 'static> {
    probe: ExecuteProbe<C>,
}

impl<C: HttpClient + 'static> CheckConnectivity<C> {
    /// Creates the use case over a probe executor.
    pub const fn new(probe: ExecuteProbe<C>) -> Self {
        Self { probe }
    }

    /// Sends every request concurrently and reports once all have completed.
    pub async fn execute(&self, requests: Vec<ProbeRequest>) -> ConnectivityReport {
        let report = ConnectivityReport::new(self.probe_all(requests).await);
        info!(
            probes = report.results.len(),
            succeeded = report.success_count,
            "connectivity check finished"
        );
        report
    }

    /// Sends every request concurrently and returns results in request order.
    pub(crate) async fn probe_all(&self, requests: Vec<ProbeRequest>) -> Vec<ProbeResult> {
        let labels: Vec<String> = requests.iter().map(ProbeRequest::endpoint_label).collect();
        let mut slots: Vec<Option<ProbeResult>> = vec![None; requests.len()];

        let mut set = JoinSet::new();
        for (index, request) in requests.into_iter().enumerate() {
            let probe = self.probe.clone();
            set.spawn(async move { (index, probe.execute(&request).await) });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!(error = %e, "probe task ended abnormally"),
            }
        }

        slots
            .into_iter()
            .zip(labels)
            .map(|(slot, label)| {
                slot.unwrap_or_else(|| {
                    ProbeResult::from_error(
                        label,
                        ProbeError::new(ProbeErrorKind::Unknown, "probe task ended without a result"),
                        Duration::ZERO,
                    )
                })
            })
            .collect()
    }
}
