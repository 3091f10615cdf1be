//! Settle Wait Use Case
//!
//! Pauses between dependent steps according to a [`SettlePolicy`]. The
//! wait never fails a step and never exceeds `policy.max_wait()`.

use std::time::Duration;

use authprobe_domain::scenario::RequestTemplate;
use authprobe_domain::{Backoff, ProbeConfig, SettlePolicy};
use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::ports::HttpClient;
use crate::use_cases::ExecuteProbe;

/// Lower bound of the jitter factor applied to each poll delay.
const JITTER_MIN: f64 = 0.8;
/// Upper bound of the jitter factor applied to each poll delay.
const JITTER_MAX: f64 = 1.2;

/// What a settle wait did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// No wait was configured.
    Skipped,
    /// Slept for a fixed delay.
    Slept(Duration),
    /// The readiness endpoint answered 2xx.
    Ready {
        /// Polls sent
        attempts: u32,
        /// Time spent waiting
        waited: Duration,
    },
    /// The maximum elapsed before the endpoint answered 2xx.
    GaveUp {
        /// Polls sent
        attempts: u32,
        /// Time spent waiting
        waited: Duration,
    },
    /// The readiness request could not be built.
    Misconfigured(String),
}

impl SettleOutcome {
    /// Returns how long the wait took.
    #[must_use]
    pub const fn waited(&self) -> Duration {
        match self {
            Self::Skipped | Self::Misconfigured(_) => Duration::ZERO,
            Self::Slept(waited) | Self::Ready { waited, .. } | Self::GaveUp { waited, .. } => {
                *waited
            }
        }
    }
}

/// Use case for bounded waits between dependent steps.
pub struct SettleWait<C: HttpClient> {
    probe: ExecuteProbe<C>,
}

impl<C: HttpClient> SettleWait<C> {
    /// Creates the use case over a probe executor.
    pub const fn new(probe: ExecuteProbe<C>) -> Self {
        Self { probe }
    }

    /// Waits as `policy` describes.
    pub async fn execute(&self, policy: &SettlePolicy, config: &ProbeConfig) -> SettleOutcome {
        match policy {
            SettlePolicy::None => SettleOutcome::Skipped,
            SettlePolicy::Fixed { delay } => {
                debug!(?delay, "settling");
                tokio::time::sleep(*delay).await;
                SettleOutcome::Slept(*delay)
            }
            SettlePolicy::Poll {
                target,
                path,
                backoff,
                max_wait,
            } => {
                let template = RequestTemplate::get(*target, path.clone()).as_health_check();
                self.poll(&template, backoff, *max_wait, config).await
            }
        }
    }

    async fn poll(
        &self,
        template: &RequestTemplate,
        backoff: &Backoff,
        max_wait: Duration,
        config: &ProbeConfig,
    ) -> SettleOutcome {
        let start = Instant::now();
        let deadline = start + max_wait;
        let mut delay = backoff.initial_delay;
        let mut attempts = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                info!(attempts, ?max_wait, "readiness endpoint never answered, continuing");
                return SettleOutcome::GaveUp {
                    attempts,
                    waited: start.elapsed(),
                };
            }

            let mut request = match template.build(config, None) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "cannot build readiness probe");
                    return SettleOutcome::Misconfigured(e.to_string());
                }
            };
            request.timeout = request.timeout.min(remaining);

            attempts += 1;
            let result = self.probe.execute(&request).await;
            if result.is_success() {
                debug!(attempts, "readiness endpoint answered");
                return SettleOutcome::Ready {
                    attempts,
                    waited: start.elapsed(),
                };
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(jittered(delay).min(remaining)).await;
            delay = backoff.next_delay(delay);
        }
    }
}

/// Scales `delay` by a random factor in `JITTER_MIN..=JITTER_MAX`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(delay: Duration) -> Duration {
    let factor: f64 = rand::rng().random_range(JITTER_MIN..=JITTER_MAX);
    Duration::from_millis((delay.as_millis() as f64 * factor) as u64)
}
