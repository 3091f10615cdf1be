//! Bounded waits between dependent steps.
//!
//! Some backends become consistent a moment after a write (a freshly
//! signed-up user may not be able to log in immediately). A settle wait
//! pauses before the dependent step, either for a fixed delay or by polling
//! a readiness endpoint with exponential backoff. Every policy states its
//! maximum wait up front.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ServiceRole;

/// Default fixed pause between dependent steps.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// How to wait before a dependent step runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettlePolicy {
    /// Do not wait.
    #[default]
    None,
    /// Sleep for a fixed delay.
    Fixed {
        /// Delay before the next step
        #[serde(with = "duration_millis")]
        delay: Duration,
    },
    /// Poll a readiness endpoint until it answers 2xx or `max_wait` elapses.
    Poll {
        /// Service to poll
        target: ServiceRole,
        /// Path of the readiness endpoint
        path: String,
        /// Backoff schedule between polls
        backoff: Backoff,
        /// Upper bound on the total wait
        #[serde(with = "duration_millis")]
        max_wait: Duration,
    },
}

impl SettlePolicy {
    /// Creates the default fixed policy.
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    /// Returns the longest this policy can wait.
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay } => *delay,
            Self::Poll { max_wait, .. } => *max_wait,
        }
    }
}

/// Exponential backoff schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backoff {
    /// Delay before the second poll
    #[serde(with = "duration_millis")]
    pub initial_delay: Duration,
    /// Cap for any single delay
    #[serde(with = "duration_millis")]
    pub max_delay: Duration,
    /// Growth factor between delays
    pub multiplier: f64,
}

impl Backoff {
    /// Returns the delay that follows `current`, capped at `max_delay`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier.max(1.0)) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
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
