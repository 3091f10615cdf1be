//! Run configuration resolved from an [`EnvFile`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::env_file::EnvFile;
use super::topology::{ServiceEndpoint, ServiceRole, Topology};
use crate::settle::{Backoff, DEFAULT_SETTLE_DELAY, SettlePolicy};

/// Env keys understood by the probe runner.
pub mod keys {
    /// Anonymous API key sent in the `apikey` header.
    pub const ANON_KEY: &str = "ANON_KEY";
    /// Gateway base URL.
    pub const GATEWAY_URL: &str = "PROBE_GATEWAY_URL";
    /// Direct auth service base URL.
    pub const AUTH_URL: &str = "PROBE_AUTH_URL";
    /// Local development stack base URL.
    pub const LOCAL_STACK_URL: &str = "PROBE_LOCAL_STACK_URL";
    /// Mailbox UI base URL.
    pub const MAILBOX_URL: &str = "PROBE_MAILBOX_URL";
    /// Test account email.
    pub const EMAIL: &str = "PROBE_EMAIL";
    /// Test account password.
    pub const PASSWORD: &str = "PROBE_PASSWORD";
    /// Timeout for API probes, in milliseconds.
    pub const TIMEOUT_MS: &str = "PROBE_TIMEOUT_MS";
    /// Timeout for health probes, in milliseconds.
    pub const HEALTH_TIMEOUT_MS: &str = "PROBE_HEALTH_TIMEOUT_MS";
    /// Fixed settle delay in milliseconds (`0` disables it).
    pub const SETTLE_MS: &str = "PROBE_SETTLE_MS";
    /// Gateway path to poll instead of a fixed settle delay.
    pub const SETTLE_POLL_PATH: &str = "PROBE_SETTLE_POLL_PATH";
    /// Upper bound for the polling settle wait, in milliseconds.
    pub const SETTLE_MAX_MS: &str = "PROBE_SETTLE_MAX_MS";
}

/// Default test account email.
pub const DEFAULT_EMAIL: &str = "test@example.com";
/// Default test account password.
pub const DEFAULT_PASSWORD: &str = "testpassword123";
/// Default bound for API probes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default bound for health probes.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_millis(3000);
/// Default bound for a polling settle wait.
pub const DEFAULT_SETTLE_MAX_WAIT: Duration = Duration::from_secs(10);

const API_KEY_PREVIEW_CHARS: usize = 20;

/// Test account used by signup and login probes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Per-request wait bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Bound for API probes
    pub request: Duration,
    /// Bound for health probes
    pub health: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_TIMEOUT,
            health: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

/// A configuration value that could not be used and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Offending key
    pub key: String,
    /// Raw value found in the source
    pub value: String,
    /// Why it was rejected
    pub reason: String,
}

/// Everything a run needs, constructed once and passed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProbeConfig {
    /// Anonymous API key, if configured
    pub api_key: Option<String>,
    /// Service addresses
    pub topology: Topology,
    /// Test account
    pub credentials: Credentials,
    /// Request bounds
    pub timeouts: Timeouts,
    /// Wait inserted before dependent steps that ask for one
    pub settle: SettlePolicy,
}

impl ProbeConfig {
    /// Resolves a configuration from env values.
    ///
    /// Missing keys fall back to defaults silently; present but unusable
    /// values fall back to defaults and are reported as warnings.
    #[must_use]
    pub fn from_env(env: &EnvFile) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let defaults = Topology::default();

        let topology = Topology {
            gateway: endpoint(env, keys::GATEWAY_URL, defaults.gateway, &mut warnings),
            auth_service: endpoint(env, keys::AUTH_URL, defaults.auth_service, &mut warnings),
            local_stack: endpoint(env, keys::LOCAL_STACK_URL, defaults.local_stack, &mut warnings),
            mailbox: endpoint(env, keys::MAILBOX_URL, defaults.mailbox, &mut warnings),
        };

        let credentials = Credentials {
            email: env.get(keys::EMAIL).unwrap_or(DEFAULT_EMAIL).to_string(),
            password: env.get(keys::PASSWORD).unwrap_or(DEFAULT_PASSWORD).to_string(),
        };

        let timeouts = Timeouts {
            request: millis(env, keys::TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT, &mut warnings),
            health: millis(env, keys::HEALTH_TIMEOUT_MS, DEFAULT_HEALTH_TIMEOUT, &mut warnings),
        };

        let settle = match env.get(keys::SETTLE_POLL_PATH) {
            Some(path) => SettlePolicy::Poll {
                target: ServiceRole::Gateway,
                path: path.to_string(),
                backoff: Backoff::default(),
                max_wait: millis(env, keys::SETTLE_MAX_MS, DEFAULT_SETTLE_MAX_WAIT, &mut warnings),
            },
            None => match millis(env, keys::SETTLE_MS, DEFAULT_SETTLE_DELAY, &mut warnings) {
                delay if delay.is_zero() => SettlePolicy::None,
                delay => SettlePolicy::fixed(delay),
            },
        };

        let config = Self {
            api_key: env.get(keys::ANON_KEY).map(str::to_string),
            topology,
            credentials,
            timeouts,
            settle,
        };
        (config, warnings)
    }

    /// Returns the API key shortened for display, or `NOT FOUND`.
    #[must_use]
    pub fn api_key_preview(&self) -> String {
        self.api_key.as_deref().map_or_else(
            || "NOT FOUND".to_string(),
            |key| {
                let prefix: String = key.chars().take(API_KEY_PREVIEW_CHARS).collect();
                format!("{prefix}...")
            },
        )
    }
}

fn endpoint(
    env: &EnvFile,
    key: &str,
    default: ServiceEndpoint,
    warnings: &mut Vec<ConfigWarning>,
) -> ServiceEndpoint {
    let Some(raw) = env.get(key) else {
        return default;
    };
    ServiceEndpoint::parse(raw).unwrap_or_else(|e| {
        warnings.push(ConfigWarning {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        });
        default
    })
}

fn millis(
    env: &EnvFile,
    key: &str,
    default: Duration,
    warnings: &mut Vec<ConfigWarning>,
) -> Duration {
    let Some(raw) = env.get(key) else {
        return default;
    };
    raw.parse::<u64>().map(Duration::from_millis).unwrap_or_else(|e| {
        warnings.push(ConfigWarning {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        });
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_when_keys_absent() {
        let (config, warnings) = ProbeConfig::from_env(&EnvFile::new());

        assert!(warnings.is_empty());
        assert_eq!(config.api_key, None);
        assert_eq!(config.topology, Topology::default());
        assert_eq!(config.credentials.email, "test@example.com");
        assert_eq!(config.timeouts.request, Duration::from_secs(5));
        assert_eq!(config.timeouts.health, Duration::from_secs(3));
        assert_eq!(config.settle, SettlePolicy::fixed(Duration::from_secs(1)));
    }

    #[test]
    fn reads_overrides() {
        let env = EnvFile::parse(
            "ANON_KEY=abc123\nPROBE_GATEWAY_URL=http://10.0.0.5:8080\nPROBE_TIMEOUT_MS=750\nPROBE_SETTLE_MS=0\n",
        );
        let (config, warnings) = ProbeConfig::from_env(&env);

        assert!(warnings.is_empty());
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.topology.gateway, ServiceEndpoint::http("10.0.0.5", 8080));
        assert_eq!(config.timeouts.request, Duration::from_millis(750));
        assert_eq!(config.settle, SettlePolicy::None);
    }

    #[test]
    fn poll_path_selects_polling_settle() {
        let env = EnvFile::parse("PROBE_SETTLE_POLL_PATH=/auth/v1/health\nPROBE_SETTLE_MAX_MS=4000");
        let (config, _) = ProbeConfig::from_env(&env);

        assert_eq!(config.settle.max_wait(), Duration::from_secs(4));
        assert!(matches!(config.settle, SettlePolicy::Poll { ref path, .. } if path == "/auth/v1/health"));
    }

    #[test]
    fn bad_values_fall_back_with_warning() {
        let env = EnvFile::parse("PROBE_AUTH_URL=localhost\nPROBE_HEALTH_TIMEOUT_MS=soon");
        let (config, warnings) = ProbeConfig::from_env(&env);

        assert_eq!(config.topology.auth_service.port, 9999);
        assert_eq!(config.timeouts.health, DEFAULT_HEALTH_TIMEOUT);
        let flagged: Vec<_> = warnings.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(flagged, vec![keys::AUTH_URL, keys::HEALTH_TIMEOUT_MS]);
    }

    #[test]
    fn api_key_preview() {
        let mut config = ProbeConfig::default();
        assert_eq!(config.api_key_preview(), "NOT FOUND");

        config.api_key = Some("eyJhbGciOiJIUzI1NiIsInR5cCI6".to_string());
        assert_eq!(config.api_key_preview(), "eyJhbGciOiJIUzI1NiIs...");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::default());
        assert!(!rendered.contains("testpassword123"));
    }
}
