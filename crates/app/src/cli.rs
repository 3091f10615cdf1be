//! Command-line interface.

use std::path::PathBuf;

use authprobe_application::ConfigSource;
use authprobe_domain::EnvFile;
use authprobe_domain::config::keys;
use clap::Parser;

use crate::catalog::ScenarioName;

/// Probe a local auth gateway: signup, login, session and health checks.
#[derive(Debug, Parser)]
#[command(name = "authprobe", version, about)]
pub struct Cli {
    /// Scenario to run
    #[arg(value_enum, default_value_t = ScenarioName::Full)]
    pub scenario: ScenarioName,

    /// List the built-in scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE", default_value = ".env")]
    pub env_file: PathBuf,

    /// Template copied into place when the configuration file is missing
    #[arg(long, value_name = "FILE", default_value = ".env.example")]
    pub env_template: PathBuf,

    /// Gateway base URL
    #[arg(long, value_name = "URL")]
    pub gateway: Option<String>,

    /// Direct auth service base URL
    #[arg(long, value_name = "URL")]
    pub auth_url: Option<String>,

    /// Local stack base URL
    #[arg(long, value_name = "URL")]
    pub local_stack: Option<String>,

    /// Mailbox UI base URL, shown in hints
    #[arg(long, value_name = "URL")]
    pub mailbox: Option<String>,

    /// API key sent in the `apikey` header
    #[arg(long, env = "AUTHPROBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Email used for signup and login
    #[arg(long)]
    pub email: Option<String>,

    /// Password used for signup and login
    #[arg(long)]
    pub password: Option<String>,

    /// Timeout for API calls, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Timeout for health probes, in milliseconds
    #[arg(long, value_name = "MS")]
    pub health_timeout_ms: Option<u64>,

    /// Fixed wait between signup and login, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Log filter when `RUST_LOG` is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the run summary as JSON instead of the console report
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Returns the flag values as configuration keys.
    #[must_use]
    pub fn overrides(&self) -> EnvFile {
        let mut env = EnvFile::new();
        let text = [
            (keys::GATEWAY_URL, &self.gateway),
            (keys::AUTH_URL, &self.auth_url),
            (keys::LOCAL_STACK_URL, &self.local_stack),
            (keys::MAILBOX_URL, &self.mailbox),
            (keys::ANON_KEY, &self.api_key),
            (keys::EMAIL, &self.email),
            (keys::PASSWORD, &self.password),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                env.insert(key, value.as_str());
            }
        }

        let millis = [
            (keys::TIMEOUT_MS, self.timeout_ms),
            (keys::HEALTH_TIMEOUT_MS, self.health_timeout_ms),
            (keys::SETTLE_MS, self.settle_ms),
        ];
        for (key, value) in millis {
            if let Some(value) = value {
                env.insert(key, value.to_string());
            }
        }
        env
    }

    /// Returns where configuration is read from.
    #[must_use]
    pub fn config_source(&self) -> ConfigSource {
        ConfigSource::new(&self.env_file, &self.env_template).with_overrides(self.overrides())
    }
}
