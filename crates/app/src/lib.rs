//! Authprobe - probe runner for a local auth gateway
//!
//! Wires the application use cases to the infrastructure adapters and
//! renders the outcome for the terminal.

pub mod catalog;
pub mod cli;
pub mod reporter;

use std::sync::Arc;

use anyhow::Context;
use authprobe_application::{
    ConfigError, ConfigSource, LoadConfiguration, LoadedConfiguration, NoopObserver, RunScenario,
    ScenarioObserver,
};
use authprobe_domain::{ProbeConfig, RunSummary, Scenario};
use authprobe_infrastructure::{ReqwestHttpClient, SystemClock, TestRunner, TokioFileSystem};

use crate::cli::Cli;
use crate::reporter::ConsoleReporter;

/// Loads the configuration from disk, copying the template if needed.
///
/// # Errors
///
/// Returns an error if neither the file nor the template can be read.
pub async fn load_configuration(source: &ConfigSource) -> Result<LoadedConfiguration, ConfigError> {
    LoadConfiguration::new(Arc::new(TokioFileSystem::new()))
        .execute(source)
        .await
}

/// Runs `scenario` against the live services, reporting to `observer`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the scenario is
/// malformed. Failing probes are recorded in the summary instead.
pub async fn run_scenario<O: ScenarioObserver>(
    scenario: &Scenario,
    config: &ProbeConfig,
    observer: &O,
) -> anyhow::Result<RunSummary> {
    let client = ReqwestHttpClient::new().context("failed to build HTTP client")?;
    let runner = RunScenario::new(
        Arc::new(client),
        Arc::new(TestRunner::new()),
        Arc::new(SystemClock::new()),
    );
    runner
        .execute(scenario, config, observer)
        .await
        .with_context(|| format!("scenario '{}' could not run", scenario.name))
}

/// Runs the scenario selected on the command line and prints the outcome.
///
/// # Errors
///
/// See [`run_scenario`]; also fails if the JSON summary cannot be encoded.
pub async fn run(cli: &Cli, loaded: &LoadedConfiguration) -> anyhow::Result<RunSummary> {
    let scenario = cli.scenario.build(&loaded.config);

    if cli.json {
        let summary = run_scenario(&scenario, &loaded.config, &NoopObserver).await?;
        let rendered =
            serde_json::to_string_pretty(&summary).context("failed to encode run summary")?;
        ConsoleReporter::stdout().line(rendered);
        return Ok(summary);
    }

    let reporter = ConsoleReporter::stdout();
    print_environment(&reporter, cli, loaded);
    run_scenario(&scenario, &loaded.config, &reporter).await
}

/// Prints the configuration check shown before a run.
pub fn print_environment<W: std::io::Write + Send>(
    reporter: &ConsoleReporter<W>,
    cli: &Cli,
    loaded: &LoadedConfiguration,
) {
    if loaded.created_from_template {
        reporter.line(format_args!(
            "Created {} from {}; review the copied values before relying on them.",
            cli.env_file.display(),
            cli.env_template.display()
        ));
    }
    let config = &loaded.config;
    reporter.line("Environment check:");
    reporter.line(format_args!("  ANON_KEY: {}", config.api_key_preview()));
    reporter.line(format_args!("  Gateway: {}", config.topology.gateway.base_url()));
    reporter.line(format_args!("  Auth service: {}", config.topology.auth_service.base_url()));
    reporter.line(format_args!("  Test account: {}", config.credentials.email));
    for warning in &loaded.warnings {
        reporter.line(format_args!(
            "  ignored {}={} ({}), using default",
            warning.key, warning.value, warning.reason
        ));
    }
}

/// Prints the built-in scenarios.
pub fn print_catalog<W: std::io::Write + Send>(reporter: &ConsoleReporter<W>) {
    let config = ProbeConfig::default();
    for name in catalog::ScenarioName::ALL {
        let scenario = name.build(&config);
        let steps: Vec<&str> = scenario.steps().map(|s| s.name.as_str()).collect();
        reporter.line(format_args!(
            "{:<14} {} [{}]",
            name.as_str(),
            scenario.description,
            steps.join(", ")
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use authprobe_domain::EnvFile;
    use clap::Parser;

    #[test]
    fn environment_check_previews_key() {
        let cli = Cli::try_parse_from(["authprobe"]).unwrap();
        let mut env = EnvFile::new();
        env.insert("ANON_KEY", "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.payload");
        let (config, warnings) = ProbeConfig::from_env(&env);
        let loaded = LoadedConfiguration {
            env,
            config,
            warnings,
            created_from_template: true,
        };

        let reporter = ConsoleReporter::new(Vec::new());
        print_environment(&reporter, &cli, &loaded);
        let out = String::from_utf8(reporter.into_inner()).unwrap();

        assert!(out.contains("Created .env from .env.example"));
        assert!(out.contains("ANON_KEY: eyJhbGciOiJIUzI1NiIs..."));
        assert!(out.contains("Gateway: http://localhost:8000"));
    }

    #[test]
    fn missing_key_is_reported() {
        let cli = Cli::try_parse_from(["authprobe"]).unwrap();
        let loaded = LoadedConfiguration {
            env: EnvFile::new(),
            config: ProbeConfig::default(),
            warnings: Vec::new(),
            created_from_template: false,
        };

        let reporter = ConsoleReporter::new(Vec::new());
        print_environment(&reporter, &cli, &loaded);
        let out = String::from_utf8(reporter.into_inner()).unwrap();

        assert!(out.contains("ANON_KEY: NOT FOUND"));
        assert!(!out.contains("Created"));
    }

    #[test]
    fn catalog_lists_every_scenario() {
        let reporter = ConsoleReporter::new(Vec::new());
        print_catalog(&reporter);
        let out = String::from_utf8(reporter.into_inner()).unwrap();

        for name in catalog::ScenarioName::ALL {
            assert!(out.contains(name.as_str()));
        }
        assert!(out.contains("signup, login, user-info, profiles"));
    }
}
