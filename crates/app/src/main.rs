//! Authprobe binary.

use std::process::ExitCode;

use authprobe::cli::Cli;
use authprobe::reporter::ConsoleReporter;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Report on stdout, diagnostics on stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.list {
        authprobe::print_catalog(&ConsoleReporter::stdout());
        return ExitCode::SUCCESS;
    }

    let loaded = match authprobe::load_configuration(&cli.config_source()).await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };

    // The run always completes; failures inside it are reported, not fatal
    let run = tokio::spawn(async move { authprobe::run(&cli, &loaded).await });
    match run.await {
        Ok(Ok(summary)) => {
            let counts = summary.counts();
            info!(
                run_id = %summary.run_id,
                succeeded = counts.succeeded,
                failed = counts.failed,
                skipped = counts.skipped,
                "run finished"
            );
        }
        Ok(Err(e)) => error!("run stopped early: {e:#}"),
        Err(e) => error!(error = %e, "run panicked"),
    }
    ExitCode::SUCCESS
}
