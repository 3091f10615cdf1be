//! Application use cases
//!
//! Each use case orchestrates ports and domain types to perform one
//! operation of a probe run.

mod check_connectivity;
mod execute_probe;
mod load_configuration;
mod run_scenario;
mod settle_wait;

pub use check_connectivity::{CheckConnectivity, ConnectivityReport};
pub use execute_probe::ExecuteProbe;
pub use load_configuration::{ConfigError, ConfigSource, LoadConfiguration, LoadedConfiguration};
pub use run_scenario::RunScenario;
pub use settle_wait::{SettleOutcome, SettleWait};
