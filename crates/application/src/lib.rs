//! Authprobe Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for HTTP, files, time, validation and progress)
//! - Use case orchestration (configuration, probes, connectivity, scenarios)
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    Clock, FileSystem, FileSystemError, HttpClient, HttpClientError, NoopObserver, RawResponse,
    ResponseValidator, ScenarioObserver,
};
pub use use_cases::{
    CheckConnectivity, ConfigError, ConfigSource, ConnectivityReport, ExecuteProbe,
    LoadConfiguration, LoadedConfiguration, RunScenario, SettleOutcome, SettleWait,
};
