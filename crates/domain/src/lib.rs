//! Authprobe Domain - Core types
//!
//! This crate defines the domain model for the authprobe HTTP probe runner.
//! All types here are pure Rust with no I/O dependencies.

pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod scenario;
pub mod session;
pub mod settle;
pub mod state;
pub mod testing;

pub use config::{EnvFile, ProbeConfig, ServiceEndpoint, ServiceRole, Topology};
pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, ProbeRequest, RequestBody};
pub use response::{ProbeError, ProbeResult, ResponseBody};
pub use scenario::{RunSummary, Scenario, StepDefinition, StepReport};
pub use session::SessionToken;
pub use settle::{Backoff, SettlePolicy};
pub use state::{ProbeErrorKind, StepState};
pub use testing::{Assertion, AssertionResult, StatusExpectation, TestResults, TestSuite};
