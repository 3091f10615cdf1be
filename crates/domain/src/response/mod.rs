//! Probe result types

mod spec;

pub use spec::{ProbeError, ProbeResult, ResponseBody, StatusCode};
