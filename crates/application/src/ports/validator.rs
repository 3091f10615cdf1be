//! Response validation port

use authprobe_domain::{ProbeResult, TestResults, TestSuite};

/// Port for checking a probe result against a step's assertions.
pub trait ResponseValidator: Send + Sync {
    /// Runs every assertion of `suite` against `result`.
    ///
    /// A result without a response fails every assertion.
    fn validate(&self, suite: &TestSuite, result: &ProbeResult) -> TestResults;
}
