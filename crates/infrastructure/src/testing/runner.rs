//! Test runner implementation.
//!
//! Executes assertions against probe results and produces test results.

use authprobe_application::ports::ResponseValidator;
use authprobe_domain::response::{ProbeResult, ResponseBody};
use authprobe_domain::testing::{
    Assertion, AssertionResult, StatusExpectation, TestResults, TestSuite,
};

/// Characters of body shown when a body assertion fails.
const BODY_PREVIEW_CHARS: usize = 100;

/// Test runner that executes assertions against probe results.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestRunner;

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run a test suite against a probe result.
    #[must_use]
    pub fn run(&self, suite: &TestSuite, result: &ProbeResult) -> TestResults {
        let results = suite
            .assertions
            .iter()
            .map(|assertion| self.run_assertion(assertion, result))
            .collect();

        TestResults::new(suite.name.clone(), results)
    }

    /// Run a single assertion against a probe result.
    #[must_use]
    pub fn run_assertion(&self, assertion: &Assertion, result: &ProbeResult) -> AssertionResult {
        let (Some(status), Some(body)) = (result.status, result.body.as_ref()) else {
            let reason = result
                .error
                .as_ref()
                .map_or_else(|| "No response".to_string(), |e| format!("No response: {e}"));
            return AssertionResult::fail(assertion.clone(), reason);
        };

        match assertion {
            Assertion::StatusCode { expected } => check_status_code(assertion, status, expected),
            Assertion::JsonField { name } => check_json_field(assertion, body, name),
        }
    }
}

impl ResponseValidator for TestRunner {
    fn validate(&self, suite: &TestSuite, result: &ProbeResult) -> TestResults {
        self.run(suite, result)
    }
}

fn check_status_code(
    assertion: &Assertion,
    actual: u16,
    expected: &StatusExpectation,
) -> AssertionResult {
    if expected.matches(actual) {
        AssertionResult::pass_with_value(assertion.clone(), actual.to_string())
    } else {
        AssertionResult::fail_with_value(
            assertion.clone(),
            actual.to_string(),
            format!("Expected status {}, got {actual}", expected.description()),
        )
    }
}

fn check_json_field(assertion: &Assertion, body: &ResponseBody, name: &str) -> AssertionResult {
    if !body.is_json() {
        return AssertionResult::fail_with_value(
            assertion.clone(),
            body.preview(BODY_PREVIEW_CHARS),
            "Body is not JSON",
        );
    }

    match body.field(name) {
        Some(value) => AssertionResult::pass_with_value(assertion.clone(), value.to_string()),
        None => AssertionResult::fail(assertion.clone(), format!("JSON field '{name}' not found")),
    }
}
