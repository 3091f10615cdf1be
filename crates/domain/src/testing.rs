//! Expectations checked against probe results.
//!
//! Each scenario step carries a [`TestSuite`]; the step succeeds only if a
//! response arrived and every assertion in its suite passed.

use serde::{Deserialize, Serialize};

/// A check to run against a probe result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Check response status code.
    StatusCode {
        /// Expected status code or range.
        expected: StatusExpectation,
    },
    /// Check that a top-level JSON field is present.
    JsonField {
        /// Field name.
        name: String,
    },
}

impl Assertion {
    /// Status must equal `code`.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::StatusCode {
            expected: StatusExpectation::Exact(code),
        }
    }

    /// Top-level JSON field `name` must be present.
    #[must_use]
    pub fn has_field(name: &str) -> Self {
        Self::JsonField {
            name: name.to_string(),
        }
    }

    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("Status code {}", expected.description()),
            Self::JsonField { name } => format!("JSON field '{name}' exists"),
        }
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub const fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// Result of running a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub const fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result with actual value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }
}

/// A named set of assertions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TestSuite {
    /// Suite name, usually the step name.
    pub name: String,
    /// Assertions to run.
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl TestSuite {
    /// Create a new empty test suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assertions: Vec::new(),
        }
    }

    /// Add an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }
}

/// Results from running a test suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResults {
    /// Test suite that was run.
    pub suite_name: String,
    /// Individual assertion results.
    pub results: Vec<AssertionResult>,
    /// Total number of assertions.
    pub total: usize,
    /// Number of passed assertions.
    pub passed: usize,
    /// Number of failed assertions.
    pub failed: usize,
}

impl TestResults {
    /// Create new test results.
    #[must_use]
    pub fn new(suite_name: impl Into<String>, results: Vec<AssertionResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();

        Self {
            suite_name: suite_name.into(),
            results,
            total,
            passed,
            failed: total - passed,
        }
    }

    /// Check if all tests passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Returns the first failure message, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&str> {
        self.results
            .iter()
            .find(|r| !r.passed)
            .and_then(|r| r.error.as_deref())
    }
}
