//! Domain error types

use thiserror::Error;

use crate::state::StepState;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The query string could not be encoded.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A step attempted a state change the state machine forbids.
    #[error("invalid step transition: {from} -> {to}")]
    InvalidTransition {
        /// State the step was in.
        from: StepState,
        /// State that was requested.
        to: StepState,
    },

    /// A scenario definition is inconsistent.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
