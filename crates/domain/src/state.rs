//! Step execution state machine and probe error categories.
//!
//! A step moves `NotRun -> Running -> Succeeded | Failed`, or straight from
//! `NotRun` to `Skipped` when a prerequisite did not succeed. The three
//! outcomes are terminal; there are no retries and no re-entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Lifecycle state of one scenario step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Not dispatched yet.
    #[default]
    NotRun,
    /// Request in flight.
    Running,
    /// Response received and every expectation held.
    Succeeded,
    /// Request failed or an expectation did not hold.
    Failed,
    /// Not dispatched because a prerequisite did not succeed.
    Skipped,
}

impl StepState {
    /// Returns true for `Succeeded`, `Failed` and `Skipped`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }

    /// Returns true if moving to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotRun, Self::Running | Self::Skipped)
                | (Self::Running, Self::Succeeded | Self::Failed)
        )
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the state machine forbids it.
    pub const fn transition(self, next: Self) -> DomainResult<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns a short label for console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotRun => "not run",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categories of probe failures for user-friendly display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    /// Invalid URL format.
    InvalidUrl,

    /// DNS resolution failed.
    DnsError,

    /// Could not establish connection.
    ConnectionFailed,

    /// Connection was refused by the server.
    ConnectionRefused,

    /// No response within the bound.
    Timeout,

    /// Request body could not be built.
    InvalidBody,

    /// Unknown or unexpected error.
    Unknown,
}

impl ProbeErrorKind {
    /// Returns a short title for this error type.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "Invalid URL",
            Self::DnsError => "DNS Resolution Failed",
            Self::ConnectionFailed => "Connection Failed",
            Self::ConnectionRefused => "Connection Refused",
            Self::Timeout => "Timeout",
            Self::InvalidBody => "Invalid Request Body",
            Self::Unknown => "Unexpected Error",
        }
    }

    /// Returns hints for diagnosing this error by hand.
    #[must_use]
    pub const fn suggestions(&self) -> &[&'static str] {
        match self {
            Self::InvalidUrl => &["Check the configured base URLs and ports"],
            Self::DnsError => &["Check if the hostname is correct"],
            Self::ConnectionFailed | Self::ConnectionRefused => &[
                "Check if the service is running",
                "Verify the port number is correct",
            ],
            Self::Timeout => &[
                "The service may still be starting",
                "Try increasing the timeout value",
            ],
            Self::InvalidBody => &["Check the request payload"],
            Self::Unknown => &["Re-run with RUST_LOG=debug for details"],
        }
    }
}
