//! Per-step reports and the run summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::ProbeResult;
use crate::state::StepState;
use crate::testing::TestResults;

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Final state
    pub state: StepState,
    /// Probe outcome, absent for skipped steps
    pub result: Option<ProbeResult>,
    /// Assertion outcomes, absent when no response arrived
    pub checks: Option<TestResults>,
    /// Skip reasons, failure reasons and hints
    #[serde(default)]
    pub notes: Vec<String>,
    /// Fields echoed from the response body on success
    #[serde(default)]
    pub details: Vec<(String, String)>,
}

impl StepReport {
    /// Creates a report for a step that was not dispatched.
    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: StepState::Skipped,
            result: None,
            checks: None,
            notes: vec![reason.into()],
            details: Vec::new(),
        }
    }

    /// Returns true if the step succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == StepState::Succeeded
    }
}

/// Number of steps per final state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    /// Steps that succeeded
    pub succeeded: usize,
    /// Steps that failed
    pub failed: usize,
    /// Steps that were skipped
    pub skipped: usize,
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier for correlating log lines
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    /// When the first stage started
    pub started_at: DateTime<Utc>,
    /// When the last stage ended
    pub finished_at: DateTime<Utc>,
    /// Reports in execution order
    pub steps: Vec<StepReport>,
}

impl RunSummary {
    /// Returns the report for a step.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Counts steps per final state.
    #[must_use]
    pub fn counts(&self) -> StateCounts {
        self.steps
            .iter()
            .fold(StateCounts::default(), |mut counts, step| {
                match step.state {
                    StepState::Succeeded => counts.succeeded += 1,
                    StepState::Failed => counts.failed += 1,
                    StepState::Skipped => counts.skipped += 1,
                    StepState::NotRun | StepState::Running => {}
                }
                counts
            })
    }

    /// Returns true if every step succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(StepReport::succeeded)
    }

    /// Returns the wall-clock duration of the run.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
