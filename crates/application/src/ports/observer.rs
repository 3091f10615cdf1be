//! Scenario progress port

use authprobe_domain::scenario::Stage;
use authprobe_domain::{ProbeRequest, RunSummary, Scenario, SettlePolicy, StepReport};
use uuid::Uuid;

use crate::use_cases::SettleOutcome;

/// Receives progress callbacks while a scenario runs.
///
/// Every method has an empty default so observers only implement what
/// they display.
pub trait ScenarioObserver: Send + Sync {
    /// Called once before the first stage.
    fn scenario_started(&self, _scenario: &Scenario, _run_id: Uuid) {}

    /// Called before the steps of a stage are dispatched.
    fn stage_started(&self, _index: usize, _stage: &Stage) {}

    /// Called when a step is dispatched.
    fn step_started(&self, _step: &str, _request: &ProbeRequest) {}

    /// Called when a step is skipped.
    fn step_skipped(&self, _report: &StepReport) {}

    /// Called when a dispatched step reaches a terminal state.
    fn step_finished(&self, _report: &StepReport) {}

    /// Called before a settle wait.
    fn settle_started(&self, _policy: &SettlePolicy) {}

    /// Called after a settle wait.
    fn settle_finished(&self, _outcome: &SettleOutcome) {}

    /// Called once with the final summary.
    fn scenario_finished(&self, _summary: &RunSummary) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScenarioObserver for NoopObserver {}
