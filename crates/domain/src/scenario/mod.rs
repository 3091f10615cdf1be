//! Scenario definitions and run reports.
//!
//! A scenario is an ordered list of stages. Each stage holds one step, or
//! several independent steps that run concurrently. Steps may require an
//! earlier step to have succeeded, and may need the session token captured
//! by an earlier login step.

mod step;
mod summary;

pub use step::{
    FailureHint, Prerequisite, RequestTemplate, Scenario, Stage, StepAuth, StepDefinition,
    TimeoutClass,
};
pub use summary::{RunSummary, StateCounts, StepReport};
