//! Human-readable console report.
//!
//! The report goes to stdout; diagnostics from `tracing` go to stderr.
//! Wording and layout are not a stable interface.

use std::fmt::Display;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use authprobe_application::{ScenarioObserver, SettleOutcome};
use authprobe_domain::scenario::Stage;
use authprobe_domain::{
    ProbeRequest, ProbeResult, RunSummary, Scenario, SessionToken, SettlePolicy, StepReport,
    StepState,
};
use uuid::Uuid;

/// Characters of a session token shown on screen.
pub const TOKEN_PREVIEW_CHARS: usize = 30;
/// Characters of a successful response body shown on screen.
pub const BODY_PREVIEW_CHARS: usize = 100;

/// Writes scenario progress as text.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<Stdout> {
    /// Creates a reporter writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Creates a reporter writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Writes one line. Write errors are ignored.
    pub fn line(&self, text: impl Display) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
        }
    }

    fn result_lines(&self, report: &StepReport, result: &ProbeResult) {
        self.line(format_args!(
            "   Status: {} ({})",
            result.status_display(),
            result.duration_display()
        ));

        let Some(body) = &result.body else {
            return;
        };
        if report.succeeded() {
            if let Some(token) = body.str_field("access_token") {
                self.line(format_args!(
                    "   Access token: {}",
                    SessionToken::new(token).preview(TOKEN_PREVIEW_CHARS)
                ));
            } else if report.details.is_empty() {
                self.line(format_args!("   Response: {}", body.preview(BODY_PREVIEW_CHARS)));
            }
        } else {
            self.line(format_args!("   Response: {}", body.pretty()));
        }
    }
}

impl<W: Write + Send> ScenarioObserver for ConsoleReporter<W> {
    fn scenario_started(&self, scenario: &Scenario, run_id: Uuid) {
        self.line(format_args!(
            "Scenario {} ({})\nRun {run_id}",
            scenario.name, scenario.description
        ));
    }

    fn stage_started(&self, _index: usize, stage: &Stage) {
        if let Stage::Concurrent(steps) = stage {
            self.line(format_args!("\nProbing {} endpoints concurrently", steps.len()));
        }
    }

    fn step_started(&self, step: &str, request: &ProbeRequest) {
        self.line(format_args!(
            "\n> {step}: {} {}",
            request.method,
            request.endpoint_label()
        ));
    }

    fn step_skipped(&self, report: &StepReport) {
        self.line(format_args!("\n- {} {}", report.name, report.state));
        for note in &report.notes {
            self.line(format_args!("   {note}"));
        }
    }

    fn step_finished(&self, report: &StepReport) {
        if let Some(result) = &report.result {
            self.result_lines(report, result);
        }
        let marker = if report.succeeded() { "ok" } else { "FAILED" };
        self.line(format_args!("   [{marker}] {}", report.name));
        for (field, value) in &report.details {
            self.line(format_args!("   {field}: {value}"));
        }
        for note in &report.notes {
            self.line(format_args!("   {note}"));
        }
    }

    fn settle_started(&self, policy: &SettlePolicy) {
        match policy {
            SettlePolicy::None => {}
            SettlePolicy::Fixed { delay } => {
                self.line(format_args!("\nWaiting {} ms before the next step", delay.as_millis()));
            }
            SettlePolicy::Poll { path, max_wait, .. } => self.line(format_args!(
                "\nPolling {path} for up to {} ms before the next step",
                max_wait.as_millis()
            )),
        }
    }

    fn settle_finished(&self, outcome: &SettleOutcome) {
        match outcome {
            SettleOutcome::Ready { attempts, waited } => self.line(format_args!(
                "   ready after {attempts} poll(s), {} ms",
                waited.as_millis()
            )),
            SettleOutcome::GaveUp { attempts, waited } => self.line(format_args!(
                "   not ready after {attempts} poll(s), {} ms; continuing",
                waited.as_millis()
            )),
            SettleOutcome::Misconfigured(reason) => {
                self.line(format_args!("   readiness probe unusable: {reason}"));
            }
            SettleOutcome::Skipped | SettleOutcome::Slept(_) => {}
        }
    }

    fn scenario_finished(&self, summary: &RunSummary) {
        let counts = summary.counts();
        self.line(format_args!(
            "\nSummary: {} succeeded, {} failed, {} skipped in {} ms",
            counts.succeeded,
            counts.failed,
            counts.skipped,
            summary.elapsed().num_milliseconds()
        ));
        for step in &summary.steps {
            let marker = match step.state {
                StepState::Succeeded => "ok",
                StepState::Failed => "FAILED",
                StepState::Skipped => "skipped",
                StepState::NotRun | StepState::Running => "incomplete",
            };
            self.line(format_args!("  {:<14} {marker}", step.name));
        }
    }
}
