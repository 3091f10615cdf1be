//! Run Scenario Use Case
//!
//! Executes the stages of a scenario in order. Each step moves through
//! the [`StepState`] machine exactly once; a step whose prerequisite did
//! not succeed, or that needs a session token nobody captured, is skipped
//! with a notice instead of being sent. Failures never abort steps that do
//! not depend on them, and the run always ends with a [`RunSummary`].

use std::collections::HashMap;
use std::sync::Arc;

use authprobe_domain::scenario::{Prerequisite, Stage};
use authprobe_domain::{
    DomainError, ProbeConfig, ProbeError, ProbeErrorKind, ProbeRequest, ProbeResult, RunSummary,
    Scenario, SessionToken, StepDefinition, StepReport, StepState, TestResults,
};
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::ApplicationResult;
use crate::ports::{Clock, HttpClient, ResponseValidator, ScenarioObserver};
use crate::use_cases::{CheckConnectivity, ExecuteProbe, SettleWait};

/// Shown for report fields absent from the response.
const MISSING_FIELD: &str = "(none)";

/// Mutable state of one run.
#[derive(Default)]
struct RunState {
    states: HashMap<String, StepState>,
    token: Option<SessionToken>,
    reports: Vec<StepReport>,
}

impl RunState {
    fn succeeded(&self, step: &str) -> bool {
        self.states.get(step) == Some(&StepState::Succeeded)
    }

    /// Returns why `step` cannot be dispatched, if it cannot.
    fn skip_reason(&self, step: &StepDefinition) -> Option<String> {
        match &step.prerequisite {
            Some(Prerequisite::Step(name)) if !self.succeeded(name) => {
                return Some(format!("skipped: '{name}' did not succeed"));
            }
            Some(Prerequisite::AnyOf(names)) if !names.iter().any(|n| self.succeeded(n)) => {
                return Some(format!("skipped: none of {} succeeded", names.join(", ")));
            }
            _ => {}
        }
        if step.needs_session() && self.token.is_none() {
            return Some("skipped: no session token available".to_string());
        }
        None
    }

    fn state_of(&self, step: &str) -> StepState {
        self.states.get(step).copied().unwrap_or_default()
    }

    /// Moves `step` to `next`, rejecting transitions the state machine forbids.
    fn advance(&mut self, step: &str, next: StepState) -> ApplicationResult<StepState> {
        let state = self.state_of(step).transition(next)?;
        self.states.insert(step.to_string(), state);
        Ok(state)
    }
}

/// A step that passed its prerequisites, with its request if it could be built.
struct Dispatch<'a> {
    /// Position within the stage
    index: usize,
    step: &'a StepDefinition,
    request: Result<ProbeRequest, DomainError>,
}

/// Use case for running a scenario end to end.
pub struct RunScenario<C: HttpClient + 'static, V: ResponseValidator, K: Clock> {
    probe: ExecuteProbe<C>,
    validator: Arc<V>,
    clock: Arc<K>,
}

impl<C, V, K> RunScenario<C, V, K>
where
    C: HttpClient + 'static,
    V: ResponseValidator,
    K: Clock,
{
    /// Creates the use case from its ports.
    pub const fn new(client: Arc<C>, validator: Arc<V>, clock: Arc<K>) -> Self {
        Self {
            probe: ExecuteProbe::new(client),
            validator,
            clock,
        }
    }

    /// Runs every stage of `scenario` and returns the summary.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` if the scenario is malformed.
    /// Probe failures never surface here; they are recorded on the step.
    pub async fn execute<O: ScenarioObserver>(
        &self,
        scenario: &Scenario,
        config: &ProbeConfig,
        observer: &O,
    ) -> ApplicationResult<RunSummary> {
        scenario.validate()?;

        let run_id = Uuid::now_v7();
        let span = info_span!("scenario", name = %scenario.name, %run_id);
        self.run(scenario, config, observer, run_id)
            .instrument(span)
            .await
    }

    async fn run<O: ScenarioObserver>(
        &self,
        scenario: &Scenario,
        config: &ProbeConfig,
        observer: &O,
        run_id: Uuid,
    ) -> ApplicationResult<RunSummary> {
        info!(stages = scenario.stages.len(), "scenario started");
        observer.scenario_started(scenario, run_id);
        let started_at = self.clock.now();
        let mut run = RunState::default();

        for (index, stage) in scenario.stages.iter().enumerate() {
            observer.stage_started(index, stage);
            self.run_stage(stage, config, observer, &mut run).await?;
        }

        let summary = RunSummary {
            run_id,
            scenario: scenario.name.clone(),
            started_at,
            finished_at: self.clock.now(),
            steps: run.reports,
        };
        let counts = summary.counts();
        info!(
            succeeded = counts.succeeded,
            failed = counts.failed,
            skipped = counts.skipped,
            "scenario finished"
        );
        observer.scenario_finished(&summary);
        Ok(summary)
    }

    async fn run_stage<O: ScenarioObserver>(
        &self,
        stage: &Stage,
        config: &ProbeConfig,
        observer: &O,
        run: &mut RunState,
    ) -> ApplicationResult<()> {
        let steps = stage.steps();
        let mut reports: Vec<Option<StepReport>> = vec![None; steps.len()];
        let mut dispatched = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            if let Some(reason) = run.skip_reason(step) {
                run.advance(&step.name, StepState::Skipped)?;
                let report = StepReport::skipped(step.name.clone(), reason);
                info!(step = %step.name, "step skipped");
                observer.step_skipped(&report);
                reports[index] = Some(report);
            } else {
                dispatched.push(Dispatch {
                    index,
                    step,
                    request: step.request.build(config, run.token.as_ref()),
                });
            }
        }
        if dispatched.is_empty() {
            run.reports.extend(reports.into_iter().flatten());
            return Ok(());
        }

        if dispatched.iter().any(|d| d.step.settle_before) {
            observer.settle_started(&config.settle);
            let outcome = SettleWait::new(self.probe.clone())
                .execute(&config.settle, config)
                .await;
            observer.settle_finished(&outcome);
        }

        let mut sendable = Vec::new();
        for dispatch in &dispatched {
            run.advance(&dispatch.step.name, StepState::Running)?;
            match &dispatch.request {
                Ok(request) => {
                    observer.step_started(&dispatch.step.name, request);
                    sendable.push(request.clone());
                }
                Err(e) => warn!(step = %dispatch.step.name, error = %e, "cannot build request"),
            }
        }

        let mut results = if sendable.len() > 1 {
            CheckConnectivity::new(self.probe.clone())
                .probe_all(sendable)
                .await
                .into_iter()
        } else {
            let mut single = Vec::with_capacity(sendable.len());
            for request in &sendable {
                single.push(self.probe.execute(request).await);
            }
            single.into_iter()
        };

        for dispatch in dispatched {
            let result = match dispatch.request {
                Ok(_) => results.next(),
                Err(e) => Some(build_failure(dispatch.step, &e)),
            };
            let Some(result) = result else {
                continue;
            };
            let report = self.finish_step(dispatch.step, result, run)?;
            observer.step_finished(&report);
            reports[dispatch.index] = Some(report);
        }
        run.reports.extend(reports.into_iter().flatten());
        Ok(())
    }

    /// Interprets a probe result and moves the step to its terminal state.
    fn finish_step(
        &self,
        step: &StepDefinition,
        result: ProbeResult,
        run: &mut RunState,
    ) -> ApplicationResult<StepReport> {
        let checks = result
            .status
            .is_some()
            .then(|| self.validator.validate(&step.expect, &result));
        let mut notes = Vec::new();
        let mut succeeded =
            result.error.is_none() && checks.as_ref().is_some_and(TestResults::all_passed);

        if let Some(error) = &result.error {
            notes.push(error.to_string());
        } else if let Some(failure) = checks.as_ref().and_then(TestResults::first_failure) {
            notes.push(failure.to_string());
        }

        if succeeded && let Some(field) = &step.capture_token {
            match result.body.as_ref().and_then(|b| b.str_field(field)) {
                Some(token) if !token.is_empty() => run.token = Some(SessionToken::new(token)),
                _ => {
                    succeeded = false;
                    notes.push(format!("response has no '{field}' field"));
                }
            }
        }

        if !succeeded {
            for hint in step.hints.iter().filter(|h| h.matches(&result)) {
                notes.extend(hint.advice.iter().cloned());
            }
        }

        let details = if succeeded {
            report_details(step, &result)
        } else {
            Vec::new()
        };

        let next = if succeeded {
            StepState::Succeeded
        } else {
            StepState::Failed
        };
        let state = run.advance(&step.name, next)?;
        info!(
            step = %step.name,
            state = %state,
            status = %result.status_display(),
            duration = %result.duration_display(),
            "step finished"
        );

        Ok(StepReport {
            name: step.name.clone(),
            state,
            result: Some(result),
            checks,
            notes,
            details,
        })
    }
}

fn build_failure(step: &StepDefinition, error: &DomainError) -> ProbeResult {
    let kind = match error {
        DomainError::InvalidUrl(_) | DomainError::InvalidQuery(_) => ProbeErrorKind::InvalidUrl,
        _ => ProbeErrorKind::InvalidBody,
    };
    ProbeResult::from_error(
        step.request.path.clone(),
        ProbeError::new(kind, error.to_string()),
        std::time::Duration::ZERO,
    )
}

fn report_details(step: &StepDefinition, result: &ProbeResult) -> Vec<(String, String)> {
    step.report_fields
        .iter()
        .map(|field| {
            let value = match result.body.as_ref().and_then(|b| b.field(field)) {
                Some(Value::String(s)) => s.clone(),
                None | Some(Value::Null) => MISSING_FIELD.to_string(),
                Some(other) => other.to_string(),
            };
            (field.clone(), value)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    use authprobe_domain::config::ServiceRole;
    use authprobe_domain::scenario::{FailureHint, RequestTemplate};
    use authprobe_domain::{
        Assertion, AssertionResult, RequestBody, SettlePolicy, TestSuite,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::ApplicationError;
    use crate::ports::{HttpClientError, NoopObserver, RawResponse};
    use crate::use_cases::SettleOutcome;

    #[derive(Clone)]
    struct Route {
        status: u16,
        body: String,
        delay: Duration,
        needs_bearer: bool,
    }

    /// Answers by `(port, path)`; unknown routes are refused.
    #[derive(Default)]
    struct FakeBackend {
        routes: HashMap<(u16, String), Route>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn route(mut self, port: u16, path: &str, status: u16, body: Value) -> Self {
            self.routes.insert(
                (port, path.to_string()),
                Route {
                    status,
                    body: body.to_string(),
                    delay: Duration::ZERO,
                    needs_bearer: false,
                },
            );
            self
        }

        fn bearer_route(mut self, port: u16, path: &str, body: Value) -> Self {
            self.routes.insert(
                (port, path.to_string()),
                Route {
                    status: 200,
                    body: body.to_string(),
                    delay: Duration::ZERO,
                    needs_bearer: true,
                },
            );
            self
        }

        fn slow_route(mut self, port: u16, path: &str) -> Self {
            self.routes.insert(
                (port, path.to_string()),
                Route {
                    status: 200,
                    body: String::new(),
                    delay: Duration::from_secs(60),
                    needs_bearer: false,
                },
            );
            self
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl HttpClient for FakeBackend {
        fn execute(
            &self,
            request: &ProbeRequest,
        ) -> Pin<Box<dyn Future<Output = Result<RawResponse, HttpClientError>> + Send + '_>>
        {
            self.seen.lock().unwrap().push(request.path.clone());
            let route = self
                .routes
                .get(&(request.port, request.path.clone()))
                .cloned();
            let authorized = request.headers.contains("Authorization");
            let host = request.host.clone();
            let port = request.port;
            Box::pin(async move {
                let Some(route) = route else {
                    return Err(HttpClientError::ConnectionRefused { host, port });
                };
                tokio::time::sleep(route.delay).await;
                if route.needs_bearer && !authorized {
                    return Ok(RawResponse::new(401, r#"{"msg":"missing bearer"}"#));
                }
                Ok(RawResponse::new(route.status, route.body.into_bytes()))
            })
        }
    }

    /// Checks status expectations and top-level field presence.
    struct StatusAndFields;

    impl ResponseValidator for StatusAndFields {
        fn validate(&self, suite: &TestSuite, result: &ProbeResult) -> TestResults {
            let results = suite
                .assertions
                .iter()
                .map(|assertion| {
                    let passed = match assertion {
                        Assertion::StatusCode { expected } => {
                            result.status.is_some_and(|s| expected.matches(s))
                        }
                        Assertion::JsonField { name } => result
                            .body
                            .as_ref()
                            .and_then(|b| b.field(name))
                            .is_some(),
                    };
                    if passed {
                        AssertionResult::pass(assertion.clone())
                    } else {
                        AssertionResult::fail(assertion.clone(), assertion.description())
                    }
                })
                .collect();
            TestResults::new(suite.name.clone(), results)
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ScenarioObserver for RecordingObserver {
        fn step_started(&self, step: &str, _request: &ProbeRequest) {
            self.push(format!("start {step}"));
        }

        fn step_skipped(&self, report: &StepReport) {
            self.push(format!("skip {}", report.name));
        }

        fn step_finished(&self, report: &StepReport) {
            self.push(format!("{} {}", report.state, report.name));
        }

        fn settle_finished(&self, outcome: &SettleOutcome) {
            self.push(format!("settled {:?}", outcome.waited()));
        }
    }

    const GATEWAY: u16 = 8000;

    fn signup() -> StepDefinition {
        StepDefinition::new(
            "signup",
            RequestTemplate::post(
                ServiceRole::Gateway,
                "/auth/v1/signup",
                RequestBody::Json(json!({"email": "a@b.c", "password": "pw"})),
            ),
        )
    }

    fn login() -> StepDefinition {
        StepDefinition::new(
            "login",
            RequestTemplate::post(ServiceRole::Gateway, "/auth/v1/token", RequestBody::None)
                .with_query("grant_type", "password"),
        )
        .expecting([Assertion::status(200), Assertion::has_field("access_token")])
        .capturing_token("access_token")
        .with_hint(FailureHint {
            status: 400,
            field: "msg".to_string(),
            equals: "Email not confirmed".to_string(),
            advice: vec!["confirm the address in the mailbox".to_string()],
        })
    }

    fn user() -> StepDefinition {
        StepDefinition::new(
            "user",
            RequestTemplate::get(ServiceRole::Gateway, "/auth/v1/user").with_session(),
        )
        .after(Prerequisite::Step("login".to_string()))
        .reporting(&["email", "email_confirmed_at"])
    }

    fn profiles() -> StepDefinition {
        StepDefinition::new(
            "profiles",
            RequestTemplate::get(ServiceRole::Gateway, "/rest/v1/profiles").with_session(),
        )
        .after(Prerequisite::Step("login".to_string()))
    }

    fn full() -> Scenario {
        Scenario::new("full", "signup, login, user, profiles")
            .then(signup())
            .then(login())
            .then(user())
            .then(profiles())
    }

    type TestRunner = RunScenario<FakeBackend, StatusAndFields, FixedClock>;

    fn runner(backend: FakeBackend) -> (Arc<FakeBackend>, TestRunner) {
        let backend = Arc::new(backend);
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let runner = RunScenario::new(
            Arc::clone(&backend),
            Arc::new(StatusAndFields),
            Arc::new(clock),
        );
        (backend, runner)
    }

    fn states(summary: &RunSummary) -> Vec<(String, StepState)> {
        summary
            .steps
            .iter()
            .map(|s| (s.name.clone(), s.state))
            .collect()
    }

    #[tokio::test]
    async fn test_full_flow_passes_token_to_dependent_steps() {
        let backend = FakeBackend::default()
            .route(GATEWAY, "/auth/v1/signup", 200, json!({"id": "u1"}))
            .route(
                GATEWAY,
                "/auth/v1/token",
                200,
                json!({"access_token": "jwt-token", "token_type": "bearer"}),
            )
            .bearer_route(
                GATEWAY,
                "/auth/v1/user",
                json!({"email": "a@b.c", "email_confirmed_at": null}),
            )
            .bearer_route(GATEWAY, "/rest/v1/profiles", json!([]));
        let (_, runner) = runner(backend);

        let summary = runner
            .execute(&full(), &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap();

        assert!(summary.all_succeeded(), "{summary:#?}");
        assert_eq!(
            summary.step("user").unwrap().details,
            vec![
                ("email".to_string(), "a@b.c".to_string()),
                ("email_confirmed_at".to_string(), "(none)".to_string()),
            ]
        );
        assert_eq!(summary.elapsed(), chrono::Duration::zero());
    }

    #[tokio::test]
    async fn test_mixed_concurrent_stage_reports_in_declaration_order() {
        let backend = FakeBackend::default()
            .route(GATEWAY, "/auth/v1/token", 400, json!({"msg": "Invalid login"}))
            .route(GATEWAY, "/auth/v1/signup", 200, json!({"id": "u1"}));
        let (_, runner) = runner(backend);
        let scenario = Scenario::new("mixed", "skips around a dispatched step")
            .then(login())
            .then_concurrently(vec![user(), signup(), profiles()]);
        let observer = RecordingObserver::default();

        let summary = runner
            .execute(&scenario, &ProbeConfig::default(), &observer)
            .await
            .unwrap();

        assert_eq!(
            states(&summary),
            vec![
                ("login".to_string(), StepState::Failed),
                ("user".to_string(), StepState::Skipped),
                ("signup".to_string(), StepState::Succeeded),
                ("profiles".to_string(), StepState::Skipped),
            ]
        );
        assert_eq!(
            observer.events(),
            vec![
                "start login",
                "failed login",
                "skip user",
                "skip profiles",
                "start signup",
                "succeeded signup",
            ]
        );
    }

    #[tokio::test]
    async fn test_login_without_token_skips_session_steps() {
        let backend = FakeBackend::default()
            .route(GATEWAY, "/auth/v1/signup", 200, json!({}))
            .route(GATEWAY, "/auth/v1/token", 200, json!({"token_type": "bearer"}))
            .bearer_route(GATEWAY, "/auth/v1/user", json!({}))
            .bearer_route(GATEWAY, "/rest/v1/profiles", json!([]));
        let (backend, runner) = runner(backend);
        let observer = RecordingObserver::default();

        let summary = runner
            .execute(&full(), &ProbeConfig::default(), &observer)
            .await
            .unwrap();

        assert_eq!(
            states(&summary),
            vec![
                ("signup".to_string(), StepState::Succeeded),
                ("login".to_string(), StepState::Failed),
                ("user".to_string(), StepState::Skipped),
                ("profiles".to_string(), StepState::Skipped),
            ]
        );
        assert_eq!(backend.seen(), vec!["/auth/v1/signup", "/auth/v1/token"]);
        assert!(observer.events().contains(&"skip user".to_string()));
        assert_eq!(
            summary.step("user").unwrap().notes,
            vec!["skipped: 'login' did not succeed".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_signup_does_not_abort_login() {
        let backend = FakeBackend::default()
            .route(GATEWAY, "/auth/v1/signup", 422, json!({"msg": "User already registered"}))
            .route(GATEWAY, "/auth/v1/token", 200, json!({"access_token": "t"}));
        let (_, runner) = runner(backend);
        let scenario = Scenario::new("signup-login", "").then(signup()).then(login());

        let summary = runner
            .execute(&scenario, &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap();

        assert_eq!(summary.step("signup").unwrap().state, StepState::Failed);
        assert_eq!(summary.step("login").unwrap().state, StepState::Succeeded);
    }

    #[tokio::test]
    async fn test_unconfirmed_email_hint_is_attached() {
        let backend = FakeBackend::default().route(
            GATEWAY,
            "/auth/v1/token",
            400,
            json!({"error": "invalid_grant", "msg": "Email not confirmed"}),
        );
        let (_, runner) = runner(backend);
        let scenario = Scenario::new("session", "")
            .then(login())
            .then(user())
            .then(profiles());

        let summary = runner
            .execute(&scenario, &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap();

        let login = summary.step("login").unwrap();
        assert_eq!(login.state, StepState::Failed);
        assert!(
            login
                .notes
                .contains(&"confirm the address in the mailbox".to_string())
        );
        assert_eq!(summary.counts().skipped, 2);
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_step_without_data() {
        let (_, runner) = runner(FakeBackend::default());
        let scenario = Scenario::new("signup-only", "").then(signup());

        let summary = runner
            .execute(&scenario, &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap();

        let report = summary.step("signup").unwrap();
        assert_eq!(report.state, StepState::Failed);
        assert!(report.checks.is_none());
        let result = report.result.as_ref().unwrap();
        assert_eq!(result.status, None);
        assert_eq!(
            result.error.as_ref().map(|e| e.kind),
            Some(ProbeErrorKind::ConnectionRefused)
        );
    }

    fn direct() -> Scenario {
        let health = |name: &str, role: ServiceRole| {
            StepDefinition::new(name, RequestTemplate::get(role, "/health").as_health_check())
        };
        Scenario::new("direct", "")
            .then_concurrently(vec![
                health("auth-health", ServiceRole::AuthService),
                health("stack-health", ServiceRole::LocalStack),
            ])
            .then(
                StepDefinition::new(
                    "direct-signup",
                    RequestTemplate::post(
                        ServiceRole::LocalStack,
                        "/auth/v1/signup",
                        RequestBody::Json(json!({})),
                    ),
                )
                .after(Prerequisite::AnyOf(vec![
                    "auth-health".to_string(),
                    "stack-health".to_string(),
                ])),
            )
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_health_then_signup_when_any_succeeds() {
        let backend = FakeBackend::default()
            .slow_route(9999, "/health")
            .route(54321, "/health", 200, json!({"status": "ok"}))
            .route(54321, "/auth/v1/signup", 200, json!({"id": "u1"}));
        let (_, runner) = runner(backend);

        let summary = runner
            .execute(&direct(), &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap();

        assert_eq!(
            states(&summary),
            vec![
                ("auth-health".to_string(), StepState::Failed),
                ("stack-health".to_string(), StepState::Succeeded),
                ("direct-signup".to_string(), StepState::Succeeded),
            ]
        );
        let auth = summary.step("auth-health").unwrap().result.as_ref().unwrap();
        assert!(auth.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signup_skipped_when_no_health_probe_succeeds() {
        let backend = FakeBackend::default().slow_route(9999, "/health");
        let (_, runner) = runner(backend);

        let summary = runner
            .execute(&direct(), &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap();

        assert_eq!(summary.steps.len(), 3);
        assert_eq!(
            summary.step("direct-signup").unwrap().state,
            StepState::Skipped
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_wait_runs_before_dependent_step() {
        let backend = FakeBackend::default()
            .route(GATEWAY, "/auth/v1/signup", 200, json!({}))
            .route(GATEWAY, "/auth/v1/token", 200, json!({"access_token": "t"}));
        let (_, runner) = runner(backend);
        let scenario = Scenario::new("signup-login", "")
            .then(signup())
            .then(login().settling());
        let config = ProbeConfig {
            settle: SettlePolicy::fixed(Duration::from_millis(1000)),
            ..ProbeConfig::default()
        };
        let observer = RecordingObserver::default();

        runner.execute(&scenario, &config, &observer).await.unwrap();

        assert_eq!(
            observer.events(),
            vec![
                "start signup",
                "succeeded signup",
                "settled 1s",
                "start login",
                "succeeded login",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_scenario_is_rejected() {
        let (backend, runner) = runner(FakeBackend::default());
        let scenario = Scenario::new("broken", "").then(StepDefinition::new(
            "user",
            RequestTemplate::get(ServiceRole::Gateway, "/auth/v1/user").with_session(),
        ));

        let err = runner
            .execute(&scenario, &ProbeConfig::default(), &NoopObserver)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidScenario(_))
        ));
        assert!(backend.seen().is_empty());
    }
}
