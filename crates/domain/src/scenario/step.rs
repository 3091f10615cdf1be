//! Step and scenario definitions

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{ProbeConfig, ServiceRole};
use crate::error::{DomainError, DomainResult};
use crate::request::{HttpMethod, ProbeRequest, RequestBody};
use crate::response::ProbeResult;
use crate::session::SessionToken;
use crate::testing::{Assertion, StatusExpectation, TestSuite};

/// How a step authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepAuth {
    /// API key only.
    #[default]
    ApiKey,
    /// API key plus the session token as a bearer credential.
    Session,
}

/// Which configured bound applies to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutClass {
    /// API call bound.
    #[default]
    Request,
    /// Health probe bound.
    Health,
}

/// A request described independently of topology and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTemplate {
    /// HTTP method
    pub method: HttpMethod,
    /// Service the request is addressed to
    pub target: ServiceRole,
    /// Absolute path
    pub path: String,
    /// Query parameters
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// Body
    #[serde(default)]
    pub body: RequestBody,
    /// Authentication mode
    #[serde(default)]
    pub auth: StepAuth,
    /// Applicable wait bound
    #[serde(default)]
    pub timeout: TimeoutClass,
}

impl RequestTemplate {
    /// Creates a GET template.
    #[must_use]
    pub fn get(target: ServiceRole, path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            target,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            auth: StepAuth::ApiKey,
            timeout: TimeoutClass::Request,
        }
    }

    /// Creates a POST template with a body.
    #[must_use]
    pub fn post(target: ServiceRole, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: HttpMethod::Post,
            body,
            ..Self::get(target, path)
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Authenticates with the session token.
    #[must_use]
    pub const fn with_session(mut self) -> Self {
        self.auth = StepAuth::Session;
        self
    }

    /// Uses the health probe bound.
    #[must_use]
    pub const fn as_health_check(mut self) -> Self {
        self.timeout = TimeoutClass::Health;
        self
    }

    /// Resolves the template into a concrete request.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the request cannot be built.
    pub fn build(
        &self,
        config: &ProbeConfig,
        token: Option<&SessionToken>,
    ) -> DomainResult<ProbeRequest> {
        let endpoint = config.topology.endpoint(self.target);
        let timeout = match self.timeout {
            TimeoutClass::Request => config.timeouts.request,
            TimeoutClass::Health => config.timeouts.health,
        };
        let bearer = match self.auth {
            StepAuth::ApiKey => None,
            StepAuth::Session => token,
        };

        let mut builder = ProbeRequest::builder(self.method, endpoint, self.path.clone())
            .api_key(config.api_key.as_deref())
            .bearer(bearer)
            .body(self.body.clone())
            .timeout(timeout);
        for (name, value) in &self.query {
            builder = builder.query(name.clone(), value.clone());
        }
        builder.build()
    }
}

/// What must hold before a step is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prerequisite {
    /// The named step succeeded.
    Step(String),
    /// At least one of the named steps succeeded.
    AnyOf(Vec<String>),
}

impl Prerequisite {
    /// Returns the step names this prerequisite refers to.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        match self {
            Self::Step(name) => vec![name.as_str()],
            Self::AnyOf(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Extra advice shown when a failure matches a known situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureHint {
    /// Status the response must have
    pub status: u16,
    /// Top-level JSON field to inspect
    pub field: String,
    /// Value the field must hold
    pub equals: String,
    /// Lines shown to the user
    pub advice: Vec<String>,
}

impl FailureHint {
    /// Returns true if the result matches this hint.
    #[must_use]
    pub fn matches(&self, result: &ProbeResult) -> bool {
        result.status == Some(self.status)
            && result
                .body
                .as_ref()
                .and_then(|b| b.str_field(&self.field))
                .is_some_and(|v| v == self.equals)
    }
}

/// One named step of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique step name
    pub name: String,
    /// Request to send
    pub request: RequestTemplate,
    /// Interpretation rules; the step succeeds only if all pass
    pub expect: TestSuite,
    /// JSON field whose string value becomes the session token
    #[serde(default)]
    pub capture_token: Option<String>,
    /// Step(s) that must have succeeded first
    #[serde(default)]
    pub prerequisite: Option<Prerequisite>,
    /// Whether the configured settle wait runs before this step
    #[serde(default)]
    pub settle_before: bool,
    /// Advice for recognised failures
    #[serde(default)]
    pub hints: Vec<FailureHint>,
    /// JSON fields echoed in the report on success
    #[serde(default)]
    pub report_fields: Vec<String>,
}

impl StepDefinition {
    /// Creates a step that expects a 2xx response.
    #[must_use]
    pub fn new(name: impl Into<String>, request: RequestTemplate) -> Self {
        let name = name.into();
        Self {
            expect: TestSuite::new(name.clone()).with_assertion(Assertion::StatusCode {
                expected: StatusExpectation::success(),
            }),
            name,
            request,
            capture_token: None,
            prerequisite: None,
            settle_before: false,
            hints: Vec::new(),
            report_fields: Vec::new(),
        }
    }

    /// Replaces the interpretation rules.
    #[must_use]
    pub fn expecting(mut self, assertions: impl IntoIterator<Item = Assertion>) -> Self {
        self.expect = TestSuite::new(self.name.clone());
        for assertion in assertions {
            self.expect = self.expect.with_assertion(assertion);
        }
        self
    }

    /// Captures the session token from `field`.
    #[must_use]
    pub fn capturing_token(mut self, field: impl Into<String>) -> Self {
        self.capture_token = Some(field.into());
        self
    }

    /// Requires another step to have succeeded.
    #[must_use]
    pub fn after(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisite = Some(prerequisite);
        self
    }

    /// Runs the settle wait before this step.
    #[must_use]
    pub const fn settling(mut self) -> Self {
        self.settle_before = true;
        self
    }

    /// Adds a failure hint.
    #[must_use]
    pub fn with_hint(mut self, hint: FailureHint) -> Self {
        self.hints.push(hint);
        self
    }

    /// Echoes these JSON fields on success.
    #[must_use]
    pub fn reporting(mut self, fields: &[&str]) -> Self {
        self.report_fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    /// Returns true if the step needs the session token.
    #[must_use]
    pub fn needs_session(&self) -> bool {
        self.request.auth == StepAuth::Session
    }
}

/// A unit of execution: one step, or independent steps dispatched together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "steps", rename_all = "snake_case")]
pub enum Stage {
    /// A single step.
    Single(StepDefinition),
    /// Steps dispatched concurrently; the stage ends when all complete.
    Concurrent(Vec<StepDefinition>),
}

impl Stage {
    /// Returns the steps of this stage.
    #[must_use]
    pub fn steps(&self) -> &[StepDefinition] {
        match self {
            Self::Single(step) => std::slice::from_ref(step),
            Self::Concurrent(steps) => steps,
        }
    }
}

/// A fixed, ordered list of stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Stages in execution order
    pub stages: Vec<Stage>,
}

impl Scenario {
    /// Creates an empty scenario.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a single-step stage.
    #[must_use]
    pub fn then(mut self, step: StepDefinition) -> Self {
        self.stages.push(Stage::Single(step));
        self
    }

    /// Appends a concurrent stage.
    #[must_use]
    pub fn then_concurrently(mut self, steps: Vec<StepDefinition>) -> Self {
        self.stages.push(Stage::Concurrent(steps));
        self
    }

    /// Returns every step in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.stages.iter().flat_map(Stage::steps)
    }

    /// Checks that the scenario can run as written.
    ///
    /// Step names must be unique, prerequisites may only name steps from
    /// earlier stages, and a session-authenticated step needs an earlier
    /// step that captures the token.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidScenario` describing the first problem found.
    pub fn validate(&self) -> DomainResult<()> {
        let mut earlier: HashSet<&str> = HashSet::new();
        let mut token_captured = false;

        for stage in &self.stages {
            if matches!(stage, Stage::Concurrent(steps) if steps.is_empty()) {
                return Err(DomainError::InvalidScenario(format!(
                    "{}: empty concurrent stage",
                    self.name
                )));
            }

            for step in stage.steps() {
                if let Some(prerequisite) = &step.prerequisite {
                    for name in prerequisite.step_names() {
                        if !earlier.contains(name) {
                            return Err(DomainError::InvalidScenario(format!(
                                "step '{}' depends on '{name}', which does not run before it",
                                step.name
                            )));
                        }
                    }
                }
                if step.needs_session() && !token_captured {
                    return Err(DomainError::InvalidScenario(format!(
                        "step '{}' needs a session token but no earlier step captures one",
                        step.name
                    )));
                }
            }

            for step in stage.steps() {
                if !earlier.insert(step.name.as_str()) {
                    return Err(DomainError::InvalidScenario(format!(
                        "duplicate step name '{}'",
                        step.name
                    )));
                }
                token_captured |= step.capture_token.is_some();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    fn login() -> StepDefinition {
        StepDefinition::new(
            "login",
            RequestTemplate::post(ServiceRole::Gateway, "/auth/v1/token", RequestBody::None)
                .with_query("grant_type", "password"),
        )
        .capturing_token("access_token")
    }

    fn user_info() -> StepDefinition {
        StepDefinition::new(
            "user",
            RequestTemplate::get(ServiceRole::Gateway, "/auth/v1/user").with_session(),
        )
    }

    #[test]
    fn template_resolves_against_config() {
        let mut config = ProbeConfig::default();
        config.api_key = Some("abc123".to_string());
        let token = SessionToken::new("jwt");

        let request = user_info().request.build(&config, Some(&token)).unwrap();
        assert_eq!(request.url(), "http://localhost:8000/auth/v1/user");
        assert_eq!(request.headers.get("apikey"), Some("abc123"));
        assert_eq!(request.headers.get("Authorization"), Some("Bearer jwt"));
        assert_eq!(request.timeout, Duration::from_secs(5));
    }

    #[test]
    fn api_key_only_template_ignores_token() {
        let config = ProbeConfig::default();
        let token = SessionToken::new("jwt");
        let health = RequestTemplate::get(ServiceRole::AuthService, "/health").as_health_check();

        let request = health.build(&config, Some(&token)).unwrap();
        assert!(!request.headers.contains("Authorization"));
        assert!(!request.headers.contains("apikey"));
        assert_eq!(request.timeout, Duration::from_secs(3));
        assert_eq!(request.port, 9999);
    }

    #[test]
    fn hint_matches_status_and_field() {
        let hint = FailureHint {
            status: 400,
            field: "msg".to_string(),
            equals: "Email not confirmed".to_string(),
            advice: vec!["confirm it".to_string()],
        };
        let matching = ProbeResult::from_response(
            "x",
            400,
            HashMap::new(),
            json!({"msg": "Email not confirmed"}).to_string().as_bytes(),
            Duration::ZERO,
        );
        let other = ProbeResult::from_response("x", 400, HashMap::new(), b"nope", Duration::ZERO);

        assert!(hint.matches(&matching));
        assert!(!hint.matches(&other));
    }

    #[test]
    fn valid_scenario() {
        let scenario = Scenario::new("session", "login then user")
            .then(login())
            .then(user_info().after(Prerequisite::Step("login".to_string())));
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.steps().count(), 2);
    }

    #[test]
    fn session_step_without_capture_is_invalid() {
        let scenario = Scenario::new("broken", "").then(user_info());
        assert!(matches!(
            scenario.validate(),
            Err(DomainError::InvalidScenario(_))
        ));
    }

    #[test]
    fn prerequisite_in_same_concurrent_stage_is_invalid() {
        let a = StepDefinition::new("a", RequestTemplate::get(ServiceRole::Gateway, "/a"));
        let b = StepDefinition::new("b", RequestTemplate::get(ServiceRole::Gateway, "/b"))
            .after(Prerequisite::Step("a".to_string()));
        let scenario = Scenario::new("racy", "").then_concurrently(vec![a, b]);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn duplicate_names_are_invalid() {
        let scenario = Scenario::new("dup", "").then(login()).then(login());
        let err = scenario.validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidScenario("duplicate step name 'login'".to_string())
        );
    }
}
