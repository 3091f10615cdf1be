//! Built-in scenarios.
//!
//! Every scenario is built from the resolved configuration, so credentials
//! and the mailbox address end up in request bodies and hints.

use std::fmt;

use authprobe_domain::config::{ProbeConfig, ServiceRole};
use authprobe_domain::scenario::{FailureHint, Prerequisite, RequestTemplate};
use authprobe_domain::{Assertion, RequestBody, Scenario, StepDefinition};
use clap::ValueEnum;
use serde_json::json;

/// Step names shared by the scenarios.
pub mod steps {
    /// Signup through the gateway
    pub const SIGNUP: &str = "signup";
    /// Password login through the gateway
    pub const LOGIN: &str = "login";
    /// Current user lookup
    pub const USER_INFO: &str = "user-info";
    /// Protected table read
    pub const PROFILES: &str = "profiles";
    /// Health probe on the auth service
    pub const AUTH_HEALTH: &str = "auth-health";
    /// Health probe on the local stack
    pub const STACK_HEALTH: &str = "stack-health";
    /// Signup on the local stack, bypassing the gateway
    pub const DIRECT_SIGNUP: &str = "direct-signup";
}

/// Response field carrying the session token.
const TOKEN_FIELD: &str = "access_token";

/// Scenario selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScenarioName {
    /// Signup, login, user info and protected profiles
    #[default]
    Full,
    /// Signup, settle, then password login
    SignupLogin,
    /// Login, then user info and profiles with the session token
    Session,
    /// Concurrent health probes, then signup on the local stack
    Direct,
}

impl ScenarioName {
    /// Every built-in scenario.
    pub const ALL: [Self; 4] = [Self::Full, Self::SignupLogin, Self::Session, Self::Direct];

    /// Returns the name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::SignupLogin => "signup-login",
            Self::Session => "session",
            Self::Direct => "direct",
        }
    }

    /// Builds the scenario for `config`.
    #[must_use]
    pub fn build(self, config: &ProbeConfig) -> Scenario {
        match self {
            Self::Full => Scenario::new(self.as_str(), "signup, login, user info, protected API")
                .then(signup(config, steps::SIGNUP, ServiceRole::Gateway))
                .then(login(config).settling())
                .then(user_info())
                .then(profiles()),
            Self::SignupLogin => Scenario::new(self.as_str(), "signup then password login")
                .then(signup(config, steps::SIGNUP, ServiceRole::Gateway))
                .then(login(config).settling()),
            Self::Session => Scenario::new(self.as_str(), "login, user info, protected API")
                .then(login(config))
                .then(user_info())
                .then(profiles()),
            Self::Direct => Scenario::new(self.as_str(), "auth service reachability and direct signup")
                .then_concurrently(vec![
                    health(steps::AUTH_HEALTH, ServiceRole::AuthService, "/health"),
                    health(steps::STACK_HEALTH, ServiceRole::LocalStack, "/auth/v1/health"),
                ])
                .then(
                    signup(config, steps::DIRECT_SIGNUP, ServiceRole::LocalStack).after(
                        Prerequisite::AnyOf(vec![
                            steps::AUTH_HEALTH.to_string(),
                            steps::STACK_HEALTH.to_string(),
                        ]),
                    ),
                ),
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn credentials_body(config: &ProbeConfig) -> RequestBody {
    RequestBody::Json(json!({
        "email": config.credentials.email,
        "password": config.credentials.password,
    }))
}

fn signup(config: &ProbeConfig, name: &str, target: ServiceRole) -> StepDefinition {
    StepDefinition::new(
        name,
        RequestTemplate::post(target, "/auth/v1/signup", credentials_body(config)),
    )
    .reporting(&["id", "email"])
}

fn login(config: &ProbeConfig) -> StepDefinition {
    StepDefinition::new(
        steps::LOGIN,
        RequestTemplate::post(ServiceRole::Gateway, "/auth/v1/token", credentials_body(config))
            .with_query("grant_type", "password"),
    )
    .expecting([Assertion::status(200), Assertion::has_field(TOKEN_FIELD)])
    .capturing_token(TOKEN_FIELD)
    .with_hint(unconfirmed_email(config))
}

fn unconfirmed_email(config: &ProbeConfig) -> FailureHint {
    FailureHint {
        status: 400,
        field: "msg".to_string(),
        equals: "Email not confirmed".to_string(),
        advice: vec![
            "Please confirm your email first:".to_string(),
            format!("  1. Open {}", config.topology.mailbox.base_url()),
            format!("  2. Open the message sent to {}", config.credentials.email),
            "  3. Follow the confirmation link".to_string(),
            "  4. Run this probe again".to_string(),
        ],
    }
}

fn user_info() -> StepDefinition {
    StepDefinition::new(
        steps::USER_INFO,
        RequestTemplate::get(ServiceRole::Gateway, "/auth/v1/user").with_session(),
    )
    .expecting([Assertion::status(200)])
    .after(Prerequisite::Step(steps::LOGIN.to_string()))
    .reporting(&["email", "id", "email_confirmed_at"])
}

fn profiles() -> StepDefinition {
    StepDefinition::new(
        steps::PROFILES,
        RequestTemplate::get(ServiceRole::Gateway, "/rest/v1/profiles").with_session(),
    )
    .expecting([Assertion::status(200)])
    .after(Prerequisite::Step(steps::LOGIN.to_string()))
}

fn health(name: &str, target: ServiceRole, path: &str) -> StepDefinition {
    StepDefinition::new(name, RequestTemplate::get(target, path).as_health_check())
        .expecting([Assertion::status(200)])
}
