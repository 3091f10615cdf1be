//! Deployment topology: where each service under test listens.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// A reachable service base address (`scheme://host:port`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// URL scheme, `http` or `https`
    pub scheme: String,
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl ServiceEndpoint {
    /// Creates a plain-HTTP endpoint.
    #[must_use]
    pub fn http(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
        }
    }

    /// Parses an endpoint from a base URL such as `http://localhost:8000`.
    ///
    /// Any path component is ignored; the port defaults to the scheme's
    /// well-known port when omitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the URL is malformed, has no
    /// host, or uses a scheme other than http/https.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{scheme}': {raw}"
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| DomainError::InvalidUrl(format!("missing host: {raw}")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| DomainError::InvalidUrl(format!("missing port: {raw}")))?;

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Which service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    /// Reverse proxy in front of auth and data services
    Gateway,
    /// Auth service reached without the gateway
    AuthService,
    /// Local development stack
    LocalStack,
}

impl ServiceRole {
    /// Returns a short label for console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::AuthService => "auth service",
            Self::LocalStack => "local stack",
        }
    }
}

/// Addresses of every service the probes talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Gateway (default `http://localhost:8000`)
    pub gateway: ServiceEndpoint,
    /// Direct auth service (default `http://localhost:9999`)
    pub auth_service: ServiceEndpoint,
    /// Local development stack (default `http://localhost:54321`)
    pub local_stack: ServiceEndpoint,
    /// Mailbox UI used to confirm sign-up emails (default `http://localhost:9000`)
    pub mailbox: ServiceEndpoint,
}

impl Topology {
    /// Returns the endpoint serving the given role.
    #[must_use]
    pub const fn endpoint(&self, role: ServiceRole) -> &ServiceEndpoint {
        match role {
            ServiceRole::Gateway => &self.gateway,
            ServiceRole::AuthService => &self.auth_service,
            ServiceRole::LocalStack => &self.local_stack,
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            gateway: ServiceEndpoint::http("localhost", 8000),
            auth_service: ServiceEndpoint::http("localhost", 9999),
            local_stack: ServiceEndpoint::http("localhost", 54321),
            mailbox: ServiceEndpoint::http("localhost", 9000),
        }
    }
}
