//! Run configuration: the env-style source, the resolved settings and the
//! deployment topology.

mod env_file;
mod settings;
mod topology;

pub use env_file::EnvFile;
pub use settings::{
    ConfigWarning, Credentials, DEFAULT_EMAIL, DEFAULT_HEALTH_TIMEOUT, DEFAULT_PASSWORD,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SETTLE_MAX_WAIT, ProbeConfig, Timeouts, keys,
};
pub use topology::{ServiceEndpoint, ServiceRole, Topology};
