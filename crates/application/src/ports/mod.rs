//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod file_system;
mod http_client;
mod observer;
mod validator;

pub use clock::Clock;
pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{HttpClient, HttpClientError, RawResponse};
pub use observer::{NoopObserver, ScenarioObserver};
pub use validator::ResponseValidator;
