//! Port adapters backed by external crates and the operating system.

mod reqwest_client;
mod system_clock;

pub use reqwest_client::ReqwestHttpClient;
pub use system_clock::SystemClock;
