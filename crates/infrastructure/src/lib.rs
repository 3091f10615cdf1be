//! Authprobe Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod persistence;
pub mod testing;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use persistence::TokioFileSystem;
pub use testing::TestRunner;
