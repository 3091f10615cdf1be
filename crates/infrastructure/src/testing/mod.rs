//! Response checking infrastructure.
//!
//! This module provides the runner that checks step assertions against probe results.

mod runner;

pub use runner::TestRunner;
