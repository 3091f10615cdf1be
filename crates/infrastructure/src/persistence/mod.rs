//! File-backed storage adapters.

mod file_system;

pub use file_system::TokioFileSystem;
