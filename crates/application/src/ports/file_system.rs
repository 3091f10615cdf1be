//! File system abstraction port.

use std::future::Future;
use std::path::{Path, PathBuf};

/// Error type for file system operations.
#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    /// File not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Contents are not valid UTF-8.
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over the file operations configuration loading needs.
///
/// This trait allows mocking file system access in tests.
pub trait FileSystem: Send + Sync {
    /// Reads a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_file_string(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<String, FileSystemError>> + Send;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// Copies a file, overwriting the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the destination written.
    fn copy_file(
        &self,
        from: &Path,
        to: &Path,
    ) -> impl Future<Output = Result<(), FileSystemError>> + Send;
}
