//! Real file system implementation.

use std::io::ErrorKind;
use std::path::Path;

use authprobe_application::ports::{FileSystem, FileSystemError};
use tokio::fs;

/// Real file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn classify(error: std::io::Error, path: &Path) -> FileSystemError {
    match error.kind() {
        ErrorKind::NotFound => FileSystemError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => FileSystemError::PermissionDenied(path.to_path_buf()),
        ErrorKind::InvalidData => FileSystemError::InvalidUtf8(path.to_path_buf()),
        _ => FileSystemError::Io(error),
    }
}

impl FileSystem for TokioFileSystem {
    async fn read_file_string(&self, path: &Path) -> Result<String, FileSystemError> {
        fs::read_to_string(path).await.map_err(|e| classify(e, path))
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), FileSystemError> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(from, to).await.map_err(|e| classify(e, from))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");

        let fs = TokioFileSystem::new();
        assert!(!fs.exists(&path).await);
        assert!(matches!(
            fs.read_file_string(&path).await,
            Err(FileSystemError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_copy_then_read() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join(".env.example");
        let target = dir.path().join("nested").join(".env");
        std::fs::write(&template, "ANON_KEY=abc\n").unwrap();

        let fs = TokioFileSystem::new();
        fs.copy_file(&template, &target).await.unwrap();

        assert!(fs.exists(&target).await);
        assert_eq!(fs.read_file_string(&target).await.unwrap(), "ANON_KEY=abc\n");
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

        let result = TokioFileSystem::new().read_file_string(&path).await;
        assert!(matches!(result, Err(FileSystemError::InvalidUtf8(_))));
    }
}
