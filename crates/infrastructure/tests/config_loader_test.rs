//! Configuration loading against the real file system.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use authprobe_application::{ConfigError, ConfigSource, LoadConfiguration};
use authprobe_domain::SettlePolicy;
use authprobe_infrastructure::TokioFileSystem;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn loader() -> LoadConfiguration<TokioFileSystem> {
    LoadConfiguration::new(Arc::new(TokioFileSystem::new()))
}

fn source(dir: &TempDir) -> ConfigSource {
    ConfigSource::new(dir.path().join(".env"), dir.path().join(".env.example"))
}

#[tokio::test]
async fn reads_values_and_ignores_junk_lines() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "# local stack\nANON_KEY=eyJhbGciOiJIUzI1NiJ9.payload.sig==\n\nnot a pair\nPROBE_SETTLE_MS=0\n",
    )
    .unwrap();

    let loaded = loader().execute(&source(&dir)).await.unwrap();

    assert_eq!(
        loaded.config.api_key.as_deref(),
        Some("eyJhbGciOiJIUzI1NiJ9.payload.sig==")
    );
    assert_eq!(loaded.config.settle, SettlePolicy::None);
    assert!(!loaded.created_from_template);
}

#[tokio::test]
async fn creates_file_from_template() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env.example"), "ANON_KEY=template-key\n").unwrap();

    let loaded = loader().execute(&source(&dir)).await.unwrap();

    assert!(loaded.created_from_template);
    assert_eq!(loaded.config.api_key.as_deref(), Some("template-key"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".env")).unwrap(),
        "ANON_KEY=template-key\n"
    );
    assert_eq!(
        loaded.config.settle,
        SettlePolicy::fixed(Duration::from_millis(1000))
    );
}

#[tokio::test]
async fn missing_file_and_template_is_fatal() {
    let dir = TempDir::new().unwrap();

    let err = loader().execute(&source(&dir)).await.unwrap_err();

    assert!(matches!(err, ConfigError::Missing { .. }));
    assert!(err.to_string().contains(".env.example"));
}
