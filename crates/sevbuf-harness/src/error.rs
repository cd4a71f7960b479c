//! Harness error type.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("fixture case '{case}': {message}")]
    Fixture { case: String, message: String },
}

impl HarnessError {
    pub(crate) fn fixture(case: &str, message: impl Into<String>) -> Self {
        Self::Fixture {
            case: case.to_string(),
            message: message.into(),
        }
    }
}
