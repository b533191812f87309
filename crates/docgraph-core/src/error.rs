//! Error taxonomy for the documentation pipeline
//!
//! Configuration problems are fatal before any file is touched. Per-file
//! failures are isolated and aggregated: the batch finishes every file, then
//! reports all failures at once.

use std::fmt;

use thiserror::Error;

/// Startup configuration problems. Always fatal, always raised before any
/// file is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown front end `{0}`")]
    UnknownFrontend(String),
}

/// A front end failed to produce raw artifacts for one file.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("malformed raw artifact input: {0}")]
    Input(#[from] serde_json::Error),
    #[error("front end `{frontend}` failed: {message}")]
    Parse { frontend: String, message: String },
}

/// One file's pipeline failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frontend(#[from] FrontendError),
}

/// A per-file failure with its file attribution.
#[derive(Debug, Error)]
#[error("{file}: {error}")]
pub struct FileFailure {
    pub file: String,
    #[source]
    pub error: PipelineError,
}

/// Aggregate of every per-file failure in a batch, raised only after all
/// files have finished.
#[derive(Debug)]
pub struct BatchError {
    pub failures: Vec<FileFailure>,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} file(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

/// Top-level failure of a documentation run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_lists_every_failure() {
        let batch = BatchError {
            failures: vec![
                FileFailure {
                    file: "a.js".to_string(),
                    error: PipelineError::Frontend(FrontendError::Parse {
                        frontend: "babel".to_string(),
                        message: "unexpected token".to_string(),
                    }),
                },
                FileFailure {
                    file: "b.js".to_string(),
                    error: PipelineError::Frontend(FrontendError::Parse {
                        frontend: "babel".to_string(),
                        message: "unterminated string".to_string(),
                    }),
                },
            ],
        };

        let rendered = batch.to_string();
        assert!(rendered.starts_with("2 file(s) failed:"));
        assert!(rendered.contains("a.js: front end `babel` failed: unexpected token"));
        assert!(rendered.contains("b.js: front end `babel` failed: unterminated string"));
    }

    #[test]
    fn test_unknown_frontend_message() {
        let error = ConfigError::UnknownFrontend("cobol".to_string());
        assert_eq!(error.to_string(), "unknown front end `cobol`");
    }
}
