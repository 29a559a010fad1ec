//! Error types shared by the data pipeline and the widgets.

use thiserror::Error;

/// Type alias for boxed dynamic errors carried as a load failure source.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Fetching or parsing a dataset failed. Nothing was cached, so the next
    /// call retries the load.
    #[error("failed to load {dataset} dataset: {source}")]
    Load {
        dataset: &'static str,
        #[source]
        source: BoxedError,
    },

    /// Externally supplied option configuration is not a JSON array of strings.
    #[error("invalid options format, expected a JSON array of strings: {0}")]
    MalformedOptions(String),

    /// Internal bookkeeping went out of sync with the data it refers to.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn load(dataset: &'static str, source: impl Into<BoxedError>) -> Self {
        Error::Load {
            dataset,
            source: source.into(),
        }
    }

    /// True for failures that a later call may recover from.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Load { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_message_names_dataset() {
        let err = Error::load("locations", "connection reset");
        assert_eq!(
            err.to_string(),
            "failed to load locations dataset: connection reset"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_malformed_options_not_retryable() {
        let err = Error::MalformedOptions("expected `[`".into());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("JSON array"));
    }
}
