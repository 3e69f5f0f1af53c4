use thiserror::Error;

/// Failure classes of the relay pipeline.
///
/// The HTTP layer maps these onto the JSON error envelope: `Validation`
/// becomes a 400, everything else a 500. `Storage` and `NotFound` are only
/// reachable from the optional persistence step and the CLI.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required request field is missing or blank.
    #[error("{0}")]
    Validation(String),
    /// The upstream model provider or agent call failed.
    #[error("provider error: {0}")]
    Provider(String),
    /// Local filesystem or object storage failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// The file slated for upload does not exist.
    #[error("file not found: {0}")]
    NotFound(String),
    /// A required configuration value is absent.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Provider(err.to_string())
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Storage(err.to_string())
    }
}
