use thiserror::Error;

/// Result type for remote calls against the description service
pub type Result<T> = std::result::Result<T, FetchError>;

/// A remote call failed.
///
/// Surfaced to the caller unchanged; nothing in the workspace retries it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct FetchError {
    /// Remote operation name (e.g. `children`, `getInverses`)
    pub operation: String,

    /// Transport or server message
    pub message: String,
}

impl FetchError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
