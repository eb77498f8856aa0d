use thiserror::Error;

/// Failures raised by a persistence engine. Always fatal for the request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self { Self::Serialization(e.to_string()) }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("batch write incomplete: {} written, {} failed", .written.len(), .failed.len())]
    PartialWrite { written: Vec<String>, failed: Vec<String> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(what: impl std::fmt::Display) -> Self { Self::NotFound(format!("{what} not found")) }

    pub fn invalid(msg: impl Into<String>) -> Self { Self::InvalidInput(msg.into()) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput(_) => 1001,
            ServiceError::Validation(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::PartialWrite { .. } => 1201,
            ServiceError::Store(_) => 1200,
        }
    }
}

/// Reject blank identifiers before they reach the store.
pub fn ensure_id<'a>(id: &'a str, what: &str) -> Result<&'a str, ServiceError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid(format!("{what} id is required")));
    }
    Ok(trimmed)
}
