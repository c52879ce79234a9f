/// Error type for the external lookup and submit collaborators.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The collaborator did not answer in time.
    #[error("Lookup timed out")]
    Timeout,

    /// Stored data could not be decoded.
    #[error("Malformed data: {0}")]
    Malformed(String),

    /// Backend-specific failure (network, storage, etc.)
    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl LookupError {
    /// Create a backend error from any error type.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }

    /// Create a malformed-data error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
