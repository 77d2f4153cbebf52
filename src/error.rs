//! Error taxonomy for listing retrieval and index initialization.
//!
//! A missing record or a missing checksum field is not an error; lookups
//! return `Ok(None)` for both.

/// The bulk listing could not be retrieved or understood.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, connect, timeout, TLS, ...).
    #[error("listing request failed: {0}")]
    Curl(#[from] curl::Error),
    /// Server rejected the credentials (401 or 403).
    #[error("listing request rejected credentials: HTTP {0}")]
    Unauthorized(u32),
    /// Any other non-2xx status.
    #[error("listing request returned HTTP {0}")]
    Http(u32),
    /// Response body was not a valid listing document.
    #[error("malformed listing response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Map a non-2xx status code to the matching variant.
    pub fn from_status(code: u32) -> Self {
        match code {
            401 | 403 => FetchError::Unauthorized(code),
            _ => FetchError::Http(code),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::Unauthorized(_))
    }
}

/// Errors surfaced by [`crate::ChecksumIndex`].
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// This caller ran the bulk fetch and it failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Explicit initialization requested while the index is already
    /// initializing or ready.
    #[error("checksum index already initialized")]
    AlreadyInitialized,
    /// This caller waited on another caller's bulk fetch, which failed.
    #[error("checksum index initialization failed in another caller: {0}")]
    InitializationFailed(String),
}
