use thiserror::Error;

/// Status reported when the credential store or the network fails before any
/// upstream status is available.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// The GitHub token could not be read from the secret store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("credential lookup failed ({status}): {detail}")]
pub struct CredentialError {
    pub status: u16,
    pub detail: String,
}

impl CredentialError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

/// A traffic feed request failed, either with a non-200 answer from the API
/// (`detail` holds the response body) or below HTTP (`detail` holds the
/// error text and `status` is 500).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("traffic request failed ({status}): {detail}")]
pub struct TrafficFetchError {
    pub status: u16,
    pub detail: String,
}

impl TrafficFetchError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("batch write failed: {0}")]
    Request(String),
    #[error("{remaining} items still unprocessed after resubmitting")]
    Unprocessed { remaining: usize },
}

/// Outcome of a single repository's fetch and persist cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Fetch(#[from] TrafficFetchError),
    #[error(transparent)]
    Persist(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),
}
