//! Error types for the lifecycle provider

use thiserror::Error;

use crate::provider::api::ApiError;

/// Failure of a lifecycle request, reported as the `Reason` of a `FAILED`
/// response
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("RDS API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid resource properties: {0}")]
    InvalidProperties(#[source] serde_json::Error),

    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("global cluster {0} does not exist")]
    GlobalClusterNotFound(String),

    #[error("source cluster {identifier} does not exist in {region}")]
    SourceClusterNotFound { identifier: String, region: String },

    #[error("engine mismatch for {context}: expected {expected}, found {actual}")]
    EngineMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ProviderError {
    /// Check if re-sending the same request could succeed without changes
    ///
    /// The provider never retries on its own; this only shapes the log line.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Api(e) => e.is_retryable(),
            ProviderError::InvalidProperties(_)
            | ProviderError::UnsupportedResourceType(_)
            | ProviderError::EngineMismatch { .. }
            | ProviderError::Conflict(_) => false,
            // The referenced cluster may still be creating
            ProviderError::GlobalClusterNotFound(_)
            | ProviderError::SourceClusterNotFound { .. } => true,
        }
    }
}

pub type ProviderResult<T, E = ProviderError> = std::result::Result<T, E>;
