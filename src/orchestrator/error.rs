//! Error types for declaring global database topologies

use thiserror::Error;

use crate::orchestrator::state_machine::{GlobalClusterEvent, GlobalClusterPhase};

/// Error variants are named with the `Error` suffix for clarity (e.g., `ValidationError`).
/// This is idiomatic for error enums and improves readability at call sites.
#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("region {0} does not support Aurora global databases")]
    RegionNotSupported(String),

    #[error("cannot apply {event} while the global cluster is {phase}")]
    InvalidTransition {
        phase: GlobalClusterPhase,
        event: GlobalClusterEvent,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("logical id {0} is already declared in this stack")]
    DuplicateLogicalId(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Check if this error comes from the caller's input or call order
    ///
    /// Usage errors are never retryable: the caller must change the region,
    /// the props, or the order of calls.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Error::RegionNotSupported(_)
            | Error::InvalidTransition { .. }
            | Error::ValidationError(_)
            | Error::InvalidConfig(_)
            | Error::DuplicateLogicalId(_) => true,
            Error::SerializationError(_) | Error::IoError(_) => false,
        }
    }
}

impl From<ipnet::PrefixLenError> for Error {
    fn from(e: ipnet::PrefixLenError) -> Self {
        Error::InvalidConfig(format!("invalid subnet prefix length: {e}"))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
