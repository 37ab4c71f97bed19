//! Error types for the package access engine

use thiserror::Error;

use crate::policy::DenialReason;

/// Access engine errors
#[derive(Debug, Error)]
pub enum AccessError {
    /// `init` was called more than once
    #[error("Packages list already initialized")]
    AlreadyInitialized,

    /// `configure` was called more than once
    #[error("Packages options already configured")]
    AlreadyConfigured,

    /// Pattern is not one of the recognized shapes, or failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A nested package declared its own `external` surface
    #[error("Nested packages can't have own \"external\" dependencies: package \"{location}\" inside package \"{parent}\"")]
    InvalidNestedExternal { location: String, parent: String },

    /// The access policy refused a load
    #[error("{reason} is denied: attempt to access \"{target}\" from \"{caller}\"")]
    AccessDenied {
        reason: DenialReason,
        caller: String,
        target: String,
    },

    /// Malformed configuration input
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The base loader has no module at this path
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Failure raised by a host loader
    #[error(transparent)]
    Loader(#[from] anyhow::Error),
}

impl AccessError {
    /// Denial reason, if this error is an access denial
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::AccessDenied { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type for access engine operations
pub type Result<T> = std::result::Result<T, AccessError>;
