// Copyright 2025 Cowboy AI, LLC.

//! Error types for portal operations

use thiserror::Error;

use crate::draft::DraftError;
use crate::export::ExportError;
use crate::identity::IdentityError;
use crate::infrastructure::{LocalStoreError, StoreError};
use crate::mutation::MutationError;

/// Errors that can occur while driving the report portal
#[derive(Debug, Clone, Error)]
pub enum PortalError {
    /// Invalid submission status transition
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: String,
        /// Attempted target status
        to: String,
    },

    /// Record mutation rejected
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Document store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Durable local storage failure
    #[error(transparent)]
    LocalStorage(#[from] LocalStoreError),

    /// Identity provider failure
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Draft persistence failure
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// Report export failure
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic portal error
    #[error("Portal error: {0}")]
    Generic(String),
}

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization(err.to_string())
    }
}

impl PortalError {
    /// Create a generic portal error
    pub fn generic(msg: impl Into<String>) -> Self {
        PortalError::Generic(msg.into())
    }

    /// Check if this error came from a storage layer
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            PortalError::Store(_) | PortalError::LocalStorage(_) | PortalError::Draft(_)
        )
    }

    /// Check if this is a serialization error
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, PortalError::Serialization(_))
    }

    /// Check if this is a rejected status transition
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, PortalError::InvalidStatusTransition { .. })
    }
}
