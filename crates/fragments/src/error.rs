//! Error types for the Fragments facade.

use fragments_core::{ConversionError, CoreError, FragmentId, OwnerId, ValidationError};
use fragments_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Fragments operations.
#[derive(Debug, Error)]
pub enum FragmentsError {
    /// The declared content type is not supported.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// Content does not match its declared type.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An export extension maps to no known type.
    #[error("unknown extension: .{0}")]
    UnknownExtension(String),

    /// Conversion is illegal or failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The owner has no fragment with this id.
    #[error("fragment not found: {owner_id}/{id}")]
    NotFound { owner_id: OwnerId, id: FragmentId },

    /// Storage error, propagated as-is.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Fragment metadata is incomplete.
    #[error("invalid fragment: {0}")]
    InvalidFragment(String),

    /// An update tried to change the declared type.
    #[error("content type cannot change from {expected} to {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Content is larger than the configured limit.
    #[error("content of {size} bytes exceeds the {limit} byte limit")]
    ContentTooLarge { size: usize, limit: usize },
}

impl From<CoreError> for FragmentsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedType(t) => FragmentsError::UnsupportedType(t),
            CoreError::UnknownExtension(ext) => FragmentsError::UnknownExtension(ext),
            CoreError::InvalidFragment(reason) => FragmentsError::InvalidFragment(reason),
        }
    }
}

/// Result type for Fragments operations.
pub type Result<T> = std::result::Result<T, FragmentsError>;
