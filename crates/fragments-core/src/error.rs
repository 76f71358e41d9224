//! Error types for Fragments Core.

use thiserror::Error;

use crate::types::BareType;

/// Core errors raised while building fragments or resolving content types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("unknown extension: .{0}")]
    UnknownExtension(String),

    #[error("invalid fragment: {0}")]
    InvalidFragment(String),
}

/// Content does not match the structural rules of its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{content_type} content is empty")]
    Empty { content_type: BareType },

    #[error("{content_type} content is not valid UTF-8")]
    NotUtf8 { content_type: BareType },

    #[error("invalid {content_type} content: {reason}")]
    Malformed {
        content_type: BareType,
        reason: String,
    },
}

impl ValidationError {
    /// The declared type the content was checked against.
    pub fn content_type(&self) -> BareType {
        match self {
            ValidationError::Empty { content_type }
            | ValidationError::NotUtf8 { content_type }
            | ValidationError::Malformed { content_type, .. } => *content_type,
        }
    }
}

/// A conversion between two content types was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("conversion from {from} to {to} is not supported")]
    Unsupported { from: BareType, to: BareType },

    #[error("conversion from {from} to {to} failed: {reason}")]
    Failed {
        from: BareType,
        to: BareType,
        reason: String,
    },
}
