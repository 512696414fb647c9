//! Error types for the primitive data model.

use thiserror::Error;

/// Result type alias for primitive operations.
pub type PrimitiveResult<T> = Result<T, PrimitiveError>;

/// Errors that can occur when constructing or manipulating primitives
/// and their attributes.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// An operation was requested on an attribute whose element type
    /// does not support it (e.g. averaging strings).
    #[error("attribute type \"{type_name}\" is not supported by {operation}")]
    UnsupportedType {
        /// Name of the offending element type.
        type_name: &'static str,
        /// The operation that rejected it.
        operation: &'static str,
    },

    /// Primitive topology is malformed.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A primitive variable is inconsistent with its primitive.
    #[error("invalid primitive variable: {0}")]
    InvalidVariable(String),

    /// A basis was not one of the recognised named bases.
    #[error("unrecognised cubic basis for {0}")]
    UnknownBasis(&'static str),

    /// The operation was cancelled via a [`Canceller`](crate::Canceller).
    #[error("operation cancelled")]
    Cancelled,
}

impl PrimitiveError {
    /// Create an unsupported-type error.
    #[must_use]
    pub const fn unsupported_type(type_name: &'static str, operation: &'static str) -> Self {
        Self::UnsupportedType {
            type_name,
            operation,
        }
    }

    /// Create an invalid-topology error.
    #[must_use]
    pub fn invalid_topology(details: impl Into<String>) -> Self {
        Self::InvalidTopology(details.into())
    }

    /// Create an invalid-variable error.
    #[must_use]
    pub fn invalid_variable(details: impl Into<String>) -> Self {
        Self::InvalidVariable(details.into())
    }
}
