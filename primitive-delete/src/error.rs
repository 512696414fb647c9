//! Error types for element deletion.

use thiserror::Error;

/// Result type alias for deletion operations.
pub type DeleteResult<T> = Result<T, DeleteError>;

/// Errors that can occur while deleting flagged elements.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The flag variable has the wrong interpolation or element type.
    #[error("deletion requires a {expected} bool, int or float variable; got {actual}")]
    InvalidFlag {
        /// The interpolation level the flag must use.
        expected: &'static str,
        /// A description of what was supplied.
        actual: String,
    },

    /// A variable on the primitive is inconsistent with its topology.
    #[error(transparent)]
    Type(#[from] primitive_types::PrimitiveError),
}
