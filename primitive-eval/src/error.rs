//! Error types for evaluator construction and attribute sampling.

use thiserror::Error;

/// Result type alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised when building an evaluator or sampling attributes at a
/// query result.
///
/// Geometric misses (a ray that hits nothing, a query on an empty
/// primitive) are *not* errors; queries report those through their
/// `bool` return.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The primitive lacks a required variable (usually `P`).
    #[error("primitive has no \"{0}\" variable")]
    MissingVariable(&'static str),

    /// A variable holds a different element type than the operation
    /// expects.
    #[error("expected {expected} data, got {actual}")]
    WrongType {
        /// The element type the operation needs.
        expected: &'static str,
        /// The element type the variable holds.
        actual: &'static str,
    },

    /// A variable's element count does not fit the evaluator's
    /// primitive at the variable's interpolation level.
    #[error("variable has {actual} elements where the primitive requires {expected}")]
    SizeMismatch {
        /// Elements required by the primitive.
        expected: usize,
        /// Elements the variable carries.
        actual: usize,
    },

    /// Construction rejected the primitive itself.
    #[error(transparent)]
    InvalidPrimitive(#[from] primitive_types::PrimitiveError),
}
