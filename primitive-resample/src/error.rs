//! Error types for interpolation-level conversion.

use primitive_types::Interpolation;
use thiserror::Error;

/// Result type alias for resampling operations.
pub type ResampleResult<T> = Result<T, ResampleError>;

/// Errors that can occur when converting a variable between
/// interpolation levels.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// The conversion is not defined for this primitive kind.
    #[error("cannot resample {from} to {to} on this primitive")]
    UnsupportedConversion {
        /// Source level.
        from: Interpolation,
        /// Requested level.
        to: Interpolation,
    },

    /// Converting an indexed variable along this path is not
    /// supported; expand the indices first.
    #[error("resampling indexed {from} variables to {to} is not supported; expand indices first")]
    IndexedUnsupported {
        /// Source level.
        from: Interpolation,
        /// Requested level.
        to: Interpolation,
    },

    /// The element type cannot take this conversion (e.g. averaging
    /// strings).
    #[error(transparent)]
    Type(#[from] primitive_types::PrimitiveError),

    /// An evaluator-backed conversion failed to sample the source.
    #[error(transparent)]
    Eval(#[from] primitive_eval::EvalError),
}
