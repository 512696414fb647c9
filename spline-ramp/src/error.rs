//! Error types for ramp and spline operations.

use thiserror::Error;

/// Result type alias for ramp operations.
pub type RampResult<T> = Result<T, RampError>;

/// Errors that can occur when converting ramps between representations.
#[derive(Debug, Error)]
pub enum RampError {
    /// Adaptor connections require fixed endpoint multiplicity, which
    /// monotone-cubic ramps cannot provide.
    #[error("cannot connect adaptors to a ramp using monotone-cubic interpolation")]
    MonotoneCubicAdaptor,
}
