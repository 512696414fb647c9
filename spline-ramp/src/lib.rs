//! Ramp and spline curves for driving shader-style gradients.
//!
//! This crate provides the control-point curve layer used to exchange
//! splines with shading systems:
//!
//! - [`Ramp`] - the editable knot list with a [`RampInterpolation`] mode
//! - [`Spline`] - the evaluatable form: a cubic basis over x-sorted
//!   control points, produced by [`Ramp::evaluator`]
//! - OSL-compatible import/export ([`Ramp::to_osl`], [`Ramp::from_osl`])
//!   reproducing that protocol's exact endpoint-duplication counts
//! - Monotone-cubic interpolation via the Fritsch-Carlson slope rule,
//!   lowered to Bezier control points
//!
//! # Example
//!
//! ```
//! use spline_ramp::{Ramp, RampInterpolation};
//!
//! let ramp = Ramp::new(
//!     RampInterpolation::MonotoneCubic,
//!     vec![(0.0, 0.0), (0.3, 0.9), (1.0, 1.0)],
//! );
//! let spline = ramp.evaluator();
//! assert!((spline.evaluate(0.3) - 0.9).abs() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod ramp;
mod spline;
mod value;

pub use error::{RampError, RampResult};
pub use ramp::{end_point_multiplicity, osl_end_point_duplication, Ramp, RampInterpolation};
pub use spline::Spline;
pub use value::SplineValue;
