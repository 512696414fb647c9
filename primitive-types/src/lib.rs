//! Core data model for procedural geometry interchange.
//!
//! This crate provides the foundational types shared by the evaluation,
//! resampling and deletion crates:
//!
//! - [`PointsPrimitive`], [`CurvesPrimitive`], [`MeshPrimitive`] - the
//!   three primitive kinds, closed over by [`Primitive`]
//! - [`PrimitiveVariable`] - a named attribute: an interpolation level,
//!   an element array and an optional index table
//! - [`AttributeData`] - the closed sum type of element arrays
//! - [`CubicBasis`] - cubic basis matrices for curve evaluation
//! - [`Canceller`] - opportunistic cancellation for long operations
//!
//! # Attribute model
//!
//! An attribute's topological size depends on both its
//! [`Interpolation`] level and the primitive kind it sits on; the
//! [`PrimitiveTopology`] trait answers that sizing question per kind.
//! Indexed attributes store deduplicated values with a per-element index
//! table; [`PrimitiveVariable::expanded_data`] and
//! [`PrimitiveVariable::compact_filtered`] convert between the expanded
//! and compacted forms.
//!
//! # Units and precision
//!
//! All scalar data is `f64`. The crate is unit-agnostic.

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod basis;
mod cancel;
mod curves;
mod data;
mod error;
mod interpolation;
mod mesh;
mod points;
mod traits;
mod variable;

pub use basis::CubicBasis;
pub use cancel::{check_cancelled, Canceller};
pub use curves::CurvesPrimitive;
pub use data::{average_slice, AttributeData, NumericElement};
pub use error::{PrimitiveError, PrimitiveResult};
pub use interpolation::Interpolation;
pub use mesh::{MeshInterpolation, MeshPrimitive};
pub use points::PointsPrimitive;
pub use traits::{Primitive, PrimitiveTopology};
pub use variable::PrimitiveVariable;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Matrix4, Point3, Quaternion, Vector2, Vector3, Vector4};
