//! Interpolation-level conversion of primitive variables.
//!
//! Each primitive kind has its own conversion matrix between the
//! `Constant` / `Uniform` / `Vertex` / `Varying` / `FaceVarying`
//! levels, because the index topology behind each level differs per
//! kind:
//!
//! - [`points::resample_primitive_variable`] - point clouds, where the
//!   per-point levels are synonyms
//! - [`curves::resample_primitive_variable`] - curve networks, where
//!   `Vertex` <-> `Varying` conversions are evaluator-backed
//! - [`mesh::resample_primitive_variable`] - meshes, with the
//!   `FaceVarying` per-corner level
//!
//! Down-sampling always averages arithmetically (numeric element types
//! only) and discards index tables; up-sampling by replication,
//! gather or identity resamples index tables directly, which is
//! guaranteed to expand to the same values.
//!
//! # Example
//!
//! ```
//! use primitive_types::{AttributeData, CubicBasis, CurvesPrimitive, Interpolation, PrimitiveVariable};
//! use primitive_resample::curves;
//!
//! let prim = CurvesPrimitive::new(vec![3, 4], CubicBasis::linear(), false).unwrap();
//! let mut var = PrimitiveVariable::new(
//!     Interpolation::Vertex,
//!     AttributeData::Float(vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0]),
//! );
//! curves::resample_primitive_variable(&prim, &mut var, Interpolation::Uniform, None).unwrap();
//! assert_eq!(var.data, AttributeData::Float(vec![2.0, 25.0]));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod common;
pub mod curves;
mod error;
pub mod mesh;
pub mod points;

pub use error::{ResampleError, ResampleResult};
pub use points::merge_points;
