//! Spatial and parametric query evaluators for geometry primitives.
//!
//! Each primitive kind gets an evaluator over an immutable snapshot of
//! the primitive:
//!
//! - [`PointsEvaluator`] - nearest-point queries via a KD-tree
//! - [`CurvesEvaluator`] - parametric evaluation, closest point and arc
//!   length over piecewise cubic or linear curves
//! - [`MeshEvaluator`] - closest point, ray intersection, UV lookup,
//!   signed distance and mass properties over a triangulated view of
//!   the mesh
//!
//! # Query model
//!
//! Evaluators build their acceleration structures lazily on the first
//! spatial query and never mutate them again, so an evaluator may be
//! shared across threads once constructed; each thread brings its own
//! result object. Geometric misses are reported by a `false` return,
//! never an error. Query results carry the contributing elements and
//! weights of the hit and can sample any of the primitive's attributes
//! at that location (`sample_float`, `sample_vec3`, ...).
//!
//! # Example
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use primitive_types::{AttributeData, Interpolation, MeshPrimitive, PrimitiveVariable};
//! use primitive_eval::MeshEvaluator;
//!
//! let mut mesh = MeshPrimitive::new(vec![3], vec![0, 1, 2]).unwrap();
//! mesh.variables.insert(
//!     "P".to_string(),
//!     PrimitiveVariable::new(
//!         Interpolation::Vertex,
//!         AttributeData::Vec3(vec![
//!             Vector3::new(0.0, 0.0, 0.0),
//!             Vector3::new(1.0, 0.0, 0.0),
//!             Vector3::new(0.0, 1.0, 0.0),
//!         ]),
//!     ),
//! );
//!
//! let evaluator = MeshEvaluator::new(&mesh).unwrap();
//! let mut result = evaluator.create_result();
//! assert!(evaluator.closest_point(&Point3::new(0.2, 0.2, 1.0), &mut result));
//! assert!((result.point().z - 0.0).abs() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bound_tree;
mod bounds;
mod curves_eval;
mod error;
mod mesh_eval;
mod points_eval;
mod sample;
mod triangle;

pub use bounds::Aabb;
pub use curves_eval::{CurvesEvaluator, CurvesResult};
pub use error::{EvalError, EvalResult};
pub use mesh_eval::{MeshEvaluator, MeshResult};
pub use points_eval::{PointsEvaluator, PointsResult};
pub use triangle::{closest_point_on_triangle, ray_triangle_intersect, triangle_normal};

use primitive_types::Primitive;

/// An evaluator over any primitive kind.
///
/// The kind set is closed, so construction dispatches with a `match`;
/// kind-specific queries live on the concrete evaluators.
pub enum Evaluator {
    /// Point cloud queries.
    Points(PointsEvaluator),
    /// Curve network queries.
    Curves(CurvesEvaluator),
    /// Mesh queries.
    Mesh(MeshEvaluator),
}

impl Evaluator {
    /// Create the evaluator matching the primitive's kind.
    ///
    /// # Errors
    ///
    /// Returns an error when the primitive cannot be evaluated
    /// (missing or malformed `P`).
    pub fn new(primitive: &Primitive) -> EvalResult<Self> {
        match primitive {
            Primitive::Points(points) => Ok(Self::Points(PointsEvaluator::new(points)?)),
            Primitive::Curves(curves) => Ok(Self::Curves(CurvesEvaluator::new(curves)?)),
            Primitive::Mesh(mesh) => Ok(Self::Mesh(MeshEvaluator::new(mesh)?)),
        }
    }
}
