//! Flag-driven element deletion with attribute compaction.
//!
//! Each primitive kind has a deletion entry point taking a flag
//! variable at the kind's deletable granularity and an `invert`
//! switch:
//!
//! - [`delete_points`] - Vertex-level flags, the deletable unit is the
//!   point
//! - [`delete_curves`] - Uniform-level flags, whole curves
//! - [`delete_faces`] - Uniform-level flags, whole faces, with point
//!   compaction and corner/crease remapping
//!
//! All remaining variables are re-filtered at their own level's
//! granularity and rebuilt compacted, so indexed variables stay
//! deduplicated against the new topology. The per-variable passes run
//! in parallel over a `rayon` pool and are merged by name afterwards.
//!
//! # Example
//!
//! ```
//! use primitive_types::{AttributeData, Interpolation, MeshPrimitive, PrimitiveVariable};
//! use primitive_delete::delete_faces;
//!
//! let mesh = MeshPrimitive::new(vec![3, 3], vec![0, 1, 2, 0, 2, 3]).unwrap();
//! let flags = PrimitiveVariable::new(
//!     Interpolation::Uniform,
//!     AttributeData::Bool(vec![true, false]),
//! );
//! let remaining = delete_faces(&mesh, &flags, false, None).unwrap();
//! assert_eq!(remaining.num_faces(), 1);
//! assert_eq!(remaining.num_points(), 3);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod common;
mod curves;
mod error;
mod mesh;
mod points;

pub use curves::delete_curves;
pub use error::{DeleteError, DeleteResult};
pub use mesh::delete_faces;
pub use points::delete_points;
