//! Deletion of flagged points.

use tracing::debug;

use primitive_types::{
    Canceller, Interpolation, PointsPrimitive, PrimitiveTopology, PrimitiveVariable,
};

use crate::common::{filter_variables, keep_mask, kept_positions};
use crate::{DeleteError, DeleteResult};

/// Delete the points flagged by `points_to_delete`, a Vertex-level
/// bool/int/float variable. With `invert`, delete the unflagged points
/// instead.
///
/// Every per-point variable is filtered and rebuilt compacted;
/// `Uniform` and `Constant` variables pass through unchanged.
///
/// # Errors
///
/// Returns an error if the flag variable has the wrong level or type,
/// any per-point variable is inconsistent with the cloud, or the
/// operation is cancelled.
pub fn delete_points(
    points: &PointsPrimitive,
    points_to_delete: &PrimitiveVariable,
    invert: bool,
    canceller: Option<&Canceller>,
) -> DeleteResult<PointsPrimitive> {
    if points_to_delete.interpolation != Interpolation::Vertex
        || points_to_delete.size() != points.num_points()
    {
        return Err(DeleteError::InvalidFlag {
            expected: "vertex",
            actual: format!(
                "{} variable of {} elements",
                points_to_delete.interpolation,
                points_to_delete.size()
            ),
        });
    }

    let mask = keep_mask(points_to_delete, "vertex", invert)?;
    let kept = kept_positions(&mask);
    debug!(
        points = points.num_points(),
        kept = kept.len(),
        "deleting flagged points"
    );

    let variables = filter_variables(
        &points.variables,
        |interpolation| points.variable_size(interpolation),
        |interpolation| match interpolation {
            Interpolation::Vertex | Interpolation::Varying | Interpolation::FaceVarying => {
                Some(kept.as_slice())
            }
            Interpolation::Constant | Interpolation::Uniform => None,
        },
        canceller,
    )?;

    let mut result = PointsPrimitive::new(kept.len());
    result.variables = variables;
    Ok(result)
}
