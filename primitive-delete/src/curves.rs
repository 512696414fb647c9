//! Deletion of flagged curves.

use tracing::debug;

use primitive_types::{
    Canceller, CurvesPrimitive, Interpolation, PrimitiveTopology, PrimitiveVariable,
};

use crate::common::{filter_variables, keep_mask, kept_positions};
use crate::{DeleteError, DeleteResult};

/// Delete the curves flagged by `curves_to_delete`, a Uniform-level
/// bool/int/float variable. With `invert`, delete the unflagged curves
/// instead.
///
/// Vertex and varying level variables are filtered at per-curve
/// granularity (a curve keeps or loses all of its values together) and
/// rebuilt compacted; `Constant` variables pass through unchanged.
///
/// # Errors
///
/// Returns an error if the flag variable has the wrong level or type,
/// any variable is inconsistent with the network, or the operation is
/// cancelled.
pub fn delete_curves(
    curves: &CurvesPrimitive,
    curves_to_delete: &PrimitiveVariable,
    invert: bool,
    canceller: Option<&Canceller>,
) -> DeleteResult<CurvesPrimitive> {
    if curves_to_delete.interpolation != Interpolation::Uniform
        || curves_to_delete.size() != curves.num_curves()
    {
        return Err(DeleteError::InvalidFlag {
            expected: "uniform",
            actual: format!(
                "{} variable of {} elements",
                curves_to_delete.interpolation,
                curves_to_delete.size()
            ),
        });
    }

    let mask = keep_mask(curves_to_delete, "uniform", invert)?;
    let uniform_kept = kept_positions(&mask);
    debug!(
        curves = curves.num_curves(),
        kept = uniform_kept.len(),
        "deleting flagged curves"
    );

    // Expand the per-curve mask to per-vertex and per-varying
    // position lists over the old topology.
    let mut vertex_kept = Vec::new();
    let mut varying_kept = Vec::new();
    let mut vertex_offset = 0;
    let mut varying_offset = 0;
    for (curve, &keep) in mask.iter().enumerate() {
        let num_vertices = curves.vertices_per_curve()[curve];
        let varying_size = curves.varying_size(curve);
        if keep {
            vertex_kept.extend(vertex_offset..vertex_offset + num_vertices);
            varying_kept.extend(varying_offset..varying_offset + varying_size);
        }
        vertex_offset += num_vertices;
        varying_offset += varying_size;
    }

    let variables = filter_variables(
        &curves.variables,
        |interpolation| curves.variable_size(interpolation),
        |interpolation| match interpolation {
            Interpolation::Uniform => Some(uniform_kept.as_slice()),
            Interpolation::Vertex => Some(vertex_kept.as_slice()),
            Interpolation::Varying | Interpolation::FaceVarying => Some(varying_kept.as_slice()),
            Interpolation::Constant => None,
        },
        canceller,
    )?;

    let new_vertices_per_curve = uniform_kept
        .iter()
        .map(|&curve| curves.vertices_per_curve()[curve])
        .collect();
    let mut result = CurvesPrimitive::new(
        new_vertices_per_curve,
        curves.basis().clone(),
        curves.periodic(),
    )
    .map_err(DeleteError::Type)?;
    result.variables = variables;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use primitive_types::{AttributeData, CubicBasis};

    fn network() -> CurvesPrimitive {
        let mut curves =
            CurvesPrimitive::new(vec![2, 3, 2], CubicBasis::linear(), false).unwrap();
        curves.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3(
                    (0..7)
                        .map(|i| Vector3::new(f64::from(i), 0.0, 0.0))
                        .collect(),
                ),
            ),
        );
        curves.variables.insert(
            "id".to_string(),
            PrimitiveVariable::new(Interpolation::Uniform, AttributeData::Int(vec![0, 1, 2])),
        );
        curves.variables.insert(
            "speed".to_string(),
            PrimitiveVariable::new(
                Interpolation::Varying,
                AttributeData::Float(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            ),
        );
        curves
    }

    #[test]
    fn deletes_flagged_curves() {
        let curves = network();
        let flags = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::Bool(vec![false, true, false]),
        );
        let result = delete_curves(&curves, &flags, false, None).unwrap();

        assert_eq!(result.num_curves(), 2);
        assert_eq!(result.vertices_per_curve(), &[2, 2]);
        assert_eq!(result.variables["id"].data, AttributeData::Int(vec![0, 2]));
        assert_eq!(
            result.variables["speed"].data,
            AttributeData::Float(vec![0.0, 1.0, 5.0, 6.0])
        );

        // Topology invariant: vertex variables match the new counts.
        let vertex_total: usize = result.vertices_per_curve().iter().sum();
        assert_eq!(result.variables["P"].data.len(), vertex_total);
    }

    #[test]
    fn float_flags_and_invert() {
        let curves = network();
        let flags = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::Float(vec![0.0, 1.0, 1.0]),
        );
        let kept = delete_curves(&curves, &flags, false, None).unwrap();
        let dropped = delete_curves(&curves, &flags, true, None).unwrap();

        assert_eq!(kept.num_curves() + dropped.num_curves(), 3);
        let AttributeData::Int(kept_ids) = &kept.variables["id"].data else {
            panic!("expected int ids");
        };
        let AttributeData::Int(dropped_ids) = &dropped.variables["id"].data else {
            panic!("expected int ids");
        };
        assert_eq!(kept_ids, &vec![0]);
        assert_eq!(dropped_ids, &vec![1, 2]);
    }

    #[test]
    fn indexed_flag_variable() {
        let curves = network();
        let flags = PrimitiveVariable::indexed(
            Interpolation::Uniform,
            AttributeData::Bool(vec![true, false]),
            vec![0, 1, 0],
        );
        let result = delete_curves(&curves, &flags, false, None).unwrap();
        assert_eq!(result.num_curves(), 1);
        assert_eq!(result.vertices_per_curve(), &[3]);
    }

    #[test]
    fn rejects_vertex_flags() {
        let curves = network();
        let flags = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Bool(vec![false; 7]),
        );
        assert!(matches!(
            delete_curves(&curves, &flags, false, None),
            Err(DeleteError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn rejects_inconsistent_variable() {
        let mut curves = network();
        curves.variables.insert(
            "bad".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![1.0])),
        );
        let flags = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::Bool(vec![false, false, false]),
        );
        assert!(delete_curves(&curves, &flags, false, None).is_err());
    }
}
