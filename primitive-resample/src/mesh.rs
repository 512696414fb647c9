//! Interpolation-level conversion for meshes.

use primitive_types::{
    check_cancelled, dispatch_numeric_data, AttributeData, Canceller, Interpolation,
    MeshPrimitive, PrimitiveTopology, PrimitiveVariable,
};

use crate::common::{group_average, indices_to_data, install, replicate, scatter_average};
use crate::{ResampleError, ResampleResult};

const fn is_vertex_like(interpolation: Interpolation) -> bool {
    matches!(
        interpolation,
        Interpolation::Vertex | Interpolation::Varying
    )
}

/// Convert `variable` to `interpolation` in place against `mesh`.
///
/// On meshes, `Vertex` and `Varying` are topological synonyms (one
/// value per shared point) while `FaceVarying` is one value per face
/// corner. Down-sampling averages (per face, or per point by
/// incidence); promotion to `FaceVarying` gathers through the vertex
/// ids; `Uniform` up-samples onto points by incidence-averaging the
/// adjacent face values.
///
/// Indexed variables resample their index table where the conversion
/// is a pure gather, replication or identity (promotion to
/// `FaceVarying` and the `Vertex` <-> `Varying` identity); every
/// averaging path expands the indices first and discards them.
///
/// # Errors
///
/// Returns an error for non-numeric data on arithmetic paths or when
/// cancelled.
pub fn resample_primitive_variable(
    mesh: &MeshPrimitive,
    variable: &mut PrimitiveVariable,
    interpolation: Interpolation,
    canceller: Option<&Canceller>,
) -> ResampleResult<()> {
    check_cancelled(canceller).map_err(ResampleError::Type)?;

    let source_interpolation = variable.interpolation;
    if source_interpolation == interpolation {
        return Ok(());
    }

    if interpolation == Interpolation::Constant {
        let averaged = variable.expanded_data().average()?;
        *variable = PrimitiveVariable::new(interpolation, averaged);
        return Ok(());
    }

    if source_interpolation == Interpolation::Constant {
        let broadcast = variable
            .expanded_data()
            .broadcast(mesh.variable_size(interpolation))?;
        *variable = PrimitiveVariable::new(interpolation, broadcast);
        return Ok(());
    }

    // An index table can stand in for the values only where the
    // conversion never mixes elements arithmetically.
    let index_preserving = matches!(
        (source_interpolation, interpolation),
        (Interpolation::Uniform, Interpolation::FaceVarying)
    ) || (is_vertex_like(source_interpolation)
        && (interpolation == Interpolation::FaceVarying || is_vertex_like(interpolation)));

    let (source, via_indices) = match &variable.indices {
        Some(indices) if index_preserving => (indices_to_data(indices), true),
        Some(_) => {
            let expanded = variable.expanded_data();
            variable.indices = None;
            (expanded, false)
        }
        None => (variable.data.clone(), false),
    };

    let vertices_per_face = mesh.vertices_per_face();
    let vertex_ids = mesh.vertex_ids();
    let num_points = mesh.num_points();

    let output = match (source_interpolation, interpolation) {
        (s, Interpolation::Uniform) if is_vertex_like(s) => {
            dispatch_numeric_data!(&source, "vertex to uniform averaging", |v| {
                face_average_by_ids(v, vertices_per_face, vertex_ids)
            })?
        }
        (Interpolation::FaceVarying, Interpolation::Uniform) => {
            dispatch_numeric_data!(&source, "face-varying to uniform averaging", |v| {
                group_average(v, vertices_per_face)
            })?
        }
        (Interpolation::Uniform, t) if is_vertex_like(t) => {
            dispatch_numeric_data!(&source, "uniform to vertex averaging", |v| {
                scatter_average(
                    &replicate(v, vertices_per_face),
                    vertex_ids,
                    num_points,
                )
            })?
        }
        (Interpolation::FaceVarying, t) if is_vertex_like(t) => {
            dispatch_numeric_data!(&source, "face-varying to vertex averaging", |v| {
                scatter_average(v, vertex_ids, num_points)
            })?
        }
        (Interpolation::Uniform, Interpolation::FaceVarying) => {
            dispatch_numeric_data!(&source, "uniform to face-varying replication", |v| {
                replicate(v, vertices_per_face)
            })?
        }
        (s, Interpolation::FaceVarying) if is_vertex_like(s) => source.gather(vertex_ids),
        (s, t) if is_vertex_like(s) && is_vertex_like(t) => source,
        (from, to) => return Err(ResampleError::UnsupportedConversion { from, to }),
    };

    install(variable, interpolation, output, via_indices);
    Ok(())
}

/// Per-face mean of point values addressed through the face's vertex
/// ids, seeded with the first corner's value.
fn face_average_by_ids<T: primitive_types::NumericElement>(
    values: &[T],
    vertices_per_face: &[usize],
    vertex_ids: &[usize],
) -> Vec<T> {
    let mut out = Vec::with_capacity(vertices_per_face.len());
    let mut offset = 0;
    for &count in vertices_per_face {
        let mut total = values[vertex_ids[offset]];
        for &id in &vertex_ids[offset + 1..offset + count] {
            total.accumulate(&values[id]);
        }
        out.push(total.divide(count));
        offset += count;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing the edge 0-2 over four points.
    fn two_triangle_quad() -> MeshPrimitive {
        MeshPrimitive::new(vec![3, 3], vec![0, 1, 2, 0, 2, 3]).unwrap()
    }

    #[test]
    fn vertex_to_uniform_averages_face_corners() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Float(vec![0.0, 3.0, 6.0, 9.0]),
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::Uniform, None)
            .unwrap();
        assert_eq!(variable.data, AttributeData::Float(vec![3.0, 5.0]));
    }

    #[test]
    fn uniform_to_vertex_averages_incident_faces() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::Float(vec![2.0, 6.0]),
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        // Points 0 and 2 touch both faces; 1 only the first; 3 only the second.
        assert_eq!(
            variable.data,
            AttributeData::Float(vec![4.0, 2.0, 4.0, 6.0])
        );
    }

    #[test]
    fn vertex_to_face_varying_gathers() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Float(vec![0.0, 1.0, 2.0, 3.0]),
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::FaceVarying, None)
            .unwrap();
        assert_eq!(
            variable.data,
            AttributeData::Float(vec![0.0, 1.0, 2.0, 0.0, 2.0, 3.0])
        );
    }

    #[test]
    fn face_varying_to_vertex_scatter_averages() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::FaceVarying,
            AttributeData::Float(vec![1.0, 2.0, 3.0, 5.0, 7.0, 4.0]),
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        // Point 0 gets corners 0 and 3; point 2 corners 2 and 4.
        assert_eq!(
            variable.data,
            AttributeData::Float(vec![3.0, 2.0, 5.0, 4.0])
        );
    }

    #[test]
    fn face_varying_to_uniform_averages_per_face() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::FaceVarying,
            AttributeData::Float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::Uniform, None)
            .unwrap();
        assert_eq!(variable.data, AttributeData::Float(vec![2.0, 5.0]));
    }

    #[test]
    fn indexed_promotion_resamples_indices() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::Vertex,
            AttributeData::String(vec!["x".to_string(), "y".to_string()]),
            vec![0, 1, 0, 1],
        );
        let expanded_via_ids = variable.expanded_data().gather(mesh.vertex_ids());
        resample_primitive_variable(&mesh, &mut variable, Interpolation::FaceVarying, None)
            .unwrap();
        assert_eq!(variable.indices, Some(vec![0, 1, 0, 0, 0, 1]));
        // Identical expanded values to operating on expanded data.
        assert_eq!(variable.expanded_data(), expanded_via_ids);
    }

    #[test]
    fn indexed_downsampling_expands_first() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::FaceVarying,
            AttributeData::Float(vec![6.0, 12.0]),
            vec![0, 0, 1, 1, 1, 0],
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::Uniform, None)
            .unwrap();
        assert_eq!(variable.indices, None);
        assert_eq!(variable.data, AttributeData::Float(vec![8.0, 10.0]));
    }

    #[test]
    fn vertex_varying_identity() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Varying,
            AttributeData::Int(vec![1, 2, 3, 4]),
        );
        resample_primitive_variable(&mesh, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        assert_eq!(variable.interpolation, Interpolation::Vertex);
        assert_eq!(variable.data, AttributeData::Int(vec![1, 2, 3, 4]));
    }

    #[test]
    fn averaging_strings_fails() {
        let mesh = two_triangle_quad();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::String(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
        );
        assert!(resample_primitive_variable(
            &mesh,
            &mut variable,
            Interpolation::Uniform,
            None
        )
        .is_err());
    }
}
