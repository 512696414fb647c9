//! Deletion of flagged faces.

use tracing::debug;

use primitive_types::{
    Canceller, Interpolation, MeshPrimitive, PrimitiveTopology, PrimitiveVariable,
};

use crate::common::{filter_variables, keep_mask, kept_positions};
use crate::{DeleteError, DeleteResult};

/// Delete the faces flagged by `faces_to_delete`, a Uniform-level
/// bool/int/float variable. With `invert`, delete the unflagged faces
/// instead.
///
/// Points referenced only by deleted faces are removed and the
/// surviving `vertex_ids` are remapped onto the compacted point table;
/// corner and crease tables are remapped the same way, a crease run
/// being dropped entirely if any of its points is removed. Every
/// variable is filtered at its level's granularity and rebuilt
/// compacted; `Constant` variables pass through unchanged.
///
/// # Errors
///
/// Returns an error if the flag variable has the wrong level or type,
/// any variable is inconsistent with the mesh, or the operation is
/// cancelled.
pub fn delete_faces(
    mesh: &MeshPrimitive,
    faces_to_delete: &PrimitiveVariable,
    invert: bool,
    canceller: Option<&Canceller>,
) -> DeleteResult<MeshPrimitive> {
    if faces_to_delete.interpolation != Interpolation::Uniform
        || faces_to_delete.size() != mesh.num_faces()
    {
        return Err(DeleteError::InvalidFlag {
            expected: "uniform",
            actual: format!(
                "{} variable of {} elements",
                faces_to_delete.interpolation,
                faces_to_delete.size()
            ),
        });
    }

    let mask = keep_mask(faces_to_delete, "uniform", invert)?;
    let uniform_kept = kept_positions(&mask);

    // Per-face-vertex positions of the surviving faces, and the set of
    // points they still reference.
    let vertex_ids = mesh.vertex_ids();
    let mut face_varying_kept = Vec::new();
    let mut used_points = vec![false; mesh.num_points()];
    let mut offset = 0;
    for (face, &keep) in mask.iter().enumerate() {
        let num_vertices = mesh.vertices_per_face()[face];
        if keep {
            for corner in offset..offset + num_vertices {
                face_varying_kept.push(corner);
                used_points[vertex_ids[corner]] = true;
            }
        }
        offset += num_vertices;
    }

    // Old point index -> new compact index.
    let mut remapping: Vec<Option<usize>> = vec![None; mesh.num_points()];
    let mut vertex_kept = Vec::new();
    for (point, &used) in used_points.iter().enumerate() {
        if used {
            remapping[point] = Some(vertex_kept.len());
            vertex_kept.push(point);
        }
    }

    debug!(
        faces = mesh.num_faces(),
        kept_faces = uniform_kept.len(),
        kept_points = vertex_kept.len(),
        "deleting flagged faces"
    );

    let new_vertices_per_face: Vec<usize> = uniform_kept
        .iter()
        .map(|&face| mesh.vertices_per_face()[face])
        .collect();
    let new_vertex_ids: Vec<usize> = face_varying_kept
        .iter()
        .map(|&corner| {
            remapping[vertex_ids[corner]].unwrap_or_default() // used by construction
        })
        .collect();

    let variables = filter_variables(
        &mesh.variables,
        |interpolation| mesh.variable_size(interpolation),
        |interpolation| match interpolation {
            Interpolation::Uniform => Some(uniform_kept.as_slice()),
            Interpolation::Vertex | Interpolation::Varying => Some(vertex_kept.as_slice()),
            Interpolation::FaceVarying => Some(face_varying_kept.as_slice()),
            Interpolation::Constant => None,
        },
        canceller,
    )?;

    let mut result = MeshPrimitive::with_interpolation(
        new_vertices_per_face,
        new_vertex_ids,
        mesh.interpolation(),
    )
    .map_err(DeleteError::Type)?;
    result.variables = variables;

    // Corners survive when their point does.
    let mut corner_ids = Vec::new();
    let mut corner_sharpnesses = Vec::new();
    for (&id, &sharpness) in mesh.corner_ids().iter().zip(mesh.corner_sharpnesses()) {
        if let Some(new_id) = remapping[id] {
            corner_ids.push(new_id);
            corner_sharpnesses.push(sharpness);
        }
    }
    if !corner_ids.is_empty() {
        result
            .set_corners(corner_ids, corner_sharpnesses)
            .map_err(DeleteError::Type)?;
    }

    // A crease run survives only if every point along it does.
    let mut crease_lengths = Vec::new();
    let mut crease_ids = Vec::new();
    let mut crease_sharpnesses = Vec::new();
    let mut run_start = 0;
    for (&length, &sharpness) in mesh.crease_lengths().iter().zip(mesh.crease_sharpnesses()) {
        let run = &mesh.crease_ids()[run_start..run_start + length];
        if run.iter().all(|&id| remapping[id].is_some()) {
            crease_lengths.push(length);
            crease_ids.extend(run.iter().map(|&id| remapping[id].unwrap_or_default()));
            crease_sharpnesses.push(sharpness);
        }
        run_start += length;
    }
    if !crease_lengths.is_empty() {
        result
            .set_creases(crease_lengths, crease_ids, crease_sharpnesses)
            .map_err(DeleteError::Type)?;
    }

    Ok(result)
}
