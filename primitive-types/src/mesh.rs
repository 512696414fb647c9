//! Indexed polygon mesh primitive.

use std::collections::BTreeMap;

use crate::{
    Interpolation, PrimitiveError, PrimitiveResult, PrimitiveTopology, PrimitiveVariable,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Subdivision scheme a mesh's faces describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshInterpolation {
    /// Faces are flat polygons.
    #[default]
    Linear,
    /// Faces are a Catmull-Clark subdivision cage.
    CatmullClark,
}

impl MeshInterpolation {
    /// Conventional lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::CatmullClark => "catmullClark",
        }
    }
}

/// An indexed polygon mesh.
///
/// Faces are described by a per-face vertex count and a flat list of
/// vertex ids; points are shared between faces. Optional corner and
/// crease sharpness tables refine subdivision behaviour.
///
/// # Example
///
/// ```
/// use primitive_types::{Interpolation, MeshPrimitive, PrimitiveTopology};
///
/// // Two triangles sharing an edge over four points.
/// let mesh = MeshPrimitive::new(vec![3, 3], vec![0, 1, 2, 0, 2, 3]).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_points(), 4);
/// assert_eq!(mesh.variable_size(Interpolation::FaceVarying), 6);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshPrimitive {
    vertices_per_face: Vec<usize>,
    vertex_ids: Vec<usize>,
    num_points: usize,
    interpolation: MeshInterpolation,
    corner_ids: Vec<usize>,
    corner_sharpnesses: Vec<f64>,
    crease_lengths: Vec<usize>,
    crease_ids: Vec<usize>,
    crease_sharpnesses: Vec<f64>,
    /// Named attributes, keyed for order-insensitive merging.
    pub variables: BTreeMap<String, PrimitiveVariable>,
}

impl MeshPrimitive {
    /// Create a linearly interpolated mesh from its face topology.
    ///
    /// # Errors
    ///
    /// Returns an error if `vertex_ids` does not match
    /// `sum(vertices_per_face)` or any face has fewer than three
    /// vertices.
    pub fn new(vertices_per_face: Vec<usize>, vertex_ids: Vec<usize>) -> PrimitiveResult<Self> {
        Self::with_interpolation(vertices_per_face, vertex_ids, MeshInterpolation::Linear)
    }

    /// Create a mesh with an explicit interpolation scheme.
    ///
    /// # Errors
    ///
    /// See [`MeshPrimitive::new`].
    pub fn with_interpolation(
        vertices_per_face: Vec<usize>,
        vertex_ids: Vec<usize>,
        interpolation: MeshInterpolation,
    ) -> PrimitiveResult<Self> {
        let expected: usize = vertices_per_face.iter().sum();
        if vertex_ids.len() != expected {
            return Err(PrimitiveError::invalid_topology(format!(
                "vertex id count {} does not match face vertex total {expected}",
                vertex_ids.len()
            )));
        }
        if let Some((face, &nv)) = vertices_per_face
            .iter()
            .enumerate()
            .find(|(_, &nv)| nv < 3)
        {
            return Err(PrimitiveError::invalid_topology(format!(
                "face {face} has {nv} vertices, minimum is 3"
            )));
        }
        let num_points = vertex_ids.iter().max().map_or(0, |&m| m + 1);
        Ok(Self {
            vertices_per_face,
            vertex_ids,
            num_points,
            interpolation,
            corner_ids: Vec::new(),
            corner_sharpnesses: Vec::new(),
            crease_lengths: Vec::new(),
            crease_ids: Vec::new(),
            crease_sharpnesses: Vec::new(),
            variables: BTreeMap::new(),
        })
    }

    /// The number of faces.
    #[inline]
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.vertices_per_face.len()
    }

    /// The number of shared points, `max(vertex_ids) + 1`.
    #[inline]
    #[must_use]
    pub const fn num_points(&self) -> usize {
        self.num_points
    }

    /// Per-face vertex counts.
    #[inline]
    #[must_use]
    pub fn vertices_per_face(&self) -> &[usize] {
        &self.vertices_per_face
    }

    /// Flat per-face-corner point ids.
    #[inline]
    #[must_use]
    pub fn vertex_ids(&self) -> &[usize] {
        &self.vertex_ids
    }

    /// The interpolation scheme.
    #[inline]
    #[must_use]
    pub const fn interpolation(&self) -> MeshInterpolation {
        self.interpolation
    }

    /// Attach sharp corners: one sharpness per corner point id.
    ///
    /// # Errors
    ///
    /// Returns an error on count mismatch or out-of-range ids.
    pub fn set_corners(&mut self, ids: Vec<usize>, sharpnesses: Vec<f64>) -> PrimitiveResult<()> {
        if ids.len() != sharpnesses.len() {
            return Err(PrimitiveError::invalid_topology(format!(
                "{} corner ids with {} sharpnesses",
                ids.len(),
                sharpnesses.len()
            )));
        }
        if let Some(&bad) = ids.iter().find(|&&id| id >= self.num_points) {
            return Err(PrimitiveError::invalid_topology(format!(
                "corner id {bad} exceeds point count {}",
                self.num_points
            )));
        }
        self.corner_ids = ids;
        self.corner_sharpnesses = sharpnesses;
        Ok(())
    }

    /// Attach creases: runs of point ids with one sharpness per run.
    ///
    /// # Errors
    ///
    /// Returns an error if `ids` does not match `sum(lengths)`, any run
    /// is shorter than two points, the sharpness count differs from the
    /// run count, or an id is out of range.
    pub fn set_creases(
        &mut self,
        lengths: Vec<usize>,
        ids: Vec<usize>,
        sharpnesses: Vec<f64>,
    ) -> PrimitiveResult<()> {
        let expected: usize = lengths.iter().sum();
        if ids.len() != expected {
            return Err(PrimitiveError::invalid_topology(format!(
                "crease id count {} does not match run total {expected}",
                ids.len()
            )));
        }
        if lengths.iter().any(|&len| len < 2) {
            return Err(PrimitiveError::invalid_topology(
                "crease runs must contain at least two points",
            ));
        }
        if sharpnesses.len() != lengths.len() {
            return Err(PrimitiveError::invalid_topology(format!(
                "{} crease runs with {} sharpnesses",
                lengths.len(),
                sharpnesses.len()
            )));
        }
        if let Some(&bad) = ids.iter().find(|&&id| id >= self.num_points) {
            return Err(PrimitiveError::invalid_topology(format!(
                "crease id {bad} exceeds point count {}",
                self.num_points
            )));
        }
        self.crease_lengths = lengths;
        self.crease_ids = ids;
        self.crease_sharpnesses = sharpnesses;
        Ok(())
    }

    /// Sharp corner point ids.
    #[must_use]
    pub fn corner_ids(&self) -> &[usize] {
        &self.corner_ids
    }

    /// Per-corner sharpness values.
    #[must_use]
    pub fn corner_sharpnesses(&self) -> &[f64] {
        &self.corner_sharpnesses
    }

    /// Crease run lengths.
    #[must_use]
    pub fn crease_lengths(&self) -> &[usize] {
        &self.crease_lengths
    }

    /// Flat crease point ids, `sum(crease_lengths)` long.
    #[must_use]
    pub fn crease_ids(&self) -> &[usize] {
        &self.crease_ids
    }

    /// Per-run crease sharpness values.
    #[must_use]
    pub fn crease_sharpnesses(&self) -> &[f64] {
        &self.crease_sharpnesses
    }

    /// Whether every face is a triangle.
    #[must_use]
    pub fn is_triangulated(&self) -> bool {
        self.vertices_per_face.iter().all(|&nv| nv == 3)
    }
}

impl PrimitiveTopology for MeshPrimitive {
    fn variable_size(&self, interpolation: Interpolation) -> usize {
        match interpolation {
            Interpolation::Constant => 1,
            Interpolation::Uniform => self.num_faces(),
            Interpolation::Vertex | Interpolation::Varying => self.num_points,
            Interpolation::FaceVarying => self.vertex_ids.len(),
        }
    }

    fn variables(&self) -> &BTreeMap<String, PrimitiveVariable> {
        &self.variables
    }

    fn variables_mut(&mut self) -> &mut BTreeMap<String, PrimitiveVariable> {
        &mut self.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangle_quad() -> MeshPrimitive {
        MeshPrimitive::new(vec![3, 3], vec![0, 1, 2, 0, 2, 3]).unwrap()
    }

    #[test]
    fn sizes() {
        let mesh = two_triangle_quad();
        assert_eq!(mesh.variable_size(Interpolation::Uniform), 2);
        assert_eq!(mesh.variable_size(Interpolation::Vertex), 4);
        assert_eq!(mesh.variable_size(Interpolation::Varying), 4);
        assert_eq!(mesh.variable_size(Interpolation::FaceVarying), 6);
    }

    #[test]
    fn rejects_mismatched_vertex_ids() {
        assert!(MeshPrimitive::new(vec![3], vec![0, 1]).is_err());
        assert!(MeshPrimitive::new(vec![2], vec![0, 1]).is_err());
    }

    #[test]
    fn corners_and_creases_validate() {
        let mut mesh = two_triangle_quad();
        assert!(mesh.set_corners(vec![0, 3], vec![2.0, 5.0]).is_ok());
        assert!(mesh.set_corners(vec![9], vec![1.0]).is_err());
        assert!(mesh.set_corners(vec![1], vec![]).is_err());

        assert!(mesh
            .set_creases(vec![3], vec![0, 1, 2], vec![4.0])
            .is_ok());
        assert!(mesh.set_creases(vec![1], vec![0], vec![4.0]).is_err());
        assert!(mesh
            .set_creases(vec![2], vec![0, 1], vec![4.0, 5.0])
            .is_err());
    }

    #[test]
    fn triangulation_check() {
        assert!(two_triangle_quad().is_triangulated());
        let quad = MeshPrimitive::new(vec![4], vec![0, 1, 2, 3]).unwrap();
        assert!(!quad.is_triangulated());
    }
}
