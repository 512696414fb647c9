//! Mesh evaluator: closest point, ray intersection, UV lookup and mass
//! properties.

use std::sync::OnceLock;

use nalgebra::{Point3, Vector2, Vector3};
use tracing::debug;

use primitive_types::{
    AttributeData, Interpolation, MeshPrimitive, PrimitiveTopology, PrimitiveVariable,
};

use crate::bound_tree::{BoundTree, NodeKind};
use crate::sample::{impl_result_sampling, Contributions};
use crate::triangle::{closest_point_on_triangle, ray_triangle_intersect, triangle_normal};
use crate::{Aabb, EvalError, EvalResult};

/// Distances closer than this to the surface report a signed distance
/// of zero, avoiding sign flicker from the normal classification.
const SIGNED_DISTANCE_EPSILON: f64 = 1e-9;

/// One triangle of the internal triangulation, remembering the source
/// face and the face-vertex positions it was fanned from.
#[derive(Debug, Clone)]
struct MeshTriangle {
    vertex_ids: [usize; 3],
    face_varying_ids: [usize; 3],
    face_index: usize,
}

/// Where the `uv` variable's values live.
#[derive(Debug, Clone, Copy)]
enum UvSource {
    FaceVarying,
    Vertex,
}

#[derive(Debug)]
struct UvSet {
    values: Vec<Vector2<f64>>,
    source: UvSource,
}

#[derive(Debug, Clone, Copy)]
struct MassProperties {
    volume: f64,
    center_of_gravity: Point3<f64>,
    surface_area: f64,
}

/// Spatial queries against an immutable snapshot of a mesh.
///
/// The mesh is triangulated internally at construction (a fan per
/// face); query results report both the triangle and the source face.
/// The triangle tree, the UV lookup tree and the mass-properties sweep
/// are each computed at most once, on first use, and shared read-only
/// afterwards; concurrent queries are safe provided each thread uses
/// its own [`MeshResult`].
#[derive(Debug)]
pub struct MeshEvaluator {
    mesh: MeshPrimitive,
    p: Vec<Point3<f64>>,
    triangles: Vec<MeshTriangle>,
    uv: Option<UvSet>,
    tree: OnceLock<BoundTree>,
    uv_tree: OnceLock<BoundTree>,
    mass: OnceLock<MassProperties>,
}

/// Scratch state of the last query against a [`MeshEvaluator`].
#[derive(Debug, Clone)]
pub struct MeshResult {
    triangle_index: usize,
    face_index: usize,
    barycentric: [f64; 3],
    vertex_ids: [usize; 3],
    face_varying_ids: [usize; 3],
    position: Point3<f64>,
    normal: Vector3<f64>,
    uv: Vector2<f64>,
}

impl Default for MeshResult {
    fn default() -> Self {
        Self {
            triangle_index: 0,
            face_index: 0,
            barycentric: [0.0; 3],
            vertex_ids: [0; 3],
            face_varying_ids: [0; 3],
            position: Point3::origin(),
            normal: Vector3::zeros(),
            uv: Vector2::zeros(),
        }
    }
}

impl MeshResult {
    /// The triangle of the internal triangulation that was hit.
    #[must_use]
    pub const fn triangle_index(&self) -> usize {
        self.triangle_index
    }

    /// The source face that triangle was fanned from.
    #[must_use]
    pub const fn face_index(&self) -> usize {
        self.face_index
    }

    /// Barycentric coordinates of the query point in the triangle.
    #[must_use]
    pub const fn barycentric_coordinates(&self) -> [f64; 3] {
        self.barycentric
    }

    /// The point ids of the triangle's corners.
    #[must_use]
    pub const fn vertex_ids(&self) -> [usize; 3] {
        self.vertex_ids
    }

    /// The query position on the mesh surface.
    #[must_use]
    pub const fn point(&self) -> Point3<f64> {
        self.position
    }

    /// The geometric normal of the hit triangle.
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// The interpolated `uv` coordinates of the query point, when the
    /// mesh carries a `uv` variable; zero otherwise.
    #[must_use]
    pub const fn uv(&self) -> Vector2<f64> {
        self.uv
    }

    fn contributions(&self, interpolation: Interpolation) -> Contributions {
        match interpolation {
            Interpolation::Constant => Contributions::single(0),
            Interpolation::Uniform => Contributions::single(self.face_index),
            Interpolation::Vertex | Interpolation::Varying => {
                Contributions::triple(self.vertex_ids, self.barycentric)
            }
            Interpolation::FaceVarying => {
                Contributions::triple(self.face_varying_ids, self.barycentric)
            }
        }
    }
}

impl_result_sampling!(MeshResult);

impl MeshEvaluator {
    /// Create an evaluator over a snapshot of `mesh`.
    ///
    /// Faces are fan-triangulated; a `uv` variable of Vec2 data at
    /// FaceVarying or Vertex/Varying interpolation is picked up for
    /// [`point_at_uv`](MeshEvaluator::point_at_uv) and result uv
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is inconsistent with the mesh
    /// topology, the mesh has no `P` variable, or `P` is not a
    /// per-point Vec3 array.
    pub fn new(mesh: &MeshPrimitive) -> EvalResult<Self> {
        mesh.validate_variables()?;
        let p_var = mesh
            .variables
            .get("P")
            .ok_or(EvalError::MissingVariable("P"))?;
        let AttributeData::Vec3(values) = p_var.expanded_data() else {
            return Err(EvalError::WrongType {
                expected: "Vec3",
                actual: p_var.data.type_name(),
            });
        };
        if values.len() != mesh.num_points() {
            return Err(EvalError::SizeMismatch {
                expected: mesh.num_points(),
                actual: values.len(),
            });
        }

        let mut triangles = Vec::new();
        let ids = mesh.vertex_ids();
        let mut offset = 0;
        for (face_index, &num_vertices) in mesh.vertices_per_face().iter().enumerate() {
            for j in 1..num_vertices - 1 {
                triangles.push(MeshTriangle {
                    vertex_ids: [ids[offset], ids[offset + j], ids[offset + j + 1]],
                    face_varying_ids: [offset, offset + j, offset + j + 1],
                    face_index,
                });
            }
            offset += num_vertices;
        }
        debug!(
            faces = mesh.num_faces(),
            triangles = triangles.len(),
            "triangulated mesh for evaluation"
        );

        let uv = mesh.variables.get("uv").and_then(|var| {
            let AttributeData::Vec2(uv_values) = var.expanded_data() else {
                return None;
            };
            let source = match var.interpolation {
                Interpolation::FaceVarying => UvSource::FaceVarying,
                Interpolation::Vertex | Interpolation::Varying => UvSource::Vertex,
                _ => return None,
            };
            Some(UvSet {
                values: uv_values,
                source,
            })
        });

        Ok(Self {
            mesh: mesh.clone(),
            p: values.into_iter().map(Point3::from).collect(),
            triangles,
            uv,
            tree: OnceLock::new(),
            uv_tree: OnceLock::new(),
            mass: OnceLock::new(),
        })
    }

    /// The evaluator's own snapshot of the mesh.
    #[must_use]
    pub const fn primitive(&self) -> &MeshPrimitive {
        &self.mesh
    }

    /// Allocate an empty result for queries against this evaluator.
    #[must_use]
    pub fn create_result(&self) -> MeshResult {
        MeshResult::default()
    }

    /// Check that `variable` fits this evaluator's primitive, once,
    /// before issuing many queries that sample it.
    ///
    /// # Errors
    ///
    /// Returns an error describing the size mismatch.
    pub fn validate_variable(&self, variable: &PrimitiveVariable) -> EvalResult<()> {
        let expected = self.mesh.variable_size(variable.interpolation);
        if variable.size() == expected {
            Ok(())
        } else {
            Err(EvalError::SizeMismatch {
                expected,
                actual: variable.size(),
            })
        }
    }

    /// Find the closest point on the mesh surface to `query`. Returns
    /// `false` for an empty mesh.
    pub fn closest_point(&self, query: &Point3<f64>, result: &mut MeshResult) -> bool {
        if self.triangles.is_empty() {
            return false;
        }
        let tree = self.triangle_tree();
        let mut closest_distance_squared = f64::INFINITY;
        self.closest_walk(tree, tree.root(), query, &mut closest_distance_squared, result);
        true
    }

    /// Find the closest intersection of a ray with the mesh, within
    /// `max_distance`. Returns `false` when nothing is hit.
    pub fn intersection_point(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        result: &mut MeshResult,
        max_distance: f64,
    ) -> bool {
        if self.triangles.is_empty() {
            return false;
        }
        let norm = direction.norm();
        if norm < f64::EPSILON {
            return false;
        }
        let direction = direction / norm;

        let tree = self.triangle_tree();
        let mut max_distance_squared = max_distance * max_distance;
        let mut hit = false;
        self.intersection_walk(
            tree,
            tree.root(),
            origin,
            &direction,
            &mut max_distance_squared,
            &mut hit,
            result,
        );
        hit
    }

    /// Find every intersection of a ray with the mesh within
    /// `max_distance`, sorted by distance along the ray.
    #[must_use]
    pub fn intersection_points(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
    ) -> Vec<MeshResult> {
        if self.triangles.is_empty() {
            return Vec::new();
        }
        let norm = direction.norm();
        if norm < f64::EPSILON {
            return Vec::new();
        }
        let direction = direction / norm;

        let tree = self.triangle_tree();
        let mut hits: Vec<(f64, MeshResult)> = Vec::new();
        self.collect_walk(tree, tree.root(), origin, &direction, max_distance, &mut hits);
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, result)| result).collect()
    }

    /// Place a result at texture coordinates `uv`. Returns `false` if
    /// the mesh has no usable `uv` variable or no triangle covers the
    /// coordinates.
    pub fn point_at_uv(&self, uv: &Vector2<f64>, result: &mut MeshResult) -> bool {
        let Some(uv_set) = &self.uv else {
            return false;
        };
        if self.triangles.is_empty() {
            return false;
        }

        let tree = self.uv_tree.get_or_init(|| {
            let bounds: Vec<Aabb> = self
                .triangles
                .iter()
                .map(|triangle| {
                    let corners = self.uv_triangle(uv_set, triangle);
                    Aabb::from_points(
                        corners
                            .iter()
                            .map(|c| Point3::new(c.x, c.y, 0.0))
                            .collect::<Vec<_>>()
                            .iter(),
                    )
                })
                .collect();
            debug!(triangles = bounds.len(), "built uv lookup tree");
            BoundTree::build(&bounds)
        });

        self.uv_walk(tree, tree.root(), uv_set, uv, result)
    }

    /// The enclosed volume of the mesh, by divergence-theorem
    /// summation over signed tetrahedra. Meaningful for closed meshes
    /// with consistent outward winding.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.mass_properties().volume
    }

    /// The centroid of the enclosed volume.
    #[must_use]
    pub fn center_of_gravity(&self) -> Point3<f64> {
        self.mass_properties().center_of_gravity
    }

    /// The total surface area of the mesh.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.mass_properties().surface_area
    }

    /// The signed distance from `query` to the mesh surface: positive
    /// on the normal side of the closest triangle's tangent plane.
    /// `None` for an empty mesh.
    #[must_use]
    pub fn signed_distance(&self, query: &Point3<f64>) -> Option<f64> {
        let mut result = self.create_result();
        if !self.closest_point(query, &mut result) {
            return None;
        }
        let offset = query - result.point();
        let distance = offset.norm();
        if distance < SIGNED_DISTANCE_EPSILON {
            return Some(0.0);
        }
        if offset.dot(&result.normal()) >= 0.0 {
            Some(distance)
        } else {
            Some(-distance)
        }
    }

    fn triangle_tree(&self) -> &BoundTree {
        self.tree.get_or_init(|| {
            let bounds: Vec<Aabb> = self
                .triangles
                .iter()
                .map(|triangle| {
                    Aabb::from_points(triangle.vertex_ids.iter().map(|&id| &self.p[id]))
                })
                .collect();
            debug!(triangles = bounds.len(), "built mesh triangle tree");
            BoundTree::build(&bounds)
        })
    }

    fn triangle_points(&self, triangle: &MeshTriangle) -> [Point3<f64>; 3] {
        [
            self.p[triangle.vertex_ids[0]],
            self.p[triangle.vertex_ids[1]],
            self.p[triangle.vertex_ids[2]],
        ]
    }

    fn uv_triangle(&self, uv_set: &UvSet, triangle: &MeshTriangle) -> [Vector2<f64>; 3] {
        let pick = |k: usize| match uv_set.source {
            UvSource::FaceVarying => uv_set.values[triangle.face_varying_ids[k]],
            UvSource::Vertex => uv_set.values[triangle.vertex_ids[k]],
        };
        [pick(0), pick(1), pick(2)]
    }

    fn fill_result(
        &self,
        result: &mut MeshResult,
        triangle_index: usize,
        barycentric: [f64; 3],
        position: Point3<f64>,
    ) {
        let triangle = &self.triangles[triangle_index];
        let [v0, v1, v2] = self.triangle_points(triangle);
        result.triangle_index = triangle_index;
        result.face_index = triangle.face_index;
        result.barycentric = barycentric;
        result.vertex_ids = triangle.vertex_ids;
        result.face_varying_ids = triangle.face_varying_ids;
        result.position = position;
        result.normal = triangle_normal(&v0, &v1, &v2);
        result.uv = self.uv.as_ref().map_or_else(Vector2::zeros, |uv_set| {
            let corners = self.uv_triangle(uv_set, triangle);
            corners[0] * barycentric[0]
                + corners[1] * barycentric[1]
                + corners[2] * barycentric[2]
        });
    }

    fn closest_walk(
        &self,
        tree: &BoundTree,
        node_index: usize,
        query: &Point3<f64>,
        closest_distance_squared: &mut f64,
        result: &mut MeshResult,
    ) {
        let node = tree.node(node_index);
        match node.kind {
            NodeKind::Leaf { first, last } => {
                for &item in tree.items(first, last) {
                    let [v0, v1, v2] = self.triangle_points(&self.triangles[item]);
                    let (closest, barycentric) =
                        closest_point_on_triangle(query, &v0, &v1, &v2);
                    let distance_squared = (closest - query).norm_squared();
                    if distance_squared < *closest_distance_squared {
                        *closest_distance_squared = distance_squared;
                        self.fill_result(result, item, barycentric, closest);
                    }
                }
            }
            NodeKind::Branch { low, high } => {
                let d_low = tree.node(low).bound.distance_squared(query);
                let d_high = tree.node(high).bound.distance_squared(query);
                let (near, far, d_far) = if d_low < d_high {
                    (low, high, d_high)
                } else {
                    (high, low, d_low)
                };
                self.closest_walk(tree, near, query, closest_distance_squared, result);
                if d_far < *closest_distance_squared {
                    self.closest_walk(tree, far, query, closest_distance_squared, result);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn intersection_walk(
        &self,
        tree: &BoundTree,
        node_index: usize,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance_squared: &mut f64,
        hit: &mut bool,
        result: &mut MeshResult,
    ) {
        let node = tree.node(node_index);
        match node.kind {
            NodeKind::Leaf { first, last } => {
                for &item in tree.items(first, last) {
                    let [v0, v1, v2] = self.triangle_points(&self.triangles[item]);
                    if let Some((t, barycentric)) =
                        ray_triangle_intersect(origin, direction, &v0, &v1, &v2)
                    {
                        let distance_squared = t * t;
                        if distance_squared < *max_distance_squared {
                            *max_distance_squared = distance_squared;
                            *hit = true;
                            self.fill_result(result, item, barycentric, origin + direction * t);
                        }
                    }
                }
            }
            NodeKind::Branch { low, high } => {
                // Descend into the nearer box first so the shrinking
                // distance bound prunes the farther subtree.
                let t_low = tree.node(low).bound.intersect_ray(origin, direction);
                let t_high = tree.node(high).bound.intersect_ray(origin, direction);
                let mut children = [(low, t_low), (high, t_high)];
                if t_high.unwrap_or(f64::INFINITY) < t_low.unwrap_or(f64::INFINITY) {
                    children.swap(0, 1);
                }
                for (child, entry) in children {
                    if let Some(t) = entry {
                        if t * t <= *max_distance_squared {
                            self.intersection_walk(
                                tree,
                                child,
                                origin,
                                direction,
                                max_distance_squared,
                                hit,
                                result,
                            );
                        }
                    }
                }
            }
        }
    }

    fn collect_walk(
        &self,
        tree: &BoundTree,
        node_index: usize,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
        hits: &mut Vec<(f64, MeshResult)>,
    ) {
        let node = tree.node(node_index);
        match node.kind {
            NodeKind::Leaf { first, last } => {
                for &item in tree.items(first, last) {
                    let [v0, v1, v2] = self.triangle_points(&self.triangles[item]);
                    if let Some((t, barycentric)) =
                        ray_triangle_intersect(origin, direction, &v0, &v1, &v2)
                    {
                        if t <= max_distance {
                            let mut result = MeshResult::default();
                            self.fill_result(
                                &mut result,
                                item,
                                barycentric,
                                origin + direction * t,
                            );
                            hits.push((t, result));
                        }
                    }
                }
            }
            NodeKind::Branch { low, high } => {
                for child in [low, high] {
                    if let Some(t) = tree.node(child).bound.intersect_ray(origin, direction) {
                        if t <= max_distance {
                            self.collect_walk(tree, child, origin, direction, max_distance, hits);
                        }
                    }
                }
            }
        }
    }

    fn uv_walk(
        &self,
        tree: &BoundTree,
        node_index: usize,
        uv_set: &UvSet,
        uv: &Vector2<f64>,
        result: &mut MeshResult,
    ) -> bool {
        let node = tree.node(node_index);
        let query = Point3::new(uv.x, uv.y, 0.0);
        if node.bound.distance_squared(&query) > 0.0 {
            return false;
        }
        match node.kind {
            NodeKind::Leaf { first, last } => {
                for &item in tree.items(first, last) {
                    let corners = self.uv_triangle(uv_set, &self.triangles[item]);
                    if let Some(barycentric) = uv_barycentric(&corners, uv) {
                        let [v0, v1, v2] = self.triangle_points(&self.triangles[item]);
                        let position = Point3::from(
                            v0.coords * barycentric[0]
                                + v1.coords * barycentric[1]
                                + v2.coords * barycentric[2],
                        );
                        self.fill_result(result, item, barycentric, position);
                        return true;
                    }
                }
                false
            }
            NodeKind::Branch { low, high } => {
                self.uv_walk(tree, low, uv_set, uv, result)
                    || self.uv_walk(tree, high, uv_set, uv, result)
            }
        }
    }

    fn mass_properties(&self) -> MassProperties {
        *self.mass.get_or_init(|| {
            let mut volume = 0.0;
            let mut weighted_centroid = Vector3::zeros();
            let mut surface_area = 0.0;

            for triangle in &self.triangles {
                let [v0, v1, v2] = self.triangle_points(triangle);

                // Signed volume of the tetrahedron against the origin.
                let cross = Vector3::new(
                    v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                    v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                    v1.x.mul_add(v2.y, -(v1.y * v2.x)),
                );
                let tetra_volume =
                    v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y)) / 6.0;
                volume += tetra_volume;
                weighted_centroid +=
                    (v0.coords + v1.coords + v2.coords) * (tetra_volume / 4.0);

                surface_area += (v1 - v0).cross(&(v2 - v0)).norm() * 0.5;
            }

            let center_of_gravity = if volume.abs() > f64::EPSILON {
                Point3::from(weighted_centroid / volume)
            } else {
                Point3::origin()
            };

            MassProperties {
                volume,
                center_of_gravity,
                surface_area,
            }
        })
    }
}

/// Barycentric coordinates of `uv` in a 2D triangle, or `None` when it
/// lies outside (or the triangle is degenerate in uv space).
fn uv_barycentric(corners: &[Vector2<f64>; 3], uv: &Vector2<f64>) -> Option<[f64; 3]> {
    const INSIDE_TOLERANCE: f64 = 1e-9;

    let e1 = corners[1] - corners[0];
    let e2 = corners[2] - corners[0];
    let denominator = e1.x.mul_add(e2.y, -(e1.y * e2.x));
    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let d = uv - corners[0];
    let b1 = d.x.mul_add(e2.y, -(d.y * e2.x)) / denominator;
    let b2 = e1.x.mul_add(d.y, -(e1.y * d.x)) / denominator;
    let b0 = 1.0 - b1 - b2;

    if b0 >= -INSIDE_TOLERANCE && b1 >= -INSIDE_TOLERANCE && b2 >= -INSIDE_TOLERANCE {
        Some([b0, b1, b2])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// A unit cube from (0,0,0) to (1,1,1), CCW from outside.
    fn unit_cube() -> MeshPrimitive {
        let vertices_per_face = vec![3; 12];
        let vertex_ids = vec![
            0, 2, 1, 0, 3, 2, // bottom (z=0)
            4, 5, 6, 4, 6, 7, // top (z=1)
            0, 1, 5, 0, 5, 4, // front (y=0)
            3, 7, 6, 3, 6, 2, // back (y=1)
            0, 4, 7, 0, 7, 3, // left (x=0)
            1, 2, 6, 1, 6, 5, // right (x=1)
        ];
        let mut mesh = MeshPrimitive::new(vertices_per_face, vertex_ids).unwrap();
        mesh.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(1.0, 0.0, 0.0),
                    Vector3::new(1.0, 1.0, 0.0),
                    Vector3::new(0.0, 1.0, 0.0),
                    Vector3::new(0.0, 0.0, 1.0),
                    Vector3::new(1.0, 0.0, 1.0),
                    Vector3::new(1.0, 1.0, 1.0),
                    Vector3::new(0.0, 1.0, 1.0),
                ]),
            ),
        );
        mesh
    }

    /// A single quad in the xy plane with unit uv coordinates.
    fn uv_quad() -> MeshPrimitive {
        let mut mesh = MeshPrimitive::new(vec![4], vec![0, 1, 2, 3]).unwrap();
        mesh.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(2.0, 0.0, 0.0),
                    Vector3::new(2.0, 2.0, 0.0),
                    Vector3::new(0.0, 2.0, 0.0),
                ]),
            ),
        );
        mesh.variables.insert(
            "uv".to_string(),
            PrimitiveVariable::new(
                Interpolation::FaceVarying,
                AttributeData::Vec2(vec![
                    Vector2::new(0.0, 0.0),
                    Vector2::new(1.0, 0.0),
                    Vector2::new(1.0, 1.0),
                    Vector2::new(0.0, 1.0),
                ]),
            ),
        );
        mesh
    }

    #[test]
    fn closest_point_on_cube() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let mut result = evaluator.create_result();

        assert!(evaluator.closest_point(&Point3::new(0.5, 0.5, 3.0), &mut result));
        assert_relative_eq!(result.point(), Point3::new(0.5, 0.5, 1.0), epsilon = 1e-9);
        assert_relative_eq!(result.normal(), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);

        let bary = result.barycentric_coordinates();
        assert_relative_eq!(bary[0] + bary[1] + bary[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn closest_point_matches_brute_force() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let mut result = evaluator.create_result();

        for query in [
            Point3::new(2.0, -1.0, 0.3),
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(-0.2, 1.7, 1.4),
        ] {
            assert!(evaluator.closest_point(&query, &mut result));
            let mut best = f64::INFINITY;
            for triangle in &evaluator.triangles {
                let [v0, v1, v2] = evaluator.triangle_points(triangle);
                let (closest, _) = closest_point_on_triangle(&query, &v0, &v1, &v2);
                best = best.min((closest - query).norm_squared());
            }
            assert_relative_eq!(
                (result.point() - query).norm_squared(),
                best,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn ray_intersection_closest_first() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let mut result = evaluator.create_result();

        let origin = Point3::new(0.5, 0.5, 5.0);
        let direction = Vector3::new(0.0, 0.0, -1.0);
        assert!(evaluator.intersection_point(&origin, &direction, &mut result, f64::INFINITY));
        // The nearer hit is the top face.
        assert_relative_eq!(result.point(), Point3::new(0.5, 0.5, 1.0), epsilon = 1e-9);

        let hits = evaluator.intersection_points(&origin, &direction, f64::INFINITY);
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].point().z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(hits[1].point().z, 0.0, epsilon = 1e-9);

        // A capped ray misses everything.
        assert!(!evaluator.intersection_point(&origin, &direction, &mut result, 1.0));
        assert!(evaluator
            .intersection_points(&origin, &direction, 1.0)
            .is_empty());

        // A ray pointing away misses.
        assert!(!evaluator.intersection_point(
            &origin,
            &Vector3::new(0.0, 0.0, 1.0),
            &mut result,
            f64::INFINITY
        ));
    }

    #[test]
    fn point_at_uv_places_on_surface() {
        let evaluator = MeshEvaluator::new(&uv_quad()).unwrap();
        let mut result = evaluator.create_result();

        assert!(evaluator.point_at_uv(&Vector2::new(0.25, 0.5), &mut result));
        assert_relative_eq!(result.point(), Point3::new(0.5, 1.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(result.uv(), Vector2::new(0.25, 0.5), epsilon = 1e-9);

        // Outside the uv domain.
        assert!(!evaluator.point_at_uv(&Vector2::new(1.5, 0.5), &mut result));
    }

    #[test]
    fn point_at_uv_without_uvs_is_a_miss() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let mut result = evaluator.create_result();
        assert!(!evaluator.point_at_uv(&Vector2::new(0.5, 0.5), &mut result));
    }

    #[test]
    fn mass_properties_of_cube() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        assert_relative_eq!(evaluator.volume(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(evaluator.surface_area(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(
            evaluator.center_of_gravity(),
            Point3::new(0.5, 0.5, 0.5),
            epsilon = 1e-9
        );
    }

    #[test]
    fn signed_distance_classifies_sides() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let outside = evaluator.signed_distance(&Point3::new(0.5, 0.5, 2.0)).unwrap();
        assert_relative_eq!(outside, 1.0, epsilon = 1e-9);
        let inside = evaluator.signed_distance(&Point3::new(0.5, 0.5, 0.9)).unwrap();
        assert!(inside < 0.0);
        assert_relative_eq!(inside, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn sampling_levels() {
        let evaluator = MeshEvaluator::new(&unit_cube()).unwrap();
        let mut result = evaluator.create_result();
        assert!(evaluator.closest_point(&Point3::new(0.5, 0.5, 3.0), &mut result));

        // Vertex-level z recovers the query height on the top face.
        let heights = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Float(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
        );
        assert!(evaluator.validate_variable(&heights).is_ok());
        assert_relative_eq!(result.sample_float(&heights).unwrap(), 1.0, epsilon = 1e-9);

        let face_ids = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::Int((0..12).collect()),
        );
        let face = result.sample_int(&face_ids).unwrap();
        assert!(face == 2 || face == 3);

        let labels = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::String((0..12).map(|i| format!("face{i}")).collect()),
        );
        let label = result.sample_string(&labels).unwrap();
        assert!(label.starts_with("face"));
    }

    #[test]
    fn empty_mesh_misses() {
        let mut mesh = MeshPrimitive::new(vec![], vec![]).unwrap();
        mesh.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Vec3(vec![])),
        );
        let evaluator = MeshEvaluator::new(&mesh).unwrap();
        let mut result = evaluator.create_result();
        assert!(!evaluator.closest_point(&Point3::origin(), &mut result));
        assert!(!evaluator.intersection_point(
            &Point3::origin(),
            &Vector3::x(),
            &mut result,
            f64::INFINITY
        ));
    }

    #[test]
    fn fan_triangulation_keeps_face_indices() {
        // A quad and a triangle: 2 + 1 triangles.
        let mut mesh = MeshPrimitive::new(vec![4, 3], vec![0, 1, 2, 3, 3, 2, 4]).unwrap();
        mesh.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(1.0, 0.0, 0.0),
                    Vector3::new(1.0, 1.0, 0.0),
                    Vector3::new(0.0, 1.0, 0.0),
                    Vector3::new(0.5, 2.0, 0.0),
                ]),
            ),
        );
        let evaluator = MeshEvaluator::new(&mesh).unwrap();
        assert_eq!(evaluator.triangles.len(), 3);
        assert_eq!(evaluator.triangles[0].face_index, 0);
        assert_eq!(evaluator.triangles[1].face_index, 0);
        assert_eq!(evaluator.triangles[2].face_index, 1);
        // Face-varying ids address the flat corner list.
        assert_eq!(evaluator.triangles[2].face_varying_ids, [4, 5, 6]);
    }
}
