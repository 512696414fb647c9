//! Triangle queries: closest point with barycentric coordinates and
//! ray intersection.

use nalgebra::{Point3, Vector3};

/// Compute the closest point on a triangle to a query point, with the
/// barycentric coordinates of that point.
///
/// This is the region-classification algorithm from "Real-Time Collision
/// Detection" by Christer Ericson.
#[must_use]
#[allow(clippy::many_single_char_names)]
#[allow(clippy::similar_names)]
pub fn closest_point_on_triangle(
    point: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> (Point3<f64>, [f64; 3]) {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);

    // Vertex region outside A
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*v0, [1.0, 0.0, 0.0]);
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);

    // Vertex region outside B
    if d3 >= 0.0 && d4 <= d3 {
        return (*v1, [0.0, 1.0, 0.0]);
    }

    // Edge region AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (v0 + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);

    // Vertex region outside C
    if d6 >= 0.0 && d5 <= d6 {
        return (*v2, [0.0, 0.0, 1.0]);
    }

    // Edge region AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (v0 + ac * w, [1.0 - w, 0.0, w]);
    }

    // Edge region BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (v1 + (v2 - v1) * w, [0.0, 1.0 - w, w]);
    }

    // Face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (v0 + ab * v + ac * w, [1.0 - v - w, v, w])
}

/// Intersect a ray with a triangle using the Moller-Trumbore algorithm.
///
/// Returns the ray parameter and barycentric coordinates of the hit, or
/// `None` for a miss. `ray_dir` should be normalised so the parameter is
/// a distance.
#[must_use]
pub fn ray_triangle_intersect(
    ray_origin: &Point3<f64>,
    ray_dir: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<(f64, [f64; 3])> {
    const EPSILON: f64 = 1e-10;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray_dir.cross(&edge2);
    let a = edge1.dot(&h);

    // Ray is parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray_origin - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray_dir.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t > EPSILON {
        Some((t, [1.0 - u - v, u, v]))
    } else {
        None
    }
}

/// The (unnormalised direction of the) triangle normal by the
/// right-hand rule, normalised to unit length. Degenerate triangles
/// yield a zero vector.
#[must_use]
pub fn triangle_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let n = (v1 - v0).cross(&(v2 - v0));
    let len = n.norm();
    if len > f64::EPSILON {
        n / len
    } else {
        Vector3::zeros()
    }
}
