//! Axis-aligned bounding boxes for tree pruning.

use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create an empty (inverted) box, ready to be expanded.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create a box from an iterator of points.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Whether the box contains no space.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Grow the box to contain `other`.
    pub fn expand_to_include_box(&mut self, other: &Self) {
        self.expand_to_include(&other.min);
        self.expand_to_include(&other.max);
    }

    /// The centre of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// The point inside the box closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Squared distance from `point` to the box; zero inside.
    #[must_use]
    pub fn distance_squared(&self, point: &Point3<f64>) -> f64 {
        (self.closest_point(point) - point).norm_squared()
    }

    /// Slab test: the ray parameter at which `origin + t * direction`
    /// first enters the box, or `None` if the ray misses it. A ray
    /// starting inside reports `t = 0`.
    #[must_use]
    pub fn intersect_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<f64> {
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < f64::EPSILON {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (self.min[axis] - o) * inv;
                let mut t1 = (self.max[axis] - o) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_near = t_near.max(t0);
                t_far = t_far.min(t1);
                if t_near > t_far || t_far < 0.0 {
                    return None;
                }
            }
        }

        Some(t_near.max(0.0))
    }
}
