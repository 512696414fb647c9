//! Value types a spline can interpolate.

use std::ops::{Add, Mul, Sub};

use nalgebra::{Vector3, Vector4};

/// Element types usable as spline values: scalars and colours.
///
/// Beyond the arithmetic a cubic blend needs, values must provide the
/// Fritsch-Carlson monotone slope combination, applied componentwise for
/// colours.
pub trait SplineValue:
    Copy
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Send
    + Sync
{
    /// The additive identity.
    fn zero() -> Self;

    /// Combine two adjacent segment slopes into a knot slope using the
    /// Fritsch-Carlson weighted harmonic mean:
    /// `3(dx1+dx2) / ((2*dx2+dx1)/s1 + (dx2+2*dx1)/s2)` where the
    /// slopes share a sign, and zero otherwise. The zero branch is what
    /// guarantees monotonicity at local extrema.
    fn monotone_slope(s1: Self, s2: Self, dx1: f64, dx2: f64) -> Self;
}

fn monotone_slope_scalar(s1: f64, s2: f64, dx1: f64, dx2: f64) -> f64 {
    if s1 * s2 > 0.0 {
        3.0 * (dx1 + dx2) / ((2.0 * dx2 + dx1) / s1 + (dx2 + 2.0 * dx1) / s2)
    } else {
        0.0
    }
}

impl SplineValue for f64 {
    fn zero() -> Self {
        0.0
    }

    fn monotone_slope(s1: Self, s2: Self, dx1: f64, dx2: f64) -> Self {
        monotone_slope_scalar(s1, s2, dx1, dx2)
    }
}

impl SplineValue for Vector3<f64> {
    fn zero() -> Self {
        Self::zeros()
    }

    fn monotone_slope(s1: Self, s2: Self, dx1: f64, dx2: f64) -> Self {
        Self::new(
            monotone_slope_scalar(s1.x, s2.x, dx1, dx2),
            monotone_slope_scalar(s1.y, s2.y, dx1, dx2),
            monotone_slope_scalar(s1.z, s2.z, dx1, dx2),
        )
    }
}

impl SplineValue for Vector4<f64> {
    fn zero() -> Self {
        Self::zeros()
    }

    fn monotone_slope(s1: Self, s2: Self, dx1: f64, dx2: f64) -> Self {
        Self::new(
            monotone_slope_scalar(s1.x, s2.x, dx1, dx2),
            monotone_slope_scalar(s1.y, s2.y, dx1, dx2),
            monotone_slope_scalar(s1.z, s2.z, dx1, dx2),
            monotone_slope_scalar(s1.w, s2.w, dx1, dx2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_slopes_flatten() {
        assert_eq!(f64::monotone_slope(1.0, -1.0, 1.0, 1.0), 0.0);
        assert_eq!(f64::monotone_slope(0.0, 2.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn equal_slopes_pass_through() {
        // With s1 == s2 == s the harmonic mean collapses to s.
        let s = f64::monotone_slope(2.0, 2.0, 1.0, 1.0);
        assert!((s - 2.0).abs() < 1e-12);
    }
}
