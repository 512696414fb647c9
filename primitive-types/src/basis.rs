//! Cubic basis matrices for piecewise curve evaluation.

use std::ops::{Add, Mul};

use nalgebra::Matrix4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PrimitiveError, PrimitiveResult};

/// A cubic basis: a 4x4 coefficient matrix plus the control-point step
/// between consecutive segments.
///
/// A segment over control points `p0..p3` evaluates as
/// `sum(ci(t) * pi)` where the coefficients come from
/// `[t^3, t^2, t, 1] * matrix`. Named constructors provide the standard
/// bases; there is no kind tag, so code that needs to know *which* basis
/// it has compares against the named constants by value.
///
/// # Example
///
/// ```
/// use primitive_types::CubicBasis;
///
/// let basis = CubicBasis::bezier();
/// let [c0, c1, c2, c3] = basis.coefficients(0.0);
/// assert_eq!((c0, c1, c2, c3), (1.0, 0.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CubicBasis {
    /// The coefficient matrix.
    pub matrix: Matrix4<f64>,
    /// Control-point advance per segment.
    pub step: usize,
}

impl CubicBasis {
    /// Create a basis from a matrix and step.
    #[must_use]
    pub const fn new(matrix: Matrix4<f64>, step: usize) -> Self {
        Self { matrix, step }
    }

    /// Piecewise linear interpolation of the middle two control points.
    #[must_use]
    #[rustfmt::skip]
    pub fn linear() -> Self {
        Self::new(
            Matrix4::new(
                0.0,  0.0, 0.0, 0.0,
                0.0,  0.0, 0.0, 0.0,
                0.0, -1.0, 1.0, 0.0,
                0.0,  1.0, 0.0, 0.0,
            ),
            1,
        )
    }

    /// Bezier basis; segments advance by three control points.
    #[must_use]
    #[rustfmt::skip]
    pub fn bezier() -> Self {
        Self::new(
            Matrix4::new(
                -1.0,  3.0, -3.0, 1.0,
                 3.0, -6.0,  3.0, 0.0,
                -3.0,  3.0,  0.0, 0.0,
                 1.0,  0.0,  0.0, 0.0,
            ),
            3,
        )
    }

    /// Uniform cubic B-spline basis.
    #[must_use]
    #[rustfmt::skip]
    pub fn b_spline() -> Self {
        Self::new(
            Matrix4::new(
                -1.0,  3.0, -3.0, 1.0,
                 3.0, -6.0,  3.0, 0.0,
                -3.0,  0.0,  3.0, 0.0,
                 1.0,  4.0,  1.0, 0.0,
            ) / 6.0,
            1,
        )
    }

    /// Catmull-Rom basis; interpolates the middle two control points.
    #[must_use]
    #[rustfmt::skip]
    pub fn catmull_rom() -> Self {
        Self::new(
            Matrix4::new(
                -1.0,  3.0, -3.0,  1.0,
                 2.0, -5.0,  4.0, -1.0,
                -1.0,  0.0,  1.0,  0.0,
                 0.0,  2.0,  0.0,  0.0,
            ) / 2.0,
            1,
        )
    }

    /// Step-function basis holding the second control point's value.
    #[must_use]
    #[rustfmt::skip]
    pub fn constant() -> Self {
        Self::new(
            Matrix4::new(
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
            ),
            1,
        )
    }

    /// The four blend coefficients at parameter `t`.
    #[must_use]
    pub fn coefficients(&self, t: f64) -> [f64; 4] {
        let t2 = t * t;
        let t3 = t2 * t;
        self.weighted_rows([t3, t2, t, 1.0])
    }

    /// The four blend coefficients of the derivative at parameter `t`.
    #[must_use]
    pub fn derivative_coefficients(&self, t: f64) -> [f64; 4] {
        self.weighted_rows([3.0 * t * t, 2.0 * t, 1.0, 0.0])
    }

    /// The four blend coefficients of the integral over `[t0, t1]`.
    #[must_use]
    pub fn integral_coefficients(&self, t0: f64, t1: f64) -> [f64; 4] {
        let antiderivative = |t: f64| [t * t * t * t / 4.0, t * t * t / 3.0, t * t / 2.0, t];
        let a1 = antiderivative(t1);
        let a0 = antiderivative(t0);
        self.weighted_rows([a1[0] - a0[0], a1[1] - a0[1], a1[2] - a0[2], a1[3] - a0[3]])
    }

    fn weighted_rows(&self, weights: [f64; 4]) -> [f64; 4] {
        let m = &self.matrix;
        let mut c = [0.0; 4];
        for (j, coefficient) in c.iter_mut().enumerate() {
            *coefficient = weights[0] * m[(0, j)]
                + weights[1] * m[(1, j)]
                + weights[2] * m[(2, j)]
                + weights[3] * m[(3, j)];
        }
        c
    }

    /// Evaluate a segment at parameter `t` over four control points.
    #[must_use]
    pub fn evaluate<T>(&self, t: f64, cv: [T; 4]) -> T
    where
        T: Copy + Add<Output = T> + Mul<f64, Output = T>,
    {
        let c = self.coefficients(t);
        cv[0] * c[0] + cv[1] * c[1] + cv[2] * c[2] + cv[3] * c[3]
    }

    /// Evaluate a segment's derivative at parameter `t`.
    #[must_use]
    pub fn evaluate_derivative<T>(&self, t: f64, cv: [T; 4]) -> T
    where
        T: Copy + Add<Output = T> + Mul<f64, Output = T>,
    {
        let c = self.derivative_coefficients(t);
        cv[0] * c[0] + cv[1] * c[1] + cv[2] * c[2] + cv[3] * c[3]
    }

    /// Number of segments a curve of `num_vertices` control points has
    /// in this basis.
    #[must_use]
    pub fn num_segments(&self, periodic: bool, num_vertices: usize) -> usize {
        if *self == Self::linear() {
            if periodic {
                num_vertices
            } else {
                num_vertices.saturating_sub(1)
            }
        } else if periodic {
            num_vertices / self.step
        } else {
            num_vertices.saturating_sub(4) / self.step + 1
        }
    }

    /// How many times each end control point must be repeated so the
    /// curve begins and ends exactly on it: 3 for B-spline, 2 for
    /// Catmull-Rom, 1 otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the basis is not one of the named constants.
    pub fn end_point_multiplicity(&self) -> PrimitiveResult<usize> {
        if *self == Self::b_spline() {
            Ok(3)
        } else if *self == Self::catmull_rom() {
            Ok(2)
        } else if *self == Self::linear()
            || *self == Self::bezier()
            || *self == Self::constant()
        {
            Ok(1)
        } else {
            Err(PrimitiveError::UnknownBasis("end point multiplicity"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn named_bases() -> Vec<CubicBasis> {
        vec![
            CubicBasis::linear(),
            CubicBasis::bezier(),
            CubicBasis::b_spline(),
            CubicBasis::catmull_rom(),
            CubicBasis::constant(),
        ]
    }

    #[test]
    fn partition_of_unity() {
        for basis in named_bases() {
            for i in 0..=20 {
                let t = f64::from(i) / 20.0;
                let c = basis.coefficients(t);
                assert_relative_eq!(c[0] + c[1] + c[2] + c[3], 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn derivative_coefficients_sum_to_zero() {
        // The derivative of a constant curve is zero, so the derivative
        // weights of any partition-of-unity basis must cancel.
        for basis in named_bases() {
            for i in 0..=10 {
                let t = f64::from(i) / 10.0;
                let c = basis.derivative_coefficients(t);
                assert_relative_eq!(c[0] + c[1] + c[2] + c[3], 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn bezier_interpolates_end_points() {
        let basis = CubicBasis::bezier();
        let cv = [1.0, 5.0, -2.0, 7.0];
        assert_relative_eq!(basis.evaluate(0.0, cv), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.evaluate(1.0, cv), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn b_spline_end_points_with_multiplicity() {
        let basis = CubicBasis::b_spline();
        assert_relative_eq!(basis.evaluate(0.0, [2.0, 2.0, 2.0, 9.0]), 2.0, epsilon = 1e-12);
        assert_relative_eq!(basis.evaluate(1.0, [9.0, 4.0, 4.0, 4.0]), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn catmull_rom_end_points_with_multiplicity() {
        let basis = CubicBasis::catmull_rom();
        assert_relative_eq!(basis.evaluate(0.0, [3.0, 3.0, 8.0, 1.0]), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn linear_blends_middle_points() {
        let basis = CubicBasis::linear();
        assert_relative_eq!(
            basis.evaluate(0.25, [99.0, 0.0, 4.0, 99.0]),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn end_point_multiplicity_table() {
        assert_eq!(CubicBasis::b_spline().end_point_multiplicity().unwrap(), 3);
        assert_eq!(CubicBasis::catmull_rom().end_point_multiplicity().unwrap(), 2);
        assert_eq!(CubicBasis::linear().end_point_multiplicity().unwrap(), 1);
        assert_eq!(CubicBasis::bezier().end_point_multiplicity().unwrap(), 1);

        let odd = CubicBasis::new(Matrix4::identity(), 1);
        assert!(odd.end_point_multiplicity().is_err());
    }

    #[test]
    fn segment_counts() {
        let linear = CubicBasis::linear();
        assert_eq!(linear.num_segments(false, 5), 4);
        assert_eq!(linear.num_segments(true, 5), 5);

        let bezier = CubicBasis::bezier();
        assert_eq!(bezier.num_segments(false, 4), 1);
        assert_eq!(bezier.num_segments(false, 7), 2);

        let bspline = CubicBasis::b_spline();
        assert_eq!(bspline.num_segments(false, 4), 1);
        assert_eq!(bspline.num_segments(false, 6), 3);
        assert_eq!(bspline.num_segments(true, 6), 6);
    }

    #[test]
    fn integral_recovers_linear_ramp() {
        // Integrating the linear basis over [0, 1] with values 0 and 1 on
        // the middle control points gives the area under a unit ramp.
        let basis = CubicBasis::linear();
        let c = basis.integral_coefficients(0.0, 1.0);
        let area = c[1].mul_add(0.0, c[2] * 1.0);
        assert_relative_eq!(area, 0.5, epsilon = 1e-12);
    }
}
