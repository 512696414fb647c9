//! Evaluatable splines over x-sorted control points.

use primitive_types::CubicBasis;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SplineValue;

/// A spline: a cubic basis over x-sorted `(x, y)` control points.
///
/// The control-point array is expected to already carry whatever
/// endpoint duplication its basis needs to reach the end values; see
/// [`Ramp::evaluator`](crate::Ramp::evaluator), which produces splines
/// in that form.
///
/// # Example
///
/// ```
/// use primitive_types::CubicBasis;
/// use spline_ramp::Spline;
///
/// let spline = Spline::new(
///     CubicBasis::linear(),
///     vec![(0.0, 0.0), (1.0, 10.0)],
/// );
/// assert!((spline.evaluate(0.5) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spline<Y> {
    /// The basis used to blend control points.
    pub basis: CubicBasis,
    /// Control points, sorted by ascending x.
    pub points: Vec<(f64, Y)>,
}

const SOLVE_ITERATIONS: usize = 32;

impl<Y: SplineValue> Spline<Y> {
    /// Create a spline, sorting the control points by x.
    #[must_use]
    pub fn new(basis: CubicBasis, mut points: Vec<(f64, Y)>) -> Self {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { basis, points }
    }

    /// The number of cubic segments the control points describe.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        let n = self.points.len();
        if n < 4 {
            0
        } else {
            (n - 4) / self.basis.step + 1
        }
    }

    /// Evaluate the spline at `x`.
    ///
    /// `x` outside the covered range clamps to the end values. An empty
    /// spline evaluates to zero.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> Y {
        if self.points.is_empty() {
            return Y::zero();
        }
        if self.basis == CubicBasis::constant() {
            return self.evaluate_constant(x);
        }
        if self.basis == CubicBasis::linear() || self.points.len() < 4 {
            return self.evaluate_linear(x);
        }
        self.evaluate_cubic(x)
    }

    fn evaluate_constant(&self, x: f64) -> Y {
        let mut value = self.points[0].1;
        for &(px, py) in &self.points {
            if px > x {
                break;
            }
            value = py;
        }
        value
    }

    fn evaluate_linear(&self, x: f64) -> Y {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        let upper = self
            .points
            .partition_point(|&(px, _)| px <= x)
            .min(self.points.len() - 1);
        let (x0, y0) = self.points[upper - 1];
        let (x1, y1) = self.points[upper];
        let dx = x1 - x0;
        if dx <= f64::EPSILON {
            return y1;
        }
        let t = (x - x0) / dx;
        y0 * (1.0 - t) + y1 * t
    }

    fn evaluate_cubic(&self, x: f64) -> Y {
        let num_segments = self.num_segments();
        debug_assert!(num_segments > 0);

        // Pick the first segment whose x-span contains x; x beyond the
        // covered range clamps to the boundary segments.
        let mut segment = num_segments - 1;
        for s in 0..num_segments {
            let xs = self.segment_xs(s);
            if x <= self.basis.evaluate(1.0, xs) {
                segment = s;
                break;
            }
        }

        let xs = self.segment_xs(segment);
        let x0 = self.basis.evaluate(0.0, xs);
        let x1 = self.basis.evaluate(1.0, xs);

        let t = if x <= x0 {
            0.0
        } else if x >= x1 {
            1.0
        } else {
            // x is monotone in t over a segment of sorted control
            // points, so bisection converges.
            let mut lo = 0.0;
            let mut hi = 1.0;
            for _ in 0..SOLVE_ITERATIONS {
                let mid = 0.5 * (lo + hi);
                if self.basis.evaluate(mid, xs) < x {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            0.5 * (lo + hi)
        };

        let offset = segment * self.basis.step;
        let ys = [
            self.points[offset].1,
            self.points[offset + 1].1,
            self.points[offset + 2].1,
            self.points[offset + 3].1,
        ];
        self.basis.evaluate(t, ys)
    }

    fn segment_xs(&self, segment: usize) -> [f64; 4] {
        let offset = segment * self.basis.step;
        [
            self.points[offset].0,
            self.points[offset + 1].0,
            self.points[offset + 2].0,
            self.points[offset + 3].0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_interpolates() {
        let spline = Spline::new(
            CubicBasis::linear(),
            vec![(0.0, 1.0), (1.0, 3.0), (2.0, 0.0)],
        );
        assert_relative_eq!(spline.evaluate(0.0), 1.0);
        assert_relative_eq!(spline.evaluate(0.5), 2.0);
        assert_relative_eq!(spline.evaluate(1.5), 1.5);
        // Clamped outside the range.
        assert_relative_eq!(spline.evaluate(-1.0), 1.0);
        assert_relative_eq!(spline.evaluate(9.0), 0.0);
    }

    #[test]
    fn constant_steps() {
        let spline = Spline::new(
            CubicBasis::constant(),
            vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)],
        );
        assert_relative_eq!(spline.evaluate(0.5), 1.0);
        assert_relative_eq!(spline.evaluate(1.0), 2.0);
        assert_relative_eq!(spline.evaluate(5.0), 3.0);
    }

    #[test]
    fn catmull_rom_with_duplicated_ends_reaches_end_values() {
        // Multiplicity 2: ends repeated once.
        let spline = Spline::new(
            CubicBasis::catmull_rom(),
            vec![(0.0, 1.0), (0.0, 1.0), (1.0, 5.0), (1.0, 5.0)],
        );
        assert_relative_eq!(spline.evaluate(0.0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(spline.evaluate(1.0), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn bspline_with_triplicated_ends_reaches_end_values() {
        let pts = vec![
            (0.0, 2.0),
            (0.0, 2.0),
            (0.0, 2.0),
            (1.0, 7.0),
            (1.0, 7.0),
            (1.0, 7.0),
        ];
        let spline = Spline::new(CubicBasis::b_spline(), pts);
        assert_relative_eq!(spline.evaluate(0.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(spline.evaluate(1.0), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_spline_is_zero() {
        let spline: Spline<f64> = Spline::new(CubicBasis::linear(), vec![]);
        assert_relative_eq!(spline.evaluate(0.5), 0.0);
    }
}
