//! Ramps: user-facing control-point curves.
//!
//! A [`Ramp`] is the editable form of a spline: a list of `(x, y)` knots
//! plus an interpolation mode. Converting to an evaluatable [`Spline`]
//! applies the basis-specific endpoint duplication, and the
//! monotone-cubic mode is lowered to Bezier control points on the way.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use primitive_types::CubicBasis;

use crate::{RampError, RampResult, Spline, SplineValue};

/// Interpolation modes a ramp can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RampInterpolation {
    /// Straight lines between knots.
    Linear,
    /// Catmull-Rom through the knots.
    CatmullRom,
    /// Uniform cubic B-spline; knots act as a hull.
    BSpline,
    /// Monotone cubic interpolation: passes through the knots without
    /// overshooting wherever the knots are monotone.
    MonotoneCubic,
    /// Piecewise constant steps.
    Constant,
}

/// A control-point curve with a chosen interpolation mode.
///
/// Knots are kept sorted by x. X values are expected to be unique for
/// monotone-cubic ramps.
///
/// # Example
///
/// ```
/// use spline_ramp::{Ramp, RampInterpolation};
///
/// let ramp = Ramp::new(
///     RampInterpolation::CatmullRom,
///     vec![(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)],
/// );
/// let spline = ramp.evaluator();
/// // Catmull-Rom needs each end knot twice to reach the end values.
/// assert_eq!(spline.points.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ramp<Y> {
    /// The interpolation mode.
    pub interpolation: RampInterpolation,
    /// Knots, sorted by ascending x.
    pub points: Vec<(f64, Y)>,
}

/// The number of times each end knot appears in the evaluatable form:
/// 3 for B-spline, 2 for Catmull-Rom, 1 otherwise.
#[must_use]
pub fn end_point_multiplicity(interpolation: RampInterpolation) -> usize {
    match interpolation {
        RampInterpolation::BSpline => 3,
        RampInterpolation::CatmullRom => 2,
        _ => 1,
    }
}

/// The `(start, end)` duplication counts the OSL-style array
/// representation requires.
///
/// OSL discards the first and last segment of linear splines and the
/// first and last two values of constant splines "to maintain
/// consistency with the other spline types", so those bases need
/// duplicates even though direct evaluation does not.
#[must_use]
pub fn osl_end_point_duplication(interpolation: RampInterpolation) -> (usize, usize) {
    match interpolation {
        RampInterpolation::CatmullRom | RampInterpolation::Linear => (1, 1),
        RampInterpolation::BSpline => (2, 2),
        RampInterpolation::Constant => (1, 2),
        RampInterpolation::MonotoneCubic => (0, 0),
    }
}

/// Lower monotone-cubic knots to Bezier control points.
///
/// The x handles sit at thirds, keeping each segment linear in x so the
/// knots behave predictably when the ramp drives a colour gradient. The
/// y tangents come from the Fritsch-Carlson weighted harmonic mean,
/// which keeps the curve monotone wherever the knots are; the end
/// tangents clamp to zero for consistency with common renderer ramps.
fn monotone_cubic_to_bezier<Y: SplineValue>(knots: &[(f64, Y)]) -> Vec<(f64, Y)> {
    if knots.len() < 2 {
        return knots.to_vec();
    }

    let mut result = Vec::with_capacity(knots.len() * 3 - 2);
    let mut prev_slope = Y::zero();

    for i in 0..knots.len() - 1 {
        let (x1, y1) = knots[i];
        let (x2, y2) = knots[i + 1];
        let dx = x2 - x1;

        let next_slope = if i + 2 < knots.len() {
            let (x3, y3) = knots[i + 2];
            let dx2 = x3 - x2;
            let s1 = (y2 - y1) * (1.0 / dx);
            let s2 = (y3 - y2) * (1.0 / dx2);
            Y::monotone_slope(s1, s2, dx, dx2)
        } else {
            Y::zero()
        };

        result.push((x1, y1));
        result.push((x1 + dx / 3.0, y1 + prev_slope * (dx / 3.0)));
        result.push((x1 + 2.0 * dx / 3.0, y2 - next_slope * (dx / 3.0)));

        prev_slope = next_slope;
    }

    result.push(knots[knots.len() - 1]);
    result
}

/// Remove runs of duplicated-x points at either end, keeping one point
/// of each run.
///
/// Spline data from external sources may carry duplicated end points for
/// a variety of reasons (evaluation-form splines duplicate so the curve
/// reaches the end values; OSL duplicates even for constant and linear
/// splines). The editable ramp form never wants them.
fn trim_end_points<Y: Copy>(points: &mut Vec<(f64, Y)>) {
    if points.is_empty() {
        return;
    }

    let first_x = points[0].0;
    let start_run = points.iter().take_while(|&&(x, _)| x == first_x).count();
    points.drain(0..start_run - 1);

    let last_x = points[points.len() - 1].0;
    let end_run = points
        .iter()
        .rev()
        .take_while(|&&(x, _)| x == last_x)
        .count();
    points.truncate(points.len() - (end_run - 1));
}

impl<Y: SplineValue> Ramp<Y> {
    /// Create a ramp, sorting the knots by x.
    #[must_use]
    pub fn new(interpolation: RampInterpolation, mut points: Vec<(f64, Y)>) -> Self {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            interpolation,
            points,
        }
    }

    /// Produce the evaluatable spline form of this ramp.
    ///
    /// Monotone-cubic knots are lowered to Bezier control points; then
    /// the end points are repeated per [`end_point_multiplicity`] so
    /// evaluation reaches the end values exactly.
    #[must_use]
    pub fn evaluator(&self) -> Spline<Y> {
        let (basis, mut points) = match self.interpolation {
            RampInterpolation::Linear => (CubicBasis::linear(), self.points.clone()),
            RampInterpolation::CatmullRom => (CubicBasis::catmull_rom(), self.points.clone()),
            RampInterpolation::BSpline => (CubicBasis::b_spline(), self.points.clone()),
            RampInterpolation::Constant => (CubicBasis::constant(), self.points.clone()),
            RampInterpolation::MonotoneCubic => {
                (CubicBasis::bezier(), monotone_cubic_to_bezier(&self.points))
            }
        };

        let multiplicity = end_point_multiplicity(self.interpolation);
        if !points.is_empty() {
            for _ in 0..multiplicity - 1 {
                points.insert(0, points[0]);
                points.push(points[points.len() - 1]);
            }
        }

        Spline::new(basis, points)
    }

    /// Export to the OSL-style `(basis, positions, values)` array
    /// representation, applying the exact per-basis endpoint
    /// duplication that representation requires.
    #[must_use]
    pub fn to_osl(&self) -> (&'static str, Vec<f64>, Vec<Y>) {
        let (basis, points) = match self.interpolation {
            RampInterpolation::MonotoneCubic => {
                ("bezier", monotone_cubic_to_bezier(&self.points))
            }
            RampInterpolation::BSpline => ("bspline", self.points.clone()),
            RampInterpolation::Linear => ("linear", self.points.clone()),
            RampInterpolation::Constant => ("constant", self.points.clone()),
            RampInterpolation::CatmullRom => ("catmull-rom", self.points.clone()),
        };

        let (start_duplicates, end_duplicates) = osl_end_point_duplication(self.interpolation);

        let mut positions = Vec::with_capacity(points.len() + start_duplicates + end_duplicates);
        let mut values = Vec::with_capacity(points.len() + start_duplicates + end_duplicates);

        if let Some(&(x, y)) = points.first() {
            for _ in 0..start_duplicates {
                positions.push(x);
                values.push(y);
            }
        }
        for &(x, y) in &points {
            positions.push(x);
            values.push(y);
        }
        if let Some(&(x, y)) = points.last() {
            for _ in 0..end_duplicates {
                positions.push(x);
                values.push(y);
            }
        }

        (basis, positions, values)
    }

    /// Import from the OSL-style array representation.
    ///
    /// Bezier streams are read as monotone-cubic knots (every third
    /// point); if the stream was not produced by the monotone-cubic
    /// export, the nearest monotone-cubic ramp is used and a warning is
    /// logged under `identifier`. Unrecognised basis names fall back to
    /// catmull-rom, matching OSL's own default. Duplicated end points
    /// are trimmed.
    #[must_use]
    pub fn from_osl(basis: &str, positions: &[f64], values: &[Y], identifier: &str) -> Self {
        let n = positions.len().min(values.len());

        if basis == "bezier" {
            let points = (0..n)
                .step_by(3)
                .map(|i| (positions[i], values[i]))
                .collect();
            let ramp = Self {
                interpolation: RampInterpolation::MonotoneCubic,
                points,
            };

            let (_, test_positions, test_values) = ramp.to_osl();
            if test_positions != positions[..n] || test_values != values[..n] {
                warn!(
                    identifier,
                    "bezier curve cannot be represented exactly; using the most similar \
                     monotone-cubic curve"
                );
            }
            return ramp;
        }

        let mut points: Vec<(f64, Y)> = (0..n).map(|i| (positions[i], values[i])).collect();

        let interpolation = match basis {
            "bspline" => RampInterpolation::BSpline,
            "linear" => RampInterpolation::Linear,
            "constant" => RampInterpolation::Constant,
            "monotonecubic" => RampInterpolation::MonotoneCubic,
            _ => RampInterpolation::CatmullRom,
        };

        trim_end_points(&mut points);

        Self {
            interpolation,
            points,
        }
    }

    /// The control-point multiplicity the OSL representation gives the
    /// start knot: one more than the duplication count.
    ///
    /// # Errors
    ///
    /// Monotone-cubic ramps have no fixed multiplicity (the exported
    /// stream is a converted Bezier), so they are rejected.
    pub fn osl_start_point_multiplicity(&self) -> RampResult<usize> {
        if self.interpolation == RampInterpolation::MonotoneCubic {
            return Err(RampError::MonotoneCubicAdaptor);
        }
        Ok(osl_end_point_duplication(self.interpolation).0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn knots() -> Vec<(f64, f64)> {
        vec![(0.0, 1.0), (0.4, 3.0), (1.0, 2.0)]
    }

    #[test]
    fn multiplicity_table() {
        assert_eq!(end_point_multiplicity(RampInterpolation::BSpline), 3);
        assert_eq!(end_point_multiplicity(RampInterpolation::CatmullRom), 2);
        assert_eq!(end_point_multiplicity(RampInterpolation::Linear), 1);
        assert_eq!(end_point_multiplicity(RampInterpolation::Constant), 1);
        assert_eq!(end_point_multiplicity(RampInterpolation::MonotoneCubic), 1);
    }

    #[test]
    fn osl_duplication_table() {
        assert_eq!(
            osl_end_point_duplication(RampInterpolation::CatmullRom),
            (1, 1)
        );
        assert_eq!(osl_end_point_duplication(RampInterpolation::BSpline), (2, 2));
        assert_eq!(osl_end_point_duplication(RampInterpolation::Linear), (1, 1));
        assert_eq!(
            osl_end_point_duplication(RampInterpolation::Constant),
            (1, 2)
        );
    }

    #[test]
    fn evaluator_duplicates_end_points() {
        let ramp = Ramp::new(RampInterpolation::BSpline, knots());
        let spline = ramp.evaluator();
        assert_eq!(spline.points.len(), 7);
        assert_eq!(spline.points[0], spline.points[2]);
        assert_eq!(spline.points[4], spline.points[6]);
    }

    #[test]
    fn evaluator_reaches_end_values() {
        for interpolation in [
            RampInterpolation::Linear,
            RampInterpolation::CatmullRom,
            RampInterpolation::BSpline,
            RampInterpolation::MonotoneCubic,
        ] {
            let ramp = Ramp::new(interpolation, knots());
            let spline = ramp.evaluator();
            assert_relative_eq!(spline.evaluate(0.0), 1.0, epsilon = 1e-9);
            assert_relative_eq!(spline.evaluate(1.0), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn monotone_cubic_interpolates_knots() {
        let ramp = Ramp::new(RampInterpolation::MonotoneCubic, knots());
        let spline = ramp.evaluator();
        for (x, y) in knots() {
            assert_relative_eq!(spline.evaluate(x), y, epsilon = 1e-9);
        }
    }

    #[test]
    fn monotone_cubic_does_not_overshoot() {
        // Monotone increasing knots with wildly uneven spacing; a plain
        // Catmull-Rom would overshoot between the last two.
        let ramp = Ramp::new(
            RampInterpolation::MonotoneCubic,
            vec![(0.0, 0.0), (0.1, 0.9), (0.2, 1.0), (1.0, 1.0)],
        );
        let spline = ramp.evaluator();
        let mut prev = spline.evaluate(0.0);
        for i in 1..=1000 {
            let x = f64::from(i) / 1000.0;
            let y = spline.evaluate(x);
            assert!(
                y >= prev - 1e-9,
                "curve decreased at x={x}: {y} < {prev}"
            );
            assert!(y <= 1.0 + 1e-9, "curve overshot at x={x}: {y}");
            prev = y;
        }
    }

    #[test]
    fn osl_round_trip() {
        for interpolation in [
            RampInterpolation::Linear,
            RampInterpolation::CatmullRom,
            RampInterpolation::BSpline,
            RampInterpolation::Constant,
            RampInterpolation::MonotoneCubic,
        ] {
            let ramp = Ramp::new(interpolation, knots());
            let (basis, positions, values) = ramp.to_osl();
            let restored = Ramp::from_osl(basis, &positions, &values, "test");
            assert_eq!(restored, ramp, "round trip failed for {interpolation:?}");
        }
    }

    #[test]
    fn osl_duplication_counts_in_stream() {
        let ramp = Ramp::new(RampInterpolation::Constant, knots());
        let (basis, positions, _) = ramp.to_osl();
        assert_eq!(basis, "constant");
        // One duplicate at the start, two at the end.
        assert_eq!(
            positions,
            vec![0.0, 0.0, 0.4, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn adaptor_multiplicity() {
        let ramp = Ramp::new(RampInterpolation::BSpline, knots());
        assert_eq!(ramp.osl_start_point_multiplicity().unwrap(), 3);

        let monotone = Ramp::new(RampInterpolation::MonotoneCubic, knots());
        assert!(monotone.osl_start_point_multiplicity().is_err());
    }
}
