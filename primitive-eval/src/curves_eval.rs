//! Curve network evaluator: parametric evaluation, closest point and
//! arc length.

use std::sync::OnceLock;

use nalgebra::{Point3, Vector2, Vector3};
use tracing::debug;

use primitive_types::{
    AttributeData, CubicBasis, CurvesPrimitive, Interpolation, PrimitiveTopology,
    PrimitiveVariable,
};

use crate::bound_tree::{BoundTree, NodeKind};
use crate::sample::{impl_result_sampling, Contributions};
use crate::{Aabb, EvalError, EvalResult};

/// Line segments approximating each cubic curve segment in the
/// closest-point tree.
const LINES_PER_CURVE_SEGMENT: usize = 20;

/// Sample count for numerically integrating arc length over one
/// control-point span.
const LENGTH_SAMPLES_PER_SPAN: usize = 10;

/// Parametric and spatial queries against an immutable snapshot of a
/// curve network.
///
/// Parametric evaluation ([`point_at_v`](CurvesEvaluator::point_at_v))
/// needs no acceleration structure; the closest-point tree over line
/// approximations of each curve is built lazily on the first
/// [`closest_point`](CurvesEvaluator::closest_point) call and is
/// read-only afterwards. Concurrent queries are safe provided each
/// thread uses its own [`CurvesResult`].
#[derive(Debug)]
pub struct CurvesEvaluator {
    curves: CurvesPrimitive,
    p: Vec<Point3<f64>>,
    vertex_data_offsets: Vec<usize>,
    varying_data_offsets: Vec<usize>,
    linear: bool,
    tree: OnceLock<SegmentTree>,
}

#[derive(Debug)]
struct SegmentTree {
    tree: BoundTree,
    lines: Vec<Line>,
}

/// One line of a curve's polyline approximation, remembering the curve
/// and the v range it covers so a tree hit can be refined parametrically.
#[derive(Debug, Clone)]
struct Line {
    start: Point3<f64>,
    end: Point3<f64>,
    curve_index: usize,
    v_min: f64,
    v_max: f64,
}

/// Scratch state of the last query against a [`CurvesEvaluator`]:
/// the segment's blend coefficients and the data indices they apply to.
#[derive(Debug, Clone)]
pub struct CurvesResult {
    curve_index: usize,
    v: f64,
    segment_v: f64,
    linear: bool,
    coefficients: [f64; 4],
    derivative_coefficients: [f64; 4],
    vertex_data_indices: [usize; 4],
    varying_data_indices: [usize; 2],
    position: Point3<f64>,
    tangent: Vector3<f64>,
}

impl Default for CurvesResult {
    fn default() -> Self {
        Self {
            curve_index: 0,
            v: 0.0,
            segment_v: 0.0,
            linear: true,
            coefficients: [0.0; 4],
            derivative_coefficients: [0.0; 4],
            vertex_data_indices: [0; 4],
            varying_data_indices: [0; 2],
            position: Point3::origin(),
            tangent: Vector3::zeros(),
        }
    }
}

impl CurvesResult {
    /// The curve the last query landed on.
    #[must_use]
    pub const fn curve_index(&self) -> usize {
        self.curve_index
    }

    /// The parametric position along that curve, in `[0, 1]`.
    #[must_use]
    pub const fn v(&self) -> f64 {
        self.v
    }

    /// The query position on the curve.
    #[must_use]
    pub const fn point(&self) -> Point3<f64> {
        self.position
    }

    /// The parametric coordinates of the result. Curves are
    /// one-parameter, so u is always 0.
    #[must_use]
    pub fn uv(&self) -> Vector2<f64> {
        Vector2::new(0.0, self.v)
    }

    /// The (unnormalised) derivative of position with respect to the
    /// segment parameter.
    #[must_use]
    pub const fn v_tangent(&self) -> Vector3<f64> {
        self.tangent
    }

    fn contributions(&self, interpolation: Interpolation) -> Contributions {
        match interpolation {
            Interpolation::Constant => Contributions::single(0),
            Interpolation::Uniform => Contributions::single(self.curve_index),
            Interpolation::Vertex => {
                if self.linear {
                    Contributions::pair(
                        (self.vertex_data_indices[0], self.coefficients[0]),
                        (self.vertex_data_indices[1], self.coefficients[1]),
                    )
                } else {
                    Contributions::quad(self.vertex_data_indices, self.coefficients)
                }
            }
            Interpolation::Varying | Interpolation::FaceVarying => Contributions::pair(
                (self.varying_data_indices[0], 1.0 - self.segment_v),
                (self.varying_data_indices[1], self.segment_v),
            ),
        }
    }

    /// Bind this result to `(curve_index, v)` on the evaluator.
    fn init(&mut self, evaluator: &CurvesEvaluator, curve_index: usize, v: f64) {
        let curves = &evaluator.curves;
        let num_vertices = curves.vertices_per_curve()[curve_index];
        let num_segments = curves.num_segments(curve_index);
        let periodic = curves.periodic();
        let basis = curves.basis();

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation,
                clippy::cast_sign_loss)]
        let segment = {
            let vv = v * num_segments as f64;
            (vv.floor() as usize).min(num_segments - 1)
        };
        #[allow(clippy::cast_precision_loss)]
        let segment_v = v.mul_add(num_segments as f64, -(segment as f64));

        self.curve_index = curve_index;
        self.v = v;
        self.segment_v = segment_v;
        self.linear = evaluator.linear;

        let vertex_offset = evaluator.vertex_data_offsets[curve_index];
        let varying_offset = evaluator.varying_data_offsets[curve_index];
        let first = segment * basis.step;

        if evaluator.linear {
            self.coefficients = [1.0 - segment_v, segment_v, 0.0, 0.0];
            self.derivative_coefficients = [-1.0, 1.0, 0.0, 0.0];
            self.vertex_data_indices[0] = vertex_offset + first;
            self.vertex_data_indices[1] = if periodic {
                vertex_offset + (first + 1) % num_vertices
            } else {
                self.vertex_data_indices[0] + 1
            };
            self.varying_data_indices[0] = self.vertex_data_indices[0];
            self.varying_data_indices[1] = self.vertex_data_indices[1];

            let p0 = evaluator.p[self.vertex_data_indices[0]];
            let p1 = evaluator.p[self.vertex_data_indices[1]];
            self.position = Point3::from(
                p0.coords * self.coefficients[0] + p1.coords * self.coefficients[1],
            );
            self.tangent = p1 - p0;
        } else {
            self.coefficients = basis.coefficients(segment_v);
            self.derivative_coefficients = basis.derivative_coefficients(segment_v);

            if periodic {
                for k in 0..4 {
                    self.vertex_data_indices[k] = vertex_offset + (first + k) % num_vertices;
                }
                self.varying_data_indices[0] = varying_offset + segment;
                self.varying_data_indices[1] = varying_offset + (segment + 1) % num_segments;
            } else {
                for k in 0..4 {
                    self.vertex_data_indices[k] = vertex_offset + first + k;
                }
                self.varying_data_indices[0] = varying_offset + segment;
                self.varying_data_indices[1] = self.varying_data_indices[0] + 1;
            }

            let cv = [
                evaluator.p[self.vertex_data_indices[0]].coords,
                evaluator.p[self.vertex_data_indices[1]].coords,
                evaluator.p[self.vertex_data_indices[2]].coords,
                evaluator.p[self.vertex_data_indices[3]].coords,
            ];
            self.position = Point3::from(
                cv[0] * self.coefficients[0]
                    + cv[1] * self.coefficients[1]
                    + cv[2] * self.coefficients[2]
                    + cv[3] * self.coefficients[3],
            );
            self.tangent = cv[0] * self.derivative_coefficients[0]
                + cv[1] * self.derivative_coefficients[1]
                + cv[2] * self.derivative_coefficients[2]
                + cv[3] * self.derivative_coefficients[3];
        }
    }
}

impl_result_sampling!(CurvesResult);

impl CurvesEvaluator {
    /// Create an evaluator over a snapshot of `curves`.
    ///
    /// # Errors
    ///
    /// Returns an error if the network has no `P` variable or `P` is
    /// not a vertex-sized Vec3 array.
    pub fn new(curves: &CurvesPrimitive) -> EvalResult<Self> {
        let p_var = curves
            .variables
            .get("P")
            .ok_or(EvalError::MissingVariable("P"))?;
        let AttributeData::Vec3(values) = p_var.expanded_data() else {
            return Err(EvalError::WrongType {
                expected: "Vec3",
                actual: p_var.data.type_name(),
            });
        };
        if values.len() != curves.num_vertices() {
            return Err(EvalError::SizeMismatch {
                expected: curves.num_vertices(),
                actual: values.len(),
            });
        }

        let mut vertex_data_offsets = Vec::with_capacity(curves.num_curves());
        let mut varying_data_offsets = Vec::with_capacity(curves.num_curves());
        let mut vertex_offset = 0;
        let mut varying_offset = 0;
        for curve in 0..curves.num_curves() {
            vertex_data_offsets.push(vertex_offset);
            vertex_offset += curves.vertices_per_curve()[curve];
            varying_data_offsets.push(varying_offset);
            varying_offset += curves.varying_size(curve);
        }

        let linear = *curves.basis() == CubicBasis::linear();

        Ok(Self {
            curves: curves.clone(),
            p: values.into_iter().map(Point3::from).collect(),
            vertex_data_offsets,
            varying_data_offsets,
            linear,
            tree: OnceLock::new(),
        })
    }

    /// The evaluator's own snapshot of the curves.
    #[must_use]
    pub const fn primitive(&self) -> &CurvesPrimitive {
        &self.curves
    }

    /// Per-curve offsets into vertex-level attribute arrays.
    #[must_use]
    pub fn vertex_data_offsets(&self) -> &[usize] {
        &self.vertex_data_offsets
    }

    /// Per-curve offsets into varying-level attribute arrays.
    #[must_use]
    pub fn varying_data_offsets(&self) -> &[usize] {
        &self.varying_data_offsets
    }

    /// Allocate an empty result for queries against this evaluator.
    #[must_use]
    pub fn create_result(&self) -> CurvesResult {
        CurvesResult::default()
    }

    /// Check that `variable` fits this evaluator's primitive, once,
    /// before issuing many queries that sample it.
    ///
    /// # Errors
    ///
    /// Returns an error describing the size mismatch.
    pub fn validate_variable(&self, variable: &PrimitiveVariable) -> EvalResult<()> {
        let expected = self.curves.variable_size(variable.interpolation);
        if variable.size() == expected {
            Ok(())
        } else {
            Err(EvalError::SizeMismatch {
                expected,
                actual: variable.size(),
            })
        }
    }

    /// Evaluate curve `curve_index` at parameter `v`. Returns `false`
    /// for an out-of-range curve or parameter.
    pub fn point_at_v(&self, curve_index: usize, v: f64, result: &mut CurvesResult) -> bool {
        if curve_index >= self.curves.num_curves() || !(0.0..=1.0).contains(&v) {
            return false;
        }
        result.init(self, curve_index, v);
        true
    }

    /// Evaluate at a parametric coordinate. Curves are one-parameter:
    /// `uv.x` is ignored and the first curve is used.
    pub fn point_at_uv(&self, uv: &Vector2<f64>, result: &mut CurvesResult) -> bool {
        self.point_at_v(0, uv.y, result)
    }

    /// Find the closest point on any curve to `query`. Returns `false`
    /// for an empty network.
    ///
    /// The tree walk finds the best line of a per-segment polyline
    /// approximation; the result is then re-evaluated parametrically on
    /// the owning curve, so sampled attributes use exact basis
    /// coefficients.
    pub fn closest_point(&self, query: &Point3<f64>, result: &mut CurvesResult) -> bool {
        if self.curves.num_curves() == 0 {
            return false;
        }

        let segment_tree = self.tree.get_or_init(|| self.build_tree());
        if segment_tree.tree.is_empty() {
            return false;
        }

        let mut best = ClosestLine {
            curve_index: 0,
            v: 0.0,
            distance_squared: f64::INFINITY,
        };
        self.closest_walk(segment_tree, segment_tree.tree.root(), query, &mut best);

        result.init(self, best.curve_index, best.v);
        true
    }

    /// The arc length of curve `curve_index` between parameters
    /// `v_start` and `v_end`.
    ///
    /// Linear curves measure the polyline exactly, including fractional
    /// end spans and the periodic wrap; cubic curves integrate
    /// `|dP/dv|` with a fixed number of samples per control-point span.
    /// Returns 0 for a degenerate or out-of-range interval.
    #[must_use]
    pub fn curve_length(&self, curve_index: usize, v_start: f64, v_end: f64) -> f64 {
        if curve_index >= self.curves.num_curves()
            || v_start >= v_end
            || !(0.0..=1.0).contains(&v_start)
            || !(0.0..=1.0).contains(&v_end)
        {
            return 0.0;
        }

        if self.linear {
            self.linear_length(curve_index, v_start, v_end)
        } else {
            self.cubic_length(curve_index, v_start, v_end)
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation,
            clippy::cast_sign_loss)]
    fn linear_length(&self, curve_index: usize, v_start: f64, v_end: f64) -> f64 {
        let num_segments = self.curves.num_segments(curve_index);
        let num_vertices = self.curves.vertices_per_curve()[curve_index];
        let offset = self.vertex_data_offsets[curve_index];

        let vertex = |local: usize| {
            // The periodic wrap folds the one-past-the-end vertex back
            // to the curve start.
            self.p[offset + local % num_vertices]
        };

        let lower_position = v_start * num_segments as f64;
        let upper_position = v_end * num_segments as f64;
        let lower_segment = lower_position.floor() as usize;
        let upper_boundary = (upper_position.ceil() as usize).min(num_segments);

        if upper_boundary == lower_segment + 1 {
            // The interval lands in a single segment.
            let fraction = upper_position - lower_position;
            return (vertex(lower_segment + 1) - vertex(lower_segment)).norm() * fraction;
        }

        let lower_fraction = (lower_segment + 1) as f64 - lower_position;
        let upper_fraction = upper_position - (upper_boundary - 1) as f64;

        let mut length =
            (vertex(lower_segment + 1) - vertex(lower_segment)).norm() * lower_fraction;
        length += (vertex(upper_boundary) - vertex(upper_boundary - 1)).norm() * upper_fraction;
        for segment in lower_segment + 1..upper_boundary - 1 {
            length += (vertex(segment + 1) - vertex(segment)).norm();
        }
        length
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation,
            clippy::cast_sign_loss)]
    fn cubic_length(&self, curve_index: usize, v_start: f64, v_end: f64) -> f64 {
        let num_segments = self.curves.num_segments(curve_index) as f64;
        let lower_boundary = (v_start * num_segments).floor() as usize;
        let upper_boundary = (v_end * num_segments).ceil() as usize;

        let mut result = self.create_result();

        if upper_boundary - lower_boundary == 1 {
            return self.integrate(curve_index, v_start, v_end, &mut result);
        }

        let mut length = self.integrate(
            curve_index,
            v_start,
            (lower_boundary + 1) as f64 / num_segments,
            &mut result,
        );
        for boundary in lower_boundary + 1..upper_boundary - 1 {
            length += self.integrate(
                curve_index,
                boundary as f64 / num_segments,
                (boundary + 1) as f64 / num_segments,
                &mut result,
            );
        }
        length += self.integrate(
            curve_index,
            (upper_boundary - 1) as f64 / num_segments,
            v_end,
            &mut result,
        );
        length
    }

    /// Measure the polyline through `LENGTH_SAMPLES_PER_SPAN` samples
    /// of the interval.
    #[allow(clippy::cast_precision_loss)]
    fn integrate(
        &self,
        curve_index: usize,
        v_start: f64,
        v_end: f64,
        result: &mut CurvesResult,
    ) -> f64 {
        result.init(self, curve_index, v_start);
        let mut previous = result.point();
        let step = (v_end - v_start) / LENGTH_SAMPLES_PER_SPAN as f64;
        let mut length = 0.0;
        for i in 1..=LENGTH_SAMPLES_PER_SPAN {
            let v = (i as f64).mul_add(step, v_start);
            result.init(self, curve_index, v.min(1.0));
            let current = result.point();
            length += (current - previous).norm();
            previous = current;
        }
        length
    }

    #[allow(clippy::cast_precision_loss)]
    fn build_tree(&self) -> SegmentTree {
        let mut lines = Vec::new();
        let mut scratch = self.create_result();

        for curve in 0..self.curves.num_curves() {
            let num_segments = self.curves.num_segments(curve);
            if num_segments == 0 {
                continue;
            }

            if self.linear {
                // The polyline is exact for linear curves.
                let offset = self.vertex_data_offsets[curve];
                let num_vertices = self.curves.vertices_per_curve()[curve];
                for segment in 0..num_segments {
                    let start = self.p[offset + segment];
                    let end = self.p[offset + (segment + 1) % num_vertices];
                    lines.push(Line {
                        start,
                        end,
                        curve_index: curve,
                        v_min: segment as f64 / num_segments as f64,
                        v_max: (segment + 1) as f64 / num_segments as f64,
                    });
                }
            } else {
                let steps = num_segments * LINES_PER_CURVE_SEGMENT;
                let mut previous_point = Point3::origin();
                let mut previous_v = 0.0;
                for i in 0..=steps {
                    let v = i as f64 / steps as f64;
                    scratch.init(self, curve, v);
                    let point = scratch.point();
                    if i != 0 {
                        lines.push(Line {
                            start: previous_point,
                            end: point,
                            curve_index: curve,
                            v_min: previous_v,
                            v_max: v,
                        });
                    }
                    previous_point = point;
                    previous_v = v;
                }
            }
        }

        let bounds: Vec<Aabb> = lines
            .iter()
            .map(|line| Aabb::from_points([line.start, line.end].iter()))
            .collect();
        debug!(
            curves = self.curves.num_curves(),
            lines = lines.len(),
            "built curves segment tree"
        );
        SegmentTree {
            tree: BoundTree::build(&bounds),
            lines,
        }
    }

    fn closest_walk(
        &self,
        segment_tree: &SegmentTree,
        node_index: usize,
        query: &Point3<f64>,
        best: &mut ClosestLine,
    ) {
        let node = segment_tree.tree.node(node_index);
        match node.kind {
            NodeKind::Leaf { first, last } => {
                for &item in segment_tree.tree.items(first, last) {
                    let line = &segment_tree.lines[item];
                    let (closest, t) = closest_point_on_segment(&line.start, &line.end, query);
                    let distance_squared = (closest - query).norm_squared();
                    if distance_squared < best.distance_squared {
                        best.distance_squared = distance_squared;
                        best.curve_index = line.curve_index;
                        best.v = t.mul_add(line.v_max - line.v_min, line.v_min);
                    }
                }
            }
            NodeKind::Branch { low, high } => {
                let d_low = segment_tree.tree.node(low).bound.distance_squared(query);
                let d_high = segment_tree.tree.node(high).bound.distance_squared(query);
                let (near, far, d_far) = if d_low < d_high {
                    (low, high, d_high)
                } else {
                    (high, low, d_low)
                };
                self.closest_walk(segment_tree, near, query, best);
                if d_far < best.distance_squared {
                    self.closest_walk(segment_tree, far, query, best);
                }
            }
        }
    }
}

struct ClosestLine {
    curve_index: usize,
    v: f64,
    distance_squared: f64,
}

/// Closest point on a segment, with the segment parameter of that point.
fn closest_point_on_segment(
    a: &Point3<f64>,
    b: &Point3<f64>,
    query: &Point3<f64>,
) -> (Point3<f64>, f64) {
    let ab = b - a;
    let t = (ab.dot(&(query - a)) / ab.norm_squared().max(f64::EPSILON)).clamp(0.0, 1.0);
    (a + ab * t, t)
}
