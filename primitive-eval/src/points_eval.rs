//! Point cloud evaluator: nearest-point queries over a KD-tree.

use std::sync::OnceLock;

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use tracing::debug;

use primitive_types::{
    AttributeData, Interpolation, PointsPrimitive, PrimitiveTopology, PrimitiveVariable,
};

use crate::sample::{impl_result_sampling, Contributions};
use crate::{EvalError, EvalResult};

/// Closest-point queries against an immutable snapshot of a point
/// cloud.
///
/// The KD-tree over positions is built on the first spatial query and
/// shared read-only afterwards; concurrent queries are safe provided
/// each thread uses its own [`PointsResult`].
///
/// # Example
///
/// ```
/// use nalgebra::{Point3, Vector3};
/// use primitive_types::{AttributeData, Interpolation, PointsPrimitive, PrimitiveVariable};
/// use primitive_eval::PointsEvaluator;
///
/// let mut points = PointsPrimitive::new(2);
/// points.variables.insert(
///     "P".to_string(),
///     PrimitiveVariable::new(
///         Interpolation::Vertex,
///         AttributeData::Vec3(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 0.0, 0.0)]),
///     ),
/// );
///
/// let evaluator = PointsEvaluator::new(&points).unwrap();
/// let mut result = evaluator.create_result();
/// assert!(evaluator.closest_point(&Point3::new(3.0, 1.0, 0.0), &mut result));
/// assert_eq!(result.point_index(), 1);
/// ```
pub struct PointsEvaluator {
    points: PointsPrimitive,
    positions: Vec<Point3<f64>>,
    tree: OnceLock<KdTree<f64, 3>>,
}

/// Scratch state of the last query against a [`PointsEvaluator`].
#[derive(Debug, Clone)]
pub struct PointsResult {
    point_index: usize,
    position: Point3<f64>,
}

impl Default for PointsResult {
    fn default() -> Self {
        Self {
            point_index: 0,
            position: Point3::origin(),
        }
    }
}

impl PointsResult {
    /// The index of the found point.
    #[must_use]
    pub const fn point_index(&self) -> usize {
        self.point_index
    }

    /// The found point's position.
    #[must_use]
    pub const fn point(&self) -> Point3<f64> {
        self.position
    }

    fn contributions(&self, interpolation: Interpolation) -> Contributions {
        match interpolation {
            Interpolation::Constant | Interpolation::Uniform => Contributions::single(0),
            _ => Contributions::single(self.point_index),
        }
    }
}

impl_result_sampling!(PointsResult);

impl PointsEvaluator {
    /// Create an evaluator over a snapshot of `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud has no `P` variable, `P` is not a
    /// per-point Vec3 array, or its length disagrees with the point
    /// count.
    pub fn new(points: &PointsPrimitive) -> EvalResult<Self> {
        let positions = extract_positions(points)?;
        Ok(Self {
            points: points.clone(),
            positions,
            tree: OnceLock::new(),
        })
    }

    /// The evaluator's own snapshot of the point cloud.
    #[must_use]
    pub const fn primitive(&self) -> &PointsPrimitive {
        &self.points
    }

    /// Allocate an empty result for queries against this evaluator.
    #[must_use]
    pub fn create_result(&self) -> PointsResult {
        PointsResult::default()
    }

    /// Check that `variable` fits this evaluator's primitive, once,
    /// before issuing many queries that sample it.
    ///
    /// # Errors
    ///
    /// Returns an error describing the size mismatch.
    pub fn validate_variable(&self, variable: &PrimitiveVariable) -> EvalResult<()> {
        let expected = self.points.variable_size(variable.interpolation);
        if variable.size() == expected {
            Ok(())
        } else {
            Err(EvalError::SizeMismatch {
                expected,
                actual: variable.size(),
            })
        }
    }

    /// Find the point nearest to `query`. Returns `false` for an empty
    /// cloud.
    pub fn closest_point(&self, query: &Point3<f64>, result: &mut PointsResult) -> bool {
        if self.positions.is_empty() {
            return false;
        }

        let tree = self.tree.get_or_init(|| {
            let mut tree: KdTree<f64, 3> = KdTree::new();
            for (i, p) in self.positions.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                tree.add(&[p.x, p.y, p.z], i as u64);
            }
            debug!(points = self.positions.len(), "built points kd-tree");
            tree
        });

        let nearest = tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y, query.z]);
        #[allow(clippy::cast_possible_truncation)]
        let index = nearest.item as usize;
        result.point_index = index;
        result.position = self.positions[index];
        true
    }
}

fn extract_positions(points: &PointsPrimitive) -> EvalResult<Vec<Point3<f64>>> {
    let p = points
        .variables
        .get("P")
        .ok_or(EvalError::MissingVariable("P"))?;
    let AttributeData::Vec3(values) = p.expanded_data() else {
        return Err(EvalError::WrongType {
            expected: "Vec3",
            actual: p.data.type_name(),
        });
    };
    if values.len() != points.num_points() {
        return Err(EvalError::SizeMismatch {
            expected: points.num_points(),
            actual: values.len(),
        });
    }
    Ok(values.into_iter().map(Point3::from).collect())
}
