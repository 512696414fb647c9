//! Point cloud primitive.

use std::collections::BTreeMap;

use crate::{Interpolation, PrimitiveTopology, PrimitiveVariable};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point cloud.
///
/// Points have no topology beyond their count: every per-element level
/// (`Vertex`, `Varying`, `FaceVarying`) has one value per point, and
/// `Uniform` collapses to a single value.
///
/// # Example
///
/// ```
/// use primitive_types::{AttributeData, Interpolation, PointsPrimitive, PrimitiveVariable, PrimitiveTopology};
///
/// let mut points = PointsPrimitive::new(3);
/// points.variables.insert(
///     "width".to_string(),
///     PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![0.1, 0.2, 0.3])),
/// );
/// assert!(points.validate_variables().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointsPrimitive {
    num_points: usize,
    /// Named attributes, keyed for order-insensitive merging.
    pub variables: BTreeMap<String, PrimitiveVariable>,
}

impl PointsPrimitive {
    /// Create a point cloud with `num_points` points and no attributes.
    #[must_use]
    pub const fn new(num_points: usize) -> Self {
        Self {
            num_points,
            variables: BTreeMap::new(),
        }
    }

    /// The number of points.
    #[inline]
    #[must_use]
    pub const fn num_points(&self) -> usize {
        self.num_points
    }

    /// Change the point count. Existing per-point variables must be
    /// re-validated by the caller.
    pub fn set_num_points(&mut self, num_points: usize) {
        self.num_points = num_points;
    }
}

impl PrimitiveTopology for PointsPrimitive {
    fn variable_size(&self, interpolation: Interpolation) -> usize {
        match interpolation {
            Interpolation::Constant | Interpolation::Uniform => 1,
            Interpolation::Vertex | Interpolation::Varying | Interpolation::FaceVarying => {
                self.num_points
            }
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
    use crate::AttributeData;

    #[test]
    fn variable_sizes() {
        let points = PointsPrimitive::new(5);
        assert_eq!(points.variable_size(Interpolation::Constant), 1);
        assert_eq!(points.variable_size(Interpolation::Uniform), 1);
        assert_eq!(points.variable_size(Interpolation::Vertex), 5);
        assert_eq!(points.variable_size(Interpolation::Varying), 5);
        assert_eq!(points.variable_size(Interpolation::FaceVarying), 5);
    }

    #[test]
    fn validation_rejects_wrong_length() {
        let mut points = PointsPrimitive::new(2);
        points.variables.insert(
            "bad".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![1.0])),
        );
        assert!(points.validate_variables().is_err());
    }
}
