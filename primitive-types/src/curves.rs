//! Piecewise cubic and linear curve network primitive.

use std::collections::BTreeMap;

use crate::{
    CubicBasis, Interpolation, PrimitiveError, PrimitiveResult, PrimitiveTopology,
    PrimitiveVariable,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A network of curves sharing one basis and periodicity.
///
/// Each curve is described by its control-point count; vertex-level
/// attribute arrays are the concatenation of every curve's control
/// points. For non-linear bases the varying level (one value per segment
/// boundary) can be smaller than the vertex level, since a cubic segment
/// consumes `step` control points.
///
/// # Example
///
/// ```
/// use primitive_types::{CubicBasis, CurvesPrimitive, Interpolation, PrimitiveTopology};
///
/// let curves = CurvesPrimitive::new(vec![3, 4], CubicBasis::linear(), false).unwrap();
/// assert_eq!(curves.num_curves(), 2);
/// assert_eq!(curves.variable_size(Interpolation::Vertex), 7);
/// // Linear open curves: one varying value per vertex.
/// assert_eq!(curves.variable_size(Interpolation::Varying), 7);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurvesPrimitive {
    vertices_per_curve: Vec<usize>,
    basis: CubicBasis,
    periodic: bool,
    /// Named attributes, keyed for order-insensitive merging.
    pub variables: BTreeMap<String, PrimitiveVariable>,
}

impl CurvesPrimitive {
    /// Create a curve network.
    ///
    /// # Errors
    ///
    /// Returns an error if any curve has too few control points for the
    /// basis, or a control-point count incompatible with the basis step.
    pub fn new(
        vertices_per_curve: Vec<usize>,
        basis: CubicBasis,
        periodic: bool,
    ) -> PrimitiveResult<Self> {
        let linear = basis == CubicBasis::linear();
        for (curve, &nv) in vertices_per_curve.iter().enumerate() {
            let ok = if linear {
                nv >= if periodic { 3 } else { 2 }
            } else if periodic {
                nv >= 3 && nv % basis.step == 0
            } else {
                nv >= 4 && (nv - 4) % basis.step == 0
            };
            if !ok {
                return Err(PrimitiveError::invalid_topology(format!(
                    "curve {curve} has {nv} vertices, invalid for the given basis"
                )));
            }
        }
        Ok(Self {
            vertices_per_curve,
            basis,
            periodic,
            variables: BTreeMap::new(),
        })
    }

    /// The number of curves.
    #[inline]
    #[must_use]
    pub fn num_curves(&self) -> usize {
        self.vertices_per_curve.len()
    }

    /// The total control-point count over all curves.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices_per_curve.iter().sum()
    }

    /// Per-curve control-point counts.
    #[inline]
    #[must_use]
    pub fn vertices_per_curve(&self) -> &[usize] {
        &self.vertices_per_curve
    }

    /// The cubic basis shared by all curves.
    #[inline]
    #[must_use]
    pub const fn basis(&self) -> &CubicBasis {
        &self.basis
    }

    /// Whether the curves wrap around.
    #[inline]
    #[must_use]
    pub const fn periodic(&self) -> bool {
        self.periodic
    }

    /// The number of segments of one curve.
    ///
    /// # Panics
    ///
    /// Panics if `curve_index` is out of range.
    #[must_use]
    pub fn num_segments(&self, curve_index: usize) -> usize {
        self.basis
            .num_segments(self.periodic, self.vertices_per_curve[curve_index])
    }

    /// The varying-level value count of one curve: one value per
    /// segment boundary, which the periodic wrap collapses by one.
    #[must_use]
    pub fn varying_size(&self, curve_index: usize) -> usize {
        self.num_segments(curve_index) + usize::from(!self.periodic)
    }
}

impl PrimitiveTopology for CurvesPrimitive {
    fn variable_size(&self, interpolation: Interpolation) -> usize {
        match interpolation {
            Interpolation::Constant => 1,
            Interpolation::Uniform => self.num_curves(),
            Interpolation::Vertex => self.num_vertices(),
            Interpolation::Varying | Interpolation::FaceVarying => {
                (0..self.num_curves()).map(|c| self.varying_size(c)).sum()
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

    #[test]
    fn linear_sizes() {
        let curves = CurvesPrimitive::new(vec![3, 4], CubicBasis::linear(), false).unwrap();
        assert_eq!(curves.variable_size(Interpolation::Uniform), 2);
        assert_eq!(curves.variable_size(Interpolation::Vertex), 7);
        assert_eq!(curves.variable_size(Interpolation::Varying), 7);
        assert_eq!(curves.variable_size(Interpolation::FaceVarying), 7);
    }

    #[test]
    fn bspline_varying_differs_from_vertex() {
        let curves = CurvesPrimitive::new(vec![6], CubicBasis::b_spline(), false).unwrap();
        assert_eq!(curves.num_segments(0), 3);
        assert_eq!(curves.variable_size(Interpolation::Vertex), 6);
        assert_eq!(curves.variable_size(Interpolation::Varying), 4);
    }

    #[test]
    fn periodic_linear_varying_matches_vertex_count() {
        let curves = CurvesPrimitive::new(vec![4], CubicBasis::linear(), true).unwrap();
        assert_eq!(curves.num_segments(0), 4);
        assert_eq!(curves.variable_size(Interpolation::Varying), 4);
    }

    #[test]
    fn rejects_bad_topology() {
        assert!(CurvesPrimitive::new(vec![1], CubicBasis::linear(), false).is_err());
        assert!(CurvesPrimitive::new(vec![3], CubicBasis::b_spline(), false).is_err());
        // Bezier needs 4 + 3k control points.
        assert!(CurvesPrimitive::new(vec![6], CubicBasis::bezier(), false).is_err());
        assert!(CurvesPrimitive::new(vec![7], CubicBasis::bezier(), false).is_ok());
    }
}
