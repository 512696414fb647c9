//! Attribute interpolation levels.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The granularity at which an attribute varies over a primitive.
///
/// The declaration order is meaningful: levels are ordered from coarsest
/// to finest, and `a < b` means converting from `a` to `b` is an
/// up-sampling. The resampling engine relies on this ordering when
/// deciding whether an indexed attribute can be resampled through its
/// index table alone.
///
/// The topological element count of each level depends on the primitive
/// kind; see the `variable_size` method of each primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    /// A single value for the whole primitive.
    Constant,
    /// One value per macro element (curve, face).
    Uniform,
    /// One value per control point / mesh point.
    Vertex,
    /// One value per curve segment endpoint; coincides with `Vertex`
    /// for meshes.
    Varying,
    /// One value per face corner (meshes); coincides with `Varying`
    /// for curves.
    FaceVarying,
}

impl Interpolation {
    /// Human-readable name, matching the conventional lowercase spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Vertex => "vertex",
            Self::Varying => "varying",
            Self::FaceVarying => "facevarying",
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_coarse_to_fine() {
        assert!(Interpolation::Constant < Interpolation::Uniform);
        assert!(Interpolation::Uniform < Interpolation::Vertex);
        assert!(Interpolation::Vertex < Interpolation::Varying);
        assert!(Interpolation::Varying < Interpolation::FaceVarying);
    }
}
