//! Shared topology behaviour and the closed primitive kind set.

use std::collections::BTreeMap;

use crate::{
    CurvesPrimitive, Interpolation, MeshPrimitive, PointsPrimitive, PrimitiveError,
    PrimitiveResult, PrimitiveVariable,
};

/// Behaviour common to every primitive kind: topological sizing of
/// attribute levels and access to the named attribute map.
pub trait PrimitiveTopology {
    /// The number of values an un-indexed attribute at `interpolation`
    /// must carry on this primitive.
    fn variable_size(&self, interpolation: Interpolation) -> usize;

    /// The named attributes.
    fn variables(&self) -> &BTreeMap<String, PrimitiveVariable>;

    /// Mutable access to the named attributes.
    fn variables_mut(&mut self) -> &mut BTreeMap<String, PrimitiveVariable>;

    /// Whether `variable` is consistent with this primitive: its
    /// topological size matches the level's size and any index table
    /// dereferences into its data.
    fn is_valid_variable(&self, variable: &PrimitiveVariable) -> bool {
        variable.size() == self.variable_size(variable.interpolation)
            && variable.validate_indices().is_ok()
    }

    /// Validate every attribute on the primitive.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first inconsistent attribute.
    fn validate_variables(&self) -> PrimitiveResult<()> {
        for (name, variable) in self.variables() {
            if variable.size() != self.variable_size(variable.interpolation) {
                return Err(PrimitiveError::invalid_variable(format!(
                    "\"{name}\" has {} elements but {} interpolation requires {}",
                    variable.size(),
                    variable.interpolation,
                    self.variable_size(variable.interpolation)
                )));
            }
            variable.validate_indices().map_err(|_| {
                PrimitiveError::invalid_variable(format!(
                    "\"{name}\" has indices out of range of its data"
                ))
            })?;
        }
        Ok(())
    }
}

/// The closed set of primitive kinds.
///
/// The kind set is small and fixed, so dispatch happens with a `match`
/// rather than a runtime registry.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// A point cloud.
    Points(PointsPrimitive),
    /// A curve network.
    Curves(CurvesPrimitive),
    /// An indexed polygon mesh.
    Mesh(MeshPrimitive),
}

impl Primitive {
    /// Topological size of `interpolation` on the wrapped primitive.
    #[must_use]
    pub fn variable_size(&self, interpolation: Interpolation) -> usize {
        match self {
            Self::Points(p) => p.variable_size(interpolation),
            Self::Curves(c) => c.variable_size(interpolation),
            Self::Mesh(m) => m.variable_size(interpolation),
        }
    }

    /// The named attributes of the wrapped primitive.
    #[must_use]
    pub fn variables(&self) -> &BTreeMap<String, PrimitiveVariable> {
        match self {
            Self::Points(p) => p.variables(),
            Self::Curves(c) => c.variables(),
            Self::Mesh(m) => m.variables(),
        }
    }
}
