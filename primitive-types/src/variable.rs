//! Primitive variables: leveled, optionally indexed attribute containers.

use hashbrown::HashMap;

use crate::{AttributeData, Interpolation, PrimitiveError, PrimitiveResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An attribute attached to a primitive.
///
/// A variable pairs an [`Interpolation`] level with an element array and
/// an optional index table. When `indices` is present, `data` holds
/// deduplicated values and `indices` has one entry per topological
/// element at the variable's level, each a valid index into `data`.
///
/// # Example
///
/// ```
/// use primitive_types::{AttributeData, Interpolation, PrimitiveVariable};
///
/// // Four face corners sharing two distinct values.
/// let var = PrimitiveVariable::indexed(
///     Interpolation::FaceVarying,
///     AttributeData::Float(vec![0.0, 1.0]),
///     vec![0, 1, 1, 0],
/// );
/// assert_eq!(var.expanded_data(), AttributeData::Float(vec![0.0, 1.0, 1.0, 0.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrimitiveVariable {
    /// The granularity at which the values vary.
    pub interpolation: Interpolation,
    /// The element values, deduplicated when `indices` is present.
    pub data: AttributeData,
    /// Optional index table mapping topological elements to values.
    pub indices: Option<Vec<usize>>,
}

impl PrimitiveVariable {
    /// Create an un-indexed variable.
    #[must_use]
    pub const fn new(interpolation: Interpolation, data: AttributeData) -> Self {
        Self {
            interpolation,
            data,
            indices: None,
        }
    }

    /// Create an indexed variable.
    #[must_use]
    pub const fn indexed(
        interpolation: Interpolation,
        data: AttributeData,
        indices: Vec<usize>,
    ) -> Self {
        Self {
            interpolation,
            data,
            indices: Some(indices),
        }
    }

    /// The topological element count this variable covers: the index
    /// count when indexed, the data length otherwise.
    #[must_use]
    pub fn size(&self) -> usize {
        self.indices
            .as_ref()
            .map_or_else(|| self.data.len(), Vec::len)
    }

    /// Map a topological position to its index into `data`.
    #[inline]
    #[must_use]
    pub fn data_index(&self, position: usize) -> usize {
        self.indices
            .as_ref()
            .map_or(position, |indices| indices[position])
    }

    /// Materialise `data[indices[i]]` for every topological position.
    ///
    /// When the variable is un-indexed this is a plain copy of the data;
    /// callers must not assume the result aliases the original array.
    #[must_use]
    pub fn expanded_data(&self) -> AttributeData {
        match &self.indices {
            Some(indices) => self.data.gather(indices),
            None => self.data.clone(),
        }
    }

    /// Check that the index table (when present) dereferences into the
    /// data array.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range index.
    pub fn validate_indices(&self) -> PrimitiveResult<()> {
        if let Some(indices) = &self.indices {
            let len = self.data.len();
            for (position, &index) in indices.iter().enumerate() {
                if index >= len {
                    return Err(PrimitiveError::invalid_variable(format!(
                        "index {index} at position {position} exceeds data length {len}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rebuild a compacted variable from a filtered stream of
    /// topological positions.
    ///
    /// `kept` lists the surviving positions of the old topology in
    /// output order. For an indexed source, values are deduplicated by
    /// their *original* data index, preserving first-occurrence order;
    /// the output carries indices only if some data index was actually
    /// referenced more than once. An un-indexed source appends
    /// unconditionally and stays un-indexed.
    ///
    /// An empty `kept` produces a valid zero-length variable.
    #[must_use]
    pub fn compact_filtered(&self, kept: &[usize]) -> Self {
        match &self.indices {
            None => Self::new(self.interpolation, self.data.gather(kept)),
            Some(indices) => {
                let mut remap: HashMap<usize, usize> = HashMap::with_capacity(kept.len());
                let mut unique = Vec::with_capacity(kept.len());
                let mut new_indices = Vec::with_capacity(kept.len());
                let mut deduplicated = false;

                for &position in kept {
                    let old = indices[position];
                    match remap.get(&old) {
                        Some(&new) => {
                            deduplicated = true;
                            new_indices.push(new);
                        }
                        None => {
                            let new = unique.len();
                            remap.insert(old, new);
                            unique.push(old);
                            new_indices.push(new);
                        }
                    }
                }

                let data = self.data.gather(&unique);
                if deduplicated {
                    Self::indexed(self.interpolation, data, new_indices)
                } else {
                    Self::new(self.interpolation, data)
                }
            }
        }
    }
}
