//! Shared flag reading and parallel attribute filtering.

use std::collections::BTreeMap;

use rayon::prelude::*;

use primitive_types::{
    check_cancelled, AttributeData, Canceller, Interpolation, PrimitiveError, PrimitiveVariable,
};

use crate::{DeleteError, DeleteResult};

/// Read a bool/int/float flag variable through its index table and turn
/// it into a keep mask: an element survives when its flag equals
/// `invert`.
pub(crate) fn keep_mask(
    flags: &PrimitiveVariable,
    expected: &'static str,
    invert: bool,
) -> DeleteResult<Vec<bool>> {
    let truthy = |position: usize| -> Option<bool> {
        let index = flags.data_index(position);
        match &flags.data {
            AttributeData::Bool(values) => values.get(index).copied(),
            AttributeData::Int(values) => values.get(index).map(|&v| v != 0),
            AttributeData::Float(values) => values.get(index).map(|&v| v != 0.0),
            _ => None,
        }
    };

    (0..flags.size())
        .map(|position| {
            truthy(position)
                .map(|flag| flag == invert)
                .ok_or_else(|| DeleteError::InvalidFlag {
                    expected,
                    actual: format!("{} {} data", flags.interpolation, flags.data.type_name()),
                })
        })
        .collect()
}

/// The surviving positions (in original order) under a keep mask.
pub(crate) fn kept_positions(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(position, &keep)| keep.then_some(position))
        .collect()
}

/// Filter every variable at its level's granularity, in parallel, and
/// merge the rebuilt variables by name.
///
/// `kept_for` maps an interpolation level to the surviving positions of
/// that level's old topology, or `None` for levels that pass through
/// unchanged (Constant). Each task reads only the immutable input; the
/// merge happens after the join.
pub(crate) fn filter_variables<'a>(
    variables: &'a BTreeMap<String, PrimitiveVariable>,
    expected_size: impl Fn(Interpolation) -> usize + Sync,
    kept_for: impl Fn(Interpolation) -> Option<&'a [usize]> + Sync,
    canceller: Option<&Canceller>,
) -> DeleteResult<BTreeMap<String, PrimitiveVariable>> {
    let filtered: Vec<(String, PrimitiveVariable)> = variables
        .par_iter()
        .map(|(name, variable)| {
            check_cancelled(canceller).map_err(DeleteError::Type)?;

            let rebuilt = match kept_for(variable.interpolation) {
                None => variable.clone(),
                Some(kept) => {
                    if variable.size() != expected_size(variable.interpolation) {
                        return Err(DeleteError::Type(PrimitiveError::invalid_variable(
                            format!(
                                "cannot delete through invalid variable \"{name}\": \
                                 {} elements where {} are required",
                                variable.size(),
                                expected_size(variable.interpolation)
                            ),
                        )));
                    }
                    variable.compact_filtered(kept)
                }
            };
            Ok((name.clone(), rebuilt))
        })
        .collect::<DeleteResult<Vec<_>>>()?;

    Ok(filtered.into_iter().collect())
}
