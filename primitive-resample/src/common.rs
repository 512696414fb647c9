//! Shared building blocks for the per-kind conversion matrices.

use primitive_types::{AttributeData, NumericElement, PrimitiveVariable};

/// Arithmetic mean over consecutive groups of `counts[g]` elements,
/// seeded with each group's first value.
pub(crate) fn group_average<T: NumericElement>(values: &[T], counts: &[usize]) -> Vec<T> {
    let mut out = Vec::with_capacity(counts.len());
    let mut offset = 0;
    for &count in counts {
        let mut total = values[offset];
        for value in &values[offset + 1..offset + count] {
            total.accumulate(value);
        }
        out.push(total.divide(count));
        offset += count;
    }
    out
}

/// Repeat each group value `counts[g]` times.
pub(crate) fn replicate<T: Copy>(values: &[T], counts: &[usize]) -> Vec<T> {
    let mut out = Vec::with_capacity(counts.iter().sum());
    for (value, &count) in values.iter().zip(counts) {
        for _ in 0..count {
            out.push(*value);
        }
    }
    out
}

/// Scatter `values[i]` into `out[targets[i]]`, averaging the
/// accumulated sums by incidence count. Targets never referenced keep
/// the additive identity.
pub(crate) fn scatter_average<T: NumericElement>(
    values: &[T],
    targets: &[usize],
    out_len: usize,
) -> Vec<T> {
    let mut out = vec![T::zero(); out_len];
    let mut counts = vec![0_usize; out_len];
    for (value, &target) in values.iter().zip(targets) {
        out[target].accumulate(value);
        counts[target] += 1;
    }
    for (total, &count) in out.iter_mut().zip(&counts) {
        if count > 0 {
            *total = total.divide(count);
        }
    }
    out
}

/// View an index table as integer attribute data, so replication and
/// gather conversions can run on the indices instead of the values.
pub(crate) fn indices_to_data(indices: &[usize]) -> AttributeData {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    AttributeData::Int(indices.iter().map(|&i| i as i32).collect())
}

/// Recover an index table from conversion output produced by
/// [`indices_to_data`].
pub(crate) fn data_to_indices(data: &AttributeData) -> Option<Vec<usize>> {
    match data {
        #[allow(clippy::cast_sign_loss)]
        AttributeData::Int(values) => Some(values.iter().map(|&i| i as usize).collect()),
        _ => None,
    }
}

/// Install the conversion output on the variable: index-path output
/// replaces the index table and keeps the deduplicated values;
/// data-path output replaces the values.
pub(crate) fn install(
    variable: &mut PrimitiveVariable,
    interpolation: primitive_types::Interpolation,
    output: AttributeData,
    via_indices: bool,
) {
    if via_indices {
        variable.indices = data_to_indices(&output);
    } else {
        variable.data = output;
        variable.indices = None;
    }
    variable.interpolation = interpolation;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_average_seeds_with_first() {
        let out = group_average(&[1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0], &[3, 4]);
        assert_eq!(out, vec![2.0, 25.0]);
    }

    #[test]
    fn replicate_counts() {
        assert_eq!(replicate(&[7, 9], &[2, 3]), vec![7, 7, 9, 9, 9]);
    }

    #[test]
    fn scatter_average_handles_unreferenced_targets() {
        let out = scatter_average(&[2.0, 4.0, 6.0], &[0, 0, 2], 4);
        assert_eq!(out, vec![3.0, 0.0, 6.0, 0.0]);
    }
}
