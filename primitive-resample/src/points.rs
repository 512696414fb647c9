//! Interpolation-level conversion and merging for point clouds.

use std::collections::BTreeMap;

use primitive_types::{
    check_cancelled, AttributeData, Canceller, Interpolation, PointsPrimitive, PrimitiveError,
    PrimitiveTopology, PrimitiveVariable,
};

use crate::common::{indices_to_data, install};
use crate::{ResampleError, ResampleResult};

/// Whether a level addresses one value per point on a point cloud.
const fn per_point(interpolation: Interpolation) -> bool {
    matches!(
        interpolation,
        Interpolation::Vertex | Interpolation::Varying | Interpolation::FaceVarying
    )
}

/// Convert `variable` to `interpolation` in place against `points`.
///
/// Points have no topology, so `Vertex`, `Varying` and `FaceVarying`
/// are synonyms (conversions between them are identities) and
/// `Uniform` holds a single aggregated value.
///
/// # Errors
///
/// Returns an error for non-numeric data on averaging paths, or when
/// cancelled.
pub fn resample_primitive_variable(
    points: &PointsPrimitive,
    variable: &mut PrimitiveVariable,
    interpolation: Interpolation,
    canceller: Option<&Canceller>,
) -> ResampleResult<()> {
    check_cancelled(canceller).map_err(ResampleError::Type)?;

    let source_interpolation = variable.interpolation;
    if source_interpolation == interpolation {
        return Ok(());
    }

    // Down-sampling to a single value always averages expanded data.
    if interpolation == Interpolation::Constant
        || (interpolation == Interpolation::Uniform && per_point(source_interpolation))
    {
        let averaged = variable.expanded_data().average()?;
        *variable = PrimitiveVariable::new(interpolation, averaged);
        return Ok(());
    }

    // Broadcasting a single value ignores any index table.
    if source_interpolation == Interpolation::Constant
        || (source_interpolation == Interpolation::Uniform && per_point(interpolation))
    {
        let broadcast = variable
            .expanded_data()
            .broadcast(points.variable_size(interpolation))?;
        *variable = PrimitiveVariable::new(interpolation, broadcast);
        return Ok(());
    }

    // What remains are identities between the per-point levels (and
    // Constant <-> Uniform, which is also a single-value identity);
    // indexed variables keep their indices untouched.
    let (source, via_indices) = match &variable.indices {
        Some(indices) => (indices_to_data(indices), true),
        None => (variable.data.clone(), false),
    };
    install(variable, interpolation, source, via_indices);
    Ok(())
}

/// Merge several point clouds into one.
///
/// Vertex-level variables of the same name must hold the same element
/// type; clouds missing a variable contribute default-valued elements.
/// Constant variables are taken from the first cloud carrying them; a
/// name used at Constant level on one cloud and per-point level on
/// another is an error.
///
/// # Errors
///
/// Returns an error on mismatched variable types or levels.
pub fn merge_points(primitives: &[&PointsPrimitive]) -> ResampleResult<PointsPrimitive> {
    let total_points: usize = primitives.iter().map(|p| p.num_points()).sum();

    // Discover the merged variable set and check it is consistent.
    let mut constant_variables: BTreeMap<String, PrimitiveVariable> = BTreeMap::new();
    let mut merged_prototypes: BTreeMap<String, AttributeData> = BTreeMap::new();

    for primitive in primitives {
        for (name, variable) in &primitive.variables {
            if variable.interpolation == Interpolation::Constant {
                if merged_prototypes.contains_key(name) {
                    return Err(ResampleError::Type(PrimitiveError::invalid_variable(
                        format!("mismatching levels for merged variable \"{name}\""),
                    )));
                }
                constant_variables
                    .entry(name.clone())
                    .or_insert_with(|| variable.clone());
                continue;
            }

            if per_point(variable.interpolation) {
                if constant_variables.contains_key(name) {
                    return Err(ResampleError::Type(PrimitiveError::invalid_variable(
                        format!("mismatching levels for merged variable \"{name}\""),
                    )));
                }
                let prototype = variable.data.default_like(0);
                match merged_prototypes.get(name) {
                    None => {
                        merged_prototypes.insert(name.clone(), prototype);
                    }
                    Some(existing) if existing.same_type(&prototype) => {}
                    Some(existing) => {
                        return Err(ResampleError::Type(PrimitiveError::invalid_variable(
                            format!(
                                "merged variable \"{name}\" mixes {} and {} data",
                                existing.type_name(),
                                prototype.type_name()
                            ),
                        )));
                    }
                }
            }
        }
    }

    let mut merged = PointsPrimitive::new(total_points);
    merged.variables.extend(constant_variables);

    for (name, prototype) in merged_prototypes {
        let mut data = prototype.default_like(0);
        for primitive in primitives {
            match primitive.variables.get(&name) {
                Some(variable) if per_point(variable.interpolation) => {
                    data.append(&variable.expanded_data())
                        .map_err(ResampleError::Type)?;
                }
                _ => {
                    // This cloud lacks the variable; pad its span.
                    data.append(&prototype.default_like(primitive.num_points()))
                        .map_err(ResampleError::Type)?;
                }
            }
        }
        merged
            .variables
            .insert(name, PrimitiveVariable::new(Interpolation::Vertex, data));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cloud(n: usize) -> PointsPrimitive {
        let mut points = PointsPrimitive::new(n);
        #[allow(clippy::cast_precision_loss)]
        points.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3((0..n).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect()),
            ),
        );
        points
    }

    #[test]
    fn vertex_to_uniform_averages() {
        let points = cloud(4);
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Float(vec![1.0, 2.0, 3.0, 6.0]),
        );
        resample_primitive_variable(&points, &mut variable, Interpolation::Uniform, None)
            .unwrap();
        assert_eq!(variable.interpolation, Interpolation::Uniform);
        assert_eq!(variable.data, AttributeData::Float(vec![3.0]));
        assert_eq!(variable.indices, None);
    }

    #[test]
    fn uniform_to_vertex_broadcasts() {
        let points = cloud(3);
        let mut variable =
            PrimitiveVariable::new(Interpolation::Uniform, AttributeData::Float(vec![7.0]));
        resample_primitive_variable(&points, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        assert_eq!(variable.data, AttributeData::Float(vec![7.0, 7.0, 7.0]));
    }

    #[test]
    fn constant_broadcast_keeps_strings() {
        let points = cloud(2);
        let mut variable = PrimitiveVariable::new(
            Interpolation::Constant,
            AttributeData::String(vec!["tag".to_string()]),
        );
        resample_primitive_variable(&points, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        assert_eq!(
            variable.data,
            AttributeData::String(vec!["tag".to_string(), "tag".to_string()])
        );
    }

    #[test]
    fn per_point_levels_are_synonyms() {
        let points = cloud(3);
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::Vertex,
            AttributeData::Float(vec![1.0, 2.0]),
            vec![0, 1, 0],
        );
        let expanded = variable.expanded_data();
        resample_primitive_variable(&points, &mut variable, Interpolation::FaceVarying, None)
            .unwrap();
        assert_eq!(variable.interpolation, Interpolation::FaceVarying);
        // The index table is preserved and still expands to the same values.
        assert_eq!(variable.expanded_data(), expanded);
        assert!(variable.indices.is_some());
    }

    #[test]
    fn averaging_strings_fails() {
        let points = cloud(2);
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::String(vec!["a".to_string(), "b".to_string()]),
        );
        assert!(resample_primitive_variable(
            &points,
            &mut variable,
            Interpolation::Constant,
            None
        )
        .is_err());
    }

    #[test]
    fn merge_concatenates_and_pads() {
        let mut a = cloud(2);
        a.variables.insert(
            "mass".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![1.0, 2.0])),
        );
        let b = cloud(3);

        let merged = merge_points(&[&a, &b]).unwrap();
        assert_eq!(merged.num_points(), 5);
        assert_eq!(
            merged.variables["mass"].data,
            AttributeData::Float(vec![1.0, 2.0, 0.0, 0.0, 0.0])
        );
        assert_eq!(merged.variables["P"].data.len(), 5);
    }

    #[test]
    fn merge_rejects_type_mismatch() {
        let mut a = cloud(1);
        a.variables.insert(
            "w".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![1.0])),
        );
        let mut b = cloud(1);
        b.variables.insert(
            "w".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Int(vec![1])),
        );
        assert!(merge_points(&[&a, &b]).is_err());
    }
}
