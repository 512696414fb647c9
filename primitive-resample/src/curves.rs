//! Interpolation-level conversion for curve networks.

use primitive_eval::CurvesEvaluator;
use primitive_types::{
    check_cancelled, dispatch_numeric_data, AttributeData, Canceller, CurvesPrimitive,
    Interpolation, PrimitiveError, PrimitiveTopology, PrimitiveVariable,
};

use crate::common::{group_average, indices_to_data, install, replicate};
use crate::{ResampleError, ResampleResult};

const fn is_varying(interpolation: Interpolation) -> bool {
    matches!(
        interpolation,
        Interpolation::Varying | Interpolation::FaceVarying
    )
}

/// Convert `variable` to `interpolation` in place against `curves`.
///
/// Down-sampling averages per curve; `Uniform` up-samples by
/// replication; `Vertex` and `Varying` convert into each other through
/// evaluator queries at the target level's parametric stations, which
/// is exact for linear bases and basis-blended otherwise. `Varying` and
/// `FaceVarying` are topological synonyms on curves.
///
/// Indexed variables up-sample by resampling their index table where
/// the conversion is a pure replication or identity; the
/// evaluator-backed `Vertex` <-> `Varying` paths do not support indexed
/// input, and down-sampling expands and discards indices.
///
/// # Errors
///
/// Returns an error for unsupported indexed paths, non-numeric data on
/// arithmetic paths, a missing `P` on evaluator-backed paths, or when
/// cancelled.
pub fn resample_primitive_variable(
    curves: &CurvesPrimitive,
    variable: &mut PrimitiveVariable,
    interpolation: Interpolation,
    canceller: Option<&Canceller>,
) -> ResampleResult<()> {
    check_cancelled(canceller).map_err(ResampleError::Type)?;

    let source_interpolation = variable.interpolation;
    if source_interpolation == interpolation {
        return Ok(());
    }

    // Average the whole array down to a single value.
    if interpolation == Interpolation::Constant {
        let averaged = variable.expanded_data().average()?;
        *variable = PrimitiveVariable::new(interpolation, averaged);
        return Ok(());
    }

    // Broadcast a single value out to the target level.
    if source_interpolation == Interpolation::Constant {
        let broadcast = variable
            .expanded_data()
            .broadcast(curves.variable_size(interpolation))?;
        *variable = PrimitiveVariable::new(interpolation, broadcast);
        return Ok(());
    }

    // Resolve the index table. Up-sampling by replication and the
    // Varying <-> FaceVarying identity act on indices exactly as they
    // would on values; the evaluator-backed paths cannot.
    let (source, via_indices) = match &variable.indices {
        Some(indices) => {
            if source_interpolation == Interpolation::Vertex && is_varying(interpolation) {
                return Err(ResampleError::IndexedUnsupported {
                    from: source_interpolation,
                    to: interpolation,
                });
            }
            if is_varying(source_interpolation) && interpolation == Interpolation::Vertex {
                return Err(ResampleError::IndexedUnsupported {
                    from: source_interpolation,
                    to: interpolation,
                });
            }
            if source_interpolation < interpolation
                || (is_varying(source_interpolation) && is_varying(interpolation))
            {
                (indices_to_data(indices), true)
            } else {
                let expanded = variable.expanded_data();
                variable.indices = None;
                (expanded, false)
            }
        }
        None => (variable.data.clone(), false),
    };

    let vertex_counts = curves.vertices_per_curve();
    let varying_counts: Vec<usize> = (0..curves.num_curves())
        .map(|c| curves.varying_size(c))
        .collect();

    let output = match (source_interpolation, interpolation) {
        (Interpolation::Vertex, Interpolation::Uniform) => {
            dispatch_numeric_data!(&source, "vertex to uniform averaging", |v| group_average(
                v,
                vertex_counts
            ))?
        }
        (s, Interpolation::Uniform) if is_varying(s) => {
            dispatch_numeric_data!(&source, "varying to uniform averaging", |v| group_average(
                v,
                &varying_counts
            ))?
        }
        (Interpolation::Uniform, Interpolation::Vertex) => {
            dispatch_numeric_data!(&source, "uniform to vertex replication", |v| replicate(
                v,
                vertex_counts
            ))?
        }
        (Interpolation::Uniform, t) if is_varying(t) => {
            dispatch_numeric_data!(&source, "uniform to varying replication", |v| replicate(
                v,
                &varying_counts
            ))?
        }
        (Interpolation::Vertex, t) if is_varying(t) => {
            sample_at_stations(curves, &source, source_interpolation, Stations::Varying)?
        }
        (s, Interpolation::Vertex) if is_varying(s) => {
            sample_at_stations(curves, &source, source_interpolation, Stations::Vertex)?
        }
        (s, t) if is_varying(s) && is_varying(t) => source,
        (from, to) => return Err(ResampleError::UnsupportedConversion { from, to }),
    };

    install(variable, interpolation, output, via_indices);
    Ok(())
}

#[derive(Clone, Copy)]
enum Stations {
    /// One station per control point: `j / num_segments`, clamped.
    /// For linear bases every control point sits exactly on a segment
    /// boundary, so the round trip through Varying is lossless there.
    Vertex,
    /// One station per segment boundary: `j / num_segments`.
    Varying,
}

/// Sample the source variable at each target element's parametric
/// station through a curves evaluator.
#[allow(clippy::cast_precision_loss)]
fn sample_at_stations(
    curves: &CurvesPrimitive,
    source: &AttributeData,
    source_interpolation: Interpolation,
    stations: Stations,
) -> ResampleResult<AttributeData> {
    tracing::debug!(
        curves = curves.num_curves(),
        "resampling through evaluator stations"
    );
    let evaluator = CurvesEvaluator::new(curves)?;
    let mut result = evaluator.create_result();
    let source_variable = PrimitiveVariable::new(source_interpolation, source.clone());

    macro_rules! sample_all {
        ($sampler:ident, $variant:ident, $values:expr) => {{
            let mut out = Vec::with_capacity($values.len());
            for curve in 0..curves.num_curves() {
                let count = match stations {
                    Stations::Vertex => curves.vertices_per_curve()[curve],
                    Stations::Varying => curves.varying_size(curve),
                };
                let denominator = curves.num_segments(curve) as f64;
                for j in 0..count {
                    let found =
                        evaluator.point_at_v(curve, (j as f64 / denominator).min(1.0), &mut result);
                    debug_assert!(found);
                    out.push(result.$sampler(&source_variable)?);
                }
            }
            AttributeData::$variant(out)
        }};
    }

    Ok(match source {
        AttributeData::Float(v) => sample_all!(sample_float, Float, v),
        AttributeData::Int(v) => sample_all!(sample_int, Int, v),
        AttributeData::Vec2(v) => sample_all!(sample_vec2, Vec2, v),
        AttributeData::Vec3(v) => sample_all!(sample_vec3, Vec3, v),
        AttributeData::Color3(v) => sample_all!(sample_color3, Color3, v),
        AttributeData::Color4(v) => sample_all!(sample_color4, Color4, v),
        other => {
            return Err(ResampleError::Type(PrimitiveError::unsupported_type(
                other.type_name(),
                "evaluator-backed resampling",
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use primitive_types::CubicBasis;

    fn linear_curves() -> CurvesPrimitive {
        let mut curves =
            CurvesPrimitive::new(vec![3, 4], CubicBasis::linear(), false).unwrap();
        curves.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3(
                    (0..7)
                        .map(|i| Vector3::new(f64::from(i), 0.0, 0.0))
                        .collect(),
                ),
            ),
        );
        curves
    }

    #[test]
    fn vertex_to_uniform_means_per_curve() {
        let curves = linear_curves();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Float(vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0]),
        );
        resample_primitive_variable(&curves, &mut variable, Interpolation::Uniform, None)
            .unwrap();
        assert_eq!(variable.data, AttributeData::Float(vec![2.0, 25.0]));
    }

    #[test]
    fn uniform_to_vertex_replicates() {
        let curves = linear_curves();
        let mut variable = PrimitiveVariable::new(
            Interpolation::Uniform,
            AttributeData::Int(vec![5, 9]),
        );
        resample_primitive_variable(&curves, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        assert_eq!(
            variable.data,
            AttributeData::Int(vec![5, 5, 5, 9, 9, 9, 9])
        );
    }

    #[test]
    fn vertex_varying_round_trip_is_lossless_on_linear_curves() {
        // On linear open curves the vertex and varying stations
        // coincide, so Vertex -> Varying -> Vertex must reproduce the
        // input exactly.
        let curves = linear_curves();
        let original = vec![1.0, 4.0, 9.0, 0.0, -2.0, 7.0, 3.5];
        let mut variable = PrimitiveVariable::new(
            Interpolation::Vertex,
            AttributeData::Float(original.clone()),
        );

        resample_primitive_variable(&curves, &mut variable, Interpolation::Varying, None)
            .unwrap();
        assert_eq!(variable.interpolation, Interpolation::Varying);
        resample_primitive_variable(&curves, &mut variable, Interpolation::Vertex, None)
            .unwrap();

        let AttributeData::Float(values) = &variable.data else {
            panic!("expected float data");
        };
        for (a, b) in values.iter().zip(&original) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn varying_facevarying_synonyms_preserve_indices() {
        let curves = linear_curves();
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::Varying,
            AttributeData::Float(vec![0.5, 1.5]),
            vec![0, 1, 0, 1, 0, 1, 0],
        );
        let expanded = variable.expanded_data();
        resample_primitive_variable(&curves, &mut variable, Interpolation::FaceVarying, None)
            .unwrap();
        assert!(variable.indices.is_some());
        assert_eq!(variable.expanded_data(), expanded);
    }

    #[test]
    fn indexed_vertex_to_varying_is_rejected() {
        let curves = linear_curves();
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::Vertex,
            AttributeData::Float(vec![1.0, 2.0]),
            vec![0, 1, 0, 1, 0, 1, 0],
        );
        assert!(matches!(
            resample_primitive_variable(&curves, &mut variable, Interpolation::Varying, None),
            Err(ResampleError::IndexedUnsupported { .. })
        ));
    }

    #[test]
    fn indexed_downsampling_expands_and_drops_indices() {
        let curves = linear_curves();
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::Vertex,
            AttributeData::Float(vec![1.0, 3.0]),
            vec![0, 1, 0, 1, 0, 1, 0],
        );
        resample_primitive_variable(&curves, &mut variable, Interpolation::Uniform, None)
            .unwrap();
        assert_eq!(variable.indices, None);
        // Curve means of the expanded values [1,3,1] and [3,1,3,1].
        assert_eq!(
            variable.data,
            AttributeData::Float(vec![5.0 / 3.0, 2.0])
        );
    }

    #[test]
    fn indexed_uniform_upsamples_through_indices() {
        let curves = linear_curves();
        let mut variable = PrimitiveVariable::indexed(
            Interpolation::Uniform,
            AttributeData::String(vec!["a".to_string(), "b".to_string()]),
            vec![1, 0],
        );
        resample_primitive_variable(&curves, &mut variable, Interpolation::Vertex, None)
            .unwrap();
        // The string payload was never touched; only indices replicated.
        assert_eq!(variable.indices, Some(vec![1, 1, 1, 0, 0, 0, 0]));
        assert_eq!(variable.data.len(), 2);
    }

    #[test]
    fn cubic_uniform_to_varying_uses_varying_counts() {
        let mut curves =
            CurvesPrimitive::new(vec![6], CubicBasis::b_spline(), false).unwrap();
        curves.variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(
                Interpolation::Vertex,
                AttributeData::Vec3(
                    (0..6)
                        .map(|i| Vector3::new(f64::from(i), 0.0, 0.0))
                        .collect(),
                ),
            ),
        );
        let mut variable =
            PrimitiveVariable::new(Interpolation::Uniform, AttributeData::Float(vec![2.0]));
        resample_primitive_variable(&curves, &mut variable, Interpolation::Varying, None)
            .unwrap();
        // 3 segments -> 4 varying values.
        assert_eq!(variable.data, AttributeData::Float(vec![2.0; 4]));
    }
}
