//! Attribute sampling at query results.
//!
//! A query result knows which topological elements contributed to it and
//! with what weights (barycentric coordinates for meshes, basis
//! coefficients for curves, identity for points). Sampling blends an
//! attribute's values at those elements with those weights; uniform and
//! constant attributes collapse to a direct lookup, and strings are
//! never blended - the heaviest contributor wins.

use primitive_types::{AttributeData, PrimitiveVariable, Vector2, Vector3, Vector4};

use crate::{EvalError, EvalResult};

/// The contributing topological positions and weights of a query result
/// at one interpolation level.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Contributions {
    items: [(usize, f64); 4],
    len: usize,
}

impl Contributions {
    pub fn single(position: usize) -> Self {
        Self {
            items: [(position, 1.0), (0, 0.0), (0, 0.0), (0, 0.0)],
            len: 1,
        }
    }

    pub fn pair(a: (usize, f64), b: (usize, f64)) -> Self {
        Self {
            items: [a, b, (0, 0.0), (0, 0.0)],
            len: 2,
        }
    }

    pub fn triple(positions: [usize; 3], weights: [f64; 3]) -> Self {
        Self {
            items: [
                (positions[0], weights[0]),
                (positions[1], weights[1]),
                (positions[2], weights[2]),
                (0, 0.0),
            ],
            len: 3,
        }
    }

    pub fn quad(positions: [usize; 4], weights: [f64; 4]) -> Self {
        Self {
            items: [
                (positions[0], weights[0]),
                (positions[1], weights[1]),
                (positions[2], weights[2]),
                (positions[3], weights[3]),
            ],
            len: 4,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.items[..self.len].iter().copied()
    }

    fn check_against(&self, variable: &PrimitiveVariable) -> EvalResult<()> {
        let size = variable.size();
        for (position, _) in self.iter() {
            if position >= size {
                return Err(EvalError::SizeMismatch {
                    expected: position + 1,
                    actual: size,
                });
            }
        }
        Ok(())
    }
}

macro_rules! blended_sampler {
    ($name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub(crate) fn $name(
            variable: &PrimitiveVariable,
            contributions: &Contributions,
        ) -> EvalResult<$ty> {
            let AttributeData::$variant(values) = &variable.data else {
                return Err(EvalError::WrongType {
                    expected: $expected,
                    actual: variable.data.type_name(),
                });
            };
            contributions.check_against(variable)?;
            let mut total = <$ty>::default();
            for (position, weight) in contributions.iter() {
                total += values[variable.data_index(position)] * weight;
            }
            Ok(total)
        }
    };
}

blended_sampler!(sample_float, Float, f64, "Float");
blended_sampler!(sample_vec2, Vec2, Vector2<f64>, "Vec2");
blended_sampler!(sample_vec3, Vec3, Vector3<f64>, "Vec3");
blended_sampler!(sample_color3, Color3, Vector3<f64>, "Color3");
blended_sampler!(sample_color4, Color4, Vector4<f64>, "Color4");

/// Integer attributes blend in floating point and truncate, so that a
/// blend over equal values is exact.
pub(crate) fn sample_int(
    variable: &PrimitiveVariable,
    contributions: &Contributions,
) -> EvalResult<i32> {
    let AttributeData::Int(values) = &variable.data else {
        return Err(EvalError::WrongType {
            expected: "Int",
            actual: variable.data.type_name(),
        });
    };
    contributions.check_against(variable)?;
    let mut total = 0.0;
    for (position, weight) in contributions.iter() {
        total += f64::from(values[variable.data_index(position)]) * weight;
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(total as i32)
}

/// Strings are never interpolated: the contributor with the largest
/// weight supplies the value.
pub(crate) fn sample_string(
    variable: &PrimitiveVariable,
    contributions: &Contributions,
) -> EvalResult<String> {
    let AttributeData::String(values) = &variable.data else {
        return Err(EvalError::WrongType {
            expected: "String",
            actual: variable.data.type_name(),
        });
    };
    contributions.check_against(variable)?;
    let mut best: Option<(usize, f64)> = None;
    for (position, weight) in contributions.iter() {
        if best.map_or(true, |(_, w)| weight > w) {
            best = Some((position, weight));
        }
    }
    let (position, _) = best.ok_or(EvalError::SizeMismatch {
        expected: 1,
        actual: 0,
    })?;
    Ok(values[variable.data_index(position)].clone())
}

/// Declare the public typed sampling methods on a result type, given a
/// private `contributions(&self, interpolation) -> Contributions`
/// method.
macro_rules! impl_result_sampling {
    ($result:ty) => {
        impl $result {
            /// Sample a float attribute at this result.
            ///
            /// # Errors
            ///
            /// Returns an error when the variable holds a different
            /// element type or is too small for this primitive.
            pub fn sample_float(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<f64> {
                crate::sample::sample_float(variable, &self.contributions(variable.interpolation))
            }

            /// Sample an integer attribute at this result.
            ///
            /// # Errors
            ///
            /// See [`sample_float`](Self::sample_float).
            pub fn sample_int(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<i32> {
                crate::sample::sample_int(variable, &self.contributions(variable.interpolation))
            }

            /// Sample a 2D vector attribute at this result.
            ///
            /// # Errors
            ///
            /// See [`sample_float`](Self::sample_float).
            pub fn sample_vec2(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<primitive_types::Vector2<f64>> {
                crate::sample::sample_vec2(variable, &self.contributions(variable.interpolation))
            }

            /// Sample a 3D vector attribute at this result.
            ///
            /// # Errors
            ///
            /// See [`sample_float`](Self::sample_float).
            pub fn sample_vec3(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<primitive_types::Vector3<f64>> {
                crate::sample::sample_vec3(variable, &self.contributions(variable.interpolation))
            }

            /// Sample an RGB colour attribute at this result.
            ///
            /// # Errors
            ///
            /// See [`sample_float`](Self::sample_float).
            pub fn sample_color3(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<primitive_types::Vector3<f64>> {
                crate::sample::sample_color3(variable, &self.contributions(variable.interpolation))
            }

            /// Sample an RGBA colour attribute at this result.
            ///
            /// # Errors
            ///
            /// See [`sample_float`](Self::sample_float).
            pub fn sample_color4(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<primitive_types::Vector4<f64>> {
                crate::sample::sample_color4(variable, &self.contributions(variable.interpolation))
            }

            /// Sample a string attribute at this result. Strings take
            /// the value of the heaviest contributing element.
            ///
            /// # Errors
            ///
            /// See [`sample_float`](Self::sample_float).
            pub fn sample_string(
                &self,
                variable: &primitive_types::PrimitiveVariable,
            ) -> crate::EvalResult<String> {
                crate::sample::sample_string(variable, &self.contributions(variable.interpolation))
            }
        }
    };
}

pub(crate) use impl_result_sampling;
