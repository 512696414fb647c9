//! Attribute element arrays.
//!
//! Attribute values are stored in a closed sum type, [`AttributeData`],
//! with one variant per supported element type. Generic algorithms are
//! written once over a slice of elements and fanned out with the
//! [`dispatch_data!`](crate::dispatch_data) and
//! [`dispatch_numeric_data!`](crate::dispatch_numeric_data) macros, which
//! are the single point of truth for which element types are valid where.

use nalgebra::{Matrix3, Matrix4, Quaternion, Vector2, Vector3, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A homogeneous array of attribute values.
///
/// Half-precision float arrays from interchange formats are widened to
/// `f64` on import; there is no separate half variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttributeData {
    /// Boolean flags.
    Bool(Vec<bool>),
    /// Signed integers.
    Int(Vec<i32>),
    /// Scalars.
    Float(Vec<f64>),
    /// 2D vectors (e.g. texture coordinates).
    Vec2(Vec<Vector2<f64>>),
    /// 3D vectors (e.g. positions, normals).
    Vec3(Vec<Vector3<f64>>),
    /// RGB colours.
    Color3(Vec<Vector3<f64>>),
    /// RGBA colours.
    Color4(Vec<Vector4<f64>>),
    /// 3x3 matrices.
    Matrix33(Vec<Matrix3<f64>>),
    /// 4x4 matrices.
    Matrix44(Vec<Matrix4<f64>>),
    /// Quaternions. Excluded from arithmetic operations.
    Quat(Vec<Quaternion<f64>>),
    /// Strings. Excluded from arithmetic operations; never interpolated.
    String(Vec<String>),
}

/// Dispatch a generic expression over every [`AttributeData`] variant.
///
/// `$values` binds the variant's `Vec` of elements; the expression must
/// produce a `Vec` of the same element type, which is rewrapped in the
/// same variant.
#[macro_export]
macro_rules! dispatch_data {
    ($data:expr, |$values:ident| $body:expr) => {
        match $data {
            $crate::AttributeData::Bool($values) => $crate::AttributeData::Bool($body),
            $crate::AttributeData::Int($values) => $crate::AttributeData::Int($body),
            $crate::AttributeData::Float($values) => $crate::AttributeData::Float($body),
            $crate::AttributeData::Vec2($values) => $crate::AttributeData::Vec2($body),
            $crate::AttributeData::Vec3($values) => $crate::AttributeData::Vec3($body),
            $crate::AttributeData::Color3($values) => $crate::AttributeData::Color3($body),
            $crate::AttributeData::Color4($values) => $crate::AttributeData::Color4($body),
            $crate::AttributeData::Matrix33($values) => $crate::AttributeData::Matrix33($body),
            $crate::AttributeData::Matrix44($values) => $crate::AttributeData::Matrix44($body),
            $crate::AttributeData::Quat($values) => $crate::AttributeData::Quat($body),
            $crate::AttributeData::String($values) => $crate::AttributeData::String($body),
        }
    };
}

/// Dispatch a generic expression over the numeric [`AttributeData`]
/// variants, erroring for the rest.
///
/// Bool, string and quaternion arrays have no meaningful arithmetic, so
/// averaging and blending operations reject them with an
/// [`UnsupportedType`](crate::PrimitiveError::UnsupportedType) error that
/// names `$operation`.
#[macro_export]
macro_rules! dispatch_numeric_data {
    ($data:expr, $operation:expr, |$values:ident| $body:expr) => {
        match $data {
            $crate::AttributeData::Int($values) => Ok($crate::AttributeData::Int($body)),
            $crate::AttributeData::Float($values) => Ok($crate::AttributeData::Float($body)),
            $crate::AttributeData::Vec2($values) => Ok($crate::AttributeData::Vec2($body)),
            $crate::AttributeData::Vec3($values) => Ok($crate::AttributeData::Vec3($body)),
            $crate::AttributeData::Color3($values) => Ok($crate::AttributeData::Color3($body)),
            $crate::AttributeData::Color4($values) => Ok($crate::AttributeData::Color4($body)),
            $crate::AttributeData::Matrix33($values) => {
                Ok($crate::AttributeData::Matrix33($body))
            }
            $crate::AttributeData::Matrix44($values) => {
                Ok($crate::AttributeData::Matrix44($body))
            }
            other => Err($crate::PrimitiveError::unsupported_type(
                other.type_name(),
                $operation,
            )),
        }
    };
}

/// Element types that support accumulation and division, i.e. averaging.
///
/// Integer division truncates, matching the behaviour of summing and
/// dividing in integer arithmetic.
pub trait NumericElement: Copy + Send + Sync {
    /// The additive identity, used to seed scatter accumulations.
    #[must_use]
    fn zero() -> Self;

    /// Add `other` into `self`.
    fn accumulate(&mut self, other: &Self);

    /// Divide an accumulated total by an element count.
    #[must_use]
    fn divide(self, count: usize) -> Self;
}

macro_rules! impl_numeric_element_f64 {
    ($($ty:ty => $zero:expr),*) => {
        $(
            impl NumericElement for $ty {
                #[inline]
                fn zero() -> Self {
                    $zero
                }

                #[inline]
                fn accumulate(&mut self, other: &Self) {
                    *self += other;
                }

                #[inline]
                #[allow(clippy::cast_precision_loss)]
                fn divide(self, count: usize) -> Self {
                    self / count as f64
                }
            }
        )*
    };
}

impl_numeric_element_f64!(
    f64 => 0.0,
    Vector2<f64> => Vector2::zeros(),
    Vector3<f64> => Vector3::zeros(),
    Vector4<f64> => Vector4::zeros(),
    Matrix3<f64> => Matrix3::zeros(),
    Matrix4<f64> => Matrix4::zeros()
);

impl NumericElement for i32 {
    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn accumulate(&mut self, other: &Self) {
        *self += other;
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn divide(self, count: usize) -> Self {
        self / count as i32
    }
}

/// Arithmetic mean of a slice, seeded with the first value rather than a
/// neutral zero so that types without a defined zero behave predictably.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn average_slice<T: NumericElement>(values: &[T]) -> Option<T> {
    let (first, rest) = values.split_first()?;
    let mut total = *first;
    for v in rest {
        total.accumulate(v);
    }
    Some(total.divide(values.len()))
}

impl AttributeData {
    /// Number of elements in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Vec2(v) => v.len(),
            Self::Vec3(v) => v.len(),
            Self::Color3(v) => v.len(),
            Self::Color4(v) => v.len(),
            Self::Matrix33(v) => v.len(),
            Self::Matrix44(v) => v.len(),
            Self::Quat(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    /// Whether the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the element type, for error reporting.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::Vec2(_) => "Vec2",
            Self::Vec3(_) => "Vec3",
            Self::Color3(_) => "Color3",
            Self::Color4(_) => "Color4",
            Self::Matrix33(_) => "Matrix33",
            Self::Matrix44(_) => "Matrix44",
            Self::Quat(_) => "Quat",
            Self::String(_) => "String",
        }
    }

    /// Whether arithmetic operations (averaging, blending) are defined
    /// for this element type.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Bool(_) | Self::Quat(_) | Self::String(_))
    }

    /// Whether `other` holds the same element type.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Build a new array by indexing into this one.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range; callers are expected to have
    /// validated indices against the data length.
    #[must_use]
    pub fn gather(&self, indices: &[usize]) -> Self {
        dispatch_data!(self, |v| indices.iter().map(|&i| v[i].clone()).collect())
    }

    /// Average all elements into a single-element array of the same type.
    ///
    /// # Errors
    ///
    /// Returns an error for non-numeric element types, or when the array
    /// is empty.
    pub fn average(&self) -> crate::PrimitiveResult<Self> {
        if self.is_empty() {
            return Err(crate::PrimitiveError::invalid_variable(
                "cannot average an empty attribute array",
            ));
        }
        dispatch_numeric_data!(self, "averaging", |v| {
            // Non-empty checked above.
            average_slice(v).into_iter().collect()
        })
    }

    /// Build an array of `count` copies of the single element of this
    /// array. Used to broadcast constant values to a topological level.
    ///
    /// # Errors
    ///
    /// Returns an error if this array does not hold exactly one element.
    pub fn broadcast(&self, count: usize) -> crate::PrimitiveResult<Self> {
        if self.len() != 1 {
            return Err(crate::PrimitiveError::invalid_variable(format!(
                "broadcast requires a single-element array, got {} elements",
                self.len()
            )));
        }
        Ok(dispatch_data!(self, |v| vec![v[0].clone(); count]))
    }

    /// An array of `count` default-valued elements of the same element
    /// type as this one. Quaternions default to identity; everything
    /// else to zero or empty.
    #[must_use]
    pub fn default_like(&self, count: usize) -> Self {
        match self {
            Self::Bool(_) => Self::Bool(vec![false; count]),
            Self::Int(_) => Self::Int(vec![0; count]),
            Self::Float(_) => Self::Float(vec![0.0; count]),
            Self::Vec2(_) => Self::Vec2(vec![Vector2::zeros(); count]),
            Self::Vec3(_) => Self::Vec3(vec![Vector3::zeros(); count]),
            Self::Color3(_) => Self::Color3(vec![Vector3::zeros(); count]),
            Self::Color4(_) => Self::Color4(vec![Vector4::zeros(); count]),
            Self::Matrix33(_) => Self::Matrix33(vec![Matrix3::zeros(); count]),
            Self::Matrix44(_) => Self::Matrix44(vec![Matrix4::zeros(); count]),
            Self::Quat(_) => Self::Quat(vec![Quaternion::identity(); count]),
            Self::String(_) => Self::String(vec![String::new(); count]),
        }
    }

    /// Append another array of the same element type.
    ///
    /// # Errors
    ///
    /// Returns an error if the element types differ.
    pub fn append(&mut self, other: &Self) -> crate::PrimitiveResult<()> {
        macro_rules! append_variant {
            ($($variant:ident),*) => {
                match (self, other) {
                    $(
                        (Self::$variant(dst), Self::$variant(src)) => {
                            dst.extend(src.iter().cloned());
                            Ok(())
                        }
                    )*
                    (dst, src) => Err(crate::PrimitiveError::invalid_variable(format!(
                        "cannot append {} data to {} data",
                        src.type_name(),
                        dst.type_name()
                    ))),
                }
            };
        }
        append_variant!(
            Bool, Int, Float, Vec2, Vec3, Color3, Color4, Matrix33, Matrix44, Quat, String
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_floats() {
        let data = AttributeData::Float(vec![1.0, 2.0, 3.0, 4.0]);
        let avg = data.average().unwrap();
        assert_eq!(avg, AttributeData::Float(vec![2.5]));
    }

    #[test]
    fn average_ints_truncates() {
        let data = AttributeData::Int(vec![1, 2]);
        assert_eq!(data.average().unwrap(), AttributeData::Int(vec![1]));
    }

    #[test]
    fn average_vectors() {
        let data = AttributeData::Vec3(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 4.0, 6.0),
        ]);
        let avg = data.average().unwrap();
        assert_eq!(
            avg,
            AttributeData::Vec3(vec![Vector3::new(1.0, 2.0, 3.0)])
        );
    }

    #[test]
    fn average_strings_unsupported() {
        let data = AttributeData::String(vec!["a".to_string(), "b".to_string()]);
        assert!(data.average().is_err());
    }

    #[test]
    fn gather_reorders() {
        let data = AttributeData::Int(vec![10, 20, 30]);
        let gathered = data.gather(&[2, 0, 0]);
        assert_eq!(gathered, AttributeData::Int(vec![30, 10, 10]));
    }

    #[test]
    fn broadcast_single_value() {
        let data = AttributeData::Float(vec![7.0]);
        assert_eq!(
            data.broadcast(3).unwrap(),
            AttributeData::Float(vec![7.0, 7.0, 7.0])
        );
        assert!(AttributeData::Float(vec![1.0, 2.0]).broadcast(3).is_err());
    }
}
