/// Errors when constructing a [`Normalization`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum NormalizationError {
    #[error("Cannot normalize by dividing with {0}: the divisor must be finite and positive")]
    InvalidDivisor(f64),
}

/// A finite, positive number to divide by.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Divisor(f64);

impl Divisor {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Divisor {
    type Error = NormalizationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(NormalizationError::InvalidDivisor(value))
        }
    }
}

impl From<Divisor> for f64 {
    #[inline]
    fn from(divisor: Divisor) -> Self {
        divisor.0
    }
}

/// An explicit, linear rescaling of tensor values.
///
/// This is never applied implicitly by deserialization: the caller picks one.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Normalization {
    /// Leave values as they are.
    #[default]
    Identity,

    /// Divide every value by a fixed maximum, e.g. 255 for 8-bit pixel data.
    ///
    /// Built with [`Normalization::divide_by`].
    DivideBy(Divisor),

    /// Map the finite minimum to 0 and the finite maximum to 1.
    ///
    /// If all finite values are equal, they all become 0.
    MinMax,
}

impl Normalization {
    /// Maps 8-bit pixel values from `[0, 255]` to `[0, 1]`.
    pub const PIXEL_U8: Self = Self::DivideBy(Divisor(255.0));

    /// Divide by `max`, which must be finite and positive.
    pub fn divide_by(max: f64) -> Result<Self, NormalizationError> {
        Divisor::try_from(max).map(Self::DivideBy)
    }

    pub fn apply(&self, values: &mut ndarray::ArrayD<f64>) {
        match *self {
            Self::Identity => {}

            Self::DivideBy(Divisor(max)) => {
                values.mapv_inplace(|value| value / max);
            }

            Self::MinMax => {
                if let Some(range) = crate::ValueRange::from_values(values.iter().copied()) {
                    values.mapv_inplace(|value| {
                        if value.is_finite() {
                            range.normalize(value)
                        } else {
                            value
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(normalization: Normalization, values: &[f64]) -> Vec<f64> {
        let mut array =
            ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(&[values.len()]), values.to_vec())
                .unwrap();
        normalization.apply(&mut array);
        array.iter().copied().collect()
    }

    #[test]
    fn divide_by_pixel_max() {
        assert_eq!(
            apply(Normalization::PIXEL_U8, &[0.0, 51.0, 255.0]),
            vec![0.0, 0.2, 1.0]
        );
    }

    #[test]
    fn min_max() {
        assert_eq!(
            apply(Normalization::MinMax, &[2.0, 4.0, 6.0]),
            vec![0.0, 0.5, 1.0]
        );
        assert_eq!(apply(Normalization::MinMax, &[5.0, 5.0]), vec![0.0, 0.0]);

        let out = apply(Normalization::MinMax, &[f64::NAN, 0.0, 10.0]);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[0.0, 1.0]);
    }

    #[test]
    fn identity() {
        assert_eq!(
            apply(Normalization::default(), &[-3.0, 300.0]),
            vec![-3.0, 300.0]
        );
    }

    #[test]
    fn invalid_divisors() {
        assert_eq!(Normalization::divide_by(255.0), Ok(Normalization::PIXEL_U8));
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(Normalization::divide_by(bad).is_err(), "{bad}");
            assert!(Divisor::try_from(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn deserialized_divisors_are_validated() {
        let normalization: Normalization = serde_json::from_str(r#"{"DivideBy": 2.0}"#).unwrap();
        assert_eq!(apply(normalization, &[1.0, 4.0]), vec![0.5, 2.0]);

        assert!(serde_json::from_str::<Normalization>(r#"{"DivideBy": 0.0}"#).is_err());
        assert!(serde_json::from_str::<Normalization>(r#"{"DivideBy": -255.0}"#).is_err());
    }
}
