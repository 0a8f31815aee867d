use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::{DeserializeError, Normalization, ShapeError, ShapeSpec};

// ----------------------------------------------------------------------------

/// The closed range of values of some data, used for color-mapping it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[inline]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The range of all finite values, or `None` if there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some(Self::new(value, value)),
                Some(Self { min, max }) => Some(Self::new(min.min(value), max.max(value))),
            })
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Maps `value` into `[0, 1]`, clamping anything outside the range.
    ///
    /// A degenerate (empty) range maps everything to zero.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

// ----------------------------------------------------------------------------

/// A flat payload reshaped into its [`ShapeSpec`].
///
/// Always in standard (row-major) layout: the last dimension varies fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: ShapeSpec,
    data: ArrayD<f64>,
}

impl Tensor {
    /// Reshape `values` into `shape`, keeping their order.
    ///
    /// Fails with [`DeserializeError::ShapeMismatch`] unless there are exactly as many values
    /// as the shape has elements. Nothing is ever truncated or padded.
    pub fn from_flat(values: Vec<f64>, shape: &ShapeSpec) -> Result<Self, DeserializeError> {
        let expected = shape.num_elements();
        let actual = values.len();
        let mismatch = || DeserializeError::ShapeMismatch {
            expected,
            actual,
            shape: shape.clone(),
        };

        if actual != expected {
            return Err(mismatch());
        }

        let data = ArrayD::from_shape_vec(IxDyn(shape.dims()), values).map_err(|_err| mismatch())?;

        Ok(Self {
            shape: shape.clone(),
            data,
        })
    }

    #[inline]
    pub fn shape(&self) -> &ShapeSpec {
        &self.shape
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    #[inline]
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_array(&self) -> &ArrayD<f64> {
        &self.data
    }

    #[inline]
    pub fn view(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    /// Value at the given multi-dimensional index, if in bounds.
    #[inline]
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.rank() {
            return None;
        }
        self.data.get(index).copied()
    }

    /// All values in row-major order.
    ///
    /// `Tensor::from_flat(values, shape)?.flatten() == values`.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// The range of all finite values, or `None` if there are none.
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.data.iter().copied())
    }

    /// Returns a rescaled copy.
    pub fn normalized(&self, normalization: Normalization) -> Self {
        let mut tensor = self.clone();
        tensor.normalize(normalization);
        tensor
    }

    /// Rescale all values in place.
    pub fn normalize(&mut self, normalization: Normalization) {
        normalization.apply(&mut self.data);
    }
}

impl TryFrom<ArrayD<f64>> for Tensor {
    type Error = ShapeError;

    fn try_from(array: ArrayD<f64>) -> Result<Self, Self::Error> {
        let shape = ShapeSpec::new(array.shape().iter().copied())?;
        let data = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        Ok(Self { shape, data })
    }
}

impl<'a> From<&'a Tensor> for ArrayViewD<'a, f64> {
    #[inline]
    fn from(tensor: &'a Tensor) -> Self {
        tensor.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_is_row_major() {
        let shape = ShapeSpec::new([2, 3]).unwrap();
        let tensor = Tensor::from_flat(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &shape).unwrap();

        assert_eq!(tensor.get(&[0, 2]), Some(2.0));
        assert_eq!(tensor.get(&[1, 0]), Some(3.0));
        assert_eq!(tensor.get(&[2, 0]), None);
        assert_eq!(tensor.get(&[1]), None);
        assert_eq!(tensor.as_array().shape(), &[2, 3]);
    }

    #[test]
    fn pixel_integers_survive_reshaping() {
        let shape = ShapeSpec::new([2]).unwrap();
        let encoding = crate::PayloadEncoding::LineIntegers;
        let tensor = crate::deserialize("16777217\n2147483647\n", encoding, &shape).unwrap();
        assert_eq!(tensor.flatten(), vec![16_777_217.0, 2_147_483_647.0]);
    }

    #[test]
    fn mismatch_reports_both_counts() {
        let shape = ShapeSpec::new([2, 3]).unwrap();
        let err = Tensor::from_flat(vec![0.0; 5], &shape).unwrap_err();
        assert!(matches!(
            err,
            DeserializeError::ShapeMismatch {
                expected: 6,
                actual: 5,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Data size mismatch: expected 6 values for shape (2, 3), but got 5"
        );

        assert!(Tensor::from_flat(vec![0.0; 7], &shape).is_err());
    }

    #[test]
    fn value_range_skips_non_finite() {
        let shape = ShapeSpec::new([4]).unwrap();
        let tensor = Tensor::from_flat(vec![f64::NAN, -1.0, 3.0, f64::INFINITY], &shape).unwrap();
        assert_eq!(tensor.value_range(), Some(ValueRange::new(-1.0, 3.0)));

        let tensor = Tensor::from_flat(vec![f64::NAN], &ShapeSpec::new([1]).unwrap()).unwrap();
        assert_eq!(tensor.value_range(), None);
    }

    #[test]
    fn range_normalize() {
        let range = ValueRange::new(-1.0, 3.0);
        assert_eq!(range.normalize(-1.0), 0.0);
        assert_eq!(range.normalize(1.0), 0.5);
        assert_eq!(range.normalize(3.0), 1.0);
        assert_eq!(range.normalize(10.0), 1.0);

        let degenerate = ValueRange::new(2.0, 2.0);
        assert_eq!(degenerate.normalize(2.0), 0.0);
    }

    #[test]
    fn from_ndarray_uses_standard_layout() {
        let array = ndarray::array![[1.0_f64, 2.0], [3.0, 4.0]];
        let transposed = array.t().to_owned().into_dyn();
        let tensor = Tensor::try_from(transposed).unwrap();

        assert_eq!(tensor.dims(), &[2, 2]);
        assert_eq!(tensor.flatten(), vec![1.0, 3.0, 2.0, 4.0]);
    }
}
