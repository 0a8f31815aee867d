use smallvec::SmallVec;

/// Errors when constructing a [`ShapeSpec`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("A shape needs at least one dimension")]
    NoDimensions,

    #[error("Dimension {axis} of shape {dims:?} has size zero; all dimensions must be positive")]
    ZeroSizedDimension { axis: usize, dims: Vec<usize> },

    #[error("The number of elements of shape {0:?} does not fit in usize")]
    Overflow(Vec<usize>),

    #[error("Failed to parse shape {text:?}: {reason}")]
    Parse { text: String, reason: String },
}

/// The exact dimensions a flat payload must be reshaped into, outermost first.
///
/// All dimensions are strictly positive, and their product fits in `usize`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeSpec {
    dims: SmallVec<[usize; 4]>,
}

impl ShapeSpec {
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Result<Self, ShapeError> {
        let dims: SmallVec<[usize; 4]> = dims.into_iter().collect();

        if dims.is_empty() {
            return Err(ShapeError::NoDimensions);
        }
        if let Some(axis) = dims.iter().position(|&size| size == 0) {
            return Err(ShapeError::ZeroSizedDimension {
                axis,
                dims: dims.to_vec(),
            });
        }
        if dims
            .iter()
            .try_fold(1usize, |acc, &size| acc.checked_mul(size))
            .is_none()
        {
            return Err(ShapeError::Overflow(dims.to_vec()));
        }

        Ok(Self { dims })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// The product of all dimensions, i.e. how many values a payload must hold.
    #[inline]
    pub fn num_elements(&self) -> usize {
        // Checked at construction.
        self.dims.iter().product()
    }

    /// Returns the shape with all leading & trailing dimensions of size 1 ignored.
    ///
    /// If all dimension sizes are one, this returns only the first dimension.
    pub fn dims_short(&self) -> &[usize] {
        let first_not_one = self.dims.iter().position(|&size| size != 1);
        let last_not_one = self.dims.iter().rev().position(|&size| size != 1);
        match (first_not_one, last_not_one) {
            (Some(first), Some(last)) => &self.dims[first..self.dims.len() - last],
            _ => &self.dims[..1],
        }
    }
}

impl std::fmt::Display for ShapeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, size) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{size}")?;
        }
        f.write_str(")")
    }
}

/// Accepts `1,2,432,768`, `1x2x432x768` and `(1, 2, 432, 768)`.
impl std::str::FromStr for ShapeSpec {
    type Err = ShapeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let inner = text.trim();
        let inner = inner
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(inner);

        let dims = inner
            .split([',', 'x', 'X'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>().map_err(|err| ShapeError::Parse {
                    text: text.to_owned(),
                    reason: format!("{part:?} is not a dimension size: {err}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(dims)
    }
}

impl TryFrom<&[usize]> for ShapeSpec {
    type Error = ShapeError;

    #[inline]
    fn try_from(dims: &[usize]) -> Result<Self, Self::Error> {
        Self::new(dims.iter().copied())
    }
}

impl<const N: usize> TryFrom<[usize; N]> for ShapeSpec {
    type Error = ShapeError;

    #[inline]
    fn try_from(dims: [usize; N]) -> Result<Self, Self::Error> {
        Self::new(dims)
    }
}

impl serde::Serialize for ShapeSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(self.dims(), serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ShapeSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dims: Vec<usize> = serde::Deserialize::deserialize(deserializer)?;
        Self::new(dims).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_notations() {
        let expected = ShapeSpec::new([1, 2, 432, 768]).unwrap();
        for text in [
            "1,2,432,768",
            "1x2x432x768",
            "(1, 2, 432, 768)",
            " 1, 2 ,432,768 ",
        ] {
            assert_eq!(text.parse::<ShapeSpec>().unwrap(), expected, "{text}");
        }
        assert_eq!(expected.to_string(), "(1, 2, 432, 768)");
        assert_eq!(expected.num_elements(), 663_552);
        assert_eq!(expected.rank(), 4);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(ShapeSpec::new(Vec::new()), Err(ShapeError::NoDimensions));
        assert_eq!(
            ShapeSpec::new([300, 0, 3]),
            Err(ShapeError::ZeroSizedDimension {
                axis: 1,
                dims: vec![300, 0, 3]
            })
        );
        assert!(matches!(
            ShapeSpec::new([usize::MAX, 2]),
            Err(ShapeError::Overflow(_))
        ));
        assert!(matches!(
            "300,three,3".parse::<ShapeSpec>(),
            Err(ShapeError::Parse { .. })
        ));
        assert_eq!("".parse::<ShapeSpec>(), Err(ShapeError::NoDimensions));
    }

    #[test]
    fn short_dims() {
        let shape = ShapeSpec::new([1, 2, 432, 768]).unwrap();
        assert_eq!(shape.dims_short(), &[2, 432, 768]);

        let shape = ShapeSpec::new([1, 1, 1]).unwrap();
        assert_eq!(shape.dims_short(), &[1]);

        let shape = ShapeSpec::new([300, 300, 3]).unwrap();
        assert_eq!(shape.dims_short(), &[300, 300, 3]);
    }

    #[test]
    fn serde_roundtrip_validates() {
        let shape: ShapeSpec = serde_json::from_str("[300, 300, 3]").unwrap();
        assert_eq!(shape.dims(), &[300, 300, 3]);
        assert_eq!(serde_json::to_string(&shape).unwrap(), "[300,300,3]");

        assert!(serde_json::from_str::<ShapeSpec>("[300, 0, 3]").is_err());
    }
}
