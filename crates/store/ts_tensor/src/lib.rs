//! Deserializing flat, textual tensor dumps into strictly-shaped arrays.
//!
//! The caller always knows the shape ahead of time. A payload either has exactly as many values as
//! the [`ShapeSpec`] has elements, or it is rejected:
//!
//! ```
//! use ts_tensor::{PayloadEncoding, ShapeSpec};
//!
//! let shape: ShapeSpec = "2,3".parse()?;
//! let tensor = ts_tensor::deserialize("1\n2\n3\n4\n5\n6\n", PayloadEncoding::LineIntegers, &shape)?;
//! assert_eq!(tensor.get(&[1, 0]), Some(4.0));
//!
//! let err = ts_tensor::deserialize("1\n2\n3\n", PayloadEncoding::LineIntegers, &shape).unwrap_err();
//! assert!(matches!(err, ts_tensor::DeserializeError::ShapeMismatch { expected: 6, actual: 3, .. }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Rescaling (e.g. dividing pixel values by 255) is a separate, explicit step:
//! see [`Normalization`].

mod detection;
mod normalization;
mod payload;
mod shape;
mod tensor;

use std::path::{Path, PathBuf};

pub use self::detection::{
    BoundingBox, Detection, DetectionError, load_detections, parse_detections,
};
pub use self::normalization::{Divisor, Normalization, NormalizationError};
pub use self::payload::{FlatPayload, ParseError, PayloadEncoding, TokenPosition};
pub use self::shape::{ShapeError, ShapeSpec};
pub use self::tensor::{Tensor, ValueRange};

/// Re-exports of other crates.
pub mod external {
    pub use ndarray;
}

// ----------------------------------------------------------------------------

/// Everything that can go wrong turning text into a [`Tensor`].
///
/// None of these are worth retrying.
#[derive(thiserror::Error, Debug)]
pub enum DeserializeError {
    #[error("Failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Data size mismatch: expected {expected} values for shape {shape}, but got {actual}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        shape: ShapeSpec,
    },
}

/// Parse `text` as a flat sequence of values and reshape it into `shape`.
///
/// The values keep their order: row-major, last dimension fastest.
pub fn deserialize(
    text: &str,
    encoding: PayloadEncoding,
    shape: &ShapeSpec,
) -> Result<Tensor, DeserializeError> {
    let payload = FlatPayload::parse(text, encoding)?;
    Tensor::from_flat(payload.into_values(), shape)
}

/// Like [`deserialize`], but reads the text from a file first.
pub fn deserialize_file(
    path: impl AsRef<Path>,
    encoding: PayloadEncoding,
    shape: &ShapeSpec,
) -> Result<Tensor, DeserializeError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DeserializeError::Io {
        path: path.to_owned(),
        source,
    })?;
    deserialize(&text, encoding, shape)
}
