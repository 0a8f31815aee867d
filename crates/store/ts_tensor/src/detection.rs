//! Object-detection results, as produced by e.g. COCO-SSD: `{"bbox": [x, y, w, h], "class": "person", "score": 0.95}`.

use std::path::{Path, PathBuf};

/// Errors from [`parse_detections`] and [`load_detections`].
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    #[error("Failed to read detections from {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed detection list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Detection {index} ({class:?}) has score {score}, expected a value in [0, 1]")]
    ScoreOutOfRange {
        index: usize,
        class: String,
        score: f32,
    },

    #[error("Detection {index} ({class:?}) has a negative size: {width}x{height}")]
    NegativeSize {
        index: usize,
        class: String,
        width: f32,
        height: f32,
    },
}

/// Axis-aligned box in pixel coordinates, `(x, y)` being the top-left corner.
///
/// Serialized as `[x, y, width, height]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<[f32; 4]> for BoundingBox {
    #[inline]
    fn from([x, y, width, height]: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<BoundingBox> for [f32; 4] {
    #[inline]
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x, bbox.y, bbox.width, bbox.height]
    }
}

/// A detected object. Only ever used to annotate an image.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Detection {
    pub bbox: BoundingBox,

    /// The class label, e.g. `person`.
    pub class: String,

    /// Confidence in `[0, 1]`.
    pub score: f32,
}

impl Detection {
    /// The text shown next to the box, e.g. `person (0.95)`.
    pub fn label(&self) -> String {
        format!("{} ({:.2})", self.class, self.score)
    }

    fn validate(&self, index: usize) -> Result<(), DetectionError> {
        if !(0.0..=1.0).contains(&self.score) {
            return Err(DetectionError::ScoreOutOfRange {
                index,
                class: self.class.clone(),
                score: self.score,
            });
        }
        if self.bbox.width < 0.0 || self.bbox.height < 0.0 {
            return Err(DetectionError::NegativeSize {
                index,
                class: self.class.clone(),
                width: self.bbox.width,
                height: self.bbox.height,
            });
        }
        Ok(())
    }
}

/// Parse a JSON array of detections.
pub fn parse_detections(text: &str) -> Result<Vec<Detection>, DetectionError> {
    let detections: Vec<Detection> = serde_json::from_str(text)?;
    for (index, detection) in detections.iter().enumerate() {
        detection.validate(index)?;
    }
    Ok(detections)
}

/// Read and parse a JSON file of detections.
pub fn load_detections(path: impl AsRef<Path>) -> Result<Vec<Detection>, DetectionError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DetectionError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_detections(&text)
}
