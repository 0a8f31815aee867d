//! Bounding-box outlines drawn on top of a rendered image.

use image::{Rgba, RgbaImage};
use ts_tensor::Detection;

/// A rectangle in pixel coordinates plus the text that belongs next to it.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxAnnotation {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
}

impl From<&Detection> for BoxAnnotation {
    fn from(detection: &Detection) -> Self {
        let bbox = detection.bbox;
        Self {
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            label: detection.label(),
        }
    }
}

/// No detections means no annotations.
pub fn annotations_for(detections: Option<&[Detection]>) -> Vec<BoxAnnotation> {
    detections
        .unwrap_or_default()
        .iter()
        .map(BoxAnnotation::from)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayStyle {
    pub color: [u8; 4],

    /// Thickness of the outline, growing inwards from the box edges.
    pub line_width: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0, 255],
            line_width: 2,
        }
    }
}

/// Draw the outline of each box. Anything outside of the image is clipped.
///
/// Labels are not rasterized.
pub fn draw_annotations(
    image: &mut RgbaImage,
    annotations: &[BoxAnnotation],
    style: &OverlayStyle,
) {
    for annotation in annotations {
        draw_outline(image, annotation, style);
    }
}

fn draw_outline(image: &mut RgbaImage, annotation: &BoxAnnotation, style: &OverlayStyle) {
    if style.line_width == 0 || !(annotation.width > 0.0 && annotation.height > 0.0) {
        return;
    }

    // Inclusive pixel bounds of the box.
    let left = annotation.x.round() as i64;
    let top = annotation.y.round() as i64;
    let right = (annotation.x + annotation.width).round() as i64 - 1;
    let bottom = (annotation.y + annotation.height).round() as i64 - 1;
    if right < left || bottom < top {
        return;
    }

    let (image_width, image_height) = image.dimensions();
    let line = i64::from(style.line_width);

    let x_range = left.max(0)..=right.min(i64::from(image_width) - 1);
    let y_range = top.max(0)..=bottom.min(i64::from(image_height) - 1);

    for y in y_range {
        let on_horizontal_edge = y < top + line || bottom - line < y;
        for x in x_range.clone() {
            let on_vertical_edge = x < left + line || right - line < x;
            if on_horizontal_edge || on_vertical_edge {
                image.put_pixel(x as u32, y as u32, Rgba(style.color));
            }
        }
    }
}
