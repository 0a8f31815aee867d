use image::{Rgba, RgbaImage};
use ts_tensor::{ShapeSpec, Tensor};

use crate::RenderError;

/// Returns `[height, width, channels]` if the shape can be shown as an image.
///
/// Accepts `(H, W)` and `(H, W, 1|3|4)` directly. Other shapes are considered after ignoring
/// leading and trailing dimensions of size one, so e.g. `(1, H, W, 3)` works too.
pub fn image_height_width_channels(shape: &ShapeSpec) -> Option<[usize; 3]> {
    match *shape.dims() {
        [height, width] => return Some([height, width, 1]),
        [height, width, channels @ (1 | 3 | 4)] => return Some([height, width, channels]),
        _ => {}
    }

    match *shape.dims_short() {
        // Special case: Nx1(x1x1x …) tensors are treated as Nx1 gray images.
        [height] if shape.rank() >= 2 => Some([height, 1, 1]),
        [height, width] => Some([height, width, 1]),
        [height, width, channels @ (1 | 3 | 4)] => Some([height, width, channels]),
        _ => None,
    }
}

/// Convert an image-shaped tensor with values in `[0, 1]` to an RGBA image.
///
/// Values outside `[0, 1]` are clamped, NaN becomes 0. One channel is gray, three are RGB,
/// four are RGBA.
pub fn tensor_to_rgb_image(tensor: &Tensor) -> Result<RgbaImage, RenderError> {
    let [height, width, channels] = image_height_width_channels(tensor.shape())
        .ok_or_else(|| RenderError::BadImageShape(tensor.shape().clone()))?;
    let (image_width, image_height) = crate::image_size(width, height)?;

    let values = tensor.flatten();
    let mut image = RgbaImage::new(image_width, image_height);
    for (pixel, texel) in image.pixels_mut().zip(values.chunks_exact(channels)) {
        *pixel = Rgba(match *texel {
            [gray] => {
                let gray = to_u8(gray);
                [gray, gray, gray, 255]
            }
            [r, g, b] => [to_u8(r), to_u8(g), to_u8(b), 255],
            [r, g, b, a] => [to_u8(r), to_u8(g), to_u8(b), to_u8(a)],
            _ => return Err(RenderError::BadImageShape(tensor.shape().clone())),
        });
    }

    Ok(image)
}

#[inline]
fn to_u8(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }
}
