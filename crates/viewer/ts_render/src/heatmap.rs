use image::{Rgba, RgbaImage};
use ndarray::ArrayView2;
use ts_tensor::ValueRange;

use crate::{Colormap, RenderError, colormap_srgb};

/// Non-finite values are drawn fully transparent.
const NON_FINITE_COLOR: [u8; 4] = [0, 0, 0, 0];

/// Color-map a 2D field (rows = `y`, columns = `x`).
///
/// Each value is normalized with `range` and clamped, the way matplotlib's `Normalize` does it
/// with `clip=True`.
pub fn render_heatmap(
    field: ArrayView2<'_, f64>,
    range: ValueRange,
    colormap: Colormap,
) -> Result<RgbaImage, RenderError> {
    let (height, width) = field.dim();
    let (image_width, image_height) = crate::image_size(width, height)?;

    let mut image = RgbaImage::new(image_width, image_height);
    for (pixel, &value) in image.pixels_mut().zip(field.iter()) {
        let color = if value.is_finite() {
            colormap_srgb(colormap, range.normalize(value) as f32)
        } else {
            NON_FINITE_COLOR
        };
        *pixel = Rgba(color);
    }

    Ok(image)
}

/// A vertical color scale: the top row is `t = 1`, the bottom row `t = 0`.
pub fn render_colorbar(width: u32, height: u32, colormap: Colormap) -> RgbaImage {
    let denominator = height.saturating_sub(1).max(1) as f32;
    RgbaImage::from_fn(width, height, |_x, y| {
        let t = 1.0 - y as f32 / denominator;
        Rgba(colormap_srgb(colormap, t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heatmap_is_row_major() {
        let field = ndarray::array![[0.0_f64, 1.0, 2.0], [3.0, 4.0, f64::NAN]];
        let image =
            render_heatmap(field.view(), ValueRange::new(0.0, 4.0), Colormap::Grayscale).unwrap();

        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, grayscale(0.75));
        assert_eq!(image.get_pixel(2, 1).0, NON_FINITE_COLOR);
    }

    fn grayscale(t: f32) -> [u8; 4] {
        colormap_srgb(Colormap::Grayscale, t)
    }

    #[test]
    fn constant_field_does_not_divide_by_zero() {
        let field = ndarray::Array2::from_elem((4, 5), 7.0_f64);
        let image =
            render_heatmap(field.view(), ValueRange::new(7.0, 7.0), Colormap::Jet).unwrap();
        let expected = colormap_srgb(Colormap::Jet, 0.0);
        assert!(image.pixels().all(|pixel| pixel.0 == expected));
    }

    #[test]
    fn non_standard_layout() {
        let field = ndarray::array![[0.0_f64, 1.0], [2.0, 3.0]];
        let transposed = field.t();
        let image =
            render_heatmap(transposed, ValueRange::new(0.0, 3.0), Colormap::Grayscale).unwrap();

        // Transposed: [[0, 2], [1, 3]]
        assert_eq!(image.get_pixel(1, 0).0, grayscale(2.0 / 3.0));
        assert_eq!(image.get_pixel(0, 1).0, grayscale(1.0 / 3.0));
    }

    #[test]
    fn colorbar_goes_from_top_to_bottom() {
        let bar = render_colorbar(4, 11, Colormap::Grayscale);
        assert_eq!(bar.dimensions(), (4, 11));
        assert_eq!(bar.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(bar.get_pixel(3, 10).0, [0, 0, 0, 255]);
    }
}
