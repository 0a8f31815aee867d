//! Rendering tensors to images.
//!
//! * [`render_flow_panels`]: the x and y components of an optical-flow field, side by side.
//! * [`tensor_to_rgb_image`] + [`draw_annotations`]: an image tensor with optional boxes on top.
//!
//! All output is an [`image::RgbaImage`], which [`save_png`] writes to disk.

mod colormap;
mod flow;
mod heatmap;
mod image_view;
mod overlay;

use std::path::{Path, PathBuf};

use ts_tensor::ShapeSpec;

pub use self::colormap::{
    Colormap, colormap_jet_srgb, colormap_srgb, colormap_turbo_srgb, colormap_viridis_srgb,
    grayscale_srgb,
};
pub use self::flow::{FlowField, FlowPanelOptions, render_flow_panels};
pub use self::heatmap::{render_colorbar, render_heatmap};
pub use self::image_view::{image_height_width_channels, tensor_to_rgb_image};
pub use self::overlay::{BoxAnnotation, OverlayStyle, annotations_for, draw_annotations};

/// Re-exports of other crates.
pub mod external {
    pub use image;
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Expected an optical-flow tensor of shape (1, 2, height, width), got {0}")]
    BadFlowShape(ShapeSpec),

    #[error("Expected an image tensor of shape (height, width) or (height, width, 1|3|4), got {0}")]
    BadImageShape(ShapeSpec),

    #[error("Image of {width}x{height} pixels is too large")]
    TooLarge { width: usize, height: usize },

    #[error("Failed to save image to {path:?}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// `(width, height)` in the form `image` wants it.
pub(crate) fn image_size(width: usize, height: usize) -> Result<(u32, u32), RenderError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(RenderError::TooLarge { width, height }),
    }
}

/// Write `image` as a PNG, whatever the extension of `path`.
pub fn save_png(image: &image::RgbaImage, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| RenderError::Save {
            path: path.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");

        let image = image::RgbaImage::from_fn(3, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 128])
            }
        });
        save_png(&image, &path).unwrap();

        let reloaded = image::open(&path).unwrap().into_rgba8();
        similar_asserts::assert_eq!(reloaded.as_raw(), image.as_raw());
    }

    #[test]
    fn save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.png");
        let err = save_png(&image::RgbaImage::new(1, 1), &path).unwrap_err();
        assert!(matches!(err, RenderError::Save { path: ref p, .. } if p == &path));
    }
}
