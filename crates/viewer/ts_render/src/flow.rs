//! Optical flow: a `(1, 2, height, width)` tensor holding the x and y displacement per pixel.

use image::{Rgba, RgbaImage};
use ndarray::{Array2, Ix4, Zip, s};
use ts_tensor::{Tensor, ValueRange};

use crate::{Colormap, RenderError, render_colorbar, render_heatmap};

/// The two components of an optical-flow field.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl FlowField {
    /// Split a `(1, 2, height, width)` tensor into its x and y components.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self, RenderError> {
        let bad_shape = || RenderError::BadFlowShape(tensor.shape().clone());

        let [1, 2, _height, _width] = tensor.dims() else {
            return Err(bad_shape());
        };

        let view = tensor
            .view()
            .into_dimensionality::<Ix4>()
            .map_err(|_err| bad_shape())?;

        Ok(Self {
            x: view.slice(s![0, 0, .., ..]).to_owned(),
            y: view.slice(s![0, 1, .., ..]).to_owned(),
        })
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.x.nrows()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.x.ncols()
    }

    /// `sqrt(x² + y²)` per pixel.
    pub fn magnitude(&self) -> Array2<f64> {
        Zip::from(&self.x)
            .and(&self.y)
            .map_collect(|&x, &y| (x * x + y * y).sqrt())
    }

    /// Finite min/max of the magnitude. Degenerate if there are no finite values.
    pub fn magnitude_range(&self) -> ValueRange {
        ValueRange::from_values(self.magnitude().iter().copied())
            .unwrap_or(ValueRange::new(0.0, 0.0))
    }
}

/// Layout of [`render_flow_panels`].
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPanelOptions {
    pub colormap: Colormap,

    /// Width of the color scale next to each panel, in pixels.
    pub colorbar_width: u32,

    /// Space between a panel and its color scale; twice this separates the two panels.
    pub gap: u32,

    pub background: [u8; 4],
}

impl Default for FlowPanelOptions {
    fn default() -> Self {
        Self {
            colormap: Colormap::Jet,
            colorbar_width: 16,
            gap: 8,
            background: [255, 255, 255, 255],
        }
    }
}

/// Render the x and y components side by side, each followed by a color scale.
///
/// Both components share one normalization: the min/max of the flow magnitude.
pub fn render_flow_panels(
    flow: &FlowField,
    options: &FlowPanelOptions,
) -> Result<RgbaImage, RenderError> {
    let range = flow.magnitude_range();

    let panel_x = render_heatmap(flow.x.view(), range, options.colormap)?;
    let panel_y = render_heatmap(flow.y.view(), range, options.colormap)?;
    let (panel_width, panel_height) = panel_x.dimensions();

    let colorbar = render_colorbar(options.colorbar_width, panel_height, options.colormap);

    let block_width = panel_width + options.gap + options.colorbar_width;
    let total_width = 2 * block_width + 2 * options.gap;

    let mut canvas = RgbaImage::from_pixel(total_width, panel_height, Rgba(options.background));

    for (block_idx, panel) in [&panel_x, &panel_y].into_iter().enumerate() {
        let left = block_idx as u32 * (block_width + 2 * options.gap);
        image::imageops::overlay(&mut canvas, panel, i64::from(left), 0);
        image::imageops::overlay(
            &mut canvas,
            &colorbar,
            i64::from(left + panel_width + options.gap),
            0,
        );
    }

    Ok(canvas)
}
