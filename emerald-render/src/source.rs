//! Pull-based export surface.

use crate::error::ExportError;
use crate::geometry::{ExportData, RenderStyle};
use crate::raster::{rasterize_svg, Canvas};
use crate::svg::export_svg;

/// What an exporter pulls from the live view.
pub trait ExportSource {
    /// Snapshot of alignments, ticks, transform and settings.
    fn export_data(&self) -> ExportData;

    /// The on-screen canvas, if one exists.
    fn canvas(&self) -> Option<&Canvas>;

    fn style(&self) -> RenderStyle {
        RenderStyle::default()
    }

    /// Redraw the scene at `scale` times the base resolution.
    fn render_high_res(&self, _scale: f64) -> Option<Canvas> {
        None
    }
}

/// Headless source: rasterizes the shared scene itself, so its high-res
/// canvases are true re-renders rather than resampled bitmaps.
pub struct SceneSource {
    data: ExportData,
    style: RenderStyle,
    canvas: Canvas,
}

impl SceneSource {
    pub fn new(data: ExportData, style: RenderStyle) -> Result<Self, ExportError> {
        let svg = export_svg(&data, &style)?;
        let canvas = Canvas::from_image(rasterize_svg(&svg, 1.0)?);
        Ok(Self { data, style, canvas })
    }

    pub fn data(&self) -> &ExportData {
        &self.data
    }
}

impl ExportSource for SceneSource {
    fn export_data(&self) -> ExportData {
        self.data.clone()
    }

    fn canvas(&self) -> Option<&Canvas> {
        Some(&self.canvas)
    }

    fn style(&self) -> RenderStyle {
        self.style.clone()
    }

    fn render_high_res(&self, scale: f64) -> Option<Canvas> {
        let rendered = export_svg(&self.data, &self.style).and_then(|svg| rasterize_svg(&svg, scale));
        match rendered {
            Ok(image) => Some(Canvas::from_image(image)),
            Err(e) => {
                log::warn!("High-resolution render at {}x failed: {}", scale, e);
                None
            }
        }
    }
}
