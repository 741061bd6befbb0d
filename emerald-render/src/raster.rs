/*!
# Raster Export

Off-screen canvases, scene rasterization through `resvg`, PNG/JPEG encoding
and the clipboard path.

High-resolution output is re-rendered from the scene whenever the source can
do so; only when it cannot is the existing bitmap resampled.
*/

use std::path::Path;
use std::sync::{Arc, OnceLock};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use thiserror::Error;

use crate::error::ExportError;
use crate::source::ExportSource;

pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;
/// Quality used for the readiness probe encode.
pub const TRIAL_QUALITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

/// Off-screen pixel surface.
///
/// A canvas may have dimensions but no obtainable 2-D context, and it may be
/// tainted by cross-origin content, in which case it can never be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Option<RgbaImage>,
    origin_clean: bool,
}

impl Canvas {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: Some(image),
            origin_clean: true,
        }
    }

    pub fn without_context(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: None,
            origin_clean: true,
        }
    }

    /// Mark the canvas as holding cross-origin content.
    pub fn tainted(mut self) -> Self {
        self.origin_clean = false;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn context_2d(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    pub fn is_origin_clean(&self) -> bool {
        self.origin_clean
    }
}

/// Pixels of `canvas`, after the size and context preconditions.
pub fn require_context(canvas: &Canvas) -> Result<&RgbaImage, ExportError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(ExportError::precondition(format!(
            "Canvas has zero size ({}x{})",
            canvas.width(),
            canvas.height()
        )));
    }
    canvas
        .context_2d()
        .ok_or_else(|| ExportError::precondition("Unable to obtain a 2D context for the canvas"))
}

/// Family every generic `sans-serif` request and unmatched family resolves to.
pub const FALLBACK_FONT_FAMILY: &str = "DejaVu Sans";

/// Fonts shipped with the crate, so text renders on hosts without system fonts.
fn embedded_fonts() -> usvg::fontdb::Database {
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(include_bytes!("../assets/fonts/DejaVuSans.ttf").to_vec());
    db.load_font_data(include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf").to_vec());
    db.set_sans_serif_family(FALLBACK_FONT_FAMILY);
    db
}

fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    let db = FONTS.get_or_init(|| {
        let mut db = embedded_fonts();
        db.load_system_fonts();
        log::debug!("Font database holds {} faces", db.len());
        Arc::new(db)
    });
    Arc::clone(db)
}

/// Render an SVG document at `scale` device pixels per user unit.
pub fn rasterize_svg(svg: &str, scale: f64) -> Result<RgbaImage, ExportError> {
    rasterize_svg_with_fonts(svg, scale, font_database())
}

fn rasterize_svg_with_fonts(
    svg: &str,
    scale: f64,
    fontdb: Arc<usvg::fontdb::Database>,
) -> Result<RgbaImage, ExportError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ExportError::precondition(format!("Invalid render scale {}", scale)));
    }

    let options = usvg::Options {
        font_family: FALLBACK_FONT_FAMILY.to_string(),
        fontdb,
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ExportError::serialization(e.to_string()))?;

    let size = tree.size();
    let width = scaled_dimension(size.width().ceil() as u32, scale);
    let height = scaled_dimension(size.height().ceil() as u32, scale);
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ExportError::precondition(format!("Unable to allocate a {}x{} canvas", width, height)))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale as f32, scale as f32),
        &mut pixmap.as_mut(),
    );

    let mut raw = Vec::with_capacity(width as usize * height as usize * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(width, height, raw)
        .ok_or_else(|| ExportError::serialization("Rasterized buffer does not match canvas size"))
}

pub fn scaled_dimension(len: u32, scale: f64) -> u32 {
    ((len as f64) * scale).round().max(1.0) as u32
}

/// Produce the canvas to encode at `resolution_scale`.
///
/// With a scale above 1 the source's high-resolution renderer is asked once;
/// its canvas is returned untouched. Without one, the base bitmap is
/// resampled with Lanczos3.
pub fn render_raster(source: &dyn ExportSource, resolution_scale: f64) -> Result<Canvas, ExportError> {
    if !resolution_scale.is_finite() || resolution_scale < 1.0 {
        return Err(ExportError::precondition(format!(
            "Resolution scale must be at least 1 (got {})",
            resolution_scale
        )));
    }
    let canvas = source
        .canvas()
        .ok_or_else(|| ExportError::precondition("No canvas available for export"))?;
    let pixels = require_context(canvas)?;

    if resolution_scale <= 1.0 {
        return Ok(canvas.clone());
    }

    if let Some(high_res) = source.render_high_res(resolution_scale) {
        log::debug!(
            "Re-rendered scene at {}x: {}x{}",
            resolution_scale,
            high_res.width(),
            high_res.height()
        );
        return Ok(high_res);
    }

    let width = scaled_dimension(pixels.width(), resolution_scale);
    let height = scaled_dimension(pixels.height(), resolution_scale);
    log::warn!(
        "High-resolution render unavailable; resampling {}x{} bitmap to {}x{}",
        pixels.width(),
        pixels.height(),
        width,
        height
    );
    let resized = image::imageops::resize(pixels, width, height, FilterType::Lanczos3);
    let mut scaled = Canvas::from_image(resized);
    scaled.origin_clean = canvas.is_origin_clean();
    Ok(scaled)
}

/// JPEG encoder quality (1..=100) for a `[0, 1]` quality value.
pub fn jpeg_quality(quality: f64) -> u8 {
    let q = if quality.is_finite() { quality } else { DEFAULT_JPEG_QUALITY };
    (q.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode `canvas`; a tainted canvas is a security error.
pub fn encode_canvas(canvas: &Canvas, format: RasterFormat, quality: f64) -> Result<Vec<u8>, ExportError> {
    let pixels = require_context(canvas)?;
    if !canvas.is_origin_clean() {
        return Err(ExportError::security(
            "The canvas has been tainted by cross-origin data and cannot be exported",
        ));
    }

    let mut buf = Vec::new();
    match format {
        RasterFormat::Png => {
            PngEncoder::new(&mut buf).write_image(pixels.as_raw(), pixels.width(), pixels.height(), ColorType::Rgba8)?;
        }
        RasterFormat::Jpeg => {
            let rgb = flatten_on_white(pixels);
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality)).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ColorType::Rgb8,
            )?;
        }
    }
    if buf.is_empty() {
        return Err(ExportError::serialization("Encoder produced no data"));
    }
    Ok(buf)
}

// JPEG has no alpha channel.
fn flatten_on_white(pixels: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let [r, g, b, a] = pixels.get_pixel(x, y).0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Render, encode and write a raster export to `path`.
pub fn export_raster(
    source: &dyn ExportSource,
    format: RasterFormat,
    quality: f64,
    resolution_scale: f64,
    path: &Path,
) -> Result<(), ExportError> {
    let canvas = render_raster(source, resolution_scale)?;
    let bytes = encode_canvas(&canvas, format, quality)?;
    std::fs::write(path, &bytes)?;
    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard is not supported")]
    Unsupported,

    #[error("clipboard permission denied")]
    PermissionDenied,

    #[error("{0}")]
    Other(String),
}

impl From<ClipboardError> for ExportError {
    fn from(err: ClipboardError) -> Self {
        match err {
            ClipboardError::Unsupported => ExportError::ClipboardUnsupported,
            ClipboardError::PermissionDenied => ExportError::ClipboardPermissionDenied,
            ClipboardError::Other(message) => ExportError::clipboard(message),
        }
    }
}

/// System clipboard capability.
pub trait Clipboard {
    fn write_png(&self, png: &[u8]) -> Result<(), ClipboardError>;
}

/// Copy the rendered plot as PNG. When `primary` is unsupported, `fallback`
/// (a degraded copy path) is tried before giving up.
pub fn copy_to_clipboard(
    source: &dyn ExportSource,
    resolution_scale: f64,
    primary: &dyn Clipboard,
    fallback: Option<&dyn Clipboard>,
) -> Result<(), ExportError> {
    let canvas = render_raster(source, resolution_scale)?;
    let png = encode_canvas(&canvas, RasterFormat::Png, 1.0)?;

    match primary.write_png(&png) {
        Ok(()) => Ok(()),
        Err(ClipboardError::Unsupported) => match fallback {
            Some(fallback) => {
                log::info!("Clipboard API unsupported, using fallback copy path");
                fallback.write_png(&png).map_err(ExportError::from)
            }
            None => Err(ExportError::ClipboardUnsupported),
        },
        Err(err) => Err(err.into()),
    }
}
