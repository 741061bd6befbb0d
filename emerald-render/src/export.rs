/*!
# Export Orchestrator

Checks readiness, picks the exporter for the requested format, names the
output file and reports exactly one [`ExportOutcome`]. Errors never escape:
they are logged and folded into the outcome.
*/

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::filename::generate_export_filename;
use crate::raster::{self, encode_canvas, require_context, Clipboard, RasterFormat, DEFAULT_JPEG_QUALITY, TRIAL_QUALITY};
use crate::source::ExportSource;
use crate::svg::{export_svg, write_svg_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn raster(&self) -> Option<RasterFormat> {
        match self {
            ExportFormat::Png => Some(RasterFormat::Png),
            ExportFormat::Jpeg => Some(RasterFormat::Jpeg),
            ExportFormat::Svg => None,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(ExportError::precondition(format!("Unsupported export format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// JPEG only, in `[0, 1]`.
    pub quality: f64,
    pub resolution_scale: f64,
    pub output_dir: PathBuf,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: DEFAULT_JPEG_QUALITY,
            resolution_scale: 1.0,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Success { filename: String, path: PathBuf },
    /// PNG placed on the clipboard.
    Copied,
    Security(String),
    Failure(String),
}

impl ExportOutcome {
    fn from_error(err: &ExportError) -> Self {
        if err.is_security() {
            ExportOutcome::Security(err.to_string())
        } else {
            ExportOutcome::Failure(err.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExportOutcome::Success { .. } | ExportOutcome::Copied)
    }
}

/// Validate that `source` can be exported at all: canvas present, non-zero,
/// with a context, and able to survive a low-quality trial encode.
pub fn check_readiness(source: &dyn ExportSource) -> Result<(), ExportError> {
    let canvas = source
        .canvas()
        .ok_or_else(|| ExportError::precondition("No canvas available for export"))?;
    require_context(canvas)?;
    encode_canvas(canvas, RasterFormat::Jpeg, TRIAL_QUALITY)?;
    Ok(())
}

/// Serializes exports: one in flight at a time, further requests get `Busy`.
#[derive(Default)]
pub struct ExportOrchestrator {
    in_flight: Mutex<()>,
}

impl ExportOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_locked()
    }

    pub fn export(&self, source: &dyn ExportSource, request: &ExportRequest) -> ExportOutcome {
        self.export_at(source, request, Utc::now())
    }

    /// Same as [`export`](Self::export) with an explicit timestamp for the filename.
    pub fn export_at(&self, source: &dyn ExportSource, request: &ExportRequest, at: DateTime<Utc>) -> ExportOutcome {
        let Some(_guard) = self.in_flight.try_lock() else {
            log::warn!("Rejecting {:?} export: another export is in flight", request.format);
            return ExportOutcome::from_error(&ExportError::Busy);
        };

        log::info!(
            "Starting {:?} export (scale {}, quality {})",
            request.format,
            request.resolution_scale,
            request.quality
        );
        match run_export(source, request, at) {
            Ok((filename, path)) => {
                log::info!("Export finished: {}", path.display());
                ExportOutcome::Success { filename, path }
            }
            Err(err) => failed("Export", &err),
        }
    }

    /// Copy the plot to the clipboard as PNG. Shares the in-flight guard with file exports.
    pub fn copy_to_clipboard(
        &self,
        source: &dyn ExportSource,
        resolution_scale: f64,
        clipboard: &dyn Clipboard,
        fallback: Option<&dyn Clipboard>,
    ) -> ExportOutcome {
        let Some(_guard) = self.in_flight.try_lock() else {
            log::warn!("Rejecting clipboard copy: another export is in flight");
            return ExportOutcome::from_error(&ExportError::Busy);
        };

        log::info!("Starting clipboard copy (scale {})", resolution_scale);
        let copied = check_readiness(source)
            .and_then(|()| raster::copy_to_clipboard(source, resolution_scale, clipboard, fallback));
        match copied {
            Ok(()) => {
                log::info!("Plot copied to clipboard");
                ExportOutcome::Copied
            }
            Err(err) => failed("Clipboard copy", &err),
        }
    }
}

/// Log `err` at the level its category deserves and fold it into an outcome.
fn failed(operation: &str, err: &ExportError) -> ExportOutcome {
    if err.is_security() {
        log::warn!("{} blocked: {}", operation, err);
    } else {
        log::error!("{} failed: {}", operation, err);
    }
    ExportOutcome::from_error(err)
}

fn run_export(
    source: &dyn ExportSource,
    request: &ExportRequest,
    at: DateTime<Utc>,
) -> Result<(String, PathBuf), ExportError> {
    check_readiness(source)?;

    let data = source.export_data();
    let filename = generate_export_filename(
        data.descriptor_a.as_deref(),
        data.descriptor_b.as_deref(),
        request.format.extension(),
        at,
    );
    let path = request.output_dir.join(&filename);
    log::debug!("Dispatching {:?} export to {}", request.format, path.display());

    match request.format.raster() {
        Some(format) => raster::export_raster(source, format, request.quality, request.resolution_scale, &path)?,
        None => write_vector(source, &path)?,
    }
    Ok((filename, path))
}

fn write_vector(source: &dyn ExportSource, path: &Path) -> Result<(), ExportError> {
    let document = export_svg(&source.export_data(), &source.style())?;
    write_svg_file(path, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Canvas;
    use crate::geometry::ExportData;
    use image::{Rgba, RgbaImage};

    struct FixedSource {
        canvas: Option<Canvas>,
        data: ExportData,
    }

    impl ExportSource for FixedSource {
        fn export_data(&self) -> ExportData {
            self.data.clone()
        }

        fn canvas(&self) -> Option<&Canvas> {
            self.canvas.as_ref()
        }
    }

    fn source(canvas: Option<Canvas>) -> FixedSource {
        FixedSource {
            canvas,
            data: ExportData {
                descriptor_a: Some("P69905".into()),
                descriptor_b: Some("P68871".into()),
                ..Default::default()
            },
        }
    }

    fn white(w: u32, h: u32) -> Canvas {
        Canvas::from_image(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::Svg.extension(), "svg");
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_readiness_failures() {
        assert!(matches!(check_readiness(&source(None)), Err(ExportError::Precondition { .. })));
        assert!(matches!(
            check_readiness(&source(Some(white(0, 0)))),
            Err(ExportError::Precondition { .. })
        ));
        assert!(matches!(
            check_readiness(&source(Some(Canvas::without_context(5, 5)))),
            Err(ExportError::Precondition { .. })
        ));
        assert!(check_readiness(&source(Some(white(5, 5).tainted()))).unwrap_err().is_security());
        assert!(check_readiness(&source(Some(white(5, 5)))).is_ok());
    }

    #[test]
    fn test_outcome_categories() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = ExportOrchestrator::new();
        let request = ExportRequest {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let tainted = orchestrator.export(&source(Some(white(4, 4).tainted())), &request);
        assert!(matches!(tainted, ExportOutcome::Security(_)));

        let missing = orchestrator.export(&source(None), &request);
        assert!(matches!(missing, ExportOutcome::Failure(msg) if msg.contains("No canvas")));

        let ok = orchestrator.export(&source(Some(white(4, 4))), &request);
        match ok {
            ExportOutcome::Success { filename, path } => {
                assert!(filename.starts_with("emerald_alignment_P69905_vs_P68871_"));
                assert!(filename.ends_with(".png"));
                assert!(path.exists());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!orchestrator.is_busy());
    }
}
