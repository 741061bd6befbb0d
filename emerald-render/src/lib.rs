/*!
# Emerald Render

Export pipeline for the alignment dot matrix.

## Architecture

1. **Geometry**: a pure function from an [`ExportData`] snapshot to a layered [`Scene`]
2. **SVG writer**: serializes the scene as a standalone SVG document
3. **Rasterizer**: renders the same SVG through `resvg` at any device-pixel ratio
4. **Orchestrator**: readiness checks, format dispatch, naming and outcome reporting

Because both output formats come from one scene, vector and raster exports
always agree with each other and with the transform they were given.
*/

pub mod error;
pub mod export;
pub mod filename;
pub mod geometry;
pub mod raster;
pub mod source;
pub mod svg;

pub use error::ExportError;
pub use export::{check_readiness, ExportFormat, ExportOrchestrator, ExportOutcome, ExportRequest};
pub use filename::{generate_export_filename, sanitize_descriptor};
pub use geometry::{build_scene, ExportData, LayerKind, RenderStyle, Scene, VisualizationSettings};
pub use raster::{Canvas, Clipboard, ClipboardError, RasterFormat};
pub use source::{ExportSource, SceneSource};
pub use svg::export_svg;

// Re-export the core model so callers need a single import path
pub use emerald_core::{AlignmentDot, AlignmentEdge, AlignmentSegment, CoordinateTransform, TickMark};
