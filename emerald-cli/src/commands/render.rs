use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use emerald_render::{ExportFormat, ExportOrchestrator, ExportOutcome, ExportRequest, SceneSource};

use crate::commands::load_snapshot;
use crate::config::Config;
use crate::error::CliError;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Jpeg,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Svg => ExportFormat::Svg,
            OutputFormat::Png => ExportFormat::Png,
            OutputFormat::Jpeg => ExportFormat::Jpeg,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Export snapshot (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory [default: export.output_dir]
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format [default: render.format]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Resolution multiplier for PNG and JPEG
    #[arg(long)]
    pub scale: Option<f64>,

    /// JPEG quality in [0, 1]
    #[arg(long)]
    pub quality: Option<f64>,

    /// Plot width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Plot height in pixels
    #[arg(long)]
    pub height: Option<f64>,

    #[arg(long)]
    pub no_grid: bool,

    #[arg(long)]
    pub no_axes: bool,

    #[arg(long)]
    pub no_axis_labels: bool,

    #[arg(long)]
    pub no_edges: bool,

    #[arg(long)]
    pub no_dots: bool,

    #[arg(long)]
    pub no_safety_windows: bool,

    #[arg(long)]
    pub no_minimap: bool,
}

/// Render a snapshot and write it to the output directory. Returns the written path.
pub fn execute(config: &Config, args: RenderArgs) -> Result<PathBuf> {
    log::info!("Rendering snapshot: {}", args.input.display());

    let format = match args.format {
        Some(format) => ExportFormat::from(format),
        None => config
            .render
            .format
            .parse::<ExportFormat>()
            .map_err(|e| CliError::config(e.to_string()))?,
    };
    let resolution_scale = args.scale.unwrap_or(config.render.resolution_scale);
    if !resolution_scale.is_finite() || resolution_scale < 1.0 {
        return Err(CliError::validation(format!("Resolution scale must be at least 1, got {}", resolution_scale)).into());
    }
    let quality = args.quality.unwrap_or(config.render.jpeg_quality);
    if !(0.0..=1.0).contains(&quality) {
        return Err(CliError::validation(format!("JPEG quality must be within [0, 1], got {}", quality)).into());
    }

    let mut data = load_snapshot(&args.input)?;
    if let Some(width) = args.width {
        data.width = width;
    }
    if let Some(height) = args.height {
        data.height = height;
    }
    let mut settings = config.restrict_layers(data.settings);
    settings.show_grid &= !args.no_grid;
    settings.show_axes &= !args.no_axes;
    settings.show_axis_labels &= !args.no_axis_labels;
    settings.show_edges &= !args.no_edges;
    settings.show_dots &= !args.no_dots;
    settings.show_safety_windows &= !args.no_safety_windows;
    settings.show_minimap &= !args.no_minimap;
    data.settings = settings;

    let output_dir = args.out.unwrap_or_else(|| config.export.output_dir.clone());
    std::fs::create_dir_all(&output_dir).map_err(CliError::from)?;

    let source = SceneSource::new(data, config.render_style()).map_err(|e| CliError::export(e.to_string()))?;
    let request = ExportRequest {
        format,
        quality,
        resolution_scale,
        output_dir,
    };

    match ExportOrchestrator::new().export(&source, &request) {
        ExportOutcome::Success { filename, path } => {
            log::info!("Wrote {}", filename);
            Ok(path)
        }
        ExportOutcome::Security(message) => Err(CliError::security(message).into()),
        ExportOutcome::Failure(message) => Err(CliError::export(message).into()),
        ExportOutcome::Copied => Err(CliError::export("Export reported a clipboard copy instead of a file").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r##"{
        "alignments": [
            {"color": "#1f77b4", "edges": [{"from": [0, 0], "to": [1, 1], "probability": 0.9}]},
            {"startDot": {"x": 1, "y": 1}, "endDot": {"x": 3, "y": 2}}
        ],
        "representative": "MVLSPADK",
        "member": "MVHLTPEEK",
        "width": 200,
        "height": 150,
        "descriptorA": "P69905",
        "descriptorB": "P68871"
    }"##;

    fn setup() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("snapshot.json");
        std::fs::write(&input, SNAPSHOT).unwrap();
        (dir, input)
    }

    fn args(input: PathBuf, out: PathBuf, format: OutputFormat) -> RenderArgs {
        RenderArgs {
            input,
            out: Some(out),
            format: Some(format),
            scale: None,
            quality: None,
            width: None,
            height: None,
            no_grid: false,
            no_axes: false,
            no_axis_labels: false,
            no_edges: false,
            no_dots: false,
            no_safety_windows: false,
            no_minimap: false,
        }
    }

    #[test]
    fn test_render_svg() {
        let (dir, input) = setup();
        let out = dir.path().join("plots");
        let mut render_args = args(input, out.clone(), OutputFormat::Svg);
        render_args.no_minimap = true;

        let path = execute(&Config::default(), render_args).unwrap();
        assert!(path.starts_with(&out));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("emerald_alignment_P69905_vs_P68871_"));
        assert!(name.ends_with(".svg"));

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("layer-edges"));
        assert!(!svg.contains(r#"class="minimap""#));
    }

    #[test]
    fn test_render_png_uses_config_format() {
        let (dir, input) = setup();
        let mut render_args = args(input, dir.path().to_path_buf(), OutputFormat::Png);
        render_args.format = None;

        let path = execute(&Config::default(), render_args).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_config_disables_layers() {
        let (dir, input) = setup();
        let mut config = Config::default();
        config.layers.grid = false;

        let path = execute(&config, args(input, dir.path().to_path_buf(), OutputFormat::Svg)).unwrap();
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(!svg.contains("layer-grid"));
        assert!(svg.contains("layer-dots"));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let (dir, input) = setup();
        let mut low_scale = args(input.clone(), dir.path().to_path_buf(), OutputFormat::Png);
        low_scale.scale = Some(0.5);
        let err = execute(&Config::default(), low_scale).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Validation { .. })));

        let mut bad_quality = args(input, dir.path().to_path_buf(), OutputFormat::Jpeg);
        bad_quality.quality = Some(1.5);
        assert!(execute(&Config::default(), bad_quality).is_err());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            &Config::default(),
            args(dir.path().join("missing.json"), dir.path().to_path_buf(), OutputFormat::Svg),
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::FileNotFound { .. })));
    }
}
