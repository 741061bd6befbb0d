//! Configuration handling for the Emerald CLI
//!
//! Supports loading configuration from emerald.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use emerald_render::geometry::{Margins, RenderStyle, VisualizationSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "emerald.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub layers: LayerConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Default output format (svg, png or jpeg)
    #[serde(default = "default_format")]
    pub format: String,

    /// Resolution multiplier for raster outputs
    #[serde(default = "default_resolution_scale")]
    pub resolution_scale: f64,

    /// JPEG quality in [0, 1]
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Safety-window brackets, shading and highlighted ticks
    #[serde(default = "default_window_color")]
    pub window_color: String,

    #[serde(default = "default_viewport_color")]
    pub viewport_color: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

/// Layers shown unless the snapshot or a flag turns them off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(default = "default_true")]
    pub grid: bool,
    #[serde(default = "default_true")]
    pub axes: bool,
    #[serde(default = "default_true")]
    pub axis_labels: bool,
    #[serde(default = "default_true")]
    pub edges: bool,
    #[serde(default = "default_true")]
    pub dots: bool,
    #[serde(default = "default_true")]
    pub safety_windows: bool,
    #[serde(default = "default_true")]
    pub minimap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

// Default value functions
fn default_format() -> String { "png".to_string() }
fn default_resolution_scale() -> f64 { 2.0 }
fn default_jpeg_quality() -> f64 { 0.92 }
fn default_background_color() -> String { "#ffffff".to_string() }
fn default_window_color() -> String { "green".to_string() }
fn default_viewport_color() -> String { "red".to_string() }
fn default_font_family() -> String { "Arial, sans-serif".to_string() }
fn default_font_size() -> f64 { 12.0 }
fn default_true() -> bool { true }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            resolution_scale: default_resolution_scale(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            window_color: default_window_color(),
            viewport_color: default_viewport_color(),
            font_family: default_font_family(),
            font_size: default_font_size(),
        }
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            grid: true,
            axes: true,
            axis_labels: true,
            edges: true,
            dots: true,
            safety_windows: true,
            minimap: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            background_color: self.style.background_color.clone(),
            window_color: self.style.window_color.clone(),
            viewport_color: self.style.viewport_color.clone(),
            font_family: self.style.font_family.clone(),
            font_size: self.style.font_size,
            margins: Margins::default(),
            ..RenderStyle::default()
        }
    }

    /// `settings` with every layer disabled here switched off.
    pub fn restrict_layers(&self, settings: VisualizationSettings) -> VisualizationSettings {
        let l = &self.layers;
        VisualizationSettings {
            show_grid: settings.show_grid && l.grid,
            show_axes: settings.show_axes && l.axes,
            show_axis_labels: settings.show_axis_labels && l.axis_labels,
            show_edges: settings.show_edges && l.edges,
            show_dots: settings.show_dots && l.dots,
            show_safety_windows: settings.show_safety_windows && l.safety_windows,
            show_minimap: settings.show_minimap && l.minimap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.format, "png");
        assert_eq!(config.render.resolution_scale, 2.0);
        assert_eq!(config.style.window_color, "green");
        assert!(config.layers.minimap);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.layers.grid = false;
        config.export.output_dir = PathBuf::from("plots");
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(config, loaded_config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let config: Config = toml::from_str("[layers]\nminimap = false\n")?;
        assert!(!config.layers.minimap);
        assert!(config.layers.grid);
        assert_eq!(config.render.jpeg_quality, 0.92);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), "[render\nformat = 1")?;

        let err = Config::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Config { .. })));
        assert!(format!("{:#}", err).contains("TOML parsing error"));
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[render]"));
        assert!(example.contains("[style]"));
        assert!(example.contains("[layers]"));
        assert!(example.contains("[export]"));
        Ok(())
    }

    #[test]
    fn test_restrict_layers() {
        let mut config = Config::default();
        config.layers.edges = false;
        let settings = config.restrict_layers(VisualizationSettings::default());
        assert!(!settings.show_edges);
        assert!(settings.show_dots);
    }
}
