//! Command implementations for the Emerald CLI

pub mod config;
pub mod render;
pub mod share;
pub mod windows;

use std::path::Path;

use emerald_render::ExportData;

use crate::error::{CliError, CliResult};

/// Read a JSON export snapshot from disk.
pub fn load_snapshot(path: &Path) -> CliResult<ExportData> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let data: ExportData =
        serde_json::from_str(&content).map_err(|e| CliError::parse(path.display().to_string(), e.to_string()))?;
    if !(data.width.is_finite() && data.width > 0.0 && data.height.is_finite() && data.height > 0.0) {
        return Err(CliError::invalid_format(format!(
            "Plot size must be positive, got {}x{}",
            data.width, data.height
        )));
    }
    log::debug!(
        "Loaded snapshot {}: {} segments, {}x{} residues",
        path.display(),
        data.alignments.len(),
        data.member_len(),
        data.representative_len()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_snapshot() {
        let err = load_snapshot(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
    }

    #[test]
    fn test_zero_sized_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"width": 0}}"#).unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, CliError::InvalidFormat { .. }));
    }

    #[test]
    fn test_minimal_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"representative": "MKV", "member": "MKAV"}}"#).unwrap();
        let data = load_snapshot(file.path()).unwrap();
        assert_eq!(data.representative_len(), 3);
        assert_eq!(data.member_len(), 4);
        assert_eq!(data.width, 800.0);
    }
}
