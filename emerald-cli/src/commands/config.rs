use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;
use crate::error::CliError;

/// Print the active configuration, the example file, or write the example to `output`.
pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            if path.exists() {
                return Err(CliError::config(format!("Refusing to overwrite existing file: {}", path.display())).into());
            }
            Config::default().save_to_file(&path)?;
            log::info!("Wrote example configuration to {}", path.display());
        }
        None if example => print!("{}", Config::example_toml()?),
        None => print!("{}", toml::to_string_pretty(config).map_err(CliError::from)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_example() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emerald.toml");

        execute(&Config::default(), true, Some(path.clone())).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), Config::default());

        // A second write must not clobber the file.
        assert!(execute(&Config::default(), true, Some(path)).is_err());
    }
}
