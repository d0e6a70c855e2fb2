//! Configuration loading for the preen bot
//!
//! Provides utilities for loading configuration files from the shared
//! preen config directory (~/.config/preen/).
//!
//! Call [`init`] at application startup to bootstrap the config directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Initialize the preen config directory.
///
/// Creates ~/.config/preen/ if it doesn't exist.
/// Call this once at application startup.
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// Get the preen config directory (~/.config/preen/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("preen"))
}

/// Get the path to a config file within the preen config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Load and parse a YAML config file from the preen config directory
pub fn load_yaml<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_yaml_file(&path)
}

/// Load and parse a YAML file from an arbitrary path
pub fn load_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Check if a config file exists in the preen config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the preen config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Save a value as YAML to a config file in the preen config directory
pub fn save_yaml<T: serde::Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    let path = dir.join(filename);
    let content = serde_yaml::to_string(value)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("preen"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("config.yaml");
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.ends_with("preen/config.yaml"));
    }

    #[test]
    fn test_load_yaml_file_missing() {
        let result: Result<serde_yaml::Value> =
            load_yaml_file(Path::new("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
