use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON config, or fall back to defaults when no path is given.
///
/// Fields missing from the file take their default values, so a config only
/// needs to name what it changes.
pub fn load_config<T: DeserializeOwned + Default>(config_path: Option<&PathBuf>) -> Result<T> {
    match config_path {
        Some(path) => {
            let config_json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&config_json)
                .with_context(|| format!("Failed to parse config file: {:?}", path))
        }
        None => {
            log::info!("No config file provided; using defaults.");
            Ok(T::default())
        }
    }
}

pub fn config_to_json<T: Serialize>(config: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

pub fn validate_file_exists(path: &str) -> Result<()> {
    if !Path::new(path).is_file() {
        anyhow::bail!("File does not exist: {}", path);
    }
    Ok(())
}

/// Reject a fraction outside the open interval `(0, 1)`.
pub fn validate_fraction(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        anyhow::bail!("{} must be in (0, 1), got {}", name, value);
    }
    Ok(())
}
