use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use mlvis_classifiers::config::{ModelConfig, ModelType};
use mlvis_classifiers::datasets::{FetchOptions, DIGITS_URL, IRIS_URL};

use crate::util::{load_config, validate_fraction};

/// Settings for the digits logistic-regression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitsConfig {
    /// URL or local path of the optdigits CSV.
    pub data: String,
    pub test_size: f64,
    pub seed: u64,
    pub model: ModelConfig,
    pub fetch: FetchOptions,
    pub output_file: String,
}

impl Default for DigitsConfig {
    fn default() -> Self {
        DigitsConfig {
            data: DIGITS_URL.to_string(),
            test_size: 0.25,
            seed: 0,
            model: ModelConfig::default(),
            fetch: FetchOptions::default(),
            output_file: String::from("digits_confusion_matrix.html"),
        }
    }
}

impl DigitsConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: DigitsConfig = load_config(config_path)?;

        // Apply CLI overrides
        if let Some(data) = matches.get_one::<String>("data") {
            config.data = data.clone();
        }
        if let Some(test_size) = matches.get_one::<f64>("test_size") {
            config.test_size = *test_size;
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.seed = *seed;
        }
        if let Some(model_type) = matches.get_one::<String>("model_type") {
            let requested = ModelType::from_str(model_type).map_err(anyhow::Error::msg)?;
            // Same family as the config file: keep its hyper-parameters.
            if requested.name() != config.model.model_type.name() {
                config.model.model_type = requested;
            }
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        apply_cache_dir(&mut config.fetch, matches);

        validate_fraction("test_size", config.test_size)?;
        Ok(config)
    }
}

/// Settings for the Iris PCA run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IrisConfig {
    /// URL or local path of `iris.data`.
    pub data: String,
    pub n_components: usize,
    pub fetch: FetchOptions,
    pub output_file: String,
}

impl Default for IrisConfig {
    fn default() -> Self {
        IrisConfig {
            data: IRIS_URL.to_string(),
            n_components: 2,
            fetch: FetchOptions::default(),
            output_file: String::from("iris_pca.html"),
        }
    }
}

impl IrisConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: IrisConfig = load_config(config_path)?;

        if let Some(data) = matches.get_one::<String>("data") {
            config.data = data.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        apply_cache_dir(&mut config.fetch, matches);

        if config.n_components < 2 {
            anyhow::bail!(
                "n_components must be at least 2 for the scatter plot, got {}",
                config.n_components
            );
        }
        Ok(config)
    }
}

fn apply_cache_dir(fetch: &mut FetchOptions, matches: &ArgMatches) {
    if let Some(dir) = matches.get_one::<PathBuf>("cache_dir") {
        fetch.cache_dir = Some(dir.clone());
    }
}
