use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use mlvis_activations::ascent::GradientAscent;
use mlvis_activations::model::layer_channels;
use mlvis_activations::trainer::TrainParams;

use crate::util::{load_config, validate_file_exists};

pub const DEFAULT_MODEL_FILE: &str = "mnist_28x28_percent98.96.safetensors";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub model_path: String,
    pub image_path: String,
    pub layer: String,
    pub device: String,
    pub ascent: GradientAscent,
    pub output_file: String,
    /// Also write the filter grid as a PNG montage.
    pub png_file: Option<String>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        FiltersConfig {
            model_path: String::from(DEFAULT_MODEL_FILE),
            image_path: String::from("images/face_grayscale_small.jpg"),
            layer: String::from("conv2d_2"),
            device: String::from("cpu"),
            ascent: GradientAscent::default(),
            output_file: String::from("filters.html"),
            png_file: None,
        }
    }
}

impl FiltersConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: FiltersConfig = load_config(config_path)?;

        // Apply CLI overrides
        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }
        if let Some(image_path) = matches.get_one::<String>("image_path") {
            config.image_path = image_path.clone();
        }
        if let Some(layer) = matches.get_one::<String>("layer") {
            config.layer = layer.clone();
        }
        if let Some(device) = matches.get_one::<String>("device") {
            config.device = device.clone();
        }
        if let Some(steps) = matches.get_one::<usize>("steps") {
            config.ascent.steps = *steps;
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        if let Some(png_file) = matches.get_one::<String>("png_file") {
            config.png_file = Some(png_file.clone());
        }

        layer_channels(&config.layer)?;
        Ok(config)
    }

    /// Check that the weights and the input image are on disk.
    pub fn validate_paths(&self) -> Result<()> {
        validate_file_exists(&self.model_path)?;
        validate_file_exists(&self.image_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainCnnConfig {
    /// Directory holding the MNIST IDX files (gzipped or raw).
    pub mnist_dir: String,
    pub output_file: String,
    pub device: String,
    pub train: TrainParams,
}

impl Default for TrainCnnConfig {
    fn default() -> Self {
        TrainCnnConfig {
            mnist_dir: String::from("data"),
            output_file: String::from(DEFAULT_MODEL_FILE),
            device: String::from("cpu"),
            train: TrainParams::default(),
        }
    }
}

impl TrainCnnConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: TrainCnnConfig = load_config(config_path)?;

        if let Some(mnist_dir) = matches.get_one::<String>("mnist_dir") {
            config.mnist_dir = mnist_dir.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        if let Some(device) = matches.get_one::<String>("device") {
            config.device = device.clone();
        }
        if let Some(epochs) = matches.get_one::<usize>("epochs") {
            config.train.epochs = *epochs;
        }
        if let Some(max) = matches.get_one::<usize>("max_train_samples") {
            config.train.max_train_samples = Some(*max);
        }

        if config.train.batch_size == 0 {
            anyhow::bail!("batch_size must be positive");
        }
        Ok(config)
    }

    pub fn validate_paths(&self) -> Result<()> {
        if !PathBuf::from(&self.mnist_dir).is_dir() {
            anyhow::bail!("MNIST directory does not exist: {}", self.mnist_dir);
        }
        Ok(())
    }
}
