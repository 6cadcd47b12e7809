use anyhow::{bail, Context, Result};
use candle_core::{Tensor, Var};
use serde::{Deserialize, Serialize};

use crate::deprocess::deprocess_image;
use crate::model::{layer_channels, MnistCnn};
use crate::utils::logging::Progress;

const GRAD_EPSILON: f64 = 1e-5;

/// Gradient-ascent schedule used to maximize a single filter's activation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GradientAscent {
    pub steps: usize,
    pub step_size: f64,
}

impl Default for GradientAscent {
    fn default() -> Self {
        Self {
            steps: 20,
            step_size: 5.0,
        }
    }
}

/// Deprocessed result of maximizing one filter.
#[derive(Debug, Clone)]
pub struct FilterImage {
    pub filter_index: usize,
    /// Mean activation of the filter after the last step.
    pub activation: f32,
    pub width: usize,
    pub height: usize,
    /// Row-major 8-bit grayscale pixels.
    pub pixels: Vec<u8>,
}

impl GradientAscent {
    /// Run gradient ascent on a copy of `input` so that the mean activation
    /// of `filter_index` in `layer_name` grows. Returns the raw image tensor
    /// and the final mean activation.
    ///
    /// The network runs in evaluation mode and its weights are never updated.
    pub fn maximize_filter(
        &self,
        model: &MnistCnn,
        input: &Tensor,
        layer_name: &str,
        filter_index: usize,
    ) -> Result<(Tensor, f32)> {
        let channels = layer_channels(layer_name)?;
        if filter_index >= channels {
            bail!(
                "filter index {} is out of range for layer {} with {} filters",
                filter_index,
                layer_name,
                channels
            );
        }

        let img = Var::from_tensor(input)?;
        let mut activation = 0f32;
        for step in 0..self.steps {
            let out = model.layer_output(img.as_tensor(), layer_name, false)?;
            let loss = out.narrow(1, filter_index, 1)?.mean_all()?;
            activation = loss.to_scalar::<f32>()?;

            let grads = loss.backward()?;
            let grad = grads
                .get(img.as_tensor())
                .context("no gradient flowed back to the input image")?;
            let rms = grad.sqr()?.mean_all()?.sqrt()?.affine(1.0, GRAD_EPSILON)?;
            let grad = grad.broadcast_div(&rms)?;
            img.set(&(img.as_tensor() + grad.affine(self.step_size, 0.0)?)?)?;

            log::trace!(
                "[{}] filter {} step {}: mean activation {:.6}",
                layer_name,
                filter_index,
                step,
                activation
            );
        }

        Ok((img.as_tensor().detach(), activation))
    }

    /// Maximize every filter of `layer_name` and deprocess the results.
    pub fn visualize_layer(
        &self,
        model: &MnistCnn,
        input: &Tensor,
        layer_name: &str,
    ) -> Result<Vec<FilterImage>> {
        let channels = layer_channels(layer_name)?;
        let dims = input.dims4().context("input image must be a (1, 1, h, w) tensor")?;
        let (height, width) = (dims.2, dims.3);

        log::info!(
            "Running {} gradient ascent steps for each of the {} filters of {}",
            self.steps,
            channels,
            layer_name
        );

        let mut progress = Progress::new(channels, &format!("[ascent] {}", layer_name));
        let mut images = Vec::with_capacity(channels);
        for filter_index in 0..channels {
            let (raw, activation) = self.maximize_filter(model, input, layer_name, filter_index)?;
            let values = raw.flatten_all()?.to_vec1::<f32>()?;
            let pixels = deprocess_image(&values)
                .with_context(|| format!("Failed to deprocess filter {}", filter_index))?;
            log::debug!("filter {}: mean activation {:.6}", filter_index, activation);
            images.push(FilterImage {
                filter_index,
                activation,
                width,
                height,
                pixels,
            });
            progress.inc();
        }
        progress.finish();

        Ok(images)
    }
}
