use anyhow::{anyhow, bail, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, Dropout, Linear, Module, VarBuilder, VarMap};
use std::path::Path;

/// Side length of the square grayscale input images.
pub const IMAGE_SIDE: usize = 28;
pub const NUM_CLASSES: usize = 10;

/// Layer names in forward order, following the Keras naming of the
/// reference MNIST network.
pub const LAYER_NAMES: [&str; 8] = [
    "conv2d_1",
    "conv2d_2",
    "max_pooling2d_1",
    "dropout_1",
    "flatten_1",
    "dense_1",
    "dropout_2",
    "dense_2",
];

const CONV1_FILTERS: usize = 32;
const CONV2_FILTERS: usize = 64;
const KERNEL_SIZE: usize = 3;
const HIDDEN_DIM: usize = 128;
// 28 -> 26 -> 24 after two valid 3x3 convolutions, then 12 after 2x2 pooling.
const FLAT_DIM: usize = CONV2_FILTERS * 12 * 12;

/// The classic two-convolution MNIST classifier.
///
/// Input is NCHW `(batch, 1, 28, 28)` with pixels in `[0, 1]`; the output of
/// `dense_2` is the raw logits over the ten digits. Weights are stored as
/// `<layer>.weight` / `<layer>.bias` with convolution kernels laid out
/// `(out, in, kh, kw)` and dense kernels `(out, in)`.
pub struct MnistCnn {
    varmap: VarMap,
    device: Device,
    conv2d_1: Conv2d,
    conv2d_2: Conv2d,
    dropout_1: Dropout,
    dense_1: Linear,
    dropout_2: Dropout,
    dense_2: Linear,
}

impl MnistCnn {
    /// Build the network with freshly initialized weights.
    pub fn new_untrained(device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);

        log::trace!("[MnistCnn] Initializing convolution layers");
        let conv2d_1 = candle_nn::conv2d(
            1,
            CONV1_FILTERS,
            KERNEL_SIZE,
            Conv2dConfig::default(),
            vb.pp("conv2d_1"),
        )?;
        let conv2d_2 = candle_nn::conv2d(
            CONV1_FILTERS,
            CONV2_FILTERS,
            KERNEL_SIZE,
            Conv2dConfig::default(),
            vb.pp("conv2d_2"),
        )?;

        log::trace!("[MnistCnn] Initializing dense layers");
        let dense_1 = candle_nn::linear(FLAT_DIM, HIDDEN_DIM, vb.pp("dense_1"))?;
        let dense_2 = candle_nn::linear(HIDDEN_DIM, NUM_CLASSES, vb.pp("dense_2"))?;

        Ok(Self {
            varmap,
            device: device.clone(),
            conv2d_1,
            conv2d_2,
            dropout_1: Dropout::new(0.25),
            dense_1,
            dropout_2: Dropout::new(0.5),
            dense_2,
        })
    }

    /// Load pretrained weights from a safetensors file.
    pub fn load<P: AsRef<Path>>(path: P, device: &Device) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("Model weights file does not exist: {}", path.display());
        }
        let mut model = Self::new_untrained(device)?;
        model
            .varmap
            .load(path)
            .with_context(|| format!("Failed to load model weights from {}", path.display()))?;
        log::info!("Loaded MNIST CNN weights from {}", path.display());
        Ok(model)
    }

    /// Save model weights to a file in safetensors format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        self.varmap
            .save(path)
            .with_context(|| format!("Failed to save model weights to {}", path.display()))?;
        log::info!("Saved MNIST CNN weights to {}", path.display());
        Ok(())
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Full forward pass returning logits of shape `(batch, 10)`.
    pub fn forward(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        self.layer_output(xs, "dense_2", train)
    }

    /// Forward pass truncated after the named layer (activation included).
    pub fn layer_output(&self, xs: &Tensor, layer_name: &str, train: bool) -> Result<Tensor> {
        let last = layer_index(layer_name)?;
        let mut out = xs.clone();
        for idx in 0..=last {
            out = self.apply_layer(idx, &out, train)?;
        }
        Ok(out)
    }

    fn apply_layer(&self, idx: usize, xs: &Tensor, train: bool) -> Result<Tensor> {
        let out = match idx {
            0 => self.conv2d_1.forward(xs)?.relu()?,
            1 => self.conv2d_2.forward(xs)?.relu()?,
            2 => xs.max_pool2d(2)?,
            3 => self.dropout_1.forward(xs, train)?,
            4 => xs.flatten_from(1)?,
            5 => self.dense_1.forward(xs)?.relu()?,
            6 => self.dropout_2.forward(xs, train)?,
            7 => self.dense_2.forward(xs)?,
            _ => bail!("layer index {} is out of range", idx),
        };
        Ok(out)
    }
}

/// Position of `layer_name` in [`LAYER_NAMES`].
pub fn layer_index(layer_name: &str) -> Result<usize> {
    LAYER_NAMES
        .iter()
        .position(|&name| name == layer_name)
        .ok_or_else(|| {
            anyhow!(
                "Unknown layer {:?}. Valid layers are: {}",
                layer_name,
                LAYER_NAMES.join(", ")
            )
        })
}

/// Number of output channels of a convolutional (4D output) layer.
pub fn layer_channels(layer_name: &str) -> Result<usize> {
    match layer_index(layer_name)? {
        0 => Ok(CONV1_FILTERS),
        1 | 2 | 3 => Ok(CONV2_FILTERS),
        _ => bail!(
            "Layer {:?} does not produce feature maps; choose one of: {}",
            layer_name,
            LAYER_NAMES[..4].join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_shapes_follow_the_architecture() {
        let device = Device::Cpu;
        let model = MnistCnn::new_untrained(&device).unwrap();
        let x = Tensor::zeros((2, 1, IMAGE_SIDE, IMAGE_SIDE), DType::F32, &device).unwrap();

        let conv1 = model.layer_output(&x, "conv2d_1", false).unwrap();
        assert_eq!(conv1.dims(), &[2, 32, 26, 26]);
        let conv2 = model.layer_output(&x, "conv2d_2", false).unwrap();
        assert_eq!(conv2.dims(), &[2, 64, 24, 24]);
        let pooled = model.layer_output(&x, "max_pooling2d_1", false).unwrap();
        assert_eq!(pooled.dims(), &[2, 64, 12, 12]);
        let flat = model.layer_output(&x, "flatten_1", false).unwrap();
        assert_eq!(flat.dims(), &[2, FLAT_DIM]);
        let logits = model.forward(&x, false).unwrap();
        assert_eq!(logits.dims(), &[2, NUM_CLASSES]);
    }

    #[test]
    fn unknown_layer_lists_valid_names() {
        let err = layer_index("conv2d_9").unwrap_err().to_string();
        assert!(err.contains("conv2d_1"));
        assert!(err.contains("dense_2"));
    }

    #[test]
    fn channels_only_for_feature_map_layers() {
        assert_eq!(layer_channels("conv2d_1").unwrap(), 32);
        assert_eq!(layer_channels("conv2d_2").unwrap(), 64);
        assert!(layer_channels("dense_1").is_err());
    }

    #[test]
    fn save_then_load_restores_weights() {
        let device = Device::Cpu;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.safetensors");

        let model = MnistCnn::new_untrained(&device).unwrap();
        model.save(&path).unwrap();
        let reloaded = MnistCnn::load(&path, &device).unwrap();

        let x = Tensor::ones((1, 1, IMAGE_SIDE, IMAGE_SIDE), DType::F32, &device).unwrap();
        let a = model.forward(&x, false).unwrap().flatten_all().unwrap().to_vec1::<f32>().unwrap();
        let b = reloaded.forward(&x, false).unwrap().flatten_all().unwrap().to_vec1::<f32>().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(MnistCnn::load("/nonexistent/weights.safetensors", &Device::Cpu).is_err());
    }
}
