use anyhow::{bail, Result};
use candle_core::{DType, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::mnist::MnistSplit;
use crate::model::MnistCnn;
use crate::utils::logging::Progress;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainParams {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
    /// Train on at most this many samples (useful for quick runs).
    pub max_train_samples: Option<usize>,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            epochs: 3,
            batch_size: 128,
            learning_rate: 1e-3,
            seed: 42,
            max_train_samples: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub avg_loss: f32,
    pub test_accuracy: Option<f32>,
}

/// Train `model` in place with AdamW on softmax cross-entropy.
///
/// Samples are reshuffled every epoch from a generator seeded with
/// `params.seed`. When `test` is given, accuracy on it is recorded after each
/// epoch.
pub fn train(
    model: &mut MnistCnn,
    train: &MnistSplit,
    test: Option<&MnistSplit>,
    params: &TrainParams,
) -> Result<Vec<EpochSummary>> {
    if params.batch_size == 0 {
        bail!("batch_size must be positive");
    }
    if train.is_empty() {
        bail!("training split is empty");
    }

    let n = params
        .max_train_samples
        .map_or(train.len(), |m| m.min(train.len()));
    let num_batches = n.div_ceil(params.batch_size);
    let device = model.device().clone();
    let (images, labels) = train.to_tensors(&device)?;

    log::info!(
        "Training MNIST CNN on {} samples ({} batches) for {} epochs",
        n,
        num_batches,
        params.epochs
    );

    let adamw = ParamsAdamW {
        lr: params.learning_rate,
        ..Default::default()
    };
    let mut opt = AdamW::new(model.varmap().all_vars(), adamw)?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut order: Vec<u32> = (0..train.len() as u32).collect();

    let mut summaries = Vec::with_capacity(params.epochs);
    for epoch in 0..params.epochs {
        order.shuffle(&mut rng);
        let mut progress = Progress::new(num_batches, &format!("[training] Epoch {}", epoch));
        let mut total_loss = 0f32;

        for chunk in order[..n].chunks(params.batch_size) {
            let idx = Tensor::from_slice(chunk, chunk.len(), &device)?;
            let xs = images.index_select(&idx, 0)?;
            let ys = labels.index_select(&idx, 0)?;

            let logits = model.forward(&xs, true)?;
            let loss = candle_nn::loss::cross_entropy(&logits, &ys)?;
            opt.backward_step(&loss)?;

            total_loss += loss.to_scalar::<f32>()?;
            progress.inc();
        }
        progress.finish();

        let avg_loss = total_loss / num_batches as f32;
        let test_accuracy = match test {
            Some(split) => Some(evaluate(model, split, params.batch_size)?),
            None => None,
        };
        match test_accuracy {
            Some(acc) => log::info!(
                "Epoch {}: avg. batch loss {:.4}, test accuracy {:.4}",
                epoch,
                avg_loss,
                acc
            ),
            None => log::info!("Epoch {}: avg. batch loss {:.4}", epoch, avg_loss),
        }
        summaries.push(EpochSummary {
            epoch,
            avg_loss,
            test_accuracy,
        });
    }

    Ok(summaries)
}

/// Fraction of `split` classified correctly (dropout disabled).
pub fn evaluate(model: &MnistCnn, split: &MnistSplit, batch_size: usize) -> Result<f32> {
    if split.is_empty() {
        bail!("evaluation split is empty");
    }
    let batch_size = batch_size.max(1);
    let (images, labels) = split.to_tensors(model.device())?;

    let mut correct = 0f32;
    let mut start = 0;
    while start < split.len() {
        let len = batch_size.min(split.len() - start);
        let xs = images.narrow(0, start, len)?;
        let ys = labels.narrow(0, start, len)?;
        let predicted = model.forward(&xs, false)?.argmax(1)?;
        correct += predicted
            .eq(&ys)?
            .to_dtype(DType::F32)?
            .sum_all()?
            .to_scalar::<f32>()?;
        start += len;
    }
    Ok(correct / split.len() as f32)
}
