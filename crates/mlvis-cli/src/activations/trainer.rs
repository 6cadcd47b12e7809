use anyhow::Result;

use mlvis_activations::mnist::load_mnist;
use mlvis_activations::model::MnistCnn;
use mlvis_activations::trainer::{train, EpochSummary};
use mlvis_activations::utils::get_device;

use super::input::TrainCnnConfig;

/// Train the MNIST network from the IDX files and save its weights where
/// `mlvis filters` expects them.
pub fn run_training(config: &TrainCnnConfig) -> Result<Vec<EpochSummary>> {
    config.validate_paths()?;
    let device = get_device(&config.device)?;

    let train_split = load_mnist(&config.mnist_dir, true)?;
    let test_split = match load_mnist(&config.mnist_dir, false) {
        Ok(split) => Some(split),
        Err(e) => {
            log::warn!("No test split available, skipping evaluation: {:#}", e);
            None
        }
    };

    let mut model = MnistCnn::new_untrained(&device)?;
    let summaries = train(&mut model, &train_split, test_split.as_ref(), &config.train)?;
    model.save(&config.output_file)?;

    if let Some(last) = summaries.last() {
        log::info!(
            "Final epoch loss {:.4}{}",
            last.avg_loss,
            last.test_accuracy
                .map(|acc| format!(", test accuracy {:.4}", acc))
                .unwrap_or_default()
        );
    }
    Ok(summaries)
}
