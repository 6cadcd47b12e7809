use anyhow::Result;
use ndarray::{Array1, Array2};

use crate::metrics::accuracy;

/// A small trait abstraction for multi-class classifier models.
///
/// Labels are class indices `0..n_classes`; rows of `x` are samples.
pub trait ClassifierModel {
    /// Fit the model on a feature matrix and its labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict a class index per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Predict class probabilities, one column per class seen during fitting.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Mean accuracy of `predict(x)` against `y`.
    fn score(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<f64> {
        let predictions = self.predict(x)?;
        accuracy(&predictions, y)
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
