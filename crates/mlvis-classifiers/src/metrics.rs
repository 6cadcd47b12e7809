//! Metrics for evaluating classifier predictions.
use anyhow::{bail, Result};
use ndarray::{Array1, Array2};

/// Fraction of predictions equal to the actual labels.
pub fn accuracy(predicted: &Array1<usize>, actual: &Array1<usize>) -> Result<f64> {
    check_lengths(predicted, actual)?;
    let correct = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    Ok(correct as f64 / actual.len() as f64)
}

/// Confusion matrix with actual labels on rows and predicted labels on columns.
pub fn confusion_matrix(
    predicted: &Array1<usize>,
    actual: &Array1<usize>,
    num_classes: usize,
) -> Result<Array2<usize>> {
    check_lengths(predicted, actual)?;
    let mut cm = Array2::<usize>::zeros((num_classes, num_classes));
    for (&p, &a) in predicted.iter().zip(actual.iter()) {
        if p >= num_classes || a >= num_classes {
            bail!(
                "label {} is out of range for {} classes",
                p.max(a),
                num_classes
            );
        }
        cm[(a, p)] += 1;
    }
    Ok(cm)
}

fn check_lengths(predicted: &Array1<usize>, actual: &Array1<usize>) -> Result<()> {
    if predicted.len() != actual.len() {
        bail!(
            "predictions ({}) and labels ({}) must have equal length",
            predicted.len(),
            actual.len()
        );
    }
    if actual.is_empty() {
        bail!("cannot evaluate an empty set of predictions");
    }
    Ok(())
}
