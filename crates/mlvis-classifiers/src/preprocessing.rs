//! Feature standardization.
//!
//! Provides a per-column mean/std `Scaler` equivalent to a standard scaler
//! with population variance. Columns with zero variance are divided by a
//! small floor instead of zero so the output stays finite.

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2, Axis};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-12;
}

/// Fit a `Scaler` from a matrix where rows are samples and columns are features.
pub fn fit_scaler(x: &Array2<f64>) -> Result<Scaler> {
    let (nrows, ncols) = x.dim();
    if nrows == 0 || ncols == 0 {
        bail!("fit_scaler requires a non-empty matrix, got {}x{}", nrows, ncols);
    }

    let mean = x
        .mean_axis(Axis(0))
        .context("failed to compute column means")?;
    let std = x.std_axis(Axis(0), 0.0).mapv(|s| s.max(Scaler::MIN_STD));

    Ok(Scaler { mean, std })
}

/// Transform all rows using the provided `Scaler` and return a new matrix.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Result<Array2<f64>> {
    if x.ncols() != sc.mean.len() {
        bail!(
            "scaler was fitted on {} features but the matrix has {}",
            sc.mean.len(),
            x.ncols()
        );
    }
    Ok((x - &sc.mean) / &sc.std)
}

/// Fit a scaler and return the transformed matrix in one call.
pub fn fit_transform(x: &Array2<f64>) -> Result<Array2<f64>> {
    let sc = fit_scaler(x)?;
    transform_all(x, &sc)
}
