//! Principal component analysis.
use anyhow::{bail, Context, Result};
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_reduction::Pca;
use ndarray::Array2;

/// Samples projected onto the leading principal components.
#[derive(Debug, Clone)]
pub struct PcaProjection {
    /// `n_samples x n_components`
    pub components: Array2<f64>,
    pub explained_variance_ratio: Vec<f64>,
}

impl PcaProjection {
    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }
}

/// Fit PCA on `records` and return the projection onto `n_components` axes.
pub fn pca(records: &Array2<f64>, n_components: usize) -> Result<PcaProjection> {
    if n_components == 0 || n_components > records.ncols() {
        bail!(
            "n_components must be in 1..={}, got {}",
            records.ncols(),
            n_components
        );
    }
    if records.nrows() < 2 {
        bail!("PCA needs at least two samples, got {}", records.nrows());
    }

    let dataset = DatasetBase::from(records.to_owned());
    let model = Pca::params(n_components)
        .fit(&dataset)
        .context("PCA fit failed")?;

    let components: Array2<f64> = model.predict(records);
    let explained_variance_ratio = model.explained_variance_ratio().to_vec();

    log::debug!(
        "PCA with {} components explains {:?} of the variance",
        n_components,
        explained_variance_ratio
    );

    Ok(PcaProjection {
        components,
        explained_variance_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn projects_to_requested_dimensions() {
        let x = array![
            [2.5, 2.4, 0.5],
            [0.5, 0.7, 0.1],
            [2.2, 2.9, 0.4],
            [1.9, 2.2, 0.3],
            [3.1, 3.0, 0.6],
            [2.3, 2.7, 0.5],
            [2.0, 1.6, 0.2],
            [1.0, 1.1, 0.1],
        ];
        let proj = pca(&x, 2).unwrap();
        assert_eq!(proj.components.dim(), (8, 2));
        assert_eq!(proj.n_components(), 2);
        assert!(proj.explained_variance_ratio[0] >= proj.explained_variance_ratio[1]);
    }

    #[test]
    fn rejects_bad_component_counts() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 7.0]];
        assert!(pca(&x, 0).is_err());
        assert!(pca(&x, 3).is_err());
    }
}
