use anyhow::{bail, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::datasets::Dataset;

/// Train and test partitions of a dataset.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
}

/// Row indices for a seeded shuffle split: `(train, test)`.
///
/// The test set takes `ceil(test_size * n)` rows from the front of the
/// shuffled order; the remaining rows form the training set.
pub fn split_indices(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        bail!("test_size must be in (0, 1), got {}", test_size);
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        bail!(
            "test_size {} on {} samples leaves an empty train or test set",
            test_size,
            n
        );
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Shuffle the rows of `dataset` with a fixed seed and split off a test set.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    let (train_idx, test_idx) = split_indices(dataset.nsamples(), test_size, seed)?;
    let (x_train, y_train) = dataset.select(&train_idx);
    let (x_test, y_test) = dataset.select(&test_idx);
    log::debug!(
        "Split {} samples into {} train / {} test (seed {})",
        dataset.nsamples(),
        train_idx.len(),
        test_idx.len(),
        seed
    );
    Ok(TrainTestSplit {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_sized_split_matches_quarter_holdout() {
        let (train, test) = split_indices(1797, 0.25, 0).unwrap();
        assert_eq!(test.len(), 450);
        assert_eq!(train.len(), 1347);
    }

    #[test]
    fn split_is_a_partition() {
        let (train, test) = split_indices(40, 0.3, 7).unwrap();
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        assert_eq!(
            split_indices(100, 0.25, 42).unwrap(),
            split_indices(100, 0.25, 42).unwrap()
        );
        assert_ne!(
            split_indices(100, 0.25, 42).unwrap(),
            split_indices(100, 0.25, 43).unwrap()
        );
    }

    #[test]
    fn invalid_test_size_errors() {
        assert!(split_indices(10, 0.0, 0).is_err());
        assert!(split_indices(10, 1.0, 0).is_err());
        assert!(split_indices(1, 0.5, 0).is_err());
    }
}
