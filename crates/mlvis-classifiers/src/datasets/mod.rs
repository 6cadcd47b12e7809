//! In-memory datasets and their loaders.
//!
//! A [`Dataset`] holds a dense feature matrix (rows are samples) and one
//! integer class label per row. Loaders read CSV text from a [`DataSource`],
//! which is either a local file or a URL fetched over HTTP.
pub mod digits;
pub mod iris;
pub mod source;

pub use digits::{load_digits, parse_digits, DIGITS_URL};
pub use iris::{load_iris, parse_iris, IRIS_URL};
pub use source::{DataSource, FetchOptions};

use anyhow::{bail, Result};
use ndarray::{Array1, Array2, Axis};

use crate::error::DatasetError;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Array2<f64>,
    pub targets: Array1<usize>,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
}

impl Dataset {
    pub fn new(
        records: Array2<f64>,
        targets: Array1<usize>,
        feature_names: Vec<String>,
        target_names: Vec<String>,
    ) -> Result<Self> {
        if records.nrows() == 0 {
            return Err(DatasetError::Empty.into());
        }
        if records.nrows() != targets.len() {
            bail!(
                "records have {} rows but there are {} targets",
                records.nrows(),
                targets.len()
            );
        }
        if let Some(&bad) = targets.iter().find(|&&t| t >= target_names.len()) {
            bail!(
                "target {} is out of range for {} classes",
                bad,
                target_names.len()
            );
        }
        Ok(Self {
            records,
            targets,
            feature_names,
            target_names,
        })
    }

    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    pub fn nfeatures(&self) -> usize {
        self.records.ncols()
    }

    pub fn nclasses(&self) -> usize {
        self.target_names.len()
    }

    /// Copy the given rows into a new feature matrix and label vector.
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Array1<usize>) {
        (
            self.records.select(Axis(0), indices),
            self.targets.select(Axis(0), indices),
        )
    }
}
