use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use ndarray::{Array1, Array2};

use super::source::{DataSource, FetchOptions};
use super::Dataset;
use crate::error::DatasetError;

pub const IRIS_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/iris/iris.data";

pub const IRIS_FEATURES: [&str; 4] = ["sepal length", "sepal width", "petal length", "petal width"];

pub const IRIS_TARGETS: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// Load the Iris dataset from a file or URL.
pub fn load_iris(source: &DataSource, options: &FetchOptions) -> Result<Dataset> {
    let text = source.read_to_string(options)?;
    parse_iris(&text).with_context(|| format!("Failed to parse Iris data from {}", source))
}

/// Parse headerless Iris CSV: four measurements followed by the species name.
pub fn parse_iris(text: &str) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let ncols = IRIS_FEATURES.len();
    let mut values = Vec::new();
    let mut targets = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        let line = record_line(&record);
        if record.len() != ncols + 1 {
            return Err(DatasetError::FieldCount {
                line,
                expected: ncols + 1,
                found: record.len(),
            }
            .into());
        }

        for (column, field) in record.iter().take(ncols).enumerate() {
            let value: f64 = field.trim().parse().map_err(|_| DatasetError::InvalidValue {
                line,
                column,
                value: field.to_string(),
            })?;
            values.push(value);
        }

        let label = record[ncols].trim();
        let target = species_index(label).ok_or_else(|| DatasetError::UnknownLabel {
            line,
            label: label.to_string(),
        })?;
        targets.push(target);
    }

    if targets.is_empty() {
        return Err(DatasetError::Empty.into());
    }

    let records = Array2::from_shape_vec((targets.len(), ncols), values)?;
    Dataset::new(
        records,
        Array1::from_vec(targets),
        IRIS_FEATURES.iter().map(|s| s.to_string()).collect(),
        IRIS_TARGETS.iter().map(|s| s.to_string()).collect(),
    )
}

/// Map a species label to its class index. Accepts both "Iris-setosa" and "setosa".
fn species_index(label: &str) -> Option<usize> {
    let normalized = label.trim_matches('"').to_lowercase();
    let normalized = normalized.trim_start_matches("iris-");
    IRIS_TARGETS
        .iter()
        .position(|t| t.to_lowercase().trim_start_matches("iris-") == normalized)
}

pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

pub(crate) fn record_line(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "5.1,3.5,1.4,0.2,Iris-setosa\n\
                          7.0,3.2,4.7,1.4,Iris-versicolor\n\
                          6.3,3.3,6.0,2.5,Iris-virginica\n\
                          \n\
                          \n";

    #[test]
    fn parses_sample_and_skips_blank_lines() {
        let ds = parse_iris(SAMPLE).unwrap();
        assert_eq!(ds.nsamples(), 3);
        assert_eq!(ds.nfeatures(), 4);
        assert_eq!(ds.targets.to_vec(), vec![0, 1, 2]);
        assert!((ds.records[(1, 2)] - 4.7).abs() < 1e-12);
    }

    #[test]
    fn unknown_species_is_rejected() {
        let err = parse_iris("5.1,3.5,1.4,0.2,Iris-unknown\n").unwrap_err();
        let parse_err = err.downcast_ref::<DatasetError>().unwrap();
        assert!(matches!(parse_err, DatasetError::UnknownLabel { line: 1, .. }));
    }

    #[test]
    fn short_row_is_rejected() {
        let err = parse_iris("5.1,3.5,Iris-setosa\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::FieldCount { expected: 5, found: 3, .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(parse_iris("\n\n").is_err());
    }

    #[test]
    fn bare_species_names_are_accepted() {
        assert_eq!(species_index("versicolor"), Some(1));
        assert_eq!(species_index("\"Iris-virginica\""), Some(2));
    }
}
