use anyhow::{Context, Result};
use csv::ReaderBuilder;
use ndarray::{Array1, Array2};

use super::iris::{is_blank, record_line};
use super::source::{DataSource, FetchOptions};
use super::Dataset;
use crate::error::DatasetError;

/// The UCI optical-digits test set: 1797 8x8 images with intensities in 0..=16.
pub const DIGITS_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/optdigits/optdigits.tes";

pub const DIGITS_IMAGE_SIDE: usize = 8;
pub const DIGITS_NUM_FEATURES: usize = DIGITS_IMAGE_SIDE * DIGITS_IMAGE_SIDE;
pub const DIGITS_NUM_CLASSES: usize = 10;

/// Load the 8x8 digits dataset from a file or URL.
pub fn load_digits(source: &DataSource, options: &FetchOptions) -> Result<Dataset> {
    let text = source.read_to_string(options)?;
    parse_digits(&text).with_context(|| format!("Failed to parse digits data from {}", source))
}

/// Parse headerless digits CSV: 64 pixel intensities followed by the label.
pub fn parse_digits(text: &str) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut values = Vec::new();
    let mut targets = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        let line = record_line(&record);
        if record.len() != DIGITS_NUM_FEATURES + 1 {
            return Err(DatasetError::FieldCount {
                line,
                expected: DIGITS_NUM_FEATURES + 1,
                found: record.len(),
            }
            .into());
        }

        for (column, field) in record.iter().take(DIGITS_NUM_FEATURES).enumerate() {
            let value: f64 = field.trim().parse().map_err(|_| DatasetError::InvalidValue {
                line,
                column,
                value: field.to_string(),
            })?;
            values.push(value);
        }

        let label = record[DIGITS_NUM_FEATURES].trim();
        let target = label
            .parse::<usize>()
            .ok()
            .filter(|&t| t < DIGITS_NUM_CLASSES)
            .ok_or_else(|| DatasetError::UnknownLabel {
                line,
                label: label.to_string(),
            })?;
        targets.push(target);
    }

    if targets.is_empty() {
        return Err(DatasetError::Empty.into());
    }

    let records = Array2::from_shape_vec((targets.len(), DIGITS_NUM_FEATURES), values)?;
    let feature_names = (0..DIGITS_IMAGE_SIDE)
        .flat_map(|r| (0..DIGITS_IMAGE_SIDE).map(move |c| format!("pixel_{}_{}", r, c)))
        .collect();
    let target_names = (0..DIGITS_NUM_CLASSES).map(|d| d.to_string()).collect();

    Dataset::new(records, Array1::from_vec(targets), feature_names, target_names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fill: u8, label: &str) -> String {
        let mut fields: Vec<String> = (0..DIGITS_NUM_FEATURES).map(|_| fill.to_string()).collect();
        fields.push(label.to_string());
        fields.join(",")
    }

    #[test]
    fn parses_rows() {
        let text = format!("{}\n{}\n", row(0, "3"), row(16, "9"));
        let ds = parse_digits(&text).unwrap();
        assert_eq!(ds.nsamples(), 2);
        assert_eq!(ds.nfeatures(), 64);
        assert_eq!(ds.nclasses(), 10);
        assert_eq!(ds.targets.to_vec(), vec![3, 9]);
        assert_eq!(ds.records[(1, 63)], 16.0);
        assert_eq!(ds.feature_names[9], "pixel_1_1");
    }

    #[test]
    fn label_out_of_range_is_rejected() {
        let err = parse_digits(&row(1, "10")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn non_numeric_pixel_is_rejected() {
        let mut text = row(1, "2");
        text.replace_range(0..1, "x");
        let err = parse_digits(&text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::InvalidValue { column: 0, .. })
        ));
    }
}
