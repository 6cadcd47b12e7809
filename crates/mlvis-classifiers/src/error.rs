use std::error::Error;
use std::fmt;

/// Custom error type for dataset parsing failures
#[derive(Debug, PartialEq)]
pub enum DatasetError {
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    InvalidValue {
        line: usize,
        column: usize,
        value: String,
    },
    UnknownLabel {
        line: usize,
        label: String,
    },
    Empty,
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatasetError::FieldCount {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {}: expected {} fields but found {}",
                line, expected, found
            ),
            DatasetError::InvalidValue {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}, column {}: cannot parse {:?} as a number",
                line, column, value
            ),
            DatasetError::UnknownLabel { line, label } => {
                write!(f, "line {}: unknown class label {:?}", line, label)
            }
            DatasetError::Empty => write!(f, "dataset contains no samples"),
        }
    }
}

impl Error for DatasetError {}
