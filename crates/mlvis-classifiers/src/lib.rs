//! mlvis-classifiers: classical machine-learning demos on small tabular datasets.
//!
//! This crate provides dataset loaders for the 8x8 digits and Iris datasets
//! (from a local file or a public URL), a seeded train/test split, a standard
//! scaler, a logistic-regression model wrapper backed by `linfa-logistic`,
//! PCA backed by `linfa-reduction`, evaluation metrics, and plotly/maud
//! reporting helpers used by the `mlvis` CLI.
pub mod config;
pub mod datasets;
pub mod decomposition;
pub mod error;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod split;
