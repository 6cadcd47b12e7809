use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    /// Multinomial logistic regression with L2 penalty.
    ///
    /// `alpha` is the penalty strength, i.e. the inverse of scikit-learn's `C`.
    LogisticRegression {
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_max_iterations")]
        max_iterations: u64,
        #[serde(default = "default_gradient_tolerance")]
        gradient_tolerance: f64,
        #[serde(default = "default_fit_intercept")]
        fit_intercept: bool,
    },
}

fn default_alpha() -> f64 {
    1.0
}

fn default_max_iterations() -> u64 {
    100
}

fn default_gradient_tolerance() -> f64 {
    1e-4
}

fn default_fit_intercept() -> bool {
    true
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::LogisticRegression {
            alpha: default_alpha(),
            max_iterations: default_max_iterations(),
            gradient_tolerance: default_gradient_tolerance(),
            fit_intercept: default_fit_intercept(),
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::LogisticRegression { .. } => "logistic_regression",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" | "logreg" | "logistic_regression" => Ok(ModelType::default()),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: logistic, logreg, logistic_regression",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}
