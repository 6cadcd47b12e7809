use anyhow::{anyhow, bail, Context, Result};
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;

/// Multinomial logistic regression backed by `linfa-logistic`.
pub struct LogisticRegressionClassifier {
    model: Option<MultiFittedLogisticRegression<f64, usize>>,
    params: ModelConfig,
}

impl LogisticRegressionClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticRegressionClassifier {
            model: None,
            params,
        }
    }

    fn fitted(&self) -> Result<&MultiFittedLogisticRegression<f64, usize>> {
        self.model
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been fitted yet", self.name()))
    }
}

impl ClassifierModel for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        if x.nrows() != y.len() {
            bail!(
                "feature matrix has {} rows but there are {} labels",
                x.nrows(),
                y.len()
            );
        }

        let ModelType::LogisticRegression {
            alpha,
            max_iterations,
            gradient_tolerance,
            fit_intercept,
        } = self.params.model_type;

        log::debug!(
            "Fitting logistic regression on {} samples x {} features (alpha={}, max_iterations={})",
            x.nrows(),
            x.ncols(),
            alpha,
            max_iterations
        );

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = MultiLogisticRegression::default()
            .alpha(alpha)
            .max_iterations(max_iterations)
            .gradient_tolerance(gradient_tolerance)
            .with_intercept(fit_intercept)
            .fit(&dataset)
            .context("Logistic regression fit failed")?;

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(self.fitted()?.predict(x))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        Ok(self.fitted()?.predict_probabilities(x))
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn three_blobs() -> (Array2<f64>, Array1<usize>) {
        let x = array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [5.0, 5.0],
            [5.2, 4.9],
            [4.8, 5.1],
            [0.0, 5.0],
            [0.3, 5.2],
            [-0.1, 4.8],
        ];
        let y = array![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (x, y)
    }

    #[test]
    fn separates_three_blobs() {
        let (x, y) = three_blobs();
        let mut model = LogisticRegressionClassifier::new(ModelConfig::default());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!((model.score(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = three_blobs();
        let mut model = LogisticRegressionClassifier::new(ModelConfig::default());
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (9, 3));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn predict_before_fit_errors() {
        let model = LogisticRegressionClassifier::new(ModelConfig::default());
        assert!(model.predict(&array![[0.0, 1.0]]).is_err());
    }
}
