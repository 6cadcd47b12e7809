use anyhow::{Context, Result};
use maud::html;
use ndarray::Array2;
use plotly::Plot;

use mlvis_classifiers::datasets::{load_digits, DataSource};
use mlvis_classifiers::metrics::confusion_matrix;
use mlvis_classifiers::models::factory::build_model;
use mlvis_classifiers::report::plots::plot_confusion_heatmap;
use mlvis_classifiers::report::{json_block, Report, ReportSection};
use mlvis_classifiers::split::train_test_split;

use super::input::DigitsConfig;

/// Outcome of one digits run.
pub struct DigitsResult {
    pub score: f64,
    pub confusion: Array2<usize>,
    pub n_train: usize,
    pub n_test: usize,
    pub plot: Plot,
}

/// Load the digits, fit the classifier on the training split and score it on
/// the held-out split.
pub fn run_digits(config: &DigitsConfig) -> Result<DigitsResult> {
    let source = DataSource::parse(&config.data);
    log::info!("Loading digits from {}", source);
    let dataset = load_digits(&source, &config.fetch)?;

    log::info!("Image Data Shape {:?}", dataset.records.dim());
    log::info!("Label Data Shape ({},)", dataset.targets.len());

    let split = train_test_split(&dataset, config.test_size, config.seed)?;
    log::info!(
        "Split into {} training and {} test samples (seed {})",
        split.x_train.nrows(),
        split.x_test.nrows(),
        config.seed
    );

    let mut model = build_model(config.model.clone());
    log::info!("Fitting {} model", model.name());
    model
        .fit(&split.x_train, &split.y_train)
        .context("Failed to fit the digits classifier")?;

    let predictions = model.predict(&split.x_test)?;
    let score = model.score(&split.x_test, &split.y_test)?;
    log::info!("Accuracy on the test split: {:.4}", score);

    let confusion = confusion_matrix(&predictions, &split.y_test, dataset.nclasses())?;
    log::debug!("Confusion matrix (rows = actual, columns = predicted):\n{}", confusion);
    let plot = plot_confusion_heatmap(&confusion, &dataset.target_names, score)?;

    Ok(DigitsResult {
        score,
        confusion,
        n_train: split.x_train.nrows(),
        n_test: split.x_test.nrows(),
        plot,
    })
}

pub fn write_digits_report(config: &DigitsConfig, result: DigitsResult) -> Result<()> {
    let mut report = Report::new(
        "mlvis",
        env!("CARGO_PKG_VERSION"),
        "Logistic regression on handwritten digits",
    );

    let mut summary = ReportSection::new("Confusion matrix");
    summary.add_content(html! {
        p {
            "Accuracy on " (result.n_test) " held-out digits: " strong { (format!("{:.4}", result.score)) }
            " (trained on " (result.n_train) ")."
        }
    });
    summary.add_plot(result.plot);
    report.add_section(summary);

    let mut settings = ReportSection::new("Configuration");
    settings.add_content(json_block(config)?);
    report.add_section(settings);

    report.save_to_file(&config.output_file)
}
