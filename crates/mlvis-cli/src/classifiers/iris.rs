use anyhow::Result;
use maud::html;
use plotly::Plot;

use mlvis_classifiers::datasets::{load_iris, DataSource};
use mlvis_classifiers::decomposition::pca;
use mlvis_classifiers::preprocessing::fit_transform;
use mlvis_classifiers::report::plots::plot_pca_scatter;
use mlvis_classifiers::report::{json_block, Report, ReportSection};

use super::input::IrisConfig;

pub struct IrisResult {
    pub explained_variance_ratio: Vec<f64>,
    pub plot: Plot,
}

/// Standardize the four Iris measurements and project them onto the leading
/// principal components.
pub fn run_iris(config: &IrisConfig) -> Result<IrisResult> {
    let source = DataSource::parse(&config.data);
    log::info!("Loading iris from {}", source);
    let dataset = load_iris(&source, &config.fetch)?;
    log::info!(
        "Loaded {} samples with features {:?}",
        dataset.nsamples(),
        dataset.feature_names
    );

    let scaled = fit_transform(&dataset.records)?;
    let projection = pca(&scaled, config.n_components)?;
    for (i, ratio) in projection.explained_variance_ratio.iter().enumerate() {
        log::info!("Principal component {}: {:.4} of the variance", i + 1, ratio);
    }

    let plot = plot_pca_scatter(
        &projection,
        &dataset.targets,
        &dataset.target_names,
        &format!("{} component PCA", config.n_components),
    )?;

    Ok(IrisResult {
        explained_variance_ratio: projection.explained_variance_ratio,
        plot,
    })
}

pub fn write_iris_report(config: &IrisConfig, result: IrisResult) -> Result<()> {
    let mut report = Report::new("mlvis", env!("CARGO_PKG_VERSION"), "PCA on the Iris dataset");

    let mut projection = ReportSection::new("Projection");
    projection.add_content(html! {
        table {
            tr { th { "Component" } th { "Explained variance ratio" } }
            @for (i, ratio) in result.explained_variance_ratio.iter().enumerate() {
                tr { td { (i + 1) } td { (format!("{:.4}", ratio)) } }
            }
        }
    });
    projection.add_plot(result.plot);
    report.add_section(projection);

    let mut settings = ReportSection::new("Configuration");
    settings.add_content(json_block(config)?);
    report.add_section(settings);

    report.save_to_file(&config.output_file)
}
