use anyhow::{Context, Result};
use maud::html;
use plotly::Plot;

use mlvis_activations::ascent::FilterImage;
use mlvis_activations::image_io::{image_tensor, load_grayscale_image};
use mlvis_activations::layout::displayed_filters;
use mlvis_activations::model::{MnistCnn, IMAGE_SIDE};
use mlvis_activations::plot::{plot_filter_grid, Montage};
use mlvis_activations::utils::get_device;
use mlvis_classifiers::report::{json_block, Report, ReportSection};

use super::input::FiltersConfig;

pub struct FiltersResult {
    pub predicted_digit: u32,
    pub filters: Vec<FilterImage>,
    pub plot: Plot,
}

/// Maximize every filter of the configured layer starting from the input
/// image and lay the results out on a grid.
pub fn run_filters(config: &FiltersConfig) -> Result<FiltersResult> {
    config.validate_paths()?;
    let device = get_device(&config.device)?;
    let model = MnistCnn::load(&config.model_path, &device)?;

    let side = IMAGE_SIDE as u32;
    let image = load_grayscale_image(&config.image_path, side, side)?;
    let input = image_tensor(&image, &device)?;

    let predicted_digit = model
        .forward(&input, false)?
        .argmax(1)?
        .to_vec1::<u32>()?
        .first()
        .copied()
        .context("model returned no prediction")?;
    log::info!("The network classifies the input image as a {}", predicted_digit);

    let filters = config.ascent.visualize_layer(&model, &input, &config.layer)?;
    log::info!(
        "Showing {} of the {} filters of {}",
        displayed_filters(filters.len()),
        filters.len(),
        config.layer
    );

    let montage = Montage::build(&image, &filters)?;
    if let Some(png_file) = &config.png_file {
        montage.save_png(png_file)?;
    }
    let plot = plot_filter_grid(&montage, &config.layer)?;

    Ok(FiltersResult {
        predicted_digit,
        filters,
        plot,
    })
}

pub fn write_filters_report(config: &FiltersConfig, result: FiltersResult) -> Result<()> {
    let mut report = Report::new(
        "mlvis",
        env!("CARGO_PKG_VERSION"),
        &format!("Filter activations of {}", config.layer),
    );

    let mut grid = ReportSection::new("Filter grid");
    grid.add_content(html! {
        p {
            "Input " code { (config.image_path) } " is classified as "
            strong { (result.predicted_digit) } "."
        }
    });
    grid.add_plot(result.plot);
    report.add_section(grid);

    let mut activations = ReportSection::new("Mean activation after gradient ascent");
    activations.add_content(html! {
        table {
            tr { th { "Filter" } th { "Mean activation" } }
            @for f in &result.filters {
                tr { td { (f.filter_index) } td { (format!("{:.4}", f.activation)) } }
            }
        }
    });
    report.add_section(activations);

    let mut settings = ReportSection::new("Configuration");
    settings.add_content(json_block(config)?);
    report.add_section(settings);

    report.save_to_file(&config.output_file)
}
