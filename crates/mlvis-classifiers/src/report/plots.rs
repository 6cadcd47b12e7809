use anyhow::{bail, Result};
use ndarray::{Array1, Array2};
use plotly::common::{ColorScale, ColorScalePalette, Font, Marker, Mode};
use plotly::layout::{Annotation, Axis, Layout};
use plotly::{HeatMap, Plot, Scatter};

use crate::decomposition::PcaProjection;

const CLASS_COLORS: [&str; 3] = ["red", "green", "blue"];

/// Annotated heat map of a confusion matrix, titled with the accuracy score.
///
/// Rows are actual labels (label 0 at the top), columns are predicted labels.
pub fn plot_confusion_heatmap(cm: &Array2<usize>, labels: &[String], score: f64) -> Result<Plot> {
    let (nrows, ncols) = cm.dim();
    if nrows != ncols || nrows != labels.len() {
        bail!(
            "confusion matrix is {}x{} but there are {} labels",
            nrows,
            ncols,
            labels.len()
        );
    }

    // Plotly draws the first z row at the bottom; flip so label 0 is on top.
    let y_labels: Vec<String> = labels.iter().rev().cloned().collect();
    let z: Vec<Vec<usize>> = (0..nrows).rev().map(|r| cm.row(r).to_vec()).collect();
    let max_count = cm.iter().copied().max().unwrap_or(0);

    let heatmap = HeatMap::new(labels.to_vec(), y_labels, z)
        // plotly's Blues runs dark to light, so large counts land on pale cells
        .color_scale(ColorScale::Palette(ColorScalePalette::Blues))
        .name("confusion matrix");

    let mut annotations = Vec::with_capacity(nrows * ncols);
    for actual in 0..nrows {
        for predicted in 0..ncols {
            let count = cm[(actual, predicted)];
            let color = if count * 2 > max_count { "black" } else { "white" };
            annotations.push(
                Annotation::new()
                    .x(labels[predicted].clone())
                    .y(labels[actual].clone())
                    .text(count.to_string().as_str())
                    .show_arrow(false)
                    .font(Font::new().color(color)),
            );
        }
    }

    let layout = Layout::new()
        .title(format!("Accuracy Score: {}", score).as_str())
        .width(900)
        .height(900)
        .x_axis(Axis::new().title("Predicted label"))
        .y_axis(Axis::new().title("Actual label"))
        .annotations(annotations);

    let mut plot = Plot::new();
    plot.add_trace(heatmap);
    plot.set_layout(layout);
    Ok(plot)
}

/// Scatter plot of the first two principal components, one trace per class.
pub fn plot_pca_scatter(
    projection: &PcaProjection,
    targets: &Array1<usize>,
    target_names: &[String],
    title: &str,
) -> Result<Plot> {
    if projection.n_components() < 2 {
        bail!(
            "a 2D scatter needs at least two components, got {}",
            projection.n_components()
        );
    }
    if projection.components.nrows() != targets.len() {
        bail!(
            "projection has {} rows but there are {} targets",
            projection.components.nrows(),
            targets.len()
        );
    }

    let mut plot = Plot::new();
    for (class, name) in target_names.iter().enumerate() {
        let (xs, ys): (Vec<f64>, Vec<f64>) = targets
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == class)
            .map(|(i, _)| (projection.components[(i, 0)], projection.components[(i, 1)]))
            .unzip();

        let color = CLASS_COLORS[class % CLASS_COLORS.len()];
        plot.add_trace(
            Scatter::new(xs, ys)
                .mode(Mode::Markers)
                .name(name.as_str())
                .marker(Marker::new().color(color).size(10)),
        );
    }

    plot.set_layout(
        Layout::new()
            .title(title)
            .width(800)
            .height(800)
            .x_axis(Axis::new().title("Principal Component 1").show_grid(true))
            .y_axis(Axis::new().title("Principal Component 2").show_grid(true)),
    );

    Ok(plot)
}
