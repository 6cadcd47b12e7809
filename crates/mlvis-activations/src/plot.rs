//! Rendering the input image and filter images as one grid.
//!
//! The grid is assembled into a single grayscale montage. That montage can
//! be shown as a plotly heat map with a caption above every cell, or written
//! out as a PNG.
use anyhow::{bail, Context, Result};
use image::GrayImage;
use plotly::common::{ColorScale, ColorScalePalette, Font};
use plotly::layout::{Annotation, Axis, Layout};
use plotly::{HeatMap, Plot};
use std::path::Path;

use crate::ascent::FilterImage;
use crate::layout::{grid_shape, panels, Panel};

const GAP: usize = 4;
const BACKGROUND: u8 = 255;
const CELL_PX: usize = 110;

/// Grayscale canvas with every grid cell pasted in.
pub struct Montage {
    pub rows: usize,
    pub cols: usize,
    pub cell: usize,
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
    /// Panel and top-left pixel of each cell, row-major.
    pub cells: Vec<(Panel, usize, usize)>,
}

impl Montage {
    pub fn build(input: &GrayImage, filters: &[FilterImage]) -> Result<Self> {
        let (w, h) = (input.width() as usize, input.height() as usize);
        if w != h {
            bail!("input image must be square, got {}x{}", w, h);
        }
        if let Some(f) = filters.iter().find(|f| f.width != w || f.height != h) {
            bail!(
                "filter {} image is {}x{} but the input is {}x{}",
                f.filter_index,
                f.width,
                f.height,
                w,
                h
            );
        }

        let cell = w;
        let (rows, cols) = grid_shape(filters.len());
        let width = cols * cell + (cols - 1) * GAP;
        let height = rows * cell + (rows - 1) * GAP;
        let mut pixels = vec![BACKGROUND; width * height];
        let mut cells = Vec::with_capacity(rows * cols);

        for (slot, panel) in panels(filters.len()).into_iter().enumerate() {
            let (r, c) = (slot / cols, slot % cols);
            let (x0, y0) = (c * (cell + GAP), r * (cell + GAP));
            let source: Option<&[u8]> = match panel {
                Panel::Input => Some(input.as_raw().as_slice()),
                Panel::Filter(i) => Some(filters[i].pixels.as_slice()),
                Panel::Empty => None,
            };
            if let Some(src) = source {
                for y in 0..cell {
                    let dst = (y0 + y) * width + x0;
                    pixels[dst..dst + cell].copy_from_slice(&src[y * cell..(y + 1) * cell]);
                }
            }
            cells.push((panel, x0, y0));
        }

        Ok(Self {
            rows,
            cols,
            cell,
            width,
            height,
            pixels,
            cells,
        })
    }

    pub fn to_gray_image(&self) -> Result<GrayImage> {
        GrayImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
            .context("montage buffer does not match its dimensions")
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        self.to_gray_image()?
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Filter montage saved to {}", path.display());
        Ok(())
    }
}

fn panel_caption(panel: Panel) -> Option<String> {
    match panel {
        Panel::Input => Some("Input image".to_string()),
        Panel::Filter(i) => Some(format!("filter {}", i)),
        Panel::Empty => None,
    }
}

/// Heat map of the montage with a caption above each cell.
pub fn plot_filter_grid(montage: &Montage, layer_name: &str) -> Result<Plot> {
    // Plotly draws z row 0 at the bottom; flip so the image reads top-down.
    let z: Vec<Vec<u8>> = montage
        .pixels
        .chunks(montage.width)
        .rev()
        .map(|row| row.to_vec())
        .collect();

    let heatmap = HeatMap::new_z(z)
        .color_scale(ColorScale::Palette(ColorScalePalette::Greys))
        .show_scale(false)
        .name(layer_name);

    let mut annotations = Vec::new();
    for &(panel, x0, y0) in &montage.cells {
        if let Some(caption) = panel_caption(panel) {
            let x = (x0 + montage.cell / 2) as f64;
            // top edge of the cell in flipped coordinates, plus a small lift
            let y = (montage.height - y0) as f64 + 1.0;
            annotations.push(
                Annotation::new()
                    .x(x)
                    .y(y)
                    .text(caption.as_str())
                    .show_arrow(false)
                    .font(Font::new().size(10)),
            );
        }
    }

    let hidden = || {
        Axis::new()
            .show_grid(false)
            .zero_line(false)
            .show_tick_labels(false)
    };
    let layout = Layout::new()
        .title(format!("Input image and {} filters", layer_name).as_str())
        .width(montage.cols * CELL_PX + 100)
        .height(montage.rows * CELL_PX + 140)
        .x_axis(hidden())
        .y_axis(hidden())
        .annotations(annotations);

    let mut plot = Plot::new();
    plot.add_trace(heatmap);
    plot.set_layout(layout);
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filters(n: usize, side: usize) -> Vec<FilterImage> {
        (0..n)
            .map(|i| FilterImage {
                filter_index: i,
                activation: 0.0,
                width: side,
                height: side,
                pixels: vec![i as u8; side * side],
            })
            .collect()
    }

    #[test]
    fn montage_places_input_then_filters() {
        let input = GrayImage::from_pixel(4, 4, Luma([200]));
        let m = Montage::build(&input, &filters(12, 4)).unwrap();
        assert_eq!((m.rows, m.cols), (2, 6));
        assert_eq!(m.width, 6 * 4 + 5 * GAP);
        assert_eq!(m.height, 2 * 4 + GAP);
        // input at the top-left corner
        assert_eq!(m.pixels[0], 200);
        // filter 0 in the second cell
        assert_eq!(m.pixels[4 + GAP], 0);
        // gap stays background
        assert_eq!(m.pixels[4], BACKGROUND);
        // slot 7 is row 1, col 1 and shows filter 6
        let (panel, x0, y0) = m.cells[7];
        assert_eq!(panel, Panel::Filter(6));
        assert_eq!(m.pixels[y0 * m.width + x0], 6);
    }

    #[test]
    fn montage_rejects_size_mismatch() {
        let input = GrayImage::new(4, 4);
        assert!(Montage::build(&input, &filters(2, 5)).is_err());
    }

    #[test]
    fn plot_carries_captions_and_title() {
        let input = GrayImage::new(4, 4);
        let m = Montage::build(&input, &filters(3, 4)).unwrap();
        let json = plot_filter_grid(&m, "conv2d_2").unwrap().to_json();
        assert!(json.contains("Input image and conv2d_2 filters"));
        assert!(json.contains("Input image"));
        assert!(json.contains("filter 0"));
    }

    #[test]
    fn png_has_montage_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/filters.png");
        let input = GrayImage::new(4, 4);
        let m = Montage::build(&input, &filters(1, 4)).unwrap();
        m.save_png(&path).unwrap();
        let back = image::open(&path).unwrap().to_luma8();
        assert_eq!(back.dimensions(), (m.width as u32, m.height as u32));
        assert_eq!(back.as_raw(), &m.pixels);
    }
}
