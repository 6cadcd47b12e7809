//! Placement of the input image and filter images on the display grid.

/// What a single grid cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Input,
    Filter(usize),
    Empty,
}

/// Grid `(rows, cols)` for a layer with `n_filters` filters.
///
/// The grid is sized by thresholds rather than exactly, so large layers only
/// show their first filters.
pub fn grid_shape(n_filters: usize) -> (usize, usize) {
    if n_filters >= 35 {
        (6, 6)
    } else if n_filters >= 23 {
        (4, 6)
    } else if n_filters >= 11 {
        (2, 6)
    } else {
        (1, 2)
    }
}

/// Row-major cell assignment: the input goes first, then filters 0, 1, ...
pub fn panel_at(row: usize, col: usize, cols: usize, n_filters: usize) -> Panel {
    let slot = row * cols + col;
    if slot == 0 {
        Panel::Input
    } else if slot - 1 < n_filters {
        Panel::Filter(slot - 1)
    } else {
        Panel::Empty
    }
}

/// Every panel of the grid in row-major order.
pub fn panels(n_filters: usize) -> Vec<Panel> {
    let (rows, cols) = grid_shape(n_filters);
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| panel_at(r, c, cols, n_filters)))
        .collect()
}

/// Number of filters that actually get a cell.
pub fn displayed_filters(n_filters: usize) -> usize {
    let (rows, cols) = grid_shape(n_filters);
    n_filters.min(rows * cols - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(grid_shape(64), (6, 6));
        assert_eq!(grid_shape(35), (6, 6));
        assert_eq!(grid_shape(34), (4, 6));
        assert_eq!(grid_shape(32), (4, 6));
        assert_eq!(grid_shape(23), (4, 6));
        assert_eq!(grid_shape(11), (2, 6));
        assert_eq!(grid_shape(10), (1, 2));
        assert_eq!(grid_shape(1), (1, 2));
    }

    #[test]
    fn input_first_then_filters() {
        assert_eq!(panel_at(0, 0, 6, 64), Panel::Input);
        assert_eq!(panel_at(0, 1, 6, 64), Panel::Filter(0));
        assert_eq!(panel_at(1, 0, 6, 64), Panel::Filter(5));
        assert_eq!(panel_at(5, 5, 6, 64), Panel::Filter(34));
    }

    #[test]
    fn small_layers_leave_empty_cells() {
        // 32 filters on a 4x6 grid: 23 shown, no empty cell
        assert_eq!(displayed_filters(32), 23);
        let ps = panels(12);
        assert_eq!(ps.len(), 12);
        assert_eq!(ps[11], Panel::Filter(10));
        assert_eq!(displayed_filters(12), 11);

        let ps = panels(1);
        assert_eq!(ps, vec![Panel::Input, Panel::Filter(0)]);
        assert_eq!(panels(0), vec![Panel::Input, Panel::Empty]);
    }
}
