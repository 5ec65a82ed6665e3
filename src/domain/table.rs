//! Row/column layout derived from detected cells.

use crate::domain::CellBBox;
use serde::{Deserialize, Serialize};

/// Cells arranged into rows.
///
/// Rows are formed from cells sharing the same top edge, which holds for grids
/// reconstructed from full-length ruling lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Rows top-to-bottom, each sorted left-to-right.
    pub rows: Vec<Vec<CellBBox>>,
    /// Largest number of cells in any row.
    pub column_count: usize,
}

impl TableLayout {
    /// Groups `cells` into rows.
    ///
    /// A leading row much shorter than the average cell (below a fifth of the
    /// mean cell height) is dropped as a border artifact. When the cells were
    /// detected on a text-masked image, rows shorter than three quarters of the
    /// mean word height cannot hold text and are dropped as well.
    pub fn from_cells(cells: &[CellBBox], text_masked: bool, mean_word_height: f64) -> Self {
        if cells.is_empty() {
            return Self {
                rows: Vec::new(),
                column_count: 0,
            };
        }

        let mean_height = cells.iter().map(|c| c.height as u64).sum::<u64>() / cells.len() as u64;

        let mut sorted = cells.to_vec();
        sorted.sort_by_key(|c| (c.y, c.x));

        let mut rows: Vec<Vec<CellBBox>> = Vec::new();
        for cell in sorted {
            match rows.last_mut() {
                Some(row) if row[0].y == cell.y => row.push(cell),
                _ => rows.push(vec![cell]),
            }
        }

        if rows.len() > 1 && (rows[0][0].height as u64) < mean_height / 5 {
            rows.remove(0);
        }

        if text_masked {
            let min_row_height = mean_word_height - mean_word_height / 4.0;
            rows.retain(|row| row[0].height as f64 >= min_row_height);
        }

        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, column_count }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
