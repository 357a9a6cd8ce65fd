//! Region resolution - expanding a label grid into placeable rectangles.
//!
//! The resolver is a greedy row-major maximal-rectangle expansion: from each
//! uncovered cell it grows the column span first, then the row span, and
//! marks the resulting rectangle covered. It is **not** a general polyomino
//! partition. A label whose footprint is not a perfect rectangle (an L or T
//! shape, or two disconnected runs) is emitted as multiple disjoint regions
//! sharing one id. Catalog entries are hand-authored to avoid that case; the
//! resolver deliberately does not reject it.

use serde::{Deserialize, Serialize};

use crate::{CollageError, CollageResult};

/// A maximal rectangular cell range sharing one label - one photo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// The label value this region was merged from.
    pub id: u32,
    /// Top-left cell row.
    pub row: usize,
    /// Top-left cell column.
    pub col: usize,
    /// Number of rows covered.
    pub row_span: usize,
    /// Number of columns covered.
    pub col_span: usize,
}

impl Region {
    /// Number of cells this region covers.
    #[must_use]
    pub const fn cell_area(&self) -> usize {
        self.row_span * self.col_span
    }

    /// Whether the given cell falls inside this region.
    #[must_use]
    pub const fn contains_cell(&self, row: usize, col: usize) -> bool {
        row >= self.row
            && row < self.row + self.row_span
            && col >= self.col
            && col < self.col + self.col_span
    }
}

/// Expand a label grid into non-overlapping rectangular regions.
///
/// Cells are scanned row-major. From each uncovered cell the span grows
/// rightward while the label matches, then downward while every cell in the
/// candidate row matches. Regions from one grid are pairwise non-overlapping
/// and their union covers the full grid.
///
/// An empty grid resolves to no regions.
///
/// # Errors
///
/// Returns [`CollageError::RaggedLayout`] if the rows have unequal lengths;
/// region boundaries would be undefined on such input.
pub fn resolve_regions(layout: &[Vec<u32>]) -> CollageResult<Vec<Region>> {
    let rows = layout.len();
    let cols = layout.first().map_or(0, Vec::len);

    for (row, cells) in layout.iter().enumerate() {
        if cells.len() != cols {
            return Err(CollageError::RaggedLayout {
                row,
                len: cells.len(),
                expected: cols,
            });
        }
    }

    let mut covered = vec![vec![false; cols]; rows];
    let mut regions = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            if covered[r][c] {
                continue;
            }
            let id = layout[r][c];

            // Grow the column span rightward while the label matches.
            let mut col_span = 1;
            while c + col_span < cols && layout[r][c + col_span] == id {
                col_span += 1;
            }

            // Grow the row span downward while the full candidate row matches.
            let mut row_span = 1;
            while r + row_span < rows
                && layout[r + row_span][c..c + col_span]
                    .iter()
                    .all(|&cell| cell == id)
            {
                row_span += 1;
            }

            for row in covered.iter_mut().skip(r).take(row_span) {
                for cell in row.iter_mut().skip(c).take(col_span) {
                    *cell = true;
                }
            }

            regions.push(Region {
                id,
                row: r,
                col: c,
                row_span,
                col_span,
            });
        }
    }

    Ok(regions)
}
