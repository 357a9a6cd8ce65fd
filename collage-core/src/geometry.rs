//! Geometry fitting - sizing cells and slots to a bounded viewport.
//!
//! Pure arithmetic, no caching: the fitter must be re-run whenever the
//! viewport, layout choice, or gap constant changes.

use serde::{Deserialize, Serialize};

use crate::{Region, Shape};

/// Gap between cells in display points.
pub const GAP: f32 = 8.0;

/// Bounds and clamps for fitting a grid into a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBounds {
    /// Maximum container width.
    pub max_width: f32,
    /// Maximum container height.
    pub max_height: f32,
    /// Gap between cells.
    pub gap: f32,
    /// Smallest allowed cell size.
    pub min_cell: f32,
    /// Largest allowed cell size.
    pub max_cell: f32,
}

impl FitBounds {
    /// Bounds used by the slot-filling picker: up to 380x540 points,
    /// capped at 80% of the viewport width, cells between 50 and 140.
    #[must_use]
    pub fn picker(viewport_width: f32) -> Self {
        Self {
            max_width: (viewport_width * 0.8).min(380.0),
            max_height: 540.0,
            gap: GAP,
            min_cell: 50.0,
            max_cell: 140.0,
        }
    }

    /// Bounds used by the export preview: up to 520x600 points, capped at
    /// 90% of the viewport width, cells between 60 and 220.
    #[must_use]
    pub fn preview(viewport_width: f32) -> Self {
        Self {
            max_width: (viewport_width * 0.9).min(520.0),
            max_height: 600.0,
            gap: GAP,
            min_cell: 60.0,
            max_cell: 220.0,
        }
    }
}

/// Result of fitting a grid into bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellGeometry {
    /// Side length of one square cell.
    pub cell_size: f32,
    /// Total container width: `cols * cell + (cols - 1) * gap`.
    pub container_width: f32,
    /// Total container height: `rows * cell + (rows - 1) * gap`.
    pub container_height: f32,
}

impl CellGeometry {
    /// Container dimensions scaled by an export factor, rounded to whole
    /// pixels for the capture collaborator.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> (u32, u32) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (
                (self.container_width * factor).round() as u32,
                (self.container_height * factor).round() as u32,
            )
        }
    }
}

/// Fit a `rows` x `cols` grid of square cells into the given bounds.
///
/// The cell size is the floor of the largest size at which both dimensions
/// fit, clamped into `[min_cell, max_cell]`. Deterministic and pure; zero
/// row or column counts are treated as one.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Grid dimensions are tiny.
pub fn fit_geometry(rows: usize, cols: usize, bounds: &FitBounds) -> CellGeometry {
    let rows = rows.max(1) as f32;
    let cols = cols.max(1) as f32;

    let fit_w = (bounds.max_width - (cols - 1.0) * bounds.gap) / cols;
    let fit_h = (bounds.max_height - (rows - 1.0) * bounds.gap) / rows;
    let cell_size = fit_w
        .min(fit_h)
        .floor()
        .clamp(bounds.min_cell, bounds.max_cell);

    CellGeometry {
        cell_size,
        container_width: cols * cell_size + (cols - 1.0) * bounds.gap,
        container_height: rows * cell_size + (rows - 1.0) * bounds.gap,
    }
}

/// Pixel placement of one region inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFrame {
    /// Offset from the container's left edge.
    pub left: f32,
    /// Offset from the container's top edge.
    pub top: f32,
    /// Slot width.
    pub width: f32,
    /// Slot height.
    pub height: f32,
}

impl RegionFrame {
    /// The shorter of the frame's two sides.
    #[must_use]
    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

impl Region {
    /// Compute this region's frame for the given cell size and gap.
    ///
    /// Spanned cells absorb the gaps between them, so a 2-column span is
    /// `2 * cell + gap` wide.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Grid dimensions are tiny.
    pub fn frame(&self, cell_size: f32, gap: f32) -> RegionFrame {
        RegionFrame {
            left: self.col as f32 * (cell_size + gap),
            top: self.row as f32 * (cell_size + gap),
            width: self.col_span as f32 * cell_size + (self.col_span as f32 - 1.0) * gap,
            height: self.row_span as f32 * cell_size + (self.row_span as f32 - 1.0) * gap,
        }
    }
}

/// Corner radius for a slot: circles round to a full half of the short
/// side, everything else gets a soft 12% rounding.
#[must_use]
pub fn corner_radius(shape: Shape, frame: &RegionFrame) -> f32 {
    match shape {
        Shape::Circle => frame.short_side() / 2.0,
        _ => (frame.short_side() * 0.12).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_respects_both_bounds() {
        let bounds = FitBounds {
            max_width: 380.0,
            max_height: 540.0,
            gap: 8.0,
            min_cell: 50.0,
            max_cell: 140.0,
        };
        let geom = fit_geometry(2, 3, &bounds);

        assert!(geom.cell_size >= 50.0);
        assert!(geom.cell_size <= 140.0);
        assert!(3.0 * geom.cell_size + 2.0 * 8.0 <= 380.0);
        assert!(2.0 * geom.cell_size + 8.0 <= 540.0);
    }

    #[test]
    fn test_fit_clamps_to_max_cell() {
        // A 1x1 grid in a huge viewport clamps at max_cell.
        let geom = fit_geometry(1, 1, &FitBounds::preview(2000.0));
        assert!((geom.cell_size - 220.0).abs() < f32::EPSILON);
        assert!((geom.container_width - 220.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fit_clamps_to_min_cell() {
        // A dense grid in a narrow viewport clamps at min_cell, even if the
        // container then exceeds the nominal bound.
        let geom = fit_geometry(9, 9, &FitBounds::picker(320.0));
        assert!((geom.cell_size - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_container_formula() {
        let bounds = FitBounds {
            max_width: 1000.0,
            max_height: 1000.0,
            gap: 8.0,
            min_cell: 10.0,
            max_cell: 100.0,
        };
        let geom = fit_geometry(2, 3, &bounds);
        let expected_w = 3.0 * geom.cell_size + 2.0 * 8.0;
        let expected_h = 2.0 * geom.cell_size + 8.0;
        assert!((geom.container_width - expected_w).abs() < f32::EPSILON);
        assert!((geom.container_height - expected_h).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_dimensions_treated_as_one() {
        let geom = fit_geometry(0, 0, &FitBounds::picker(400.0));
        assert!(geom.cell_size >= 50.0);
    }

    #[test]
    fn test_region_frame_spans_absorb_gaps() {
        let region = Region {
            id: 1,
            row: 1,
            col: 1,
            row_span: 2,
            col_span: 2,
        };
        let frame = region.frame(100.0, 8.0);
        assert!((frame.left - 108.0).abs() < f32::EPSILON);
        assert!((frame.top - 108.0).abs() < f32::EPSILON);
        assert!((frame.width - 208.0).abs() < f32::EPSILON);
        assert!((frame.height - 208.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_corner_radius_circle_is_half_short_side() {
        let frame = RegionFrame {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 80.0,
        };
        assert!((corner_radius(Shape::Circle, &frame) - 40.0).abs() < f32::EPSILON);
        assert!((corner_radius(Shape::Rect, &frame) - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scaled_rounds_to_pixels() {
        let geom = CellGeometry {
            cell_size: 100.0,
            container_width: 316.0,
            container_height: 208.0,
        };
        assert_eq!(geom.scaled(2.0), (632, 416));
    }
}
