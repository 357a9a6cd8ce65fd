//! Grid layout templates - the immutable entries of the layout catalog.

use serde::{Deserialize, Serialize};

use crate::{CollageError, CollageResult};

/// Outline shape of a layout's photo slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Plain rectangular slots (the default family).
    Rect,
    /// Circular slots clipped by an SVG arc path.
    Circle,
    /// Hexagonal slot.
    Hexagon,
    /// Pentagonal slot.
    Pentagon,
    /// Heptagonal slot.
    Heptagon,
    /// Octagonal slot.
    Octagon,
    /// Nonagonal slot.
    Nonagon,
    /// Decagonal slot.
    Decagon,
    /// Heart-shaped slot.
    Heart,
    /// Four-leaf clover slot.
    Clover,
}

impl Shape {
    /// Whether slots of this shape are plain axis-aligned rectangles.
    #[must_use]
    pub const fn is_rect(self) -> bool {
        matches!(self, Self::Rect)
    }
}

/// An SVG clip path applied to a layout's slots for non-rectangular shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    /// Path data suitable for an SVG `<path d="..."/>` element.
    pub path: String,
    /// Size of the square view box the path coordinates live in.
    #[serde(default = "default_view_box")]
    pub view_box_size: f32,
}

fn default_view_box() -> f32 {
    100.0
}

impl Mask {
    /// Create a mask from a path string in the default 100-unit view box.
    #[must_use]
    pub fn svg(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view_box_size: 100.0,
        }
    }
}

/// A named, immutable grid template from the catalog.
///
/// The `layout` matrix assigns a positive integer label to every cell;
/// contiguous same-label cells form one macro-region (one photo slot).
/// The declared `rows`/`cols` describe the template for display purposes
/// and may differ from the matrix dimensions for masked single-slot shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Unique catalog key, e.g. `grid-04`.
    pub id: String,
    /// Human-readable template name.
    pub name: String,
    /// Slot outline shape.
    pub shape: Shape,
    /// Declared row count.
    pub rows: usize,
    /// Declared column count.
    pub cols: usize,
    /// Label matrix; each row must have the same length.
    pub layout: Vec<Vec<u32>>,
    /// Optional clip path for non-rectangular shapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
}

impl GridLayout {
    /// Row count of the label matrix (may differ from the declared `rows`).
    #[must_use]
    pub fn grid_rows(&self) -> usize {
        self.layout.len()
    }

    /// Column count of the label matrix.
    #[must_use]
    pub fn grid_cols(&self) -> usize {
        self.layout.first().map_or(0, Vec::len)
    }

    /// Number of distinct labels in the matrix, i.e. the number of photo
    /// slots the template offers.
    #[must_use]
    pub fn label_count(&self) -> usize {
        let mut labels: Vec<u32> = self.layout.iter().flatten().copied().collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }

    /// Whether the template clips its slots with an SVG mask.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    /// Check that the label matrix is well formed.
    ///
    /// Every row must have the same length as the first. A ragged matrix is
    /// a data defect in the catalog, not a recoverable runtime condition.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::RaggedLayout`] naming the first offending row.
    pub fn validate(&self) -> CollageResult<()> {
        let expected = self.grid_cols();
        for (row, cells) in self.layout.iter().enumerate() {
            if cells.len() != expected {
                return Err(CollageError::RaggedLayout {
                    row,
                    len: cells.len(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> GridLayout {
        GridLayout {
            id: "grid-04".to_string(),
            name: "2x2".to_string(),
            shape: Shape::Rect,
            rows: 2,
            cols: 2,
            layout: vec![vec![1, 2], vec![3, 4]],
            mask: None,
        }
    }

    #[test]
    fn test_grid_dimensions() {
        let layout = two_by_two();
        assert_eq!(layout.grid_rows(), 2);
        assert_eq!(layout.grid_cols(), 2);
        assert_eq!(layout.label_count(), 4);
        assert!(!layout.is_masked());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(two_by_two().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let mut layout = two_by_two();
        layout.layout = vec![vec![1, 2], vec![3]];
        let err = layout.validate().expect_err("ragged matrix must fail");
        assert!(matches!(
            err,
            CollageError::RaggedLayout {
                row: 1,
                len: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_label_count_merges_duplicates() {
        let mut layout = two_by_two();
        layout.layout = vec![vec![1, 1], vec![2, 3]];
        assert_eq!(layout.label_count(), 3);
    }

    #[test]
    fn test_mask_default_view_box() {
        let mask = Mask::svg("M50 0 L100 100 L0 100 Z");
        assert!((mask.view_box_size - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_json_round_trip() {
        let layout = two_by_two();
        let json = serde_json::to_string(&layout).expect("serialize");
        let restored: GridLayout = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, layout);
    }
}
