//! The layout catalog - a process-wide frozen registry of grid templates.
//!
//! The catalog is built once, validated, and shared read-only by every
//! authoring session. Regions are resolved a single time per entry at build
//! and served from the memo thereafter.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::layout::{GridLayout, Mask, Shape};
use crate::region::{resolve_regions, Region};

/// The frozen set of grid templates plus their pre-resolved regions.
#[derive(Debug)]
pub struct LayoutCatalog {
    layouts: Vec<GridLayout>,
    regions: HashMap<String, Vec<Region>>,
}

static CATALOG: OnceLock<LayoutCatalog> = OnceLock::new();

impl LayoutCatalog {
    /// The process-wide catalog, built on first access.
    ///
    /// # Panics
    ///
    /// Panics if a catalog entry carries a ragged label matrix. That is a
    /// build-time data defect and is allowed to surface loudly.
    #[must_use]
    pub fn global() -> &'static Self {
        CATALOG.get_or_init(Self::build)
    }

    fn build() -> Self {
        let layouts = builtin_layouts();
        let mut regions = HashMap::with_capacity(layouts.len());
        for layout in &layouts {
            let resolved = resolve_regions(&layout.layout)
                .unwrap_or_else(|e| panic!("catalog entry {} is malformed: {e}", layout.id));
            regions.insert(layout.id.clone(), resolved);
        }
        tracing::debug!("layout catalog built with {} entries", layouts.len());
        Self { layouts, regions }
    }

    /// All templates in their stable catalog order.
    #[must_use]
    pub fn layouts(&self) -> &[GridLayout] {
        &self.layouts
    }

    /// Look up a template by id. A missing id is a caller decision, not an
    /// error.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&GridLayout> {
        self.layouts.iter().find(|l| l.id == id)
    }

    /// The pre-resolved regions for a template.
    #[must_use]
    pub fn regions(&self, id: &str) -> Option<&[Region]> {
        self.regions.get(id).map(Vec::as_slice)
    }

    /// Number of templates in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Whether the catalog is empty (never true for the built-in set).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

fn rect(id: &str, name: &str, layout: Vec<Vec<u32>>) -> GridLayout {
    let rows = layout.len();
    let cols = layout.first().map_or(0, Vec::len);
    GridLayout {
        id: id.to_string(),
        name: name.to_string(),
        shape: Shape::Rect,
        rows,
        cols,
        layout,
        mask: None,
    }
}

fn masked(
    id: &str,
    name: &str,
    shape: Shape,
    rows: usize,
    cols: usize,
    layout: Vec<Vec<u32>>,
    path: &str,
) -> GridLayout {
    GridLayout {
        id: id.to_string(),
        name: name.to_string(),
        shape,
        rows,
        cols,
        layout,
        mask: Some(Mask::svg(path)),
    }
}

const CIRCLE_PATH: &str = "M50 0 A50 50 0 1 0 50 100 A50 50 0 1 0 50 0 Z";

/// The hand-authored template set. Order is presentation order and stable.
#[allow(clippy::too_many_lines)]
fn builtin_layouts() -> Vec<GridLayout> {
    vec![
        rect("grid-02", "1x2", vec![vec![1, 2]]),
        rect("grid-03", "2x1", vec![vec![1], vec![2]]),
        rect("grid-04", "2x2", vec![vec![1, 2], vec![3, 4]]),
        rect("grid-05", "3x2", vec![vec![1, 2], vec![3, 4], vec![5, 6]]),
        rect("grid-06", "2x3", vec![vec![1, 2, 3], vec![4, 5, 6]]),
        rect("grid-07", "Big top + 2 small", vec![vec![1, 1], vec![2, 3]]),
        rect(
            "grid-08",
            "Left big + right stack",
            vec![vec![1, 2], vec![1, 3]],
        ),
        rect(
            "grid-09",
            "Top big + bottom row",
            vec![vec![1, 1, 1], vec![2, 3, 4]],
        ),
        rect(
            "grid-10",
            "Bottom big + top row",
            vec![vec![1, 2, 3], vec![4, 4, 4]],
        ),
        rect(
            "grid-11",
            "3x3",
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
        ),
        // Label 5 is intentionally non-rectangular here; the resolver emits
        // it as two disjoint regions sharing one id.
        rect(
            "grid-12",
            "Cross (center focus)",
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 5]],
        ),
        rect("grid-13", "Columns 3", vec![vec![1, 2, 3]]),
        masked(
            "grid-14",
            "Circles 3",
            Shape::Circle,
            1,
            3,
            vec![vec![1, 2, 3]],
            CIRCLE_PATH,
        ),
        masked(
            "grid-15",
            "Circle single",
            Shape::Circle,
            1,
            1,
            vec![vec![1]],
            CIRCLE_PATH,
        ),
        masked(
            "grid-22",
            "Pentagon 3",
            Shape::Pentagon,
            1,
            1,
            vec![vec![1]],
            "M50 10 L78 32 L64 74 L36 74 L22 32 Z",
        ),
        masked(
            "grid-23",
            "Heptagon 3",
            Shape::Heptagon,
            1,
            1,
            vec![vec![1]],
            "M50 10 L81.28 25.08 L88.996 58.90 L67.36 86.04 L32.64 86.04 L11.00 58.90 L18.72 25.08 Z",
        ),
        masked(
            "grid-24",
            "Octagon 3",
            Shape::Octagon,
            1,
            1,
            vec![vec![1]],
            "M30 10 L70 10 L90 30 L90 70 L70 90 L30 90 L10 70 L10 30 Z",
        ),
        masked(
            "grid-25",
            "Nonagon 3",
            Shape::Nonagon,
            1,
            1,
            vec![vec![1]],
            "M50 10 L75.71 19.36 L89.39 43.05 L84.64 70.00 L63.68 87.59 L36.32 87.59 L15.36 70.00 L10.61 43.05 L24.29 19.36 Z",
        ),
        masked(
            "grid-26",
            "Decagon 3",
            Shape::Decagon,
            1,
            1,
            vec![vec![1]],
            "M50 10 L73.51 17.64 L88.04 37.64 L88.04 62.36 L73.51 82.36 L50 90 L26.49 82.36 L11.96 62.36 L11.96 37.64 L26.49 17.64 Z",
        ),
        // Declared as 1x3 for presentation but carries a single-slot matrix.
        masked(
            "grid-18",
            "Hexagon",
            Shape::Hexagon,
            1,
            3,
            vec![vec![1]],
            "M50 5 L90 27.5 L90 72.5 L50 95 L10 72.5 L10 27.5 Z",
        ),
        rect(
            "grid-20",
            "Mosaic 3x3",
            vec![vec![1, 1, 2], vec![3, 4, 2], vec![5, 6, 6]],
        ),
        rect(
            "grid-21",
            "Asymmetric 5",
            vec![vec![1, 2, 2], vec![3, 4, 5], vec![3, 6, 5]],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;

    #[test]
    fn test_global_is_stable() {
        let a = LayoutCatalog::global();
        let b = LayoutCatalog::global();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), 22);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_find_known_and_unknown() {
        let catalog = LayoutCatalog::global();
        assert!(catalog.find("grid-04").is_some());
        assert!(catalog.find("grid-99").is_none());
    }

    #[test]
    fn test_every_entry_validates() {
        for layout in LayoutCatalog::global().layouts() {
            layout.validate().expect("built-in entry must be well formed");
        }
    }

    #[test]
    fn test_every_rect_entry_covers_its_grid() {
        let catalog = LayoutCatalog::global();
        for layout in catalog.layouts() {
            if !layout.shape.is_rect() {
                continue;
            }
            let regions = catalog.regions(&layout.id).expect("regions memoized");
            let total: usize = regions.iter().map(Region::cell_area).sum();
            assert_eq!(
                total,
                layout.grid_rows() * layout.grid_cols(),
                "{} must be fully covered",
                layout.id
            );
        }
    }

    #[test]
    fn test_memoized_regions_match_fresh_resolution() {
        let catalog = LayoutCatalog::global();
        let layout = catalog.find("grid-20").expect("exists");
        let fresh = resolve_regions(&layout.layout).expect("resolve");
        assert_eq!(catalog.regions("grid-20").expect("memoized"), &fresh[..]);
    }

    #[test]
    fn test_masked_entries_carry_paths() {
        let catalog = LayoutCatalog::global();
        for id in ["grid-14", "grid-15", "grid-18", "grid-22", "grid-26"] {
            let layout = catalog.find(id).expect("exists");
            let mask = layout.mask.as_ref().expect("masked entry");
            assert!(mask.path.starts_with('M'));
            assert!((mask.view_box_size - 100.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_hexagon_keeps_declared_dims_with_single_slot_matrix() {
        let layout = LayoutCatalog::global().find("grid-18").expect("exists");
        assert_eq!((layout.rows, layout.cols), (1, 3));
        assert_eq!((layout.grid_rows(), layout.grid_cols()), (1, 1));
        assert_eq!(layout.label_count(), 1);
    }
}
