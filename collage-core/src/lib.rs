//! # Collage Core
//!
//! Core logic for the collage composer: named grid layouts, the geometry
//! that turns a label grid into placeable photo slots, and the state machine
//! that drives an authoring session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               collage-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Layout Catalog  │  Region Resolver         │
//! │  - Frozen grids  │  - Maximal rectangles    │
//! │  - SVG masks     │  - Memoized per layout   │
//! ├─────────────────────────────────────────────┤
//! │  Geometry Fitter │  Session Controller      │
//! │  - Cell sizing   │  - Layout pick / fill    │
//! │  - Slot frames   │  - Undo buffer / export  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything in this crate is synchronous and side-effect free. Timers,
//! collaborator calls, and persistence live in `collage-flow`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod region;
pub mod session;

pub use catalog::LayoutCatalog;
pub use error::{CollageError, CollageResult};
pub use geometry::{corner_radius, fit_geometry, CellGeometry, FitBounds, RegionFrame, GAP};
pub use layout::{GridLayout, Mask, Shape};
pub use region::{resolve_regions, Region};
pub use session::{
    BorderStyle, CollageSession, DeletedSnapshot, ExportScale, SessionState, UNDO_WINDOW_MS,
};

/// Collage core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
