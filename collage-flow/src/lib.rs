//! # Collage Flow
//!
//! The asynchronous authoring layer of the collage composer. `collage-core`
//! owns the pure state; this crate owns everything that touches the outside
//! world:
//!
//! - collaborator trait seams for the device services (picker, crop/rotate,
//!   capture, media library, share sheet, file deletion, notifications),
//! - the [`AuthoringFlow`] driver: per-slot image operations, the delete
//!   undo timer, and the save/share export pipeline with its busy guard,
//! - the persisted [`GalleryStore`] and [`ProfileStore`] (whole-object JSON
//!   blobs in a data directory),
//! - the simulated generation [`Wizard`] (timers and placeholder output,
//!   no real inference).
//!
//! All failure handling follows one policy: externally-triggered failures
//! (permissions, capture, share targets) become user notifications and never
//! propagate into the state machine; best-effort cleanup failures are logged
//! and surfaced as transient notices without blocking state updates.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod authoring;
pub mod error;
pub mod gallery;
pub mod media;
pub mod notify;
pub mod profile;
pub mod wizard;

pub use authoring::{AuthoringFlow, Collaborators, ExportGeometry};
pub use error::{FlowError, FlowResult};
pub use gallery::{GalleryStore, ImageItem, ImageKind};
pub use media::{
    CaptureFormat, CaptureRequest, CaptureTarget, FileStore, ImageEditor, ImagePicker,
    MediaLibrary, PickOutcome, SaveOutcome, ShareOutcome, ShareTarget,
};
pub use notify::{MemorySink, Notice, NoticeKind, NotifySink, NullSink};
pub use profile::{Membership, Profile, ProfileStore, DAILY_POINTS};
pub use wizard::{
    GenerationRequest, GenerationResult, Wizard, PLACEHOLDER_OUTPUT_URI, SIMULATED_GENERATION_MS,
};

/// Collage flow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
