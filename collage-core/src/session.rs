//! Collage session state - the per-editing-instance controller.
//!
//! A session is exclusively owned by one authoring flow. All transitions
//! happen on single-threaded event callbacks; the `busy` flag is the
//! re-entrancy guard for save/share, and the undo buffer is explicit state
//! whose expiry clock lives in the flow layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CollageError, CollageResult};

/// How long a deleted session stays restorable, in milliseconds.
pub const UNDO_WINDOW_MS: u64 = 6000;

/// Multiplier applied to the base container size on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScale {
    /// Base resolution.
    X1,
    /// Double resolution (the default).
    #[default]
    X2,
    /// Quadruple resolution.
    X4,
}

impl ExportScale {
    /// The numeric scale factor.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::X1 => 1.0,
            Self::X2 => 2.0,
            Self::X4 => 4.0,
        }
    }
}

/// Border treatment for rectangular slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// Softly rounded corners (the default).
    #[default]
    Rounded,
    /// Square corners.
    Square,
}

/// Snapshot taken when the user deletes their work, restorable until the
/// undo window expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedSnapshot {
    /// The image assignments at the time of deletion.
    pub images: HashMap<u32, String>,
    /// The selected layout at the time of deletion.
    pub selected_layout_id: Option<String>,
}

/// Derived lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No layout chosen yet.
    NoLayout,
    /// A layout is active; slots are being filled.
    Filling,
    /// At least one slot is filled; export actions are available.
    ReadyToExport,
    /// A save/share export is running.
    Exporting,
}

/// The mutable state of one collage editing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollageSession {
    selected_layout_id: Option<String>,
    images: HashMap<u32, String>,
    export_scale: ExportScale,
    border_style: BorderStyle,
    last_deleted: Option<DeletedSnapshot>,
    busy: bool,
}

impl CollageSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The derived lifecycle state. Filling begins as soon as a layout is
    /// active; `ReadyToExport` requires only a partial fill.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.busy {
            SessionState::Exporting
        } else if self.selected_layout_id.is_none() {
            SessionState::NoLayout
        } else if self.images.is_empty() {
            SessionState::Filling
        } else {
            SessionState::ReadyToExport
        }
    }

    /// The currently selected layout id, if any.
    #[must_use]
    pub fn selected_layout_id(&self) -> Option<&str> {
        self.selected_layout_id.as_deref()
    }

    /// The image URI assigned to a region, if any.
    #[must_use]
    pub fn image(&self, region_id: u32) -> Option<&str> {
        self.images.get(&region_id).map(String::as_str)
    }

    /// All current image assignments.
    #[must_use]
    pub fn images(&self) -> &HashMap<u32, String> {
        &self.images
    }

    /// Number of regions with an assigned image.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.images.len()
    }

    /// Whether at least one region is filled.
    #[must_use]
    pub fn has_any_image(&self) -> bool {
        !self.images.is_empty()
    }

    /// Whether a save/share export is running.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// The current export scale.
    #[must_use]
    pub const fn export_scale(&self) -> ExportScale {
        self.export_scale
    }

    /// The current border style.
    #[must_use]
    pub const fn border_style(&self) -> BorderStyle {
        self.border_style
    }

    /// Whether a deleted snapshot is still waiting for an undo.
    #[must_use]
    pub const fn has_pending_undo(&self) -> bool {
        self.last_deleted.is_some()
    }

    /// Select a layout. Any change of layout clears every image assignment
    /// (a fresh layout starts with empty slots, even if images were somehow
    /// assigned before a layout was chosen); re-selecting the current layout
    /// is a no-op.
    pub fn select_layout(&mut self, id: &str) {
        if self.selected_layout_id.as_deref() == Some(id) {
            return;
        }
        if self.images.is_empty() {
            tracing::debug!("layout {id} selected");
        } else {
            tracing::debug!("layout changed to {id}, clearing {} images", self.images.len());
            self.images.clear();
        }
        self.selected_layout_id = Some(id.to_string());
    }

    /// Clear the layout choice and every image assignment (the back
    /// affordance from the filling step).
    pub fn clear_layout(&mut self) {
        self.selected_layout_id = None;
        self.images.clear();
    }

    /// Assign an image to a region, returning the URI it displaced so the
    /// caller can dispose of the old file. Last write wins.
    pub fn assign_image(&mut self, region_id: u32, uri: impl Into<String>) -> Option<String> {
        self.images.insert(region_id, uri.into())
    }

    /// Remove a region's image, returning the URI for cleanup.
    pub fn remove_image(&mut self, region_id: u32) -> Option<String> {
        self.images.remove(&region_id)
    }

    /// Set the export scale.
    pub fn set_export_scale(&mut self, scale: ExportScale) {
        self.export_scale = scale;
    }

    /// Set the border style.
    pub fn set_border_style(&mut self, style: BorderStyle) {
        self.border_style = style;
    }

    /// Move the whole session into the undo buffer and clear it.
    ///
    /// Returns `false` (and changes nothing) while an export is running or
    /// when there is nothing to delete. The caller is responsible for
    /// arming the expiry clock.
    pub fn request_delete(&mut self) -> bool {
        if self.busy {
            return false;
        }
        if self.images.is_empty() && self.selected_layout_id.is_none() {
            return false;
        }
        self.last_deleted = Some(DeletedSnapshot {
            images: std::mem::take(&mut self.images),
            selected_layout_id: self.selected_layout_id.take(),
        });
        tracing::debug!("session moved to undo buffer");
        true
    }

    /// Restore the deleted snapshot, if one is still pending. Returns
    /// whether anything was restored; the caller cancels the expiry clock.
    pub fn undo_delete(&mut self) -> bool {
        let Some(snapshot) = self.last_deleted.take() else {
            return false;
        };
        self.images = snapshot.images;
        self.selected_layout_id = snapshot.selected_layout_id;
        tracing::debug!("delete undone");
        true
    }

    /// Drop the undo snapshot. Called when the expiry clock fires; firing
    /// with no pending snapshot is harmless.
    pub fn expire_undo(&mut self) {
        if self.last_deleted.take().is_some() {
            tracing::debug!("undo window expired");
        }
    }

    /// Enter the exporting state.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::ExportInProgress`] if an export is already
    /// running (callers treat this as a no-op, not a failure), and
    /// [`CollageError::NothingToExport`] when no layout is chosen or no
    /// image is assigned.
    pub fn begin_export(&mut self) -> CollageResult<()> {
        if self.busy {
            return Err(CollageError::ExportInProgress);
        }
        if self.selected_layout_id.is_none() {
            return Err(CollageError::NothingToExport("no layout chosen".into()));
        }
        if self.images.is_empty() {
            return Err(CollageError::NothingToExport("no image assigned".into()));
        }
        self.busy = true;
        Ok(())
    }

    /// Leave the exporting state. Unconditional: called on success and on
    /// every failure path.
    pub fn finish_export(&mut self) {
        self.busy = false;
    }

    /// Reset the session to empty, discarding the undo buffer. Called after
    /// a successful save/share or when the owning screen unmounts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_session() -> CollageSession {
        let mut session = CollageSession::new();
        session.select_layout("grid-04");
        session.assign_image(1, "file:///a.png");
        session
    }

    #[test]
    fn test_initial_state() {
        let session = CollageSession::new();
        assert_eq!(session.state(), SessionState::NoLayout);
        assert_eq!(session.export_scale(), ExportScale::X2);
        assert_eq!(session.border_style(), BorderStyle::Rounded);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_filling_begins_on_layout_pick() {
        let mut session = CollageSession::new();
        session.select_layout("grid-04");
        assert_eq!(session.state(), SessionState::Filling);
    }

    #[test]
    fn test_partial_fill_is_exportable() {
        let session = filled_session();
        assert_eq!(session.state(), SessionState::ReadyToExport);
    }

    #[test]
    fn test_switching_layout_resets_images() {
        let mut session = filled_session();
        session.select_layout("grid-07");
        assert_eq!(session.selected_layout_id(), Some("grid-07"));
        assert!(session.images().is_empty());
    }

    #[test]
    fn test_select_layout_discards_images_assigned_without_layout() {
        let mut session = CollageSession::new();
        assert!(session.assign_image(1, "file:///orphan.png").is_none());
        assert_eq!(session.state(), SessionState::NoLayout);

        session.select_layout("grid-04");
        assert!(session.images().is_empty());
        assert_eq!(session.state(), SessionState::Filling);
    }

    #[test]
    fn test_reselecting_same_layout_keeps_images() {
        let mut session = filled_session();
        session.select_layout("grid-04");
        assert_eq!(session.filled_count(), 1);
    }

    #[test]
    fn test_assign_returns_displaced_uri() {
        let mut session = filled_session();
        let old = session.assign_image(1, "file:///b.png");
        assert_eq!(old.as_deref(), Some("file:///a.png"));
        assert_eq!(session.image(1), Some("file:///b.png"));
    }

    #[test]
    fn test_remove_image() {
        let mut session = filled_session();
        assert_eq!(session.remove_image(1).as_deref(), Some("file:///a.png"));
        assert!(session.remove_image(1).is_none());
        assert_eq!(session.state(), SessionState::Filling);
    }

    #[test]
    fn test_undo_round_trip() {
        let mut session = filled_session();
        assert!(session.request_delete());
        assert_eq!(session.state(), SessionState::NoLayout);
        assert!(session.has_pending_undo());

        assert!(session.undo_delete());
        assert_eq!(session.selected_layout_id(), Some("grid-04"));
        assert_eq!(session.image(1), Some("file:///a.png"));
        assert!(!session.has_pending_undo());
    }

    #[test]
    fn test_undo_expiry_discards_snapshot() {
        let mut session = filled_session();
        assert!(session.request_delete());
        session.expire_undo();
        assert!(!session.has_pending_undo());
        assert!(!session.undo_delete());
        assert_eq!(session.state(), SessionState::NoLayout);
    }

    #[test]
    fn test_delete_on_empty_session_is_refused() {
        let mut session = CollageSession::new();
        assert!(!session.request_delete());
        assert!(!session.has_pending_undo());
    }

    #[test]
    fn test_delete_blocked_while_busy() {
        let mut session = filled_session();
        session.begin_export().expect("exportable");
        assert!(!session.request_delete());
        assert_eq!(session.filled_count(), 1);
    }

    #[test]
    fn test_export_reentrancy_guard() {
        let mut session = filled_session();
        session.begin_export().expect("first export starts");
        assert_eq!(session.state(), SessionState::Exporting);
        assert!(matches!(
            session.begin_export(),
            Err(CollageError::ExportInProgress)
        ));
        session.finish_export();
        assert!(!session.is_busy());
        session.begin_export().expect("second export after finish");
    }

    #[test]
    fn test_export_requires_content() {
        let mut session = CollageSession::new();
        assert!(matches!(
            session.begin_export(),
            Err(CollageError::NothingToExport(_))
        ));
        session.select_layout("grid-04");
        assert!(matches!(
            session.begin_export(),
            Err(CollageError::NothingToExport(_))
        ));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = filled_session();
        session.set_export_scale(ExportScale::X4);
        session.request_delete();
        session.reset();
        assert_eq!(session.state(), SessionState::NoLayout);
        assert!(!session.has_pending_undo());
        assert_eq!(session.export_scale(), ExportScale::X2);
    }

    #[test]
    fn test_scale_factors() {
        assert!((ExportScale::X1.factor() - 1.0).abs() < f32::EPSILON);
        assert!((ExportScale::X2.factor() - 2.0).abs() < f32::EPSILON);
        assert!((ExportScale::X4.factor() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_session_json_round_trip() {
        let session = filled_session();
        let json = serde_json::to_string(&session).expect("serialize");
        let restored: CollageSession = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.selected_layout_id(), Some("grid-04"));
        assert_eq!(restored.image(1), Some("file:///a.png"));
    }
}
