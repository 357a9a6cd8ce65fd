//! The authoring flow - drives one collage editing session.
//!
//! Owns the [`CollageSession`], talks to the device collaborators, arms the
//! delete undo timer, and runs the save/share export pipeline. One flow per
//! authoring screen; [`AuthoringFlow::teardown`] (or drop) cancels the
//! timer so nothing fires into a dead session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use collage_core::{
    fit_geometry, CellGeometry, CollageError, CollageSession, ExportScale, FitBounds,
    LayoutCatalog, Region, SessionState, UNDO_WINDOW_MS,
};

use crate::media::{
    CaptureFormat, CaptureRequest, CaptureTarget, FileStore, ImageEditor, ImagePicker,
    MediaLibrary, PickOutcome, SaveOutcome, ShareOutcome, ShareTarget,
};
use crate::notify::{Notice, NotifySink};
use crate::{FlowError, FlowResult};

/// The device collaborators an authoring flow talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// System image picker.
    pub picker: Arc<dyn ImagePicker>,
    /// Crop/rotate service.
    pub editor: Arc<dyn ImageEditor>,
    /// Best-effort file deletion.
    pub files: Arc<dyn FileStore>,
    /// Collage view capture.
    pub capture: Arc<dyn CaptureTarget>,
    /// Device photo library.
    pub library: Arc<dyn MediaLibrary>,
    /// System share sheet.
    pub share: Arc<dyn ShareTarget>,
    /// Toast sink.
    pub notify: Arc<dyn NotifySink>,
}

/// Geometry the host needs to place the export preview's slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportGeometry {
    /// The selected layout.
    pub layout_id: String,
    /// Fitted cell and container sizes.
    pub geometry: CellGeometry,
    /// Pre-resolved slot regions for the layout.
    pub regions: Vec<Region>,
}

/// Drives one collage editing session against the device collaborators.
pub struct AuthoringFlow {
    session: Arc<Mutex<CollageSession>>,
    collaborators: Collaborators,
    viewport_width: f32,
    /// Cleared on teardown; timer callbacks check it before touching state.
    alive: Arc<AtomicBool>,
    /// Bumped whenever the undo timer is re-armed or cancelled, so a stale
    /// timer that already passed its abort window still does nothing.
    undo_generation: Arc<AtomicU64>,
    undo_timer: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AuthoringFlow {
    /// Create a flow with an empty session.
    #[must_use]
    pub fn new(collaborators: Collaborators, viewport_width: f32) -> Self {
        Self {
            session: Arc::new(Mutex::new(CollageSession::new())),
            collaborators,
            viewport_width,
            alive: Arc::new(AtomicBool::new(true)),
            undo_generation: Arc::new(AtomicU64::new(0)),
            undo_timer: std::sync::Mutex::new(None),
        }
    }

    /// Shared handle to the underlying session.
    #[must_use]
    pub fn session(&self) -> Arc<Mutex<CollageSession>> {
        Arc::clone(&self.session)
    }

    /// The session's derived lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Select a layout from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::LayoutNotFound`] for an unknown id.
    pub async fn select_layout(&self, id: &str) -> FlowResult<()> {
        if LayoutCatalog::global().find(id).is_none() {
            return Err(CollageError::LayoutNotFound(id.to_string()).into());
        }
        self.session.lock().await.select_layout(id);
        Ok(())
    }

    /// Clear the layout choice (the back affordance from the filling step).
    pub async fn clear_layout(&self) {
        self.session.lock().await.clear_layout();
    }

    /// Set the export scale.
    pub async fn set_export_scale(&self, scale: ExportScale) {
        self.session.lock().await.set_export_scale(scale);
    }

    /// Set the border style.
    pub async fn set_border_style(&self, style: collage_core::BorderStyle) {
        self.session.lock().await.set_border_style(style);
    }

    /// Ask the user to pick an image for a slot. Cancellation is a no-op;
    /// a declined permission becomes an error notice.
    pub async fn pick_image_for(&self, region_id: u32) {
        match self.collaborators.picker.pick_image().await {
            PickOutcome::Picked(uri) => {
                self.session.lock().await.assign_image(region_id, uri);
            }
            PickOutcome::Cancelled => {}
            PickOutcome::PermissionDenied => {
                self.collaborators.notify.notify(Notice::error(
                    "Permission to access the photo library was declined",
                ));
            }
        }
    }

    /// Rotate a slot's image through the editor collaborator. The new URI
    /// replaces the old one; the old file is disposed best-effort.
    pub async fn rotate_image(&self, region_id: u32) {
        let Some(src) = self.slot_uri(region_id).await else {
            return;
        };
        if let Some(new_uri) = self.collaborators.editor.rotate_and_flip(&src).await {
            let old = self.session.lock().await.assign_image(region_id, new_uri);
            if let Some(old) = old {
                self.dispose_file(&old).await;
            }
        }
    }

    /// Crop a slot's image through the editor collaborator. `None` from the
    /// editor means the user cancelled.
    pub async fn crop_image(&self, region_id: u32) {
        let Some(src) = self.slot_uri(region_id).await else {
            return;
        };
        if let Some(new_uri) = self.collaborators.editor.crop(&src).await {
            let old = self.session.lock().await.assign_image(region_id, new_uri);
            if let Some(old) = old {
                self.dispose_file(&old).await;
            }
            self.collaborators
                .notify
                .notify(Notice::success("Image cropped"));
        }
    }

    /// Remove a slot's image. The in-memory state updates even when the
    /// file deletion fails; the failure is logged and surfaced as a notice.
    pub async fn delete_image(&self, region_id: u32) {
        let Some(uri) = self.session.lock().await.remove_image(region_id) else {
            return;
        };
        if self.collaborators.files.delete_file(&uri).await {
            self.collaborators
                .notify
                .notify(Notice::success("Image removed"));
        } else {
            tracing::warn!("failed to delete image file {uri}");
            self.collaborators
                .notify
                .notify(Notice::error("Could not remove the image file"));
        }
    }

    /// Move the whole session into the undo buffer and start the expiry
    /// clock. Refused (silently) while an export is running or when there
    /// is nothing to delete.
    pub async fn request_delete(&self) {
        if !self.session.lock().await.request_delete() {
            return;
        }
        self.collaborators
            .notify
            .notify(Notice::info("Collage moved to trash"));
        self.arm_undo_timer();
    }

    /// Restore the deleted session if the undo window is still open.
    pub async fn undo_delete(&self) {
        if self.session.lock().await.undo_delete() {
            self.cancel_undo_timer();
            self.collaborators
                .notify
                .notify(Notice::success("Delete undone"));
        }
    }

    /// Capture the collage at the session's export scale and save it to the
    /// photo library. A second call while an export is running is a no-op.
    /// Every failure becomes a notification; the image map is never touched.
    /// A completion that lands after [`AuthoringFlow::teardown`] touches no
    /// state and stays silent.
    pub async fn save(&self) {
        if !self.try_begin_export("save").await {
            return;
        }
        let notice = self.run_save().await;
        if !self.alive.load(Ordering::SeqCst) {
            tracing::debug!("save completed after teardown, dropping result");
            return;
        }
        self.session.lock().await.finish_export();
        self.collaborators.notify.notify(notice);
    }

    /// Capture the collage and hand it to the share sheet. Same guard,
    /// failure, and teardown policy as [`AuthoringFlow::save`]; success is
    /// silent.
    pub async fn share(&self) {
        if !self.try_begin_export("share").await {
            return;
        }
        let notice = self.run_share().await;
        if !self.alive.load(Ordering::SeqCst) {
            tracing::debug!("share completed after teardown, dropping result");
            return;
        }
        self.session.lock().await.finish_export();
        if let Some(notice) = notice {
            self.collaborators.notify.notify(notice);
        }
    }

    /// Geometry and regions for the export preview of the selected layout.
    pub async fn preview_geometry(&self) -> Option<ExportGeometry> {
        let layout_id = self
            .session
            .lock()
            .await
            .selected_layout_id()
            .map(str::to_string)?;
        let catalog = LayoutCatalog::global();
        let layout = catalog.find(&layout_id)?;
        let regions = catalog.regions(&layout_id)?.to_vec();
        let geometry = fit_geometry(
            layout.grid_rows(),
            layout.grid_cols(),
            &FitBounds::preview(self.viewport_width),
        );
        Some(ExportGeometry {
            layout_id,
            geometry,
            regions,
        })
    }

    /// Cancel the undo timer and mark the flow dead. In-flight exports are
    /// not forcibly cancelled, but their completions no longer notify.
    pub fn teardown(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.cancel_undo_timer();
    }

    async fn slot_uri(&self, region_id: u32) -> Option<String> {
        self.session
            .lock()
            .await
            .image(region_id)
            .map(str::to_string)
    }

    async fn dispose_file(&self, uri: &str) {
        if !self.collaborators.files.delete_file(uri).await {
            tracing::warn!("best-effort deletion of {uri} failed");
            self.collaborators
                .notify
                .notify(Notice::info("Old image file could not be removed"));
        }
    }

    /// Enter the exporting state, converting refusals per policy: an export
    /// already in flight is a silent no-op, an empty session is a notice.
    async fn try_begin_export(&self, action: &str) -> bool {
        match self.session.lock().await.begin_export() {
            Ok(()) => true,
            Err(CollageError::ExportInProgress) => {
                tracing::debug!("{action} ignored: export already in progress");
                false
            }
            Err(e) => {
                self.collaborators.notify.notify(Notice::error(e.to_string()));
                false
            }
        }
    }

    async fn run_save(&self) -> Notice {
        match self.capture_current(None).await {
            Ok(uri) => match self.collaborators.library.save_to_library(&uri).await {
                SaveOutcome::Saved(asset_id) => {
                    tracing::info!("collage saved to library as {asset_id}");
                    Notice::success("Saved to your photo library")
                }
                SaveOutcome::PermissionDenied => {
                    Notice::error("Permission to access the photo library was declined")
                }
                SaveOutcome::Failed(message) => Notice::error(message),
            },
            Err(e) => {
                tracing::warn!("save capture failed: {e}");
                Notice::error(e.to_string())
            }
        }
    }

    async fn run_share(&self) -> Option<Notice> {
        match self.capture_current(Some(ExportScale::X2)).await {
            Ok(uri) => match self.collaborators.share.share(&uri).await {
                ShareOutcome::Shared => {
                    tracing::info!("collage handed to share sheet");
                    None
                }
                ShareOutcome::Unavailable => {
                    Some(Notice::error("Sharing is not available on this device"))
                }
                ShareOutcome::Failed(message) => Some(Notice::error(message)),
            },
            Err(e) => {
                tracing::warn!("share capture failed: {e}");
                Some(Notice::error(e.to_string()))
            }
        }
    }

    /// Capture the current collage at the session's export scale, or at a
    /// fixed override (sharing always captures at 2x).
    async fn capture_current(&self, scale_override: Option<ExportScale>) -> FlowResult<String> {
        let (layout_id, scale) = {
            let session = self.session.lock().await;
            (
                session.selected_layout_id().map(str::to_string),
                scale_override.unwrap_or_else(|| session.export_scale()),
            )
        };
        let layout_id = layout_id
            .ok_or_else(|| CollageError::NothingToExport("no layout chosen".into()))?;
        let layout = LayoutCatalog::global()
            .find(&layout_id)
            .ok_or_else(|| FlowError::from(CollageError::LayoutNotFound(layout_id.clone())))?;
        let geometry = fit_geometry(
            layout.grid_rows(),
            layout.grid_cols(),
            &FitBounds::preview(self.viewport_width),
        );
        let (width, height) = geometry.scaled(scale.factor());
        self.collaborators
            .capture
            .capture(CaptureRequest {
                width,
                height,
                format: CaptureFormat::Png,
            })
            .await
    }

    fn arm_undo_timer(&self) {
        let generation = self.undo_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Arc::clone(&self.session);
        let alive = Arc::clone(&self.alive);
        let generations = Arc::clone(&self.undo_generation);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(UNDO_WINDOW_MS)).await;
            // A stale or torn-down timer must never touch the session.
            if !alive.load(Ordering::SeqCst) || generations.load(Ordering::SeqCst) != generation {
                return;
            }
            session.lock().await.expire_undo();
        });
        let mut slot = self
            .undo_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_undo_timer(&self) {
        self.undo_generation.fetch_add(1, Ordering::SeqCst);
        let mut slot = self
            .undo_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

impl Drop for AuthoringFlow {
    fn drop(&mut self) {
        self.teardown();
    }
}
