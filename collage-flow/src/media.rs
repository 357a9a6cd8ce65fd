//! Collaborator interfaces for the device media services.
//!
//! These traits are the boundary between the authoring flow and the
//! platform: image picking, crop/rotate, view capture, the photo library,
//! the share sheet, and best-effort file deletion. The flow only ever talks
//! to these seams, so hosts plug in their platform bindings and tests plug
//! in stubs.

use async_trait::async_trait;

use crate::FlowResult;

/// Outcome of asking the user to pick an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The user picked an image.
    Picked(String),
    /// The user dismissed the picker. Not an error.
    Cancelled,
    /// The user declined media library access.
    PermissionDenied,
}

/// Outcome of saving a file to the photo library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file was saved; carries the created asset's identifier.
    Saved(String),
    /// The user declined media library access. A first-class outcome, not
    /// an exception.
    PermissionDenied,
    /// The library rejected the file.
    Failed(String),
}

/// Outcome of handing a file to the share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The share sheet was presented.
    Shared,
    /// No share target is available on this device. A first-class outcome.
    Unavailable,
    /// The share action failed.
    Failed(String),
}

/// Output format for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureFormat {
    /// Lossless PNG (the default).
    #[default]
    Png,
    /// JPEG.
    Jpeg,
}

/// A request to render the collage preview into a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Output width in pixels (already scaled).
    pub width: u32,
    /// Output height in pixels (already scaled).
    pub height: u32,
    /// Output format.
    pub format: CaptureFormat,
}

/// Presents the system image picker.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Ask the user to pick one image from their library.
    async fn pick_image(&self) -> PickOutcome;
}

/// Crop and rotate service. Either operation may delete its source file as
/// a side effect; `None` means the user cancelled.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Interactive crop. Returns the new file's URI, or `None` on cancel.
    async fn crop(&self, uri: &str) -> Option<String>;

    /// Rotate 90 degrees and flip. Returns the new file's URI, or `None`.
    async fn rotate_and_flip(&self, uri: &str) -> Option<String>;
}

/// Best-effort file deletion.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Delete a file, returning whether it was removed.
    async fn delete_file(&self, uri: &str) -> bool;
}

/// Renders the collage view into an image file.
#[async_trait]
pub trait CaptureTarget: Send + Sync {
    /// Capture the collage at the requested pixel size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FlowError::Capture`] when rendering fails; the flow
    /// surfaces the message as a notification.
    async fn capture(&self, request: CaptureRequest) -> FlowResult<String>;
}

/// The device photo library.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Save a file into the photo library. Requires a granted permission;
    /// denial is reported as [`SaveOutcome::PermissionDenied`].
    async fn save_to_library(&self, uri: &str) -> SaveOutcome;
}

/// The system share sheet.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Offer a file to the share sheet.
    async fn share(&self, uri: &str) -> ShareOutcome;
}
