//! The persisted image gallery.
//!
//! A thread-safe store of the user's kept creations, persisted as a single
//! whole-object JSON blob in an optional data directory. Persistence is
//! best-effort: a failed write is logged, never surfaced as an error to the
//! mutation that triggered it.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FlowError, FlowResult};

/// File name of the persisted gallery blob.
const GALLERY_FILE: &str = "gallery.json";

/// Where a gallery item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Free-form edit.
    #[default]
    Free,
    /// Exported collage.
    Collage,
    /// Simulated generation output.
    Generated,
}

/// One kept image in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    /// Unique item id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Item provenance.
    pub kind: ImageKind,
    /// File or remote URI.
    pub uri: String,
    /// Creation time, milliseconds since epoch.
    pub created_at: u64,
    /// Whether the user starred this item.
    pub favorite: bool,
    /// Free-form tags.
    pub tags: Vec<String>,
}

impl ImageItem {
    /// Create a fresh item with a new id and the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ImageKind, uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            uri: uri.into(),
            created_at: now_ms(),
            favorite: false,
            tags: Vec::new(),
        }
    }
}

/// Thread-safe gallery storage with optional JSON persistence.
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    items: Arc<RwLock<Vec<ImageItem>>>,
    data_dir: Option<PathBuf>,
}

impl GalleryStore {
    /// Create an empty in-memory gallery (no persistence).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gallery persisted under `data_dir`, loading any existing
    /// blob. The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Io`] if the directory cannot be created, or
    /// [`FlowError::Serialization`] if an existing blob is corrupt.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> FlowResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let path = data_dir.join(GALLERY_FILE);
        let items = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Vec::new()
        };

        Ok(Self {
            items: Arc::new(RwLock::new(items)),
            data_dir: Some(data_dir),
        })
    }

    /// Append a fresh item and return it.
    #[must_use = "the returned item carries the generated id"]
    pub fn add(
        &self,
        name: impl Into<String>,
        kind: ImageKind,
        uri: impl Into<String>,
    ) -> ImageItem {
        let item = ImageItem::new(name, kind, uri);
        {
            let mut items = self
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            items.push(item.clone());
        }
        self.persist();
        item
    }

    /// All items, oldest first.
    #[must_use]
    pub fn items(&self) -> Vec<ImageItem> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the starred items.
    #[must_use]
    pub fn favorites(&self) -> Vec<ImageItem> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|i| i.favorite)
            .cloned()
            .collect()
    }

    /// Flip an item's favorite flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ImageNotFound`] for an unknown id.
    pub fn toggle_favorite(&self, id: Uuid) -> FlowResult<bool> {
        let favorite = {
            let mut items = self
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| FlowError::ImageNotFound(id.to_string()))?;
            item.favorite = !item.favorite;
            item.favorite
        };
        self.persist();
        Ok(favorite)
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ImageNotFound`] for an unknown id.
    pub fn remove(&self, id: Uuid) -> FlowResult<ImageItem> {
        let removed = {
            let mut items = self
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let index = items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| FlowError::ImageNotFound(id.to_string()))?;
            items.remove(index)
        };
        self.persist();
        Ok(removed)
    }

    /// Drop every item.
    pub fn reset(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.persist();
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the gallery is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole gallery as one JSON blob. Best-effort.
    fn persist(&self) {
        let Some(ref data_dir) = self.data_dir else {
            return;
        };
        let items = self.items();
        let json = match serde_json::to_string_pretty(&items) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("failed to serialize gallery: {e}");
                return;
            }
        };
        let path = data_dir.join(GALLERY_FILE);
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!("failed to persist gallery to {}: {e}", path.display());
        }
    }
}

/// Current Unix timestamp in milliseconds.
fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_list() {
        let store = GalleryStore::new();
        assert!(store.is_empty());

        let item = store.add("Sunset", ImageKind::Collage, "file:///sunset.png");
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0], item);
        assert!(!item.favorite);
        assert!(item.created_at > 0);
    }

    #[test]
    fn test_toggle_favorite() {
        let store = GalleryStore::new();
        let item = store.add("Pick", ImageKind::Free, "file:///a.png");

        assert!(store.toggle_favorite(item.id).expect("toggle on"));
        assert_eq!(store.favorites().len(), 1);
        assert!(!store.toggle_favorite(item.id).expect("toggle off"));
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn test_toggle_unknown_fails() {
        let store = GalleryStore::new();
        let result = store.toggle_favorite(Uuid::new_v4());
        assert!(matches!(result, Err(FlowError::ImageNotFound(_))));
    }

    #[test]
    fn test_remove() {
        let store = GalleryStore::new();
        let item = store.add("Gone", ImageKind::Generated, "https://x/y.png");

        let removed = store.remove(item.id).expect("remove");
        assert_eq!(removed.id, item.id);
        assert!(store.is_empty());
        assert!(matches!(
            store.remove(item.id),
            Err(FlowError::ImageNotFound(_))
        ));
    }

    #[test]
    fn test_reset() {
        let store = GalleryStore::new();
        let _ = store.add("a", ImageKind::Free, "file:///a.png");
        let _ = store.add("b", ImageKind::Free, "file:///b.png");
        store.reset();
        assert!(store.is_empty());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = GalleryStore::with_data_dir(dir.path()).expect("store");
        let item = store.add("Kept", ImageKind::Collage, "file:///kept.png");
        store.toggle_favorite(item.id).expect("toggle");

        let restored = GalleryStore::with_data_dir(dir.path()).expect("restored");
        assert_eq!(restored.len(), 1);
        let items = restored.items();
        assert_eq!(items[0].id, item.id);
        assert!(items[0].favorite);
    }

    #[test]
    fn test_persistence_empty_dir_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = GalleryStore::with_data_dir(dir.path()).expect("store");
        assert!(store.is_empty());
    }
}
