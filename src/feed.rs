//! View-side gallery state: the shared recent feed and one user's own
//! gallery. Both are plain data the host renders; they differ in how they
//! treat a thumbnail that no longer loads. The shared feed swaps in a
//! placeholder and keeps the entry, because the viewer cannot fix someone
//! else's drawing. The personal gallery deletes the entry, because a broken
//! thumbnail there means the stored image is gone for good.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::gallery::{
    fetch_for_user, fetch_recent, DeleteReport, GalleryBackend, GalleryError, GalleryItem,
    UserIdentity,
};

/// What a feed entry should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Image(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub item: GalleryItem,
    pub thumbnail: Thumbnail,
}

/// The shared most-recent-first gallery.
#[derive(Debug, Default)]
pub struct GalleryFeed {
    entries: Vec<FeedEntry>,
}

impl GalleryFeed {
    pub fn load(
        backend: &Arc<dyn GalleryBackend>,
        limit: usize,
        timeout: Duration,
    ) -> Result<Self, GalleryError> {
        let items = fetch_recent(backend, limit, timeout)?;
        debug!(count = items.len(), "shared gallery loaded");
        let entries = items
            .into_iter()
            .map(|item| FeedEntry {
                thumbnail: Thumbnail::Image(item.image_url.clone()),
                item,
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A broken image keeps its entry; only the display switches to a
    /// placeholder. Unknown ids are ignored.
    pub fn mark_image_failed(&mut self, id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.item.id == id) {
            entry.thumbnail = Thumbnail::Placeholder;
        }
    }
}

/// One signed-in user's drawings, with delete and broken-image healing.
#[derive(Debug)]
pub struct PersonalGallery {
    user: UserIdentity,
    entries: Vec<GalleryItem>,
    notices: Vec<String>,
}

impl PersonalGallery {
    pub fn load(
        backend: &Arc<dyn GalleryBackend>,
        user: &UserIdentity,
        timeout: Duration,
    ) -> Result<Self, GalleryError> {
        let entries = fetch_for_user(backend, user, timeout)?;
        debug!(user = %user.id, count = entries.len(), "personal gallery loaded");
        Ok(Self {
            user: user.clone(),
            entries,
            notices: Vec::new(),
        })
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn entries(&self) -> &[GalleryItem] {
        &self.entries
    }

    /// Non-fatal messages collected along the way, e.g. leftover image
    /// warnings from healing. Drained on read.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// User-requested delete. The entry goes away locally once the backend
    /// confirms; a leftover stored image is reported, not retried.
    pub fn delete(
        &mut self,
        backend: &Arc<dyn GalleryBackend>,
        id: &str,
    ) -> Result<DeleteReport, GalleryError> {
        let report = backend.delete(id)?;
        self.entries.retain(|item| item.id != id);
        Ok(report)
    }

    /// Called when one of this user's thumbnails fails to load. The stored
    /// image is gone, so the entry is deleted outright. One attempt per
    /// report; a failed attempt is logged and the entry stays.
    pub fn handle_broken_image(&mut self, backend: &Arc<dyn GalleryBackend>, id: &str) {
        if !self.entries.iter().any(|item| item.id == id) {
            return;
        }
        match backend.delete(id) {
            Ok(report) => {
                self.entries.retain(|item| item.id != id);
                debug!(%id, "removed drawing with a missing image");
                if let Some(warning) = report.blob_warning {
                    self.notices.push(warning);
                }
            }
            Err(err) => {
                warn!(%id, "auto-delete of a broken drawing failed: {err}");
            }
        }
    }
}
