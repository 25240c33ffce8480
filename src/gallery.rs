//! Narrow interfaces to the two collaborators the drawing core talks to:
//! whoever knows the signed-in user, and whatever stores published drawings.
//!
//! Backend failures arrive as [`GalleryError`] so the `Display` text is
//! always fit to show; transport details stay in the logs.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::snapshot::Snapshot;

/// How long a gallery fetch may run before it is reported as timed out.
pub const GALLERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Title stored when the caller supplies nothing usable.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }
}

/// Who is signed in right now, if anyone.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
}

/// One published drawing as the gallery lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a delete whose metadata removal succeeded. `blob_warning`
/// carries the message for a stored image that could not be cleaned up;
/// that leftover is never retried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub blob_warning: Option<String>,
}

/// Gallery failures, each with display text safe to put in front of the
/// user. The `Other` detail string is for logs only; its `Display` stays
/// generic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("You don't have permission to do that. Sign in and try again.")]
    Unauthorized,
    #[error("The request was cancelled before it finished.")]
    Cancelled,
    #[error("The gallery is out of storage space. Delete some drawings and try again.")]
    QuotaExceeded,
    #[error("The gallery took too long to respond. Please try again.")]
    TimedOut,
    #[error("Something went wrong while talking to the gallery. Please try again later.")]
    Other(String),
}

/// Storage for published drawings. Calls are synchronous; list calls are
/// raced against a deadline by [`fetch_recent`] and [`fetch_for_user`].
pub trait GalleryBackend: Send + Sync {
    /// Store a drawing and return its new id. Implementations store the
    /// title as [`normalize_title`] shapes it.
    fn upload(
        &self,
        image: &Snapshot,
        user: &UserIdentity,
        title: &str,
    ) -> Result<String, GalleryError>;

    /// Newest first, at most `limit` items.
    fn list_recent(&self, limit: usize) -> Result<Vec<GalleryItem>, GalleryError>;

    /// Everything `user` has published, newest first.
    fn list_for_user(&self, user: &UserIdentity) -> Result<Vec<GalleryItem>, GalleryError>;

    /// Remove a drawing. Metadata removal decides success; a stored image
    /// that would not go away is reported in the [`DeleteReport`] instead.
    fn delete(&self, id: &str) -> Result<DeleteReport, GalleryError>;
}

/// Trim a user-supplied title, falling back to [`UNTITLED`] when nothing
/// remains.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// The shared gallery listing, raced against `timeout`.
pub fn fetch_recent(
    backend: &Arc<dyn GalleryBackend>,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<GalleryItem>, GalleryError> {
    race_against_deadline(backend, timeout, move |backend| backend.list_recent(limit))
}

/// One user's drawings, raced against `timeout`.
pub fn fetch_for_user(
    backend: &Arc<dyn GalleryBackend>,
    user: &UserIdentity,
    timeout: Duration,
) -> Result<Vec<GalleryItem>, GalleryError> {
    let user = user.clone();
    race_against_deadline(backend, timeout, move |backend| backend.list_for_user(&user))
}

/// Run a backend call on a worker thread and wait at most `timeout` for its
/// reply. A call that outlives the deadline keeps running on its thread but
/// its eventual result is dropped; the caller gets [`GalleryError::TimedOut`]
/// so slow backends fail distinguishably from broken ones.
fn race_against_deadline<T, F>(
    backend: &Arc<dyn GalleryBackend>,
    timeout: Duration,
    call: F,
) -> Result<T, GalleryError>
where
    T: Send + 'static,
    F: FnOnce(&dyn GalleryBackend) -> Result<T, GalleryError> + Send + 'static,
{
    let backend = Arc::clone(backend);
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(call(backend.as_ref()));
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "gallery call timed out");
            Err(GalleryError::TimedOut)
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!("gallery worker dropped its reply channel");
            Err(GalleryError::Other("gallery worker vanished".into()))
        }
    }
}
