//! The drawing session: one surface, its snapshot history, the tool state,
//! and the collaborators everything else is delegated to. Hosts feed it
//! pointer events and tool changes; it decides when snapshots are captured,
//! when the store is written, and what publishing requires.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::color::Color;
use crate::gallery::{GalleryBackend, GalleryError, IdentityProvider};
use crate::history::HistoryLog;
use crate::input::{Point, PointerScope};
use crate::snapshot::Snapshot;
use crate::store::{SavedSession, SessionStore, SESSION_KEY};
use crate::surface::StrokeSurface;
use crate::tools::{ToolMode, ToolState};

/// Everything a session talks to besides its own state.
pub struct SessionDeps {
    pub store: Arc<dyn SessionStore>,
    pub gallery: Arc<dyn GalleryBackend>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Local checks that fail a publish before any collaborator is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Sign in to publish your drawing.")]
    IdentityRequired,
    #[error("Give your drawing a title first.")]
    TitleRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    /// The detail is for logs; the displayed message stays generic.
    #[error("The drawing could not be prepared for upload. Please try again.")]
    Encode(String),
}

pub struct DrawingSession {
    surface: StrokeSurface,
    tools: ToolState,
    history: HistoryLog,
    store: Arc<dyn SessionStore>,
    gallery: Arc<dyn GalleryBackend>,
    identity: Arc<dyn IdentityProvider>,
    store_key: String,
}

impl DrawingSession {
    /// A blank session. Call [`DrawingSession::hydrate`] next to adopt a
    /// previously saved state and seed the history baseline.
    pub fn new(width: u32, height: u32, deps: SessionDeps) -> Self {
        Self {
            surface: StrokeSurface::new(width, height),
            tools: ToolState::new(),
            history: HistoryLog::new(),
            store: deps.store,
            gallery: deps.gallery,
            identity: deps.identity,
            store_key: SESSION_KEY.to_string(),
        }
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn pointer_scope(&self) -> PointerScope {
        self.surface.pointer_scope()
    }

    /// Adopt the saved session if the store has a usable one, otherwise
    /// start blank. Either way the history ends up seeded, so undo always
    /// has a floor to stand on. Unreadable records are logged and treated
    /// as absent, never surfaced.
    pub fn hydrate(&mut self) -> Result<()> {
        if let Some(saved) = self.load_saved() {
            if !saved.history.is_empty() {
                let log = HistoryLog::from_snapshots(saved.history);
                let latest = log.latest().cloned();
                if let Some(snapshot) = latest {
                    match self.surface.restore(&snapshot) {
                        Ok(()) => {
                            self.history = log;
                            self.tools.set_color(saved.brush_color);
                            self.tools.set_size(saved.brush_size);
                            debug!(entries = self.history.len(), "saved session adopted");
                            return Ok(());
                        }
                        Err(err) => {
                            warn!("saved snapshot is unusable, starting fresh: {err:#}");
                        }
                    }
                }
            }
        }
        self.start_fresh()
    }

    fn load_saved(&self) -> Option<SavedSession> {
        let raw = self.store.load(&self.store_key)?;
        match SavedSession::from_json(&raw) {
            Ok(saved) => Some(saved),
            Err(err) => {
                warn!("saved session is unreadable, treating as absent: {err:#}");
                None
            }
        }
    }

    fn start_fresh(&mut self) -> Result<()> {
        self.surface.clear();
        self.history = HistoryLog::new();
        self.capture()
    }

    /// Snapshot the surface into history and write the record out.
    fn capture(&mut self) -> Result<()> {
        let snapshot = self
            .surface
            .export_encoded()
            .context("capturing the surface failed")?;
        self.history.capture(snapshot);
        self.persist();
        Ok(())
    }

    /// Write the current record. Failures are logged and swallowed; drawing
    /// keeps working without persistence.
    fn persist(&mut self) {
        let record = SavedSession {
            history: self.history.snapshots().cloned().collect(),
            brush_color: self.tools.brush_color(),
            brush_size: self.tools.brush_size(),
        };
        let json = match record.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!("session record could not be serialized: {err:#}");
                return;
            }
        };
        if let Err(err) = self.store.save(&self.store_key, &json) {
            warn!("saving the session failed, drawing continues unsaved: {err:#}");
        }
    }

    /// Pointer pressed at a bitmap-space point. With the eyedropper active
    /// this picks a color instead of starting a stroke; the picked color is
    /// persisted like any other color change.
    pub fn pointer_down(&mut self, point: Point) {
        let before = self.tools.brush_color();
        self.surface.begin_stroke(point, &mut self.tools);
        if self.tools.brush_color() != before {
            self.persist();
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.surface.extend_stroke(point, &self.tools);
    }

    /// Pointer released. Completing a stroke captures a history entry;
    /// a release without an active stroke changes nothing.
    pub fn pointer_up(&mut self) -> Result<()> {
        if self.surface.end_stroke() {
            self.capture()?;
        }
        Ok(())
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.tools.set_color(color);
        self.persist();
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.tools.set_size(size);
        self.persist();
    }

    /// Tool switches are session-local; the record keeps color and size only.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.tools.set_mode(mode);
    }

    /// Wipe the surface and record the blank state as a history entry, so
    /// clearing is undoable like any stroke.
    pub fn clear(&mut self) -> Result<()> {
        self.surface.clear();
        self.capture()
    }

    /// Step back one history entry and repaint. At the floor, or while a
    /// stroke is still active, this is a no-op. The entry is only dropped
    /// once the repaint has succeeded, so a failed undo loses nothing.
    pub fn undo(&mut self) -> Result<()> {
        if self.surface.is_drawing() {
            debug!("undo ignored while a stroke is active");
            return Ok(());
        }
        let Some(target) = self.history.undo_target().cloned() else {
            debug!("undo ignored at the history floor");
            return Ok(());
        };
        self.surface
            .restore(&target)
            .context("repainting the previous state failed")?;
        self.history.drop_newest();
        self.persist();
        Ok(())
    }

    /// Stretch the surface to a new size. Not recorded in history; undoing
    /// past a resize repaints stretched pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    /// Publish the current drawing and return its gallery id. Identity and
    /// title are checked here, before the backend sees anything.
    pub fn publish(&self, title: &str) -> Result<String, PublishError> {
        let Some(user) = self.identity.current_user() else {
            return Err(ValidationError::IdentityRequired.into());
        };
        if title.trim().is_empty() {
            return Err(ValidationError::TitleRequired.into());
        }
        let snapshot = self.surface.export_encoded().map_err(|err| {
            warn!("export for publish failed: {err:#}");
            PublishError::Encode(err.to_string())
        })?;
        let id = self.gallery.upload(&snapshot, &user, title)?;
        info!(%id, user = %user.id, "drawing published");
        Ok(id)
    }

    pub fn export_encoded(&self) -> Result<Snapshot> {
        self.surface.export_encoded()
    }

    /// Write the current drawing as a timestamped PNG under `dir` and return
    /// the full path.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export directory {}", dir.display()))?;
        let filename = format!("sketch_{}.png", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(filename);
        self.surface.bitmap().save_png(&path)?;
        info!(path = %path.display(), "drawing exported");
        Ok(path)
    }
}
