pub mod bitmap;
pub mod color;
pub mod feed;
pub mod gallery;
pub mod history;
pub mod input;
pub mod logging;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod surface;
pub mod tools;

pub use bitmap::Bitmap;
pub use color::Color;
pub use feed::{FeedEntry, GalleryFeed, PersonalGallery, Thumbnail};
pub use gallery::{
    DeleteReport, GalleryBackend, GalleryError, GalleryItem, IdentityProvider, UserIdentity,
    GALLERY_TIMEOUT,
};
pub use history::{HistoryLog, MAX_HISTORY};
pub use input::{DisplayViewport, Point, PointerScope};
pub use session::{DrawingSession, PublishError, SessionDeps, ValidationError};
pub use snapshot::Snapshot;
pub use store::{FileStore, MemoryStore, SavedSession, SessionStore, SESSION_KEY};
pub use surface::StrokeSurface;
pub use tools::{Brush, ToolMode, ToolState, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
