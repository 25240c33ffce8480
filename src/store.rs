use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::snapshot::Snapshot;
use crate::tools::DEFAULT_BRUSH_SIZE;

/// Store key under which the drawing session keeps its record.
pub const SESSION_KEY: &str = "sketchpad_session";

/// Key/value persistence for session records. Implementations are free to
/// back this with anything that survives a restart.
pub trait SessionStore: Send + Sync {
    /// Absent and unreadable records both come back as `None`; the session
    /// treats either as "start fresh".
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// The persisted shape of a session: the snapshot history plus the brush
/// settings worth restoring. The active tool mode is deliberately absent;
/// a session always reopens in draw mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    #[serde(default)]
    pub history: Vec<Snapshot>,
    #[serde(default)]
    pub brush_color: Color,
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,
}

fn default_brush_size() -> u32 {
    DEFAULT_BRUSH_SIZE
}

impl SavedSession {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serializing session record failed")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("session record is not valid JSON")
    }
}

/// One JSON file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => None,
            Ok(content) => Some(content),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                debug!(path = %path.display(), "session record unreadable: {err}");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create store directory {}", self.dir.display()))?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .with_context(|| format!("failed to write session record {}", path.display()))
    }
}

/// In-memory store. Used by tests and by hosts that bring their own
/// persistence and only hydrate through [`SessionStore::load`] once.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        let records = self.records.lock().ok()?;
        records.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let Some(mut records) = self.records.lock().ok() else {
            return Ok(());
        };
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrips_a_record() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        assert!(store.load(SESSION_KEY).is_none());

        store.save(SESSION_KEY, "{\"history\":[]}").expect("save");
        assert_eq!(store.load(SESSION_KEY).as_deref(), Some("{\"history\":[]}"));
    }

    #[test]
    fn file_store_creates_its_directory_on_save() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested/stores"));
        store.save(SESSION_KEY, "x").expect("save");
        assert_eq!(store.load(SESSION_KEY).as_deref(), Some("x"));
    }

    #[test]
    fn empty_files_read_as_absent() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        std::fs::write(dir.path().join(format!("{SESSION_KEY}.json")), "  \n")
            .expect("write empty");
        assert!(store.load(SESSION_KEY).is_none());
    }

    #[test]
    fn memory_store_roundtrips() {
        let store = MemoryStore::new();
        assert!(store.load("k").is_none());
        store.save("k", "v").expect("save");
        assert_eq!(store.load("k").as_deref(), Some("v"));
    }

    #[test]
    fn missing_record_fields_fall_back_to_defaults() {
        let record = SavedSession::from_json("{}").expect("parse");
        assert!(record.history.is_empty());
        assert_eq!(record.brush_color, Color::BLACK);
        assert_eq!(record.brush_size, DEFAULT_BRUSH_SIZE);
    }

    #[test]
    fn record_json_roundtrips() {
        let record = SavedSession {
            history: vec![Snapshot::from_encoded("abc")],
            brush_color: Color::rgb(255, 0, 0),
            brush_size: 12,
        };
        let json = record.to_json().expect("to_json");
        assert_eq!(SavedSession::from_json(&json).expect("from_json"), record);
    }

    #[test]
    fn unparseable_records_are_rejected() {
        assert!(SavedSession::from_json("{not json").is_err());
        assert!(SavedSession::from_json("\"a bare string\"").is_err());
    }

    #[test]
    fn array_records_parse_positionally_to_defaults() {
        // Serde fills struct fields from a JSON sequence; an empty one
        // leaves every field at its default, same as `{}`.
        let record = SavedSession::from_json("[]").expect("parse");
        assert!(record.history.is_empty());
        assert_eq!(record.brush_color, Color::BLACK);
        assert_eq!(record.brush_size, DEFAULT_BRUSH_SIZE);
    }
}
