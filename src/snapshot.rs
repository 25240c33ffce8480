use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;

/// A full-surface capture: PNG bytes in standard base64. The text form is
/// what history keeps, what the session store persists, and what uploads
/// send, so every consumer shares one encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn encode(bitmap: &Bitmap) -> Result<Self> {
        let png = bitmap.encode_png()?;
        Ok(Self(general_purpose::STANDARD.encode(png)))
    }

    /// Adopt an already-encoded payload, e.g. one carried over from another
    /// store. Nothing is validated here; [`Snapshot::decode`] reports
    /// payloads that turn out not to be images.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn decode(&self) -> Result<RgbaImage> {
        let bytes = general_purpose::STANDARD
            .decode(&self.0)
            .context("snapshot is not valid base64")?;
        let image =
            image::load_from_memory(&bytes).context("snapshot does not decode as an image")?;
        Ok(image.to_rgba8())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
