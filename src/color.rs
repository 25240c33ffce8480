use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Format as `#rrggbb`. Alpha has no place in the text form; sampled
    /// pixels carry only their RGB channels into the palette.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a `#RRGGBB` string. Case-insensitive, the leading `#` is
    /// required. The result is always opaque.
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text
            .strip_prefix('#')
            .with_context(|| format!("color {text:?} is missing the leading '#'"))?;
        if digits.len() != 6 {
            bail!("color {text:?} must have exactly six hex digits");
        }
        let bytes =
            hex::decode(digits).with_context(|| format!("color {text:?} is not valid hex"))?;
        Ok(Self::rgb(bytes[0], bytes[1], bytes[2]))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

// Persisted records store the color in its `#rrggbb` text form.
impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Color::from_hex(&text).map_err(serde::de::Error::custom)
    }
}
