use serde::{Deserialize, Serialize};

use crate::color::Color;

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 300;
pub const DEFAULT_BRUSH_SIZE: u32 = 2;

/// The active tool. One mode at a time; selecting a tool replaces the
/// previous one, so erase and eyedropper can never both be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    Draw,
    Erase,
    Eyedropper,
}

impl Default for ToolMode {
    fn default() -> Self {
        ToolMode::Draw
    }
}

/// What one segment is stamped with. Re-derived from [`ToolState`] for every
/// segment, so a tool change mid-stroke applies from the next pixel on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub color: Color,
    pub width: u32,
    pub erase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolState {
    brush_color: Color,
    brush_size: u32,
    mode: ToolMode,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            brush_color: Color::BLACK,
            brush_size: DEFAULT_BRUSH_SIZE,
            mode: ToolMode::Draw,
        }
    }
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brush_color(&self) -> Color {
        self.brush_color
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn set_color(&mut self, color: Color) {
        self.brush_color = color;
    }

    /// Out-of-range sizes are clamped, not rejected.
    pub fn set_size(&mut self, size: u32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    pub fn is_erasing(&self) -> bool {
        self.mode == ToolMode::Erase
    }

    pub fn is_eyedropper(&self) -> bool {
        self.mode == ToolMode::Eyedropper
    }

    pub fn brush(&self) -> Brush {
        Brush {
            color: self.brush_color,
            width: self.brush_size,
            erase: self.mode == ToolMode::Erase,
        }
    }
}
