/// A position in bitmap space. Fractional coordinates are kept as-is so
/// segment rasterisation stays smooth at any display scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Where the host should currently listen for pointer events.
///
/// While a stroke is active the surface wants global move/up events, so a
/// stroke that leaves the displayed area keeps extending and still ends
/// cleanly when the button is released outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerScope {
    Surface,
    Global,
}

/// On-screen geometry of the displayed surface, in client coordinates.
///
/// The display rectangle and the bitmap may differ in size; pointer
/// positions are translated by the offset and scaled per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayViewport {
    pub offset_x: f32,
    pub offset_y: f32,
    pub display_width: f32,
    pub display_height: f32,
}

impl DisplayViewport {
    pub fn new(offset_x: f32, offset_y: f32, display_width: f32, display_height: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            display_width,
            display_height,
        }
    }

    /// Map a client-space pointer position onto the bitmap.
    ///
    /// The result may lie outside the bitmap when the pointer is outside the
    /// display rectangle; rasterisation clips, sampling clamps.
    pub fn map_to_bitmap(
        &self,
        client_x: f32,
        client_y: f32,
        bitmap_width: u32,
        bitmap_height: u32,
    ) -> Point {
        let scale_x = if self.display_width > 0.0 {
            bitmap_width as f32 / self.display_width
        } else {
            1.0
        };
        let scale_y = if self.display_height > 0.0 {
            bitmap_height as f32 / self.display_height
        } else {
            1.0
        };
        Point::new(
            (client_x - self.offset_x) * scale_x,
            (client_y - self.offset_y) * scale_y,
        )
    }
}
