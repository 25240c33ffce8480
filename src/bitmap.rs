//! Raster storage for the drawing surface.
//!
//! The backing image is RGBA with a fully transparent background. Drawing
//! writes opaque brush pixels, erasing writes the background back, so an
//! erased region is indistinguishable from one never painted.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, ImageOutputFormat, Rgba, RgbaImage};

use crate::color::Color;
use crate::input::Point;
use crate::tools::Brush;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

pub struct Bitmap {
    pixels: RgbaImage,
}

impl Bitmap {
    /// Create a transparent bitmap. Zero dimensions are bumped to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: ImageBuffer::from_pixel(width.max(1), height.max(1), BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Some(Color::rgba(r, g, b, a))
    }

    /// Stored color at `point`, rounded to the nearest pixel and clamped
    /// into bounds, so sampling near an edge never fails.
    pub fn sample(&self, point: Point) -> Color {
        let x = (point.x.round() as i64).clamp(0, self.width() as i64 - 1) as u32;
        let y = (point.y.round() as i64).clamp(0, self.height() as i64 - 1) as u32;
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Color::rgba(r, g, b, a)
    }

    /// Stamp one capsule-shaped segment: every pixel whose center lies within
    /// half the brush width of the segment is written. Both ends get round
    /// caps, so chained segments join without notches. Pixel (x, y) has its
    /// center at (x as f32, y as f32).
    pub fn stroke_segment(&mut self, from: Point, to: Point, brush: &Brush) {
        let radius = brush.width.max(1) as f32 / 2.0;
        let radius_sq = radius * radius;
        let pad = radius.ceil() as i64 + 1;

        let max_x_bound = self.width() as i64 - 1;
        let max_y_bound = self.height() as i64 - 1;
        let min_x = (from.x.min(to.x).floor() as i64 - pad).clamp(0, max_x_bound);
        let max_x = (from.x.max(to.x).ceil() as i64 + pad).clamp(0, max_x_bound);
        let min_y = (from.y.min(to.y).floor() as i64 - pad).clamp(0, max_y_bound);
        let max_y = (from.y.max(to.y).ceil() as i64 + pad).clamp(0, max_y_bound);

        let value = if brush.erase {
            BACKGROUND
        } else {
            Rgba([brush.color.r, brush.color.g, brush.color.b, brush.color.a])
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point::new(x as f32, y as f32);
                if point_segment_distance_sq(p, from, to) <= radius_sq {
                    self.pixels.put_pixel(x as u32, y as u32, value);
                }
            }
        }
    }

    /// A zero-length stroke: one round dab at `at`.
    pub fn stamp_dot(&mut self, at: Point, brush: &Brush) {
        self.stroke_segment(at, at, brush);
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    /// Stretch the pixels to a new size. Lossy both ways; shrinking and
    /// re-growing does not restore the original raster.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == self.pixels.dimensions() {
            return;
        }
        self.pixels = imageops::resize(&self.pixels, width, height, FilterType::Triangle);
    }

    /// Replace every pixel with `source`, stretching it first when the sizes
    /// differ. The bitmap keeps its own dimensions.
    pub fn overwrite(&mut self, source: RgbaImage) {
        if source.dimensions() == self.pixels.dimensions() {
            self.pixels = source;
        } else {
            let (width, height) = self.pixels.dimensions();
            self.pixels = imageops::resize(&source, width, height, FilterType::Triangle);
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .context("encoding bitmap as PNG failed")?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixels
            .save(path)
            .with_context(|| format!("failed to write PNG to {}", path.display()))
    }
}

/// Squared distance from `p` to the closed segment `a`..`b`.
fn point_segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let ab_len_sq = abx * abx + aby * aby;
    if ab_len_sq <= f32::EPSILON {
        // Zero-length segment: a dot stamped in place.
        return p.distance_sq(a);
    }
    let apx = p.x - a.x;
    let apy = p.y - a.y;
    let t = ((apx * abx + apy * aby) / ab_len_sq).clamp(0.0, 1.0);
    let cx = a.x + t * abx - p.x;
    let cy = a.y + t * aby - p.y;
    cx * cx + cy * cy
}
