use anyhow::{bail, Result};
use tracing::debug;

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::input::{Point, PointerScope};
use crate::snapshot::Snapshot;
use crate::tools::{ToolMode, ToolState};

/// Stroke lifecycle. `Restoring` exists so pointer input arriving while a
/// snapshot repaint is underway cannot interleave pixels with it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Drawing { last: Point },
    Restoring,
}

/// The drawing surface: a bitmap plus the stroke phase on top of it.
///
/// Pixels land immediately; there is no preview layer. A stroke is begun,
/// extended segment by segment, and ended, and only the caller decides what
/// a completed stroke means (the session captures a snapshot).
pub struct StrokeSurface {
    bitmap: Bitmap,
    phase: Phase,
}

impl StrokeSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bitmap: Bitmap::new(width, height),
            phase: Phase::Idle,
        }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, Phase::Drawing { .. })
    }

    /// While a stroke is active the host should route global pointer events
    /// here, so leaving the displayed area neither drops nor orphans it.
    pub fn pointer_scope(&self) -> PointerScope {
        if self.is_drawing() {
            PointerScope::Global
        } else {
            PointerScope::Surface
        }
    }

    /// Start a stroke at `point`.
    ///
    /// With the eyedropper active no stroke starts: the pixel under the
    /// pointer is sampled into the brush color and the tool snaps back to
    /// drawing. Otherwise a dab lands at the anchor right away, so a click
    /// without movement still leaves a mark. A second start while a stroke
    /// is active is ignored.
    pub fn begin_stroke(&mut self, point: Point, tools: &mut ToolState) {
        match self.phase {
            Phase::Restoring => {
                debug!("stroke start ignored while a snapshot repaint is in progress");
                return;
            }
            Phase::Drawing { .. } => {
                debug!("duplicate stroke start ignored");
                return;
            }
            Phase::Idle => {}
        }
        if tools.mode() == ToolMode::Eyedropper {
            let sampled = self.bitmap.sample(point);
            tools.set_color(Color::rgb(sampled.r, sampled.g, sampled.b));
            tools.set_mode(ToolMode::Draw);
            return;
        }
        self.bitmap.stamp_dot(point, &tools.brush());
        self.phase = Phase::Drawing { last: point };
    }

    /// Extend the active stroke to `point`. Without an active stroke this is
    /// a no-op, which also covers hover movement and moves during a repaint.
    pub fn extend_stroke(&mut self, point: Point, tools: &ToolState) {
        let Phase::Drawing { last } = self.phase else {
            return;
        };
        self.bitmap.stroke_segment(last, point, &tools.brush());
        self.phase = Phase::Drawing { last: point };
    }

    /// End the active stroke. Returns whether a stroke was actually ended,
    /// so the caller knows a new history entry is due.
    pub fn end_stroke(&mut self) -> bool {
        if self.is_drawing() {
            self.phase = Phase::Idle;
            return true;
        }
        false
    }

    /// Color under `point`, clamped into bounds.
    pub fn sample_pixel(&self, point: Point) -> Color {
        self.bitmap.sample(point)
    }

    /// Wipe the surface back to transparent. Any active stroke ends with it;
    /// its pixels are gone anyway.
    pub fn clear(&mut self) {
        self.bitmap.clear();
        self.phase = Phase::Idle;
    }

    /// Capture the current pixels. Read-only, so a caller that abandons the
    /// result has changed nothing.
    pub fn export_encoded(&self) -> Result<Snapshot> {
        Snapshot::encode(&self.bitmap)
    }

    /// Repaint the whole surface from a snapshot, stretching when its size
    /// differs from the current one. On failure the pixels are left exactly
    /// as they were.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self.is_drawing() {
            bail!("cannot repaint while a stroke is active");
        }
        self.phase = Phase::Restoring;
        let decoded = match snapshot.decode() {
            Ok(decoded) => decoded,
            Err(err) => {
                self.phase = Phase::Idle;
                return Err(err);
            }
        };
        self.bitmap.overwrite(decoded);
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Stretch the surface to a new size. Not a history event; callers decide
    /// whether a capture should follow.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.bitmap.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> ToolState {
        let mut tools = ToolState::new();
        tools.set_color(Color::rgb(200, 40, 40));
        tools.set_size(3);
        tools
    }

    #[test]
    fn click_without_movement_leaves_a_dab() {
        let mut surface = StrokeSurface::new(16, 16);
        let mut tools = tools();
        surface.begin_stroke(Point::new(8.0, 8.0), &mut tools);
        assert!(surface.is_drawing());
        assert!(surface.end_stroke());
        assert_eq!(surface.sample_pixel(Point::new(8.0, 8.0)), Color::rgb(200, 40, 40));
    }

    #[test]
    fn moves_without_a_begin_are_ignored() {
        let mut surface = StrokeSurface::new(16, 16);
        surface.extend_stroke(Point::new(4.0, 4.0), &tools());
        assert_eq!(surface.sample_pixel(Point::new(4.0, 4.0)), Color::TRANSPARENT);
        assert!(!surface.end_stroke());
    }

    #[test]
    fn duplicate_begin_keeps_the_original_anchor() {
        let mut surface = StrokeSurface::new(32, 16);
        let mut tools = tools();
        surface.begin_stroke(Point::new(2.0, 8.0), &mut tools);
        surface.begin_stroke(Point::new(30.0, 8.0), &mut tools);
        surface.extend_stroke(Point::new(6.0, 8.0), &tools);
        // The segment ran from the first anchor; the second never took.
        assert_eq!(surface.sample_pixel(Point::new(4.0, 8.0)), Color::rgb(200, 40, 40));
        assert_eq!(surface.sample_pixel(Point::new(20.0, 8.0)), Color::TRANSPARENT);
    }

    #[test]
    fn eyedropper_samples_and_snaps_back_to_draw() {
        let mut surface = StrokeSurface::new(16, 16);
        let mut tools = tools();
        surface.begin_stroke(Point::new(5.0, 5.0), &mut tools);
        surface.end_stroke();

        tools.set_color(Color::BLACK);
        tools.set_mode(ToolMode::Eyedropper);
        surface.begin_stroke(Point::new(5.0, 5.0), &mut tools);
        assert!(!surface.is_drawing());
        assert_eq!(tools.brush_color(), Color::rgb(200, 40, 40));
        assert_eq!(tools.mode(), ToolMode::Draw);
    }

    #[test]
    fn eyedropper_on_blank_pixels_picks_opaque_black() {
        let mut surface = StrokeSurface::new(16, 16);
        let mut tools = tools();
        tools.set_mode(ToolMode::Eyedropper);
        surface.begin_stroke(Point::new(1.0, 1.0), &mut tools);
        assert_eq!(tools.brush_color(), Color::BLACK);
    }

    #[test]
    fn pointer_scope_widens_only_while_drawing() {
        let mut surface = StrokeSurface::new(16, 16);
        let mut tools = tools();
        assert_eq!(surface.pointer_scope(), PointerScope::Surface);
        surface.begin_stroke(Point::new(3.0, 3.0), &mut tools);
        assert_eq!(surface.pointer_scope(), PointerScope::Global);
        surface.end_stroke();
        assert_eq!(surface.pointer_scope(), PointerScope::Surface);
    }

    #[test]
    fn restore_repaints_from_a_snapshot() {
        let mut surface = StrokeSurface::new(16, 16);
        let mut tools = tools();
        surface.begin_stroke(Point::new(8.0, 8.0), &mut tools);
        surface.end_stroke();
        let painted = surface.export_encoded().expect("export");

        surface.clear();
        assert_eq!(surface.sample_pixel(Point::new(8.0, 8.0)), Color::TRANSPARENT);
        surface.restore(&painted).expect("restore");
        assert_eq!(surface.sample_pixel(Point::new(8.0, 8.0)), Color::rgb(200, 40, 40));
    }

    #[test]
    fn failed_restore_leaves_pixels_untouched() {
        let mut surface = StrokeSurface::new(16, 16);
        let mut tools = tools();
        surface.begin_stroke(Point::new(8.0, 8.0), &mut tools);
        surface.end_stroke();

        let corrupt = Snapshot::from_encoded("not a snapshot");
        assert!(surface.restore(&corrupt).is_err());
        assert_eq!(surface.sample_pixel(Point::new(8.0, 8.0)), Color::rgb(200, 40, 40));
        // The surface accepts strokes again afterwards.
        surface.begin_stroke(Point::new(2.0, 2.0), &mut tools);
        assert!(surface.is_drawing());
    }

    #[test]
    fn restore_stretches_snapshots_of_a_different_size() {
        let mut small = StrokeSurface::new(8, 8);
        let mut tools = tools();
        tools.set_size(8);
        small.begin_stroke(Point::new(4.0, 4.0), &mut tools);
        small.extend_stroke(Point::new(4.0, 4.0), &tools);
        small.end_stroke();
        let snapshot = small.export_encoded().expect("export");

        let mut large = StrokeSurface::new(16, 16);
        large.restore(&snapshot).expect("restore");
        assert_eq!(large.dimensions(), (16, 16));
        assert_eq!(large.sample_pixel(Point::new(8.0, 8.0)), Color::rgb(200, 40, 40));
    }

    #[test]
    fn restore_refuses_mid_stroke() {
        let mut surface = StrokeSurface::new(8, 8);
        let mut tools = tools();
        let blank = surface.export_encoded().expect("export");
        surface.begin_stroke(Point::new(4.0, 4.0), &mut tools);
        assert!(surface.restore(&blank).is_err());
        assert!(surface.is_drawing());
    }

    #[test]
    fn clear_ends_an_active_stroke() {
        let mut surface = StrokeSurface::new(8, 8);
        let mut tools = tools();
        surface.begin_stroke(Point::new(4.0, 4.0), &mut tools);
        surface.clear();
        assert!(!surface.is_drawing());
        assert!(!surface.end_stroke());
    }
}
