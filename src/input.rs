use glam::Vec2;
use winit::event::WindowEvent;

/// Maps a pointer position in pixels to normalized viewport coordinates.
///
/// `x` runs from -1 at the left edge to 1 at the right, `y` from 1 at the top
/// to -1 at the bottom (up is positive). Returns `None` when the viewport has
/// no area.
pub fn normalize_pointer(px: f32, py: f32, width: f32, height: f32) -> Option<Vec2> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    Some(Vec2::new((px / width) * 2.0 - 1.0, -(py / height) * 2.0 + 1.0))
}

/// Tracks the most recent pointer position.
///
/// Only the latest sample matters: each move overwrites the previous one.
/// Before the first move the pointer reads as neutral (zero).
#[derive(Clone, Copy, Debug, Default)]
pub struct Input {
    pointer: Option<Vec2>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer move at pixel `(px, py)` in a `width × height` viewport.
    ///
    /// Samples against a zero-sized viewport are dropped.
    pub fn on_pointer_move(&mut self, px: f32, py: f32, width: u32, height: u32) {
        if let Some(p) = normalize_pointer(px, py, width as f32, height as f32) {
            self.pointer = Some(p);
        }
    }

    /// Process a window event and update pointer state.
    ///
    /// `viewport` is the current surface size in physical pixels, matching the
    /// physical cursor coordinates winit reports.
    pub fn handle_event(&mut self, event: &WindowEvent, viewport: (u32, u32)) {
        if let WindowEvent::CursorMoved { position, .. } = event {
            self.on_pointer_move(position.x as f32, position.y as f32, viewport.0, viewport.1);
        }
    }

    /// Current normalized pointer, or zero before the first move.
    pub fn pointer(&self) -> Vec2 {
        self.pointer.unwrap_or(Vec2::ZERO)
    }

    /// Returns true once any pointer move has been observed.
    pub fn has_pointer(&self) -> bool {
        self.pointer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_corners_and_center() {
        let (w, h) = (800.0, 600.0);
        assert_eq!(normalize_pointer(0.0, 0.0, w, h), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(normalize_pointer(w, h, w, h), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(normalize_pointer(w / 2.0, h / 2.0, w, h), Some(Vec2::ZERO));
    }

    #[test]
    fn normalize_rejects_empty_viewport() {
        assert_eq!(normalize_pointer(10.0, 10.0, 0.0, 600.0), None);
        assert_eq!(normalize_pointer(10.0, 10.0, 800.0, 0.0), None);
        assert_eq!(normalize_pointer(10.0, 10.0, f32::NAN, 600.0), None);
    }

    #[test]
    fn neutral_before_first_move() {
        let input = Input::new();
        assert!(!input.has_pointer());
        assert_eq!(input.pointer(), Vec2::ZERO);
        assert!(input.pointer().is_finite());
    }

    #[test]
    fn latest_sample_wins() {
        let mut input = Input::new();
        input.on_pointer_move(0.0, 0.0, 100, 100);
        input.on_pointer_move(75.0, 25.0, 100, 100);
        assert_eq!(input.pointer(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn zero_viewport_keeps_previous_sample() {
        let mut input = Input::new();
        input.on_pointer_move(100.0, 0.0, 100, 100);
        input.on_pointer_move(50.0, 50.0, 0, 0);
        assert_eq!(input.pointer(), Vec2::new(1.0, 1.0));
    }
}
