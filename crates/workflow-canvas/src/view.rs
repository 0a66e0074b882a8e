//! # Viewport System
//!
//! World <-> Screen coordinate transforms for the infinite canvas.
//! `screen = world * scale + (x, y)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_SCALE: f32 = 0.6;
/// Largest allowed zoom factor.
pub const MAX_SCALE: f32 = 20.0;
/// Scale change per wheel step, proportional to the current scale.
pub const ZOOM_SENSITIVITY: f32 = 0.05;

/// The camera state: pan offset plus zoom factor.
///
/// Serialized as `{x, y, scale}`, the exact shape persisted in workflow
/// snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for View {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl View {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Screen Space (viewport pixels) -> World Space (graph units).
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset()) / self.scale
    }

    /// World Space -> Screen Space.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset()
    }

    /// Applies a zoom step anchored at `anchor` (screen space): the world
    /// point under the anchor stays put. Returns `false` when the scale is
    /// already clamped and nothing changed.
    pub fn zoom_at(&mut self, anchor: Vec2, steps: f32) -> bool {
        let new_scale =
            (self.scale + steps * ZOOM_SENSITIVITY * self.scale).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == self.scale {
            return false;
        }
        let world = self.screen_to_world(anchor);
        self.scale = new_scale;
        self.x = anchor.x - world.x * new_scale;
        self.y = anchor.y - world.y * new_scale;
        true
    }
}

/// Computes a scale-1 view centering `content_bounds` (world-space min/size)
/// inside a container of `container_size` pixels. Falls back to the default
/// view when the container has not been measured yet.
pub fn centered_view(container_size: Vec2, content_min: Vec2, content_size: Vec2) -> View {
    if container_size.x <= 0.0 || container_size.y <= 0.0 {
        return View::default();
    }
    View {
        x: (container_size.x - content_size.x) / 2.0 - content_min.x,
        y: (container_size.y - content_size.y) / 2.0 - content_min.y,
        scale: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_identity() {
        let view = View { x: -37.5, y: 12.0, scale: 2.5 };
        let screen = Vec2::new(481.0, -220.0);
        let back = view.world_to_screen(view.screen_to_world(screen));
        assert!((back - screen).length() < 1e-3);
    }

    #[test]
    fn zoom_is_anchored_at_cursor() {
        let mut view = View::default();
        let anchor = Vec2::new(320.0, 240.0);
        let before = view.screen_to_world(anchor);
        assert!(view.zoom_at(anchor, 1.0));
        let after = view.screen_to_world(anchor);
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn zoom_clamps_and_reports_no_op() {
        let mut view = View::default();
        for _ in 0..500 {
            view.zoom_at(Vec2::ZERO, 1.0);
        }
        assert_eq!(view.scale, MAX_SCALE);
        assert!(!view.zoom_at(Vec2::ZERO, 1.0));

        for _ in 0..500 {
            view.zoom_at(Vec2::ZERO, -1.0);
        }
        assert_eq!(view.scale, MIN_SCALE);
        assert!(!view.zoom_at(Vec2::ZERO, -1.0));
    }

    #[test]
    fn centered_view_falls_back_when_unmeasured() {
        let view = centered_view(Vec2::ZERO, Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert_eq!(view, View::default());
    }
}
