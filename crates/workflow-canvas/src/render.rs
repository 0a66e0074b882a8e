//! # Rendering System
//!
//! The canvas never draws pixels itself. Each frame it emits a display list
//! of `DrawCommand`s; the host (egui, wgpu, a test harness) interprets them.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// A single drawing primitive.
///
/// Coordinates are in **screen space** (pixels).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DrawCommand {
    /// A filled rounded rectangle with an optional stroke.
    Rect {
        /// Top-left position in screen pixels.
        pos: Vec2,
        /// Size in screen pixels.
        size: Vec2,
        /// Fill color (RGBA, 0.0 - 1.0).
        color: Vec4,
        /// Radius of the corners in pixels.
        corner_radius: f32,
        /// Width of the border stroke in pixels.
        stroke_width: f32,
        /// Color of the border stroke.
        stroke_color: Option<Vec4>,
    },
    /// A straight line segment.
    Line {
        start: Vec2,
        end: Vec2,
        color: Vec4,
        width: f32,
    },
    /// Text to be rendered; layout and font are up to the consumer.
    Text {
        /// Top-left position in screen pixels.
        pos: Vec2,
        text: String,
        color: Vec4,
        /// Font size in pixels (approximate).
        size: f32,
    },
    /// A cubic Bezier curve, primarily for edge wires.
    Bezier {
        start: Vec2,
        /// Control point 1.
        cp1: Vec2,
        /// Control point 2.
        cp2: Vec2,
        end: Vec2,
        color: Vec4,
        width: f32,
    },
}

/// A list of draw commands representing the current frame.
pub type RenderList = Vec<DrawCommand>;
