//! # Configuration
//!
//! Tunables for the canvas interactions and the visual style used by the
//! painter. The host can tweak these; defaults match the reference editor.

use serde::{Deserialize, Serialize};

/// Configuration parameters for the canvas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// World-space radius within which an edge drag snaps to a port.
    pub snap_distance: f32,
    /// A press/release on the same port within this window counts as a click.
    pub click_time_ms: u64,
    /// Maximum pointer travel (screen px) for a press to stay a click.
    pub click_slop: f32,
    /// Screen-space radius for port hit-testing (scaled down when zoomed in).
    pub port_hit_radius: f32,
    /// World-space offset applied to a pasted node.
    pub paste_offset: f32,
    /// Layout width of a node body in world units.
    pub node_width: f32,
    /// Minimum layout height of a node body.
    pub node_min_height: f32,
    /// Extra layout height per port row / parameter row.
    pub port_row_height: f32,
    /// Horizontal pitch of the predicted-node grid.
    pub predicted_h_spacing: f32,
    /// Vertical pitch of the predicted-node grid.
    pub predicted_v_spacing: f32,
    /// Clearance between the gesture point and a rightward predicted grid.
    pub predicted_output_clearance: f32,
    /// Clearance between the gesture point and a leftward predicted grid.
    pub predicted_input_clearance: f32,
    /// Visual styling configuration.
    #[serde(default)]
    pub style: CanvasStyle,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            snap_distance: 40.0,
            click_time_ms: 200,
            click_slop: 5.0,
            port_hit_radius: 10.0,
            paste_offset: 50.0,
            node_width: 450.0,
            node_min_height: 120.0,
            port_row_height: 40.0,
            predicted_h_spacing: 500.0,
            predicted_v_spacing: 350.0,
            predicted_output_clearance: 100.0,
            predicted_input_clearance: 550.0,
            style: CanvasStyle::default(),
        }
    }
}

/// Colors used by the painter, RGBA in `glam::Vec4`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanvasStyle {
    pub background_color: glam::Vec4,
    pub grid_color: glam::Vec4,
    pub text_color: glam::Vec4,
    pub node_color: glam::Vec4,
    pub node_selected_border: glam::Vec4,
    pub node_border: glam::Vec4,
    pub port_color: glam::Vec4,
    pub snap_valid_color: glam::Vec4,
    pub snap_invalid_color: glam::Vec4,
    pub edge_color: glam::Vec4,
    pub edge_selected_color: glam::Vec4,
    pub preview_color: glam::Vec4,
    pub edge_width: f32,
    /// Opacity of a predicted ghost node at rest / while hovered.
    pub predicted_opacity: f32,
    pub predicted_hover_opacity: f32,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            background_color: glam::Vec4::new(0.1, 0.1, 0.1, 1.0),
            grid_color: glam::Vec4::new(0.2, 0.2, 0.2, 1.0),
            text_color: glam::Vec4::new(0.9, 0.9, 0.9, 1.0),
            node_color: glam::Vec4::new(0.15, 0.15, 0.15, 1.0),
            node_selected_border: glam::Vec4::new(0.4, 0.6, 1.0, 1.0),
            node_border: glam::Vec4::new(0.5, 0.5, 0.5, 1.0),
            port_color: glam::Vec4::new(0.7, 0.7, 0.7, 1.0),
            snap_valid_color: glam::Vec4::new(0.3, 0.9, 0.4, 1.0),
            snap_invalid_color: glam::Vec4::new(0.9, 0.3, 0.3, 1.0),
            edge_color: glam::Vec4::new(0.8, 0.8, 0.8, 1.0),
            edge_selected_color: glam::Vec4::new(0.4, 0.6, 1.0, 1.0),
            preview_color: glam::Vec4::new(0.8, 0.8, 0.5, 0.8),
            edge_width: 2.0,
            predicted_opacity: 0.3,
            predicted_hover_opacity: 1.0,
        }
    }
}
