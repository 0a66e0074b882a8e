use glam::{Vec2, Vec4};

use crate::config::{CanvasConfig, CanvasStyle};
use crate::graph::GraphStore;
use crate::interaction::{GestureState, Selection};
use crate::math;
use crate::model::PortSide;
use crate::registry::{self, PortKey, PortRegistry};
use crate::render::{DrawCommand, RenderList};
use crate::view::View;

/// High-level renderer for the workflow graph.
///
/// Converts the abstract editor state (nodes, edges, gesture transients)
/// into concrete `DrawCommand`s. It handles:
/// - Grid rendering
/// - Node and predicted-ghost shapes (with selection/hover highlights)
/// - Port rendering (with snap-target highlights)
/// - Wire rendering (Bezier curves) and the rubber-band preview
/// - Z-ordering (painters algorithm)
pub struct Painter;

impl Painter {
    /// Generates a list of draw commands to render the whole frame.
    pub fn draw_frame(
        view: &View,
        config: &CanvasConfig,
        graph: &GraphStore,
        registry: &PortRegistry,
        gesture: &GestureState,
        selection: &Selection,
        screen_size: Vec2,
    ) -> RenderList {
        let mut draw_list = Vec::new();
        let style = &config.style;

        Self::draw_grid(view, style, screen_size, &mut draw_list);

        // Edges go behind nodes.
        for edge in graph.edges() {
            let start = registry.position(&PortKey::new(
                &edge.source.node_id,
                &edge.source.port_id,
                PortSide::Output,
            ));
            let end = registry.position(&PortKey::new(
                &edge.target.node_id,
                &edge.target.port_id,
                PortSide::Input,
            ));
            if let (Some(start_world), Some(end_world)) = (start, end) {
                let screen_start = view.world_to_screen(start_world);
                let screen_end = view.world_to_screen(end_world);
                let (cp1, cp2) = math::calculate_bezier_points(screen_start, screen_end);

                let color = if selection.edge.as_deref() == Some(edge.id.as_str()) {
                    style.edge_selected_color
                } else {
                    style.edge_color
                };

                draw_list.push(DrawCommand::Bezier {
                    start: screen_start,
                    cp1,
                    cp2,
                    end: screen_end,
                    color,
                    width: style.edge_width,
                });
            }
        }

        // Rubber-band preview while an edge drag is live.
        if let Some(preview) = &gesture.edge_preview {
            let screen_start = view.world_to_screen(preview.start);
            let screen_end = view.world_to_screen(preview.end);
            let (cp1, cp2) = math::calculate_bezier_points(screen_start, screen_end);
            draw_list.push(DrawCommand::Bezier {
                start: screen_start,
                cp1,
                cp2,
                end: screen_end,
                color: style.preview_color,
                width: style.edge_width,
            });
        }

        for node in graph.nodes() {
            let selected = selection.node.as_deref() == Some(node.id.as_str());
            Self::draw_node(
                view, config, registry, gesture, &node.id, &node.data, node.position, selected,
                1.0, &mut draw_list,
            );
        }

        for ghost in &gesture.predicted {
            let opacity = if ghost.hovered {
                style.predicted_hover_opacity
            } else {
                style.predicted_opacity
            };
            Self::draw_node(
                view, config, registry, gesture, &ghost.id, &ghost.data, ghost.position, false,
                opacity, &mut draw_list,
            );
        }

        draw_list
    }

    /// Draws one node body plus its ports and title.
    #[allow(clippy::too_many_arguments)]
    fn draw_node(
        view: &View,
        config: &CanvasConfig,
        registry: &PortRegistry,
        gesture: &GestureState,
        node_id: &str,
        spec: &crate::model::NodeSpec,
        position: Vec2,
        selected: bool,
        opacity: f32,
        draw_list: &mut RenderList,
    ) {
        let style = &config.style;
        let screen_pos = view.world_to_screen(position);
        let scaled_size = registry::node_size(spec, config) * view.scale;

        let stroke_color = if selected {
            style.node_selected_border
        } else {
            style.node_border
        };

        draw_list.push(DrawCommand::Rect {
            pos: screen_pos,
            size: scaled_size,
            color: with_opacity(style.node_color, opacity),
            corner_radius: 5.0 * view.scale,
            stroke_width: if selected { 2.0 } else { 1.0 },
            stroke_color: Some(with_opacity(stroke_color, opacity)),
        });

        draw_list.push(DrawCommand::Text {
            pos: screen_pos + Vec2::splat(10.0 * view.scale),
            text: spec.node_name.clone(),
            color: with_opacity(style.text_color, opacity),
            size: 14.0 * view.scale,
        });

        for side in [PortSide::Input, PortSide::Output] {
            for port in spec.ports(side) {
                let key = PortKey::new(node_id, &port.id, side);
                let Some(world_pos) = registry.position(&key) else {
                    continue;
                };
                let screen_port_pos = view.world_to_screen(world_pos);
                let port_size = Vec2::splat(10.0) * view.scale;

                let color = match &gesture.snap {
                    Some(snap) if snap.key == key => {
                        if snap.valid {
                            style.snap_valid_color
                        } else {
                            style.snap_invalid_color
                        }
                    }
                    _ => style.port_color,
                };

                draw_list.push(DrawCommand::Rect {
                    pos: screen_port_pos - port_size * 0.5,
                    size: port_size,
                    color: with_opacity(color, opacity),
                    corner_radius: 5.0 * view.scale,
                    stroke_width: 1.0,
                    stroke_color: Some(Vec4::new(0.0, 0.0, 0.0, opacity)),
                });
            }
        }
    }

    /// Renders the background grid over the visible world bounds.
    fn draw_grid(
        view: &View,
        style: &CanvasStyle,
        screen_size: Vec2,
        draw_list: &mut RenderList,
    ) {
        let grid_size = 100.0; // World units

        let top_left_world = view.screen_to_world(Vec2::ZERO);
        let bottom_right_world = view.screen_to_world(screen_size);

        let min_x = top_left_world.x.min(bottom_right_world.x);
        let max_x = top_left_world.x.max(bottom_right_world.x);
        let min_y = top_left_world.y.min(bottom_right_world.y);
        let max_y = top_left_world.y.max(bottom_right_world.y);

        let start_x = (min_x / grid_size).floor() * grid_size;
        let start_y = (min_y / grid_size).floor() * grid_size;

        let mut x = start_x;
        while x <= max_x {
            draw_list.push(DrawCommand::Line {
                start: view.world_to_screen(Vec2::new(x, min_y)),
                end: view.world_to_screen(Vec2::new(x, max_y)),
                color: style.grid_color,
                width: 1.0,
            });
            x += grid_size;
        }

        let mut y = start_y;
        while y <= max_y {
            draw_list.push(DrawCommand::Line {
                start: view.world_to_screen(Vec2::new(min_x, y)),
                end: view.world_to_screen(Vec2::new(max_x, y)),
                color: style.grid_color,
                width: 1.0,
            });
            y += grid_size;
        }
    }
}

fn with_opacity(color: Vec4, opacity: f32) -> Vec4 {
    Vec4::new(color.x, color.y, color.z, color.w * opacity)
}
