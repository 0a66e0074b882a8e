//! # Predicted-Node Engine
//!
//! Given a port being clicked or dragged into empty space, lays out the
//! catalog templates compatible with that port as a grid of ghost nodes next
//! to the gesture point. Output drags grow a grid to the right; input drags
//! to the left. Ghosts are ephemeral and never enter the persisted graph.

use glam::Vec2;
use tracing::debug;

use crate::config::CanvasConfig;
use crate::connect::types_compatible;
use crate::model::{NodeSpec, PortSide, PortSpec, PredictedNode};

/// Templates with at least one input accepting `output_type`.
pub fn compatible_with_output<'a>(
    specs: &'a [NodeSpec],
    output_type: Option<&str>,
) -> Vec<&'a NodeSpec> {
    specs
        .iter()
        .filter(|spec| {
            spec.inputs
                .iter()
                .any(|input| types_compatible(output_type, input.data_type.as_deref()))
        })
        .collect()
}

/// Templates with at least one output feeding `input_type`.
pub fn compatible_with_input<'a>(
    specs: &'a [NodeSpec],
    input_type: Option<&str>,
) -> Vec<&'a NodeSpec> {
    specs
        .iter()
        .filter(|spec| {
            spec.outputs
                .iter()
                .any(|output| types_compatible(output.data_type.as_deref(), input_type))
        })
        .collect()
}

/// First input on `spec` accepting `source_type` (first-match, not best-match).
pub fn first_compatible_input<'a>(spec: &'a NodeSpec, source_type: Option<&str>) -> Option<&'a PortSpec> {
    spec.inputs
        .iter()
        .find(|input| types_compatible(source_type, input.data_type.as_deref()))
}

/// First output on `spec` feeding `target_type`.
pub fn first_compatible_output<'a>(spec: &'a NodeSpec, target_type: Option<&str>) -> Option<&'a PortSpec> {
    spec.outputs
        .iter()
        .find(|output| types_compatible(output.data_type.as_deref(), target_type))
}

/// Builds the ghost batch for a gesture from a port of `side` with
/// `port_type`, anchored at `anchor` (world space). `stamp` is the batch's id
/// stamp; each ghost additionally embeds its grid index.
pub fn generate(
    specs: &[NodeSpec],
    side: PortSide,
    port_type: Option<&str>,
    anchor: Vec2,
    stamp: u64,
    config: &CanvasConfig,
) -> Vec<PredictedNode> {
    let candidates = match side {
        PortSide::Output => compatible_with_output(specs, port_type),
        PortSide::Input => compatible_with_input(specs, port_type),
    };
    if candidates.is_empty() {
        return Vec::new();
    }

    let count = candidates.len();
    let cols = 3.min((count as f32).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    let grid_width = (cols - 1) as f32 * config.predicted_h_spacing;
    let grid_height = (rows - 1) as f32 * config.predicted_v_spacing;

    // Grid clears the gesture point horizontally and is centred vertically.
    let start = match side {
        PortSide::Output => Vec2::new(
            anchor.x + config.predicted_output_clearance,
            anchor.y - grid_height / 2.0,
        ),
        PortSide::Input => Vec2::new(
            anchor.x - config.predicted_input_clearance - grid_width,
            anchor.y - grid_height / 2.0,
        ),
    };

    debug!(count, cols, rows, ?side, "predicted nodes generated");

    let prefix = match side {
        PortSide::Output => "predicted",
        PortSide::Input => "predicted-output",
    };

    candidates
        .into_iter()
        .enumerate()
        .map(|(index, spec)| {
            let col = (index % cols) as f32;
            let row = (index / cols) as f32;
            PredictedNode {
                id: format!("{prefix}-{}-{stamp}-{index}", spec.id),
                data: spec.clone(),
                position: Vec2::new(
                    start.x + col * config.predicted_h_spacing,
                    start.y + row * config.predicted_v_spacing,
                ),
                hovered: false,
            }
        })
        .collect()
}
