//! # Drag/Gesture State Machine
//!
//! Interprets raw pointer and key events into canvas pans, node moves, edge
//! draws, port clicks, and predicted-node resolution, and turns them into
//! graph mutations. Exactly one drag state is active at a time; every
//! gesture-termination path funnels through `GestureState::clear_transients`
//! so no ephemeral state survives a completed or cancelled gesture.

use glam::Vec2;
use tracing::debug;

use crate::config::CanvasConfig;
use crate::connect::{self, SnapTarget};
use crate::graph::GraphStore;
use crate::input::{InputState, Key};
use crate::math::Rect;
use crate::model::{CanvasNode, NodeSpec, PortRef, PortSide, PredictedNode};
use crate::persistence::CanvasState;
use crate::registry::{self, PortKey, PortRegistry};
use crate::view::View;

/// Events emitted to the host application.
#[derive(Clone, Debug)]
pub enum CanvasEvent {
    /// Fired after any node/edge/view mutation, carrying the full snapshot.
    /// Suppressed while both the node and edge lists are empty so an empty
    /// canvas never clobbers externally persisted state.
    StateChanged(CanvasState),
    /// Something visual changed; the host should repaint.
    RepaintNeeded,
}

/// The active drag, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// Panning the canvas; `grab` is `pointer - view offset` at press.
    Canvas { grab: Vec2 },
    /// Moving a node; `grab_offset` is `pointer/scale - position` at press.
    Node { node_id: String, grab_offset: Vec2 },
    /// Drawing or rewiring an edge.
    Edge,
}

/// The rubber-band line shown while dragging from a port.
#[derive(Clone, Debug)]
pub struct EdgePreview {
    /// The fixed end. Carries the port's type tag for compatibility checks.
    pub source: PortRef,
    pub start: Vec2,
    pub end: Vec2,
}

/// A port press that may still resolve into a click.
#[derive(Clone, Debug)]
struct PortPress {
    port: PortRef,
    at_ms: u64,
    screen: Vec2,
}

/// Node/edge selection. At most one of the two is set.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pub node: Option<String>,
    pub edge: Option<String>,
}

impl Selection {
    pub fn select_node(&mut self, id: impl Into<String>) {
        self.node = Some(id.into());
        self.edge = None;
    }

    pub fn select_edge(&mut self, id: impl Into<String>) {
        self.edge = Some(id.into());
        self.node = None;
    }

    pub fn clear(&mut self) {
        self.node = None;
        self.edge = None;
    }
}

/// All transient gesture state, owned by the controller and reset centrally.
#[derive(Debug, Default)]
pub struct GestureState {
    pub drag: DragState,
    pub edge_preview: Option<EdgePreview>,
    pending_click: Option<PortPress>,
    pub snap: Option<SnapTarget>,
    pub predicted: Vec<PredictedNode>,
    /// Remembered source port so a click on a predicted node can still
    /// complete the connection after the rubber-band is gone.
    source_port: Option<PortRef>,
    /// Side the gesture started from; `None` while rewiring an existing
    /// edge (a cancelled rewire spawns no predictions).
    drag_side: Option<PortSide>,
    prev_left: bool,
}

impl GestureState {
    /// The single reset invoked from every gesture-termination path.
    pub fn clear_transients(&mut self) {
        self.drag = DragState::Idle;
        self.edge_preview = None;
        self.pending_click = None;
        self.snap = None;
        self.predicted.clear();
        self.source_port = None;
        self.drag_side = None;
    }

    pub fn has_predictions(&self) -> bool {
        !self.predicted.is_empty()
    }
}

/// Processes one input event against the whole editor state.
#[allow(clippy::too_many_arguments)]
pub fn handle(
    gesture: &mut GestureState,
    view: &mut View,
    selection: &mut Selection,
    clipboard: &mut Option<CanvasNode>,
    graph: &mut GraphStore,
    registry: &PortRegistry,
    specs: &[NodeSpec],
    config: &CanvasConfig,
    input: &InputState,
    events: &mut Vec<CanvasEvent>,
) {
    if input.scroll_delta != 0.0 && view.zoom_at(input.pointer, input.scroll_delta) {
        events.push(CanvasEvent::RepaintNeeded);
    }

    if !input.event_consumed_by_content {
        handle_keys(gesture, selection, clipboard, graph, config, input, events);
    }

    let pressed = input.buttons.left && !gesture.prev_left;
    let released = !input.buttons.left && gesture.prev_left;
    gesture.prev_left = input.buttons.left;

    match gesture.drag.clone() {
        DragState::Idle => {
            handle_idle(
                gesture, view, selection, graph, registry, config, input, pressed, events,
            );
        }
        DragState::Canvas { grab } => {
            if released {
                gesture.drag = DragState::Idle;
            } else {
                view.x = input.pointer.x - grab.x;
                view.y = input.pointer.y - grab.y;
                events.push(CanvasEvent::RepaintNeeded);
            }
        }
        DragState::Node { node_id, grab_offset } => {
            if released {
                gesture.drag = DragState::Idle;
            } else {
                let pos = input.pointer / view.scale - grab_offset;
                graph.move_node(&node_id, pos);
                events.push(CanvasEvent::RepaintNeeded);
            }
        }
        DragState::Edge => {
            if released {
                finish_edge_drag(gesture, view, graph, registry, specs, config, input, events);
            } else {
                continue_edge_drag(gesture, view, graph, registry, config, input, events);
            }
        }
    }
}

fn handle_keys(
    gesture: &mut GestureState,
    selection: &mut Selection,
    clipboard: &mut Option<CanvasNode>,
    graph: &mut GraphStore,
    config: &CanvasConfig,
    input: &InputState,
    events: &mut Vec<CanvasEvent>,
) {
    for key in &input.pressed_keys {
        match key {
            Key::C if input.modifiers.command() => {
                if let Some(node) = selection.node.as_deref().and_then(|id| graph.node(id)) {
                    debug!(node = %node.id, "node copied");
                    *clipboard = Some(node.clone());
                }
            }
            Key::V if input.modifiers.command() => {
                if let Some(copied) = clipboard.clone() {
                    let stamp = graph.stamp();
                    let pasted = CanvasNode {
                        id: format!("{}-{}", copied.data.id, stamp),
                        data: copied.data.clone(),
                        position: copied.position
                            + Vec2::splat(config.paste_offset),
                    };
                    let id = pasted.id.clone();
                    graph.insert_node(pasted);
                    selection.select_node(id);
                    events.push(CanvasEvent::RepaintNeeded);
                }
            }
            Key::Z if input.modifiers.command() => {
                if graph.undo_delete() {
                    events.push(CanvasEvent::RepaintNeeded);
                }
            }
            Key::Delete | Key::Backspace => {
                if let Some(node_id) = selection.node.take() {
                    graph.remove_node(&node_id);
                    events.push(CanvasEvent::RepaintNeeded);
                } else if let Some(edge_id) = selection.edge.take() {
                    graph.remove_edge(&edge_id);
                    events.push(CanvasEvent::RepaintNeeded);
                }
            }
            _ => {}
        }
    }
}

/// Hit-test priority on press: ports, predicted ghosts, node bodies (topmost
/// last in the list), then empty canvas.
#[allow(clippy::too_many_arguments)]
fn handle_idle(
    gesture: &mut GestureState,
    view: &View,
    selection: &mut Selection,
    graph: &mut GraphStore,
    registry: &PortRegistry,
    config: &CanvasConfig,
    input: &InputState,
    pressed: bool,
    events: &mut Vec<CanvasEvent>,
) {
    let world = view.screen_to_world(input.pointer);

    // Hover feedback on predicted ghosts while idle.
    if gesture.has_predictions() {
        let mut changed = false;
        for ghost in &mut gesture.predicted {
            let rect = Rect::new(ghost.position, registry::node_size(&ghost.data, config));
            let over = rect.contains(world);
            if ghost.hovered != over {
                ghost.hovered = over;
                changed = true;
            }
        }
        if changed {
            events.push(CanvasEvent::RepaintNeeded);
        }
    }

    if !pressed || input.event_consumed_by_content {
        return;
    }

    if let Some(key) = hit_test_real_port(graph, registry, view, world, config) {
        begin_port_press(gesture, graph, registry, &key, input, world);
        events.push(CanvasEvent::RepaintNeeded);
        return;
    }

    if let Some(ghost_id) = hit_test_predicted(&gesture.predicted, world, config) {
        resolve_predicted_click(gesture, graph, &ghost_id, events);
        return;
    }

    if let Some(node_id) = hit_test_node(graph, world, config) {
        selection.select_node(node_id.clone());
        gesture.clear_transients();
        let grab_offset = input.pointer / view.scale
            - graph.node(&node_id).map(|n| n.position).unwrap_or(world);
        gesture.drag = DragState::Node { node_id, grab_offset };
        events.push(CanvasEvent::RepaintNeeded);
        return;
    }

    // Empty canvas: deselect, discard any predictions, start panning.
    selection.clear();
    gesture.clear_transients();
    gesture.drag = DragState::Canvas { grab: input.pointer - view.offset() };
    events.push(CanvasEvent::RepaintNeeded);
}

/// Nearest real port anchor within the zoom-scaled hit radius.
fn hit_test_real_port(
    graph: &GraphStore,
    registry: &PortRegistry,
    view: &View,
    world: Vec2,
    config: &CanvasConfig,
) -> Option<PortKey> {
    let radius = (config.port_hit_radius / view.scale).max(5.0);
    let mut best: Option<(PortKey, f32)> = None;
    for (key, pos) in registry.iter() {
        if PredictedNode::is_predicted_id(&key.node_id) || graph.node(&key.node_id).is_none() {
            continue;
        }
        let dist = pos.distance(world);
        if dist <= radius && best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((key.clone(), dist));
        }
    }
    best.map(|(key, _)| key)
}

fn hit_test_predicted(
    predicted: &[PredictedNode],
    world: Vec2,
    config: &CanvasConfig,
) -> Option<String> {
    predicted
        .iter()
        .rev()
        .find(|ghost| {
            Rect::new(ghost.position, registry::node_size(&ghost.data, config)).contains(world)
        })
        .map(|ghost| ghost.id.clone())
}

fn hit_test_node(graph: &GraphStore, world: Vec2, config: &CanvasConfig) -> Option<String> {
    graph
        .nodes()
        .iter()
        .rev()
        .find(|node| Rect::new(node.position, registry::node_size(&node.data, config)).contains(world))
        .map(|node| node.id.clone())
}

/// Enters the edge drag state for a press on a real port, per port kind:
/// outputs and bare inputs start a fresh rubber-band; an input already
/// carrying an edge re-grabs it (the edge leaves the store and its source
/// becomes the fixed end).
fn begin_port_press(
    gesture: &mut GestureState,
    graph: &mut GraphStore,
    registry: &PortRegistry,
    key: &PortKey,
    input: &InputState,
    world: Vec2,
) {
    // Predictions from an earlier click stay alive (their ports are snap
    // candidates for this drag); everything else resets.
    gesture.snap = None;
    gesture.source_port = None;
    gesture.drag_side = None;

    let port_type = graph
        .port_spec(&key.node_id, key.side, &key.port_id)
        .and_then(|p| p.data_type.clone());
    let port_ref =
        PortRef::new(&key.node_id, &key.port_id, key.side).with_type(port_type.clone());

    gesture.pending_click = Some(PortPress {
        port: port_ref.clone(),
        at_ms: input.time_ms,
        screen: input.pointer,
    });

    if key.side == PortSide::Input {
        let multi = graph
            .port_spec(&key.node_id, PortSide::Input, &key.port_id)
            .map(|p| p.multi)
            .unwrap_or(false);
        let existing = if multi {
            graph.edges_into(&key.node_id, &key.port_id).last()
        } else {
            graph.edges_into(&key.node_id, &key.port_id).next()
        }
        .map(|e| e.id.clone());

        if let Some(edge) = existing.and_then(|edge_id| graph.remove_edge(&edge_id)) {
            // Rewire: pick the edge up by its source end.
            let source_type = graph
                .port_spec(&edge.source.node_id, PortSide::Output, &edge.source.port_id)
                .and_then(|p| p.data_type.clone());
            let source = edge.source.clone().with_type(source_type);
            let start = registry
                .position(&PortKey::new(&source.node_id, &source.port_id, PortSide::Output))
                .unwrap_or(world);
            debug!(edge = %edge.id, "edge re-grabbed for rewiring");
            gesture.edge_preview = Some(EdgePreview { source, start, end: world });
            gesture.pending_click = None;
            gesture.drag = DragState::Edge;
            return;
        }
    }

    let start = registry.position(key).unwrap_or(world);
    gesture.edge_preview = Some(EdgePreview { source: port_ref.clone(), start, end: start });
    gesture.source_port = Some(port_ref);
    gesture.drag_side = Some(key.side);
    gesture.drag = DragState::Edge;
}

fn continue_edge_drag(
    gesture: &mut GestureState,
    view: &View,
    graph: &GraphStore,
    registry: &PortRegistry,
    config: &CanvasConfig,
    input: &InputState,
    events: &mut Vec<CanvasEvent>,
) {
    let world = view.screen_to_world(input.pointer);

    // Travelling beyond the slop converts the press into a drag for good.
    if let Some(press) = &gesture.pending_click {
        if press.screen.distance(input.pointer) > config.click_slop {
            gesture.pending_click = None;
        }
    }

    let Some(preview) = gesture.edge_preview.as_mut() else {
        return;
    };
    preview.end = world;

    let source = preview.source.clone();
    gesture.snap = connect::find_snap_target(
        graph,
        registry,
        &gesture.predicted,
        &source,
        world,
        config.snap_distance,
    );

    // Snap the visual end onto the candidate port.
    if let Some(snap) = &gesture.snap {
        if let Some(pos) = registry.position(&snap.key) {
            if let Some(preview) = gesture.edge_preview.as_mut() {
                preview.end = pos;
            }
        }
    }

    events.push(CanvasEvent::RepaintNeeded);
}

/// Pointer-up while edge-dragging: port click, snap commit, predicted
/// conversion, prediction spawn over empty space, or silent cancel.
#[allow(clippy::too_many_arguments)]
fn finish_edge_drag(
    gesture: &mut GestureState,
    view: &View,
    graph: &mut GraphStore,
    registry: &PortRegistry,
    specs: &[NodeSpec],
    config: &CanvasConfig,
    input: &InputState,
    events: &mut Vec<CanvasEvent>,
) {
    let world = view.screen_to_world(input.pointer);

    // Port click: press and release on the same spot inside the window.
    if let Some(press) = gesture.pending_click.take() {
        let quick = input.time_ms.saturating_sub(press.at_ms) < config.click_time_ms;
        let near = press.screen.distance(input.pointer) <= config.click_slop;
        if quick && near {
            spawn_predictions(gesture, graph, registry, specs, config, &press.port, None, events);
            return;
        }
    }

    let preview = gesture.edge_preview.clone();
    let snap = gesture.snap.clone();

    if let (Some(preview), Some(snap)) = (&preview, &snap) {
        if PredictedNode::is_predicted_id(&snap.key.node_id) {
            convert_predicted_snap(gesture, graph, &snap.key, &preview.source, events);
            return;
        }
        if snap.valid {
            let drop_type = graph
                .port_spec(&snap.key.node_id, snap.key.side, &snap.key.port_id)
                .and_then(|p| p.data_type.clone());
            let drop = PortRef::new(&snap.key.node_id, &snap.key.port_id, snap.key.side)
                .with_type(drop_type);
            match connect::commit_connection(graph, &preview.source, &drop) {
                Ok(edge) => debug!(edge = %edge.id, "connection committed"),
                Err(reason) => debug!(%reason, "connection rejected"),
            }
        }
        gesture.clear_transients();
        events.push(CanvasEvent::RepaintNeeded);
        return;
    }

    // Dropped over empty space: a fresh port drag spawns predictions there;
    // a cancelled rewire just ends (the re-grabbed edge stays removed).
    if let (Some(preview), Some(_)) = (&preview, gesture.drag_side) {
        let source = preview.source.clone();
        spawn_predictions(gesture, graph, registry, specs, config, &source, Some(world), events);
        return;
    }

    gesture.clear_transients();
    events.push(CanvasEvent::RepaintNeeded);
}

/// Generates the ghost batch for a port gesture. `anchor_override` is the
/// drop point for drag-released spawns; clicks anchor at the port itself.
#[allow(clippy::too_many_arguments)]
fn spawn_predictions(
    gesture: &mut GestureState,
    graph: &mut GraphStore,
    registry: &PortRegistry,
    specs: &[NodeSpec],
    config: &CanvasConfig,
    source: &PortRef,
    anchor_override: Option<Vec2>,
    events: &mut Vec<CanvasEvent>,
) {
    let anchor = anchor_override
        .or_else(|| registry.position(&PortKey::new(&source.node_id, &source.port_id, source.side)))
        .unwrap_or_default();
    let stamp = graph.stamp();
    let batch = crate::predicted::generate(
        specs,
        source.side,
        source.data_type.as_deref(),
        anchor,
        stamp,
        config,
    );

    gesture.clear_transients();
    if !batch.is_empty() {
        gesture.predicted = batch;
        gesture.source_port = Some(source.clone());
        gesture.drag_side = Some(source.side);
    }
    events.push(CanvasEvent::RepaintNeeded);
}

/// Click resolution: instantiate the ghost and auto-wire to the FIRST
/// compatible port on its opposite side (first-match, not best-match).
fn resolve_predicted_click(
    gesture: &mut GestureState,
    graph: &mut GraphStore,
    ghost_id: &str,
    events: &mut Vec<CanvasEvent>,
) {
    let Some(ghost) = gesture.predicted.iter().find(|g| g.id == ghost_id).cloned() else {
        gesture.clear_transients();
        return;
    };

    let node_id = graph.add_node(ghost.data.clone(), ghost.position).id.clone();

    if let (Some(source), Some(side)) = (gesture.source_port.clone(), gesture.drag_side) {
        match side {
            PortSide::Output => {
                if let Some(input) =
                    crate::predicted::first_compatible_input(&ghost.data, source.data_type.as_deref())
                {
                    let target = PortRef::new(&node_id, &input.id, PortSide::Input)
                        .with_type(input.data_type.clone());
                    if let Err(reason) = graph.add_edge(source, target) {
                        debug!(%reason, "predicted auto-connect rejected");
                    }
                }
            }
            PortSide::Input => {
                if let Some(output) =
                    crate::predicted::first_compatible_output(&ghost.data, source.data_type.as_deref())
                {
                    let new_source = PortRef::new(&node_id, &output.id, PortSide::Output)
                        .with_type(output.data_type.clone());
                    if let Err(reason) = graph.add_edge(new_source, source) {
                        debug!(%reason, "predicted auto-connect rejected");
                    }
                }
            }
        }
    }

    debug!(node = %node_id, "predicted node instantiated by click");
    gesture.clear_transients();
    events.push(CanvasEvent::RepaintNeeded);
}

/// Snap resolution: instantiate the ghost and wire to the specific snapped
/// port (more precise than the click path's first-match).
fn convert_predicted_snap(
    gesture: &mut GestureState,
    graph: &mut GraphStore,
    key: &PortKey,
    drag_source: &PortRef,
    events: &mut Vec<CanvasEvent>,
) {
    let Some(ghost) = gesture.predicted.iter().find(|g| g.id == key.node_id).cloned() else {
        gesture.clear_transients();
        return;
    };

    let port_type = ghost.data.port(key.side, &key.port_id).and_then(|p| p.data_type.clone());
    let node_id = graph.add_node(ghost.data.clone(), ghost.position).id.clone();
    let ghost_end = PortRef::new(&node_id, &key.port_id, key.side).with_type(port_type);

    let result = match key.side {
        PortSide::Input => graph.add_edge(drag_source.clone(), ghost_end),
        PortSide::Output => graph.add_edge(ghost_end, drag_source.clone()),
    };
    match result {
        Ok(edge) => debug!(edge = %edge.id, node = %node_id, "predicted node snap-connected"),
        Err(reason) => debug!(%reason, "predicted snap-connect rejected"),
    }

    gesture.clear_transients();
    events.push(CanvasEvent::RepaintNeeded);
}
