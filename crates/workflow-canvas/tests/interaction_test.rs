use glam::Vec2;
use workflow_canvas::input::{InputState, Key, ModifiersState, MouseButtons};
use workflow_canvas::interaction::{CanvasEvent, DragState};
use workflow_canvas::model::{NodeSpec, PortRef, PortSide, PortSpec};
use workflow_canvas::{CanvasConfig, WorkflowCanvas};

fn port(id: &str, data_type: &str, multi: bool) -> PortSpec {
    PortSpec {
        id: id.to_string(),
        name: id.to_string(),
        data_type: Some(data_type.to_string()),
        required: false,
        multi,
    }
}

fn spec(id: &str, inputs: Vec<PortSpec>, outputs: Vec<PortSpec>) -> NodeSpec {
    NodeSpec {
        id: id.to_string(),
        node_name: id.to_string(),
        function_id: Some(format!("fn-{id}")),
        inputs,
        outputs,
        parameters: vec![],
    }
}

fn number_spec() -> NodeSpec {
    spec("number", vec![], vec![port("out", "INT", false)])
}

fn sink_spec() -> NodeSpec {
    spec("sink", vec![port("in", "FLOAT", false)], vec![])
}

fn frame(pointer: Vec2, left: bool, time_ms: u64) -> InputState {
    InputState {
        pointer,
        buttons: MouseButtons { left, ..Default::default() },
        time_ms,
        ..Default::default()
    }
}

fn key_frame(key: Key, command: bool) -> InputState {
    InputState {
        pressed_keys: vec![key],
        modifiers: ModifiersState { ctrl: command, ..Default::default() },
        ..Default::default()
    }
}

/// A `number` node at the origin and a `sink` at (800, 0). With default
/// config both are 450x160, so the output anchor sits at (450, 80) and the
/// sink's input anchor at (800, 80).
fn wired_pair(canvas: &mut WorkflowCanvas) -> (String, String) {
    let src = canvas.graph_mut().add_node(number_spec(), Vec2::ZERO).id.clone();
    let dst = canvas
        .graph_mut()
        .add_node(sink_spec(), Vec2::new(800.0, 0.0))
        .id
        .clone();
    (src, dst)
}

#[test]
fn test_panning() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());

    canvas.update(&frame(Vec2::new(1000.0, 500.0), true, 0));
    assert!(matches!(canvas.gesture.drag, DragState::Canvas { .. }));

    canvas.update(&frame(Vec2::new(1050.0, 520.0), true, 16));
    assert_eq!(canvas.view.x, 50.0);
    assert_eq!(canvas.view.y, 20.0);

    canvas.update(&frame(Vec2::new(1050.0, 520.0), false, 32));
    assert_eq!(canvas.gesture.drag, DragState::Idle);
}

#[test]
fn test_zoom_is_cursor_anchored_and_clamped() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let cursor = Vec2::new(100.0, 100.0);
    let world_before = canvas.view.screen_to_world(cursor);

    let mut input = frame(cursor, false, 0);
    input.scroll_delta = 1.0;
    canvas.update(&input);

    assert!((canvas.view.scale - 1.05).abs() < 1e-5);
    let world_after = canvas.view.screen_to_world(cursor);
    assert!(world_before.distance(world_after) < 1e-3, "zoom must anchor at the cursor");

    // Zooming out bottoms out at the minimum scale.
    let mut out = frame(cursor, false, 0);
    out.scroll_delta = -1.0;
    for _ in 0..200 {
        canvas.update(&out);
    }
    assert_eq!(canvas.view.scale, 0.6);
}

#[test]
fn test_node_drag_updates_position_and_selection() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let id = canvas
        .graph_mut()
        .add_node(number_spec(), Vec2::new(100.0, 100.0))
        .id
        .clone();

    // Press inside the body, away from the output anchor at (550, 180).
    canvas.update(&frame(Vec2::new(300.0, 150.0), true, 0));
    assert!(matches!(canvas.gesture.drag, DragState::Node { .. }));
    assert_eq!(canvas.selection().node.as_deref(), Some(id.as_str()));

    canvas.update(&frame(Vec2::new(350.0, 170.0), true, 16));
    let node = canvas.graph().node(&id).unwrap();
    assert_eq!(node.position, Vec2::new(150.0, 120.0));

    canvas.update(&frame(Vec2::new(350.0, 170.0), false, 32));
    assert_eq!(canvas.gesture.drag, DragState::Idle);
}

#[test]
fn test_edge_drag_commits_compatible_connection() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let (src, dst) = wired_pair(&mut canvas);

    canvas.update(&frame(Vec2::new(450.0, 80.0), true, 0));
    assert_eq!(canvas.gesture.drag, DragState::Edge);

    // Within snap range of the sink's input anchor at (800, 80).
    canvas.update(&frame(Vec2::new(780.0, 85.0), true, 300));
    let snap = canvas.gesture.snap.as_ref().expect("should snap to the input port");
    assert!(snap.valid, "INT feeding FLOAT is a valid widening");

    let (_, events) = canvas.update(&frame(Vec2::new(780.0, 85.0), false, 320));

    let edges = canvas.graph().edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source.node_id, src);
    assert_eq!(edges[0].target.node_id, dst);
    assert_eq!(edges[0].target.port_id, "in");

    assert!(
        events.iter().any(|e| matches!(e, CanvasEvent::StateChanged(_))),
        "committing an edge must report a state change"
    );
}

#[test]
fn test_edge_drag_rejects_incompatible_types() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    canvas
        .graph_mut()
        .add_node(spec("text", vec![], vec![port("out", "STRING", false)]), Vec2::ZERO);
    canvas
        .graph_mut()
        .add_node(sink_spec(), Vec2::new(800.0, 0.0));

    canvas.update(&frame(Vec2::new(450.0, 80.0), true, 0));
    canvas.update(&frame(Vec2::new(780.0, 85.0), true, 300));
    let snap = canvas.gesture.snap.as_ref().expect("in range, so still a snap candidate");
    assert!(!snap.valid, "STRING cannot feed FLOAT");

    canvas.update(&frame(Vec2::new(780.0, 85.0), false, 320));
    assert_eq!(canvas.graph().edges().len(), 0, "invalid drops must not create edges");
    assert!(canvas.gesture.edge_preview.is_none());
}

#[test]
fn test_edge_drag_from_bare_input_commits_onto_output() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let (src, dst) = wired_pair(&mut canvas);

    // Pressing the unwired input starts a fresh rubber-band from that input.
    canvas.update(&frame(Vec2::new(800.0, 80.0), true, 0));
    assert_eq!(canvas.gesture.drag, DragState::Edge);
    let preview = canvas.gesture.edge_preview.as_ref().expect("rubber-band from the input");
    assert_eq!(preview.source.side, PortSide::Input);

    // Within snap range of the number's output anchor at (450, 80).
    canvas.update(&frame(Vec2::new(455.0, 85.0), true, 300));
    let snap = canvas.gesture.snap.as_ref().expect("should snap to the output port");
    assert!(snap.valid, "an INT output feeding this FLOAT input is a valid widening");

    canvas.update(&frame(Vec2::new(455.0, 85.0), false, 320));

    // The highlight's verdict holds at commit, and the edge is normalized
    // output -> input even though the drag started at the input end.
    let edges = canvas.graph().edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source.node_id, src);
    assert_eq!(edges[0].source.port_id, "out");
    assert_eq!(edges[0].target.node_id, dst);
    assert_eq!(edges[0].target.port_id, "in");
}

#[test]
fn test_regrab_detaches_edge_and_cancel_leaves_it_removed() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let (src, dst) = wired_pair(&mut canvas);
    canvas
        .graph_mut()
        .add_edge(
            PortRef::new(&src, "out", PortSide::Output).with_type(Some("INT".into())),
            PortRef::new(&dst, "in", PortSide::Input).with_type(Some("FLOAT".into())),
        )
        .unwrap();

    // Pressing the wired input picks the edge up by its source end.
    canvas.update(&frame(Vec2::new(800.0, 80.0), true, 0));
    assert_eq!(canvas.graph().edges().len(), 0, "re-grab detaches immediately");
    let preview = canvas.gesture.edge_preview.as_ref().expect("rubber-band from the old source");
    assert_eq!(preview.source.node_id, src);
    assert_eq!(preview.source.side, PortSide::Output);

    // Dropping over empty space just ends the gesture: no predictions, no
    // restored edge.
    canvas.update(&frame(Vec2::new(600.0, 400.0), true, 300));
    canvas.update(&frame(Vec2::new(600.0, 400.0), false, 320));
    assert_eq!(canvas.graph().edges().len(), 0);
    assert!(canvas.gesture.predicted.is_empty());
    assert!(canvas.gesture.edge_preview.is_none());
}

#[test]
fn test_regrab_can_rewire_to_another_input() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let (src, dst) = wired_pair(&mut canvas);
    let other = canvas
        .graph_mut()
        .add_node(sink_spec(), Vec2::new(800.0, 600.0))
        .id
        .clone();
    canvas
        .graph_mut()
        .add_edge(
            PortRef::new(&src, "out", PortSide::Output).with_type(Some("INT".into())),
            PortRef::new(&dst, "in", PortSide::Input).with_type(Some("FLOAT".into())),
        )
        .unwrap();

    canvas.update(&frame(Vec2::new(800.0, 80.0), true, 0));
    // Drag onto the other sink's input anchor at (800, 680).
    canvas.update(&frame(Vec2::new(805.0, 675.0), true, 300));
    canvas.update(&frame(Vec2::new(805.0, 675.0), false, 320));

    let edges = canvas.graph().edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source.node_id, src);
    assert_eq!(edges[0].target.node_id, other);
}

#[test]
fn test_delete_selected_node_and_undo() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let (src, _) = wired_pair(&mut canvas);
    canvas.select_node(&src);

    canvas.update(&key_frame(Key::Delete, false));
    assert!(canvas.graph().node(&src).is_none());
    assert_eq!(canvas.graph().nodes().len(), 1);

    canvas.update(&key_frame(Key::Z, true));
    assert!(canvas.graph().node(&src).is_some(), "undo restores the deleted node");
}

#[test]
fn test_copy_paste_offsets_the_clone() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    let id = canvas
        .graph_mut()
        .add_node(number_spec(), Vec2::new(100.0, 100.0))
        .id
        .clone();
    canvas.select_node(&id);

    canvas.update(&key_frame(Key::C, true));
    canvas.update(&key_frame(Key::V, true));

    let nodes = canvas.graph().nodes();
    assert_eq!(nodes.len(), 2);
    let pasted = &nodes[1];
    assert_ne!(pasted.id, id);
    assert_eq!(pasted.position, Vec2::new(150.0, 150.0));
    assert_eq!(canvas.selection().node.as_deref(), Some(pasted.id.as_str()));
}

#[test]
fn test_state_changed_is_suppressed_while_canvas_is_empty() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());

    // Panning an empty canvas changes the view but must stay silent.
    canvas.update(&frame(Vec2::new(100.0, 100.0), true, 0));
    let (_, events) = canvas.update(&frame(Vec2::new(150.0, 100.0), true, 16));
    assert!(!events.iter().any(|e| matches!(e, CanvasEvent::StateChanged(_))));

    canvas.graph_mut().add_node(number_spec(), Vec2::ZERO);
    let (_, events) = canvas.update(&InputState::default());
    assert!(events.iter().any(|e| matches!(e, CanvasEvent::StateChanged(_))));
}

#[test]
fn test_content_consumed_events_do_not_start_gestures() {
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    canvas.graph_mut().add_node(number_spec(), Vec2::new(100.0, 100.0));

    let mut input = frame(Vec2::new(300.0, 150.0), true, 0);
    input.event_consumed_by_content = true;
    canvas.update(&input);

    assert_eq!(canvas.gesture.drag, DragState::Idle);
    assert!(canvas.selection().node.is_none());
}
