use glam::Vec2;
use workflow_canvas::input::{InputState, MouseButtons};
use workflow_canvas::interaction::CanvasEvent;
use workflow_canvas::model::{NodeSpec, PortSpec};
use workflow_canvas::{CanvasConfig, WorkflowCanvas};

fn port(id: &str, data_type: &str) -> PortSpec {
    PortSpec {
        id: id.to_string(),
        name: id.to_string(),
        data_type: Some(data_type.to_string()),
        required: false,
        multi: false,
    }
}

fn frame(pointer: Vec2, left: bool, time_ms: u64) -> InputState {
    InputState {
        pointer,
        buttons: MouseButtons { left, ..Default::default() },
        time_ms,
        ..Default::default()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== workflow-canvas Headless Demo ===");

    // 1. Initialize the canvas and the template palette.
    let mut canvas = WorkflowCanvas::new(CanvasConfig::default());
    canvas.set_viewport_size(Vec2::new(1280.0, 720.0));
    canvas.set_available_node_specs(vec![
        NodeSpec {
            id: "number".into(),
            node_name: "Number".into(),
            function_id: Some("fn-number".into()),
            inputs: vec![],
            outputs: vec![port("out", "INT")],
            parameters: vec![],
        },
        NodeSpec {
            id: "accumulator".into(),
            node_name: "Accumulator".into(),
            function_id: Some("fn-accumulator".into()),
            inputs: vec![port("in", "FLOAT")],
            outputs: vec![port("sum", "FLOAT")],
            parameters: vec![],
        },
    ]);

    // 2. Drop a source node onto the canvas.
    let src = canvas.add_node_at_screen(
        NodeSpec {
            id: "number".into(),
            node_name: "Number".into(),
            function_id: Some("fn-number".into()),
            inputs: vec![],
            outputs: vec![port("out", "INT")],
            parameters: vec![],
        },
        Vec2::new(0.0, 0.0),
    );
    println!("Placed source node {src}");

    // 3. Click its output port: compatible templates appear as ghosts.
    //    The output anchor sits at (450, 80) with the default layout.
    canvas.update(&frame(Vec2::new(450.0, 80.0), true, 0));
    canvas.update(&frame(Vec2::new(450.0, 80.0), false, 100));
    println!("Predicted nodes: {}", canvas.gesture.predicted.len());
    for ghost in &canvas.gesture.predicted {
        println!("  - {} at {:?}", ghost.id, ghost.position);
    }

    // 4. Click the first ghost: it becomes a real node, auto-wired back.
    if let Some(ghost_pos) = canvas.gesture.predicted.first().map(|g| g.position) {
        let inside = ghost_pos + Vec2::new(100.0, 30.0);
        canvas.update(&frame(inside, true, 300));
        let (_, events) = canvas.update(&frame(inside, false, 350));
        for event in &events {
            if let CanvasEvent::StateChanged(state) = event {
                let json = state.to_json().unwrap_or_default();
                println!("State changed ({} bytes of snapshot)", json.len());
            }
        }
    }

    println!(
        "Graph now holds {} nodes and {} edges:",
        canvas.graph().nodes().len(),
        canvas.graph().edges().len()
    );
    for node in canvas.graph().nodes() {
        println!("  - node {} at {:?}", node.id, node.position);
    }
    for edge in canvas.graph().edges() {
        println!(
            "  - edge {}:{} -> {}:{}",
            edge.source.node_id, edge.source.port_id, edge.target.node_id, edge.target.port_id
        );
    }

    // 5. One more frame renders the display list the host would draw.
    let (draw_list, _) = canvas.update(&InputState::default());
    println!("Display list: {} draw commands", draw_list.len());
}
