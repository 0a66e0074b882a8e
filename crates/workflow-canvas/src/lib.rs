//! # workflow-canvas
//!
//! `workflow_canvas` is a headless, retained-mode editor for node-based
//! workflow graphs. It owns the state, mathematics, and interaction logic of
//! the canvas, while delegating all rendering to the host application.
//!
//! ## Core Architecture
//! - **Graph (`src/graph.rs`)**: Ordered node/edge lists with a single-slot
//!   deletion undo buffer.
//! - **View (`src/view.rs`)**: World <-> screen transforms with
//!   cursor-anchored zooming.
//! - **Interaction (`src/interaction.rs`)**: The drag/gesture state machine,
//!   including edge drawing, snapping, and predicted-node resolution.
//! - **Render (`src/render.rs`)**: Outputs a list of `DrawCommand`s for the
//!   host to render.
//!
//! The host feeds an `InputState` per frame into [`WorkflowCanvas::update`]
//! and receives the display list plus any logic events back.

pub mod config;
pub mod connect;
pub mod graph;
pub mod input;
pub mod interaction;
pub mod math;
pub mod model;
pub mod painter;
pub mod persistence;
pub mod predicted;
pub mod registry;
pub mod render;
pub mod view;

use glam::Vec2;
use tracing::debug;

use graph::{ExecutionBlocker, GraphStore};
use input::InputState;
use interaction::{GestureState, Selection};
use math::Rect;
use model::{CanvasEdge, CanvasNode, NodeSpec, Parameter};
use registry::PortRegistry;
use render::RenderList;
use view::View;

// Re-exports for convenience
pub use config::CanvasConfig;
pub use interaction::CanvasEvent;
pub use persistence::CanvasState;

/// The main entry point for the library.
///
/// Holds the entire editor: viewport, graph, port registry, gesture state,
/// selection, and the palette of node templates. Instantiate once and drive
/// it with [`WorkflowCanvas::update`] every frame (or on event).
pub struct WorkflowCanvas {
    pub config: CanvasConfig,
    pub view: View,
    graph: GraphStore,
    registry: PortRegistry,
    /// Current gesture state (drag machine, rubber-band, predictions).
    pub gesture: GestureState,
    selection: Selection,
    clipboard: Option<CanvasNode>,
    specs: Vec<NodeSpec>,
    viewport_size: Vec2,
    last_revision: u64,
    last_view: View,
}

impl WorkflowCanvas {
    /// Creates a new canvas with the given configuration.
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            view: View::default(),
            graph: GraphStore::default(),
            registry: PortRegistry::default(),
            gesture: GestureState::default(),
            selection: Selection::default(),
            clipboard: None,
            specs: Vec::new(),
            viewport_size: Vec2::new(800.0, 600.0),
            last_revision: 0,
            last_view: View::default(),
        }
    }

    /// Updates the viewport size (e.g. on window resize).
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
    }

    /// Installs the palette of node templates available for prediction and
    /// placement.
    pub fn set_available_node_specs(&mut self, specs: Vec<NodeSpec>) {
        self.specs = specs;
    }

    /// The core update loop.
    ///
    /// Processes one frame of input against the editor state and returns the
    /// display list plus any logic events. A `StateChanged` event carries the
    /// full snapshot whenever nodes, edges, or the viewport changed; it is
    /// suppressed while the graph is empty so a blank canvas never overwrites
    /// externally persisted state.
    pub fn update(&mut self, input: &InputState) -> (RenderList, Vec<CanvasEvent>) {
        let mut events = Vec::new();

        // Anchors must be current before hit-testing.
        self.registry
            .sync(&self.graph, &self.gesture.predicted, &self.config);

        interaction::handle(
            &mut self.gesture,
            &mut self.view,
            &mut self.selection,
            &mut self.clipboard,
            &mut self.graph,
            &self.registry,
            &self.specs,
            &self.config,
            input,
            &mut events,
        );

        // Gestures may have moved nodes or spawned predictions this frame.
        self.registry
            .sync(&self.graph, &self.gesture.predicted, &self.config);

        if self.graph.revision() != self.last_revision || self.view != self.last_view {
            self.last_revision = self.graph.revision();
            self.last_view = self.view;
            if !self.graph.is_empty() {
                events.push(CanvasEvent::StateChanged(self.canvas_state()));
            }
        }

        let draw_list = painter::Painter::draw_frame(
            &self.view,
            &self.config,
            &self.graph,
            &self.registry,
            &self.gesture,
            &self.selection,
            self.viewport_size,
        );

        (draw_list, events)
    }

    /// The current snapshot: viewport plus graph content.
    pub fn canvas_state(&self) -> CanvasState {
        CanvasState::new(
            self.view,
            self.graph.nodes().to_vec(),
            self.graph.edges().to_vec(),
        )
    }

    /// Restores a snapshot. Missing sections keep their current value, so a
    /// partial snapshot (say, nodes without a saved viewport) loads cleanly.
    pub fn load_canvas_state(&mut self, state: CanvasState) {
        if let Some(view) = state.view {
            self.view = view;
        }
        self.graph.replace(state.nodes, state.edges);
        self.gesture.clear_transients();
        self.selection.clear();
        // The loaded snapshot is the new baseline, not a change to report.
        self.last_revision = self.graph.revision();
        self.last_view = self.view;
        self.registry
            .sync(&self.graph, &self.gesture.predicted, &self.config);
        debug!(
            nodes = self.graph.nodes().len(),
            edges = self.graph.edges().len(),
            "canvas state loaded"
        );
    }

    /// Restores graph content only, leaving the viewport untouched. `None`
    /// sections keep their current value.
    pub fn load_workflow_state(
        &mut self,
        nodes: Option<Vec<CanvasNode>>,
        edges: Option<Vec<CanvasEdge>>,
    ) {
        self.graph.replace(nodes, edges);
        self.gesture.clear_transients();
        self.selection.clear();
        self.last_revision = self.graph.revision();
        self.registry
            .sync(&self.graph, &self.gesture.predicted, &self.config);
    }

    /// Direct read access to the graph.
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Mutable graph access for hosts that drive edits imperatively. The next
    /// `update` reports the mutation through `StateChanged`.
    pub fn graph_mut(&mut self) -> &mut GraphStore {
        &mut self.graph
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_node(&mut self, id: &str) {
        self.selection.select_node(id);
    }

    pub fn select_edge(&mut self, id: &str) {
        self.selection.select_edge(id);
    }

    /// Instantiates a template at a screen position (e.g. palette drop).
    pub fn add_node_at_screen(&mut self, spec: NodeSpec, screen: Vec2) -> String {
        let world = self.view.screen_to_world(screen);
        let id = self.graph.add_node(spec, world).id.clone();
        self.selection.select_node(id.clone());
        id
    }

    /// Recenters the viewport on the graph's bounding box at default zoom.
    /// An empty graph resets to the default view.
    pub fn center_view(&mut self) {
        let mut bounds: Option<Rect> = None;
        for node in self.graph.nodes() {
            let rect = Rect::new(node.position, registry::node_size(&node.data, &self.config));
            bounds = Some(match bounds {
                Some(b) => b.union(&rect),
                None => rect,
            });
        }
        self.view = match bounds {
            Some(b) => view::centered_view(self.viewport_size, b.min, b.size()),
            None => View::default(),
        };
    }

    /// Checks every required input is wired. On failure the offending node is
    /// selected so the host can scroll it into view alongside the message.
    pub fn validate_and_prepare_execution(&mut self) -> Result<(), ExecutionBlocker> {
        match self.graph.validate_required_inputs() {
            Ok(()) => Ok(()),
            Err(blocker) => {
                self.selection.select_node(blocker.node_id.clone());
                Err(blocker)
            }
        }
    }

    pub fn update_node_parameter(
        &mut self,
        node_id: &str,
        param_id: &str,
        value: serde_json::Value,
    ) -> bool {
        self.graph.update_parameter_value(node_id, param_id, value)
    }

    pub fn rename_node(&mut self, node_id: &str, new_name: &str) -> bool {
        self.graph.rename_node(node_id, new_name)
    }

    pub fn rename_node_parameter(
        &mut self,
        node_id: &str,
        param_id: &str,
        new_name: &str,
    ) -> bool {
        self.graph.rename_parameter(node_id, param_id, new_name)
    }

    pub fn add_node_parameter(&mut self, node_id: &str, parameter: Parameter) -> bool {
        self.graph.add_parameter(node_id, parameter)
    }

    pub fn delete_node_parameter(&mut self, node_id: &str, param_id: &str) -> bool {
        self.graph.delete_parameter(node_id, param_id)
    }
}
