//! # Port Registry
//!
//! A runtime map from `(node, port, side)` to the world-space position of
//! that port's visual anchor. The key is a struct with structural equality,
//! not a delimited string, so id contents can never collide with a key
//! separator.
//!
//! Anchors are recomputed from node layout after every graph mutation
//! (state -> layout -> registry, in that order); lookups for an unregistered
//! port simply return `None`, since ports legitimately come and go.

use std::collections::HashMap;

use glam::Vec2;

use crate::config::CanvasConfig;
use crate::graph::GraphStore;
use crate::model::{NodeSpec, PortSide, PredictedNode};

/// Composite registry key with structural equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PortKey {
    pub node_id: String,
    pub port_id: String,
    pub side: PortSide,
}

impl PortKey {
    pub fn new(node_id: impl Into<String>, port_id: impl Into<String>, side: PortSide) -> Self {
        Self { node_id: node_id.into(), port_id: port_id.into(), side }
    }
}

#[derive(Debug, Default)]
pub struct PortRegistry {
    positions: HashMap<PortKey, Vec2>,
}

/// Layout size of a node body: fixed width, height growing with the deeper
/// of the two port columns plus the parameter rows.
pub fn node_size(spec: &NodeSpec, config: &CanvasConfig) -> Vec2 {
    let port_rows = spec.inputs.len().max(spec.outputs.len()) as f32;
    let param_rows = spec.parameters.len() as f32;
    let height = config
        .node_min_height
        .max(config.node_min_height + (port_rows + param_rows) * config.port_row_height);
    Vec2::new(config.node_width, height)
}

/// Anchor of one port on a node at `position`: inputs on the left edge,
/// outputs on the right, each column distributed evenly over the height.
pub fn port_anchor(
    spec: &NodeSpec,
    position: Vec2,
    side: PortSide,
    index: usize,
    config: &CanvasConfig,
) -> Vec2 {
    let size = node_size(spec, config);
    let count = spec.ports(side).len().max(1) as f32;
    let y = position.y + size.y / (count + 1.0) * (index as f32 + 1.0);
    let x = match side {
        PortSide::Input => position.x,
        PortSide::Output => position.x + size.x,
    };
    Vec2::new(x, y)
}

impl PortRegistry {
    /// Idempotent upsert.
    pub fn register(&mut self, key: PortKey, position: Vec2) {
        self.positions.insert(key, position);
    }

    /// Idempotent removal.
    pub fn deregister(&mut self, key: &PortKey) {
        self.positions.remove(key);
    }

    /// Purges every entry belonging to a node; called when a node leaves the
    /// graph so no stale anchor survives.
    pub fn purge_node(&mut self, node_id: &str) {
        self.positions.retain(|key, _| key.node_id != node_id);
    }

    /// `None` means "cannot compute distance / cannot highlight", never an
    /// error.
    pub fn position(&self, key: &PortKey) -> Option<Vec2> {
        self.positions.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortKey, Vec2)> {
        self.positions.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Recomputes every anchor from the current node and predicted-node
    /// layout. Predicted ghosts register exactly like real nodes so the snap
    /// math treats them uniformly.
    pub fn sync(&mut self, graph: &GraphStore, predicted: &[PredictedNode], config: &CanvasConfig) {
        self.positions.clear();
        for node in graph.nodes() {
            self.register_node(&node.id, &node.data, node.position, config);
        }
        for ghost in predicted {
            self.register_node(&ghost.id, &ghost.data, ghost.position, config);
        }
    }

    fn register_node(&mut self, node_id: &str, spec: &NodeSpec, position: Vec2, config: &CanvasConfig) {
        for side in [PortSide::Input, PortSide::Output] {
            for (idx, port) in spec.ports(side).iter().enumerate() {
                self.register(
                    PortKey::new(node_id, &port.id, side),
                    port_anchor(spec, position, side, idx, config),
                );
            }
        }
    }
}
