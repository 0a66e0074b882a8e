//! # Graph Store
//!
//! The authoritative in-memory graph: ordered node and edge lists plus the
//! single-slot deletion undo buffer. All mutations preserve the order and
//! identity of unrelated entries, and bump a revision counter so the
//! controller can emit one state-changed event per update.

use glam::Vec2;
use serde_json::Value;
use tracing::debug;

use crate::connect::ConnectError;
use crate::model::{CanvasEdge, CanvasNode, IdClock, NodeSpec, Parameter, PortRef, PortSide};

/// The payload of the one-slot undo buffer: the removed node together with
/// every edge that was attached to it.
#[derive(Clone, Debug)]
pub struct DeletedNode {
    pub node: CanvasNode,
    pub edges: Vec<CanvasEdge>,
}

/// Outcome of `validate_required_inputs`: the first unmet required input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Required input \"{input_name}\" is missing in node \"{node_name}\"")]
pub struct ExecutionBlocker {
    pub node_id: String,
    pub node_name: String,
    pub input_name: String,
}

#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<CanvasNode>,
    edges: Vec<CanvasEdge>,
    last_deleted: Option<DeletedNode>,
    clock: IdClock,
    revision: u64,
}

impl GraphStore {
    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CanvasEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&CanvasEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Bumped on every mutation; the controller diffs it per update.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A stamp from the store's monotonic id clock, also used for edge and
    /// prediction ids so a whole session shares one ordering.
    pub fn stamp(&mut self) -> u64 {
        self.clock.next()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Resolves a port spec on a live node.
    pub fn port_spec(&self, node_id: &str, side: PortSide, port_id: &str) -> Option<&crate::model::PortSpec> {
        self.node(node_id).and_then(|n| n.data.port(side, port_id))
    }

    /// Instantiates `spec` at `position` with a fresh `"{template}-{stamp}"`
    /// id and appends it to the node list.
    pub fn add_node(&mut self, spec: NodeSpec, position: Vec2) -> &CanvasNode {
        let id = format!("{}-{}", spec.id, self.clock.next());
        debug!(node = %id, name = %spec.node_name, "node added");
        self.nodes.push(CanvasNode { id, data: spec, position });
        self.touch();
        self.nodes.last().expect("just pushed")
    }

    /// Inserts a node that already carries an id (paste, predicted-node
    /// conversion, undo restore).
    pub fn insert_node(&mut self, node: CanvasNode) -> &CanvasNode {
        debug!(node = %node.id, "node inserted");
        self.nodes.push(node);
        self.touch();
        self.nodes.last().expect("just pushed")
    }

    /// Replaces a node's position. Edges are untouched; their geometry is
    /// derived from port anchors at render time.
    pub fn move_node(&mut self, id: &str, position: Vec2) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        self.touch();
        true
    }

    /// Removes a node and every edge touching it, atomically, and records
    /// the pair in the undo slot (overwriting any previous recording).
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(idx) = self.nodes.iter().position(|n| n.id == id) else {
            return false;
        };
        let node = self.nodes.remove(idx);
        let (cascade, kept): (Vec<_>, Vec<_>) = self.edges.drain(..).partition(|e| e.touches(id));
        self.edges = kept;
        debug!(node = %id, cascaded_edges = cascade.len(), "node removed");
        self.last_deleted = Some(DeletedNode { node, edges: cascade });
        self.touch();
        true
    }

    /// Restores the most recently deleted node and its edges, with their
    /// original ids and positions. Single level: returns `false` when the
    /// slot is empty.
    pub fn undo_delete(&mut self) -> bool {
        let Some(DeletedNode { node, edges }) = self.last_deleted.take() else {
            return false;
        };
        debug!(node = %node.id, edges = edges.len(), "deletion undone");
        self.nodes.push(node);
        self.edges.extend(edges);
        self.touch();
        true
    }

    /// Inserts an output->input edge. The caller (the connection engine) has
    /// already verified type compatibility, direction, and self-loop rules;
    /// this enforces the data-model invariants: duplicate signatures are
    /// rejected, and a non-multi target input evicts its existing edge.
    pub fn add_edge(&mut self, source: PortRef, target: PortRef) -> Result<&CanvasEdge, ConnectError> {
        let duplicate = self.edges.iter().any(|e| {
            e.source.node_id == source.node_id
                && e.source.port_id == source.port_id
                && e.target.node_id == target.node_id
                && e.target.port_id == target.port_id
        });
        if duplicate {
            return Err(ConnectError::Duplicate);
        }

        let multi = self
            .port_spec(&target.node_id, PortSide::Input, &target.port_id)
            .map(|p| p.multi)
            .unwrap_or(false);
        if !multi {
            self.edges
                .retain(|e| !(e.target.node_id == target.node_id && e.target.port_id == target.port_id));
        }

        let id = format!(
            "edge-{}:{}-{}:{}-{}",
            source.node_id,
            source.port_id,
            target.node_id,
            target.port_id,
            self.clock.next()
        );
        debug!(edge = %id, "edge added");
        self.edges.push(CanvasEdge { id, source, target });
        self.touch();
        Ok(self.edges.last().expect("just pushed"))
    }

    /// Removes an edge by id; no cascade.
    pub fn remove_edge(&mut self, id: &str) -> Option<CanvasEdge> {
        let idx = self.edges.iter().position(|e| e.id == id)?;
        let edge = self.edges.remove(idx);
        debug!(edge = %id, "edge removed");
        self.touch();
        Some(edge)
    }

    /// Edges terminating at an input port, in insertion order.
    pub fn edges_into<'a>(
        &'a self,
        node_id: &'a str,
        port_id: &'a str,
    ) -> impl Iterator<Item = &'a CanvasEdge> {
        self.edges
            .iter()
            .filter(move |e| e.target.node_id == node_id && e.target.port_id == port_id)
    }

    /// Updates a parameter value. When the stored value is numeric, a string
    /// payload is coerced back to a number; a write that leaves the value
    /// unchanged is a no-op and does not bump the revision.
    pub fn update_parameter_value(&mut self, node_id: &str, param_id: &str, value: Value) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };
        let Some(param) = node.data.parameters.iter_mut().find(|p| p.id == param_id) else {
            return false;
        };
        let coerced = coerce_like(&param.value, value);
        if param.value == coerced {
            return false;
        }
        debug!(node = %node_id, param = %param_id, "parameter updated");
        param.value = coerced;
        self.revision += 1;
        true
    }

    pub fn rename_node(&mut self, node_id: &str, new_name: &str) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };
        if node.data.node_name == new_name {
            return false;
        }
        node.data.node_name = new_name.to_string();
        self.revision += 1;
        true
    }

    /// Renames a parameter. The id follows the name, matching how added
    /// parameters are keyed.
    pub fn rename_parameter(&mut self, node_id: &str, param_id: &str, new_name: &str) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };
        let Some(param) = node.data.parameters.iter_mut().find(|p| p.id == param_id) else {
            return false;
        };
        if param.name == new_name {
            return false;
        }
        param.name = new_name.to_string();
        param.id = new_name.to_string();
        self.revision += 1;
        true
    }

    pub fn add_parameter(&mut self, node_id: &str, parameter: Parameter) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };
        node.data.parameters.push(parameter);
        self.revision += 1;
        true
    }

    pub fn delete_parameter(&mut self, node_id: &str, param_id: &str) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };
        let before = node.data.parameters.len();
        node.data.parameters.retain(|p| p.id != param_id);
        if node.data.parameters.len() == before {
            return false;
        }
        self.revision += 1;
        true
    }

    /// Scans every node's required inputs; the first one with no incoming
    /// edge blocks execution.
    pub fn validate_required_inputs(&self) -> Result<(), ExecutionBlocker> {
        for node in &self.nodes {
            for input in &node.data.inputs {
                if !input.required {
                    continue;
                }
                let wired = self.edges.iter().any(|e| {
                    e.target.node_id == node.id && e.target.port_id == input.id
                });
                if !wired {
                    return Err(ExecutionBlocker {
                        node_id: node.id.clone(),
                        node_name: node.data.node_name.clone(),
                        input_name: input.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Bulk replacement used by snapshot loading. Clears the undo slot: a
    /// loaded workflow has no deletion history.
    pub fn replace(&mut self, nodes: Option<Vec<CanvasNode>>, edges: Option<Vec<CanvasEdge>>) {
        if let Some(nodes) = nodes {
            self.nodes = nodes;
        }
        if let Some(edges) = edges {
            self.edges = edges;
        }
        self.last_deleted = None;
        self.touch();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Coerces `new` to a number when `old` is numeric and `new` parses as one.
fn coerce_like(old: &Value, new: Value) -> Value {
    if !old.is_number() {
        return new;
    }
    match &new {
        Value::String(s) => {
            if let Ok(int) = s.parse::<i64>() {
                Value::from(int)
            } else if let Ok(float) = s.parse::<f64>() {
                serde_json::Number::from_f64(float).map(Value::Number).unwrap_or(new)
            } else {
                new
            }
        }
        _ => new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str) -> NodeSpec {
        NodeSpec {
            id: id.to_string(),
            node_name: id.to_uppercase(),
            function_id: None,
            inputs: vec![],
            outputs: vec![],
            parameters: vec![Parameter {
                id: "count".into(),
                name: "count".into(),
                data_type: Some("INT".into()),
                value: Value::from(3),
                required: false,
                options: vec![],
                min: None,
                max: None,
                handle_id: false,
            }],
        }
    }

    #[test]
    fn instance_ids_are_unique_per_template() {
        let mut graph = GraphStore::default();
        let a = graph.add_node(spec("llm"), Vec2::ZERO).id.clone();
        let b = graph.add_node(spec("llm"), Vec2::ZERO).id.clone();
        assert_ne!(a, b);
        assert!(a.starts_with("llm-"));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let mut graph = GraphStore::default();
        let id = graph.add_node(spec("llm"), Vec2::ZERO).id.clone();
        assert!(graph.update_parameter_value(&id, "count", Value::from("7")));
        assert_eq!(graph.node(&id).unwrap().data.parameters[0].value, Value::from(7));
        // Equal write is a no-op.
        assert!(!graph.update_parameter_value(&id, "count", Value::from(7)));
    }

    #[test]
    fn rename_parameter_rewrites_id() {
        let mut graph = GraphStore::default();
        let id = graph.add_node(spec("llm"), Vec2::ZERO).id.clone();
        assert!(graph.rename_parameter(&id, "count", "limit"));
        let param = &graph.node(&id).unwrap().data.parameters[0];
        assert_eq!(param.name, "limit");
        assert_eq!(param.id, "limit");
    }
}
