//! # Persistence
//!
//! Serializable snapshots of the editor state. The wire format is the plain
//! `{view, nodes, edges}` JSON shape used by the hosting application, with
//! camelCase field names on the graph types so snapshots round-trip exactly.

use serde::{Deserialize, Serialize};

use crate::model::{CanvasEdge, CanvasNode};
use crate::view::View;

/// A full snapshot of the canvas: viewport plus graph content.
///
/// All three sections are optional on load so a host can restore a partial
/// snapshot (for example graph content without a saved viewport).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CanvasState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<CanvasNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<CanvasEdge>>,
}

impl CanvasState {
    pub fn new(view: View, nodes: Vec<CanvasNode>, edges: Vec<CanvasEdge>) -> Self {
        Self {
            view: Some(view),
            nodes: Some(nodes),
            edges: Some(edges),
        }
    }

    /// Serializes the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a snapshot from JSON. Missing sections stay `None`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
