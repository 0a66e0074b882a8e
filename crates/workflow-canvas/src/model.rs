//! # Core Data Models
//!
//! This module defines the fundamental data model for the workflow graph:
//! node templates (`NodeSpec`), graph instances (`CanvasNode`), typed ports,
//! edges, and the ephemeral predicted-node suggestions.
//!
//! Instance ids are strings (`"{template}-{stamp}"`) so that a persisted
//! snapshot round-trips byte-for-byte; the serialized field names match the
//! workflow snapshot format (`nodeName`, `portType`, ...).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direction of a port. The serialized form is the snapshot's `portType`
/// string (`"input"` / `"output"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortSide {
    Input,
    Output,
}

impl PortSide {
    pub fn opposite(self) -> Self {
        match self {
            PortSide::Input => PortSide::Output,
            PortSide::Output => PortSide::Input,
        }
    }
}

/// A port declared by a node template.
///
/// `data_type` is an open type tag (`"INT"`, `"FLOAT"`, `"STR"`, `"ANY"`, ...).
/// A missing tag is treated as compatible with everything.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortSpec {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Inputs only: execution validation fails while this port is unwired.
    #[serde(default)]
    pub required: bool,
    /// Inputs only: whether more than one incoming edge is allowed.
    #[serde(default)]
    pub multi: bool,
}

/// A selectable option for an enumerated parameter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterOption {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A configurable value on a node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    pub value: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParameterOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Marks the parameter as externally bindable (schema providers).
    #[serde(default)]
    pub handle_id: bool,
}

/// A node template ("spec"). Multiple graph nodes may be instantiated from
/// the same template; the instance then owns its own mutable copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(rename = "nodeName")]
    pub node_name: String,
    #[serde(rename = "functionId", default, skip_serializing_if = "Option::is_none")]
    pub function_id: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PortSpec>,
    #[serde(default)]
    pub outputs: Vec<PortSpec>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl NodeSpec {
    pub fn ports(&self, side: PortSide) -> &[PortSpec] {
        match side {
            PortSide::Input => &self.inputs,
            PortSide::Output => &self.outputs,
        }
    }

    pub fn port(&self, side: PortSide, port_id: &str) -> Option<&PortSpec> {
        self.ports(side).iter().find(|p| p.id == port_id)
    }
}

/// A node placed on the canvas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: String,
    pub data: NodeSpec,
    /// World-space position of the top-left corner.
    pub position: Vec2,
}

/// One end of an edge (or of the rubber-band preview).
///
/// `data_type` rides along on preview sources so compatibility checks do not
/// need a node lookup mid-gesture; it is omitted from the wire format when
/// absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortRef {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(rename = "portId")]
    pub port_id: String,
    #[serde(rename = "portType")]
    pub side: PortSide,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl PortRef {
    pub fn new(node_id: impl Into<String>, port_id: impl Into<String>, side: PortSide) -> Self {
        Self {
            node_id: node_id.into(),
            port_id: port_id.into(),
            side,
            data_type: None,
        }
    }

    pub fn with_type(mut self, data_type: Option<String>) -> Self {
        self.data_type = data_type;
        self
    }
}

/// A committed connection. `source` is always the output end and `target`
/// the input end, regardless of which end the user dragged from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanvasEdge {
    pub id: String,
    pub source: PortRef,
    pub target: PortRef,
}

impl CanvasEdge {
    /// The duplicate-detection signature: same source and target port pair.
    pub fn signature(&self) -> (&str, &str, &str, &str) {
        (
            &self.source.node_id,
            &self.source.port_id,
            &self.target.node_id,
            &self.target.port_id,
        )
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source.node_id == node_id || self.target.node_id == node_id
    }
}

/// An ephemeral node suggestion shown near a dragged/clicked port. Never part
/// of the persisted graph; discarded on any unrelated gesture.
#[derive(Clone, Debug)]
pub struct PredictedNode {
    pub id: String,
    pub data: NodeSpec,
    pub position: Vec2,
    pub hovered: bool,
}

impl PredictedNode {
    pub fn is_predicted_id(node_id: &str) -> bool {
        node_id.starts_with("predicted-")
    }
}

/// Monotonic millisecond clock used to stamp instance/edge/prediction ids.
///
/// Wall-clock millis, bumped by one whenever two stamps would collide, so a
/// burst of instantiations still yields unique ids.
#[derive(Clone, Debug, Default)]
pub struct IdClock {
    last: u64,
}

impl IdClock {
    pub fn next(&mut self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last + 1);
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_clock_is_strictly_monotonic() {
        let mut clock = IdClock::default();
        let a = clock.next();
        let b = clock.next();
        let c = clock.next();
        assert!(a < b && b < c);
    }

    #[test]
    fn port_ref_serializes_snapshot_field_names() {
        let port = PortRef::new("n1", "text", PortSide::Input);
        let json = serde_json::to_value(&port).unwrap();
        assert_eq!(json["nodeId"], "n1");
        assert_eq!(json["portId"], "text");
        assert_eq!(json["portType"], "input");
        assert!(json.get("type").is_none());
    }
}
