//! # Connection / Compatibility Engine
//!
//! The single source of truth for port type compatibility, the ordered
//! commit rules for new edges, and the nearest-snap-target search used while
//! an edge drag is in flight. Live highlighting and commit validation share
//! `sides_compatible`, so the two can never disagree about a target; it and
//! the predicted-node filters all reduce to the same `types_compatible`.

use glam::Vec2;
use tracing::trace;

use crate::graph::GraphStore;
use crate::model::{CanvasEdge, PortRef, PortSide, PredictedNode};
use crate::registry::{PortKey, PortRegistry};

/// The universal wildcard target type.
pub const ANY_TYPE: &str = "ANY";

/// Directional compatibility: can a value of `source` flow into `target`?
///
/// Missing tags are permissive; identical tags match; `ANY` targets accept
/// everything; `INT` widens to `FLOAT`. Everything else is incompatible.
pub fn types_compatible(source: Option<&str>, target: Option<&str>) -> bool {
    match (source, target) {
        (None, _) | (_, None) => true,
        (Some(s), Some(t)) => s == t || t == ANY_TYPE || (s == "INT" && t == "FLOAT"),
    }
}

/// Why a connection attempt was rejected. These never surface as user-facing
/// errors; the gesture machine treats any of them as a silent cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("port types are incompatible")]
    Incompatible,
    #[error("cannot join two ports of the same direction")]
    SameSide,
    #[error("cannot connect a node to itself")]
    SelfLoop,
    #[error("an identical edge already exists")]
    Duplicate,
    #[error("port not found")]
    UnknownPort,
}

/// Commits a connection between the rubber-band source and a drop target,
/// applying the rules in order: type compatibility, opposite directions,
/// distinct nodes, then the store's duplicate/multiplicity invariants.
///
/// The edge is normalized so its source is always the output end, whichever
/// end the user dragged from. The type check runs through the same
/// [`sides_compatible`] rule as snap highlighting, so a port highlighted as
/// a valid target is exactly a port this function accepts.
pub fn commit_connection<'a>(
    graph: &'a mut GraphStore,
    drag_source: &PortRef,
    drop: &PortRef,
) -> Result<&'a CanvasEdge, ConnectError> {
    if !sides_compatible(drag_source, drop.data_type.as_deref(), drop.side) {
        return Err(ConnectError::Incompatible);
    }
    if drag_source.side == drop.side {
        return Err(ConnectError::SameSide);
    }
    if drag_source.node_id == drop.node_id {
        return Err(ConnectError::SelfLoop);
    }

    let (source, target) = if drag_source.side == PortSide::Input {
        (drop.clone(), drag_source.clone())
    } else {
        (drag_source.clone(), drop.clone())
    };
    graph.add_edge(source, target)
}

/// The candidate a dragged edge end would land on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapTarget {
    pub key: PortKey,
    /// False when the port is in range but its type does not accept the
    /// dragged value; rendered as the invalid highlight.
    pub valid: bool,
}

/// Directional compatibility between the drag source and a candidate port on
/// the opposite side: the output end's type always plays the source role.
fn sides_compatible(source: &PortRef, candidate_type: Option<&str>, candidate_side: PortSide) -> bool {
    match candidate_side {
        PortSide::Input => types_compatible(source.data_type.as_deref(), candidate_type),
        PortSide::Output => types_compatible(candidate_type, source.data_type.as_deref()),
    }
}

/// Finds the nearest snappable port within `snap_distance` of the pointer
/// (world space). Candidates sit on the side opposite the drag source.
///
/// Real ports on other nodes are candidates whether or not the type matches
/// (a mismatch is reported through `valid` and rendered as the invalid
/// highlight). Predicted-node ports are candidates only when compatible.
pub fn find_snap_target(
    graph: &GraphStore,
    registry: &PortRegistry,
    predicted: &[PredictedNode],
    source: &PortRef,
    pointer_world: Vec2,
    snap_distance: f32,
) -> Option<SnapTarget> {
    let wanted_side = source.side.opposite();
    let mut best_dist = snap_distance;
    let mut best: Option<SnapTarget> = None;

    for (key, pos) in registry.iter() {
        if PredictedNode::is_predicted_id(&key.node_id) {
            continue;
        }
        if key.side != wanted_side || key.node_id == source.node_id {
            continue;
        }
        let dist = pos.distance(pointer_world);
        if dist < best_dist {
            let valid = graph
                .port_spec(&key.node_id, key.side, &key.port_id)
                .map(|p| sides_compatible(source, p.data_type.as_deref(), key.side))
                .unwrap_or(false);
            best_dist = dist;
            best = Some(SnapTarget { key: key.clone(), valid });
        }
    }

    for node in predicted {
        for port in node.data.ports(wanted_side) {
            if !sides_compatible(source, port.data_type.as_deref(), wanted_side) {
                continue;
            }
            let key = PortKey::new(&node.id, &port.id, wanted_side);
            let Some(pos) = registry.position(&key) else {
                continue;
            };
            let dist = pos.distance(pointer_world);
            if dist < best_dist {
                trace!(port = %key.port_id, node = %key.node_id, dist, "predicted snap candidate");
                best_dist = dist;
                best = Some(SnapTarget { key, valid: true });
            }
        }
    }

    best
}
