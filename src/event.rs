use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::properties::{EdgeId, NodeId};

/// Notifications emitted after a mutation has been applied to a
/// [crate::graph::PipelineGraph]. A UI subscribes to these to know when to re-render; each event
/// describes state that is already in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    /// Node, name of the data field that changed
    NodeUpdated(NodeId, String),
    /// A manual edge was added by a connect gesture
    EdgeAdded(EdgeId),
    /// An edge was deleted explicitly
    EdgeRemoved(EdgeId),
    /// Reconciliation of a template node replaced its auto edges
    EdgesSynced {
        target: NodeId,
        added: Vec<EdgeId>,
        removed: Vec<EdgeId>,
    },
}

impl GraphEvent {
    /// The node this event is about, if any.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            GraphEvent::NodeAdded(id)
            | GraphEvent::NodeRemoved(id)
            | GraphEvent::NodeUpdated(id, _) => Some(id),
            GraphEvent::EdgesSynced { target, .. } => Some(target),
            GraphEvent::EdgeAdded(_) | GraphEvent::EdgeRemoved(_) => None,
        }
    }

    pub fn touches_edges(&self) -> bool {
        matches!(
            self,
            GraphEvent::EdgeAdded(_) | GraphEvent::EdgeRemoved(_) | GraphEvent::EdgesSynced { .. }
        )
    }
}

impl Display for GraphEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphEvent::NodeAdded(id) => write!(f, "NodeAdded({id})"),
            GraphEvent::NodeRemoved(id) => write!(f, "NodeRemoved({id})"),
            GraphEvent::NodeUpdated(id, field) => write!(f, "NodeUpdated({id}.{field})"),
            GraphEvent::EdgeAdded(id) => write!(f, "EdgeAdded({id})"),
            GraphEvent::EdgeRemoved(id) => write!(f, "EdgeRemoved({id})"),
            GraphEvent::EdgesSynced {
                target,
                added,
                removed,
            } => write!(
                f,
                "EdgesSynced({target}: +{} -{})",
                added.len(),
                removed.len()
            ),
        }
    }
}
