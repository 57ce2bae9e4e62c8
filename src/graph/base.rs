//! PipelineGraph: the canonical node and edge store.
//!
//! Nodes are keyed by their id. Edges are kept as an ordered list so that snapshots render and
//! serialize in a stable order. The only way to change the edge list wholesale is
//! [PipelineGraph::replace_edges], which swaps the list in one step.

use crate::{
    error::PipelineError,
    properties::{Connection, Edge, EdgeId, NodeId, PipelineNode, Provenance},
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use super::Relations;

/// PipelineGraph: a set of [PipelineNode]s and the [Edge]s between them.
///
/// Static invariants (checked by [PipelineGraph::built_in_test]):
///
/// 0. Node ids are unique. Enforced on insertion.
///
/// 1. Edge ids are unique.
///
/// 2. At most one auto edge exists for any (source, target) pair, and its id is [EdgeId::auto]
///    of that pair. Only reconciliation creates or removes auto edges.
///
/// 3. Manual edges never carry the reserved `auto-` id prefix.
///
/// Edges may point at nodes that no longer exist. Deleting a node never touches edges: dangling
/// auto edges are cleaned up by the next reconciliation of their target, and manual edges are only
/// removed explicitly. See [PipelineGraph::find_orphaned_edges].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineGraph {
    nodes: BTreeMap<NodeId, PipelineNode>,
    edges: Vec<Edge>,
}

impl fmt::Display for PipelineGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PipelineGraph({} nodes, {} edges)",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

impl PipelineGraph {
    pub fn new() -> PipelineGraph {
        PipelineGraph::default()
    }

    /// Build a graph from previously exported parts. Fails on duplicate node ids.
    ///
    /// Imported edges are re-keyed so that ids agree with provenance (invariants 2 and 3 on
    /// [PipelineGraph]). An edge whose id repeats an earlier one is dropped.
    pub fn from_parts(nodes: Vec<PipelineNode>, edges: Vec<Edge>) -> Result<PipelineGraph> {
        let mut graph = PipelineGraph::new();
        for node in nodes {
            if graph.nodes.contains_key(&node.id) {
                return Err(PipelineError::DuplicateNode(node.id.to_string()));
            }
            graph.nodes.insert(node.id.clone(), node);
        }
        let mut seen = BTreeSet::new();
        for edge in edges {
            let original = edge.id.clone();
            let edge = edge.normalized();
            if edge.id != original {
                tracing::debug!("[PipelineGraph::from_parts] re-keyed {original} as {edge}");
            }
            if !seen.insert(edge.id.clone()) {
                tracing::warn!("[PipelineGraph::from_parts] dropping duplicate edge {edge}");
                continue;
            }
            graph.edges.push(edge);
        }
        Ok(graph)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PipelineNode> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&PipelineNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id.as_str() == id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Synced edges whose target is `target`.
    pub fn synced_edges_into<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .iter()
            .filter(move |edge| edge.is_synced() && edge.target.as_str() == target)
    }

    /// Insert a new node.
    ///
    /// Node ids are allocated by [crate::allocator::IdAllocator] and must be unique. Inserting an
    /// id that is already present is a caller bug: it is rejected, and fails loudly in debug
    /// builds.
    pub fn add_node(&mut self, node: PipelineNode) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            tracing::warn!("[PipelineGraph::add_node] duplicate node id {}", node.id);
            debug_assert!(false, "duplicate node id {}", node.id);
            return Err(PipelineError::DuplicateNode(node.id.to_string()));
        }
        tracing::debug!("[PipelineGraph::add_node] {node}");
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Remove a node. Edges attached to it are left in place.
    pub fn remove_node(&mut self, id: &str) -> Option<PipelineNode> {
        let removed = self.nodes.remove(id);
        if removed.is_some() {
            tracing::debug!("[PipelineGraph::remove_node] {id}");
        }
        removed
    }

    /// Replace a single data field of a node.
    pub fn update_node_field(&mut self, id: &str, field: &str, value: Value) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))?;
        node.data.insert(field.to_string(), value);
        Ok(())
    }

    /// Add a manual edge for a connect gesture.
    ///
    /// Both endpoints must exist. Repeating a connection that is already present (same endpoints
    /// and handles) is a no-op and returns `Ok(None)`.
    pub fn add_edge(&mut self, connection: &Connection) -> Result<Option<EdgeId>> {
        for endpoint in [&connection.source, &connection.target] {
            if !self.contains_node(endpoint.as_str()) {
                return Err(PipelineError::NodeNotFound(endpoint.to_string()));
            }
        }
        let edge = Edge::manual(connection);
        if self
            .edges
            .iter()
            .any(|existing| existing.is_manual() && existing.matches(connection))
            || self.edge(edge.id.as_str()).is_some()
        {
            tracing::debug!("[PipelineGraph::add_edge] connection already present: {edge}");
            return Ok(None);
        }
        tracing::debug!("[PipelineGraph::add_edge] {edge}");
        let id = edge.id.clone();
        self.edges.push(edge);
        Ok(Some(id))
    }

    /// Remove an edge by id, whatever its provenance.
    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let idx = self.edges.iter().position(|edge| edge.id.as_str() == id)?;
        let removed = self.edges.remove(idx);
        tracing::debug!("[PipelineGraph::remove_edge] {removed}");
        Some(removed)
    }

    /// Swap the whole edge list in one step, returning the previous list.
    pub fn replace_edges(&mut self, edges: Vec<Edge>) -> Vec<Edge> {
        std::mem::replace(&mut self.edges, edges)
    }

    /// Edges with a source or target that is not in the node set.
    pub fn find_orphaned_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| {
                !self.contains_node(edge.source.as_str()) || !self.contains_node(edge.target.as_str())
            })
            .collect()
    }

    /// A petgraph projection of the current nodes and edges.
    pub fn relations(&self) -> Relations {
        Relations::from_graph(self)
    }

    /// Check the static invariants listed on [PipelineGraph], returning one message per violation.
    pub fn built_in_test(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut edge_ids = BTreeSet::new();
        let mut auto_pairs = BTreeSet::new();
        for edge in self.edges.iter() {
            if !edge_ids.insert(&edge.id) {
                errors.push(format!("duplicate edge id {}", edge.id));
            }
            if edge.provenance == Provenance::Auto {
                if !auto_pairs.insert((&edge.source, &edge.target)) {
                    errors.push(format!(
                        "more than one auto edge {} -> {}",
                        edge.source, edge.target
                    ));
                }
                if edge.id != EdgeId::auto(&edge.source, &edge.target) {
                    errors.push(format!(
                        "auto edge id {} does not match its endpoints {} -> {}",
                        edge.id, edge.source, edge.target
                    ));
                }
            } else if edge.id.has_auto_prefix() {
                errors.push(format!("manual edge {} uses the reserved auto prefix", edge.id));
            }
        }
        errors
    }

    /// Consume the graph, returning its nodes (in id order) and edges.
    pub fn into_parts(self) -> (Vec<PipelineNode>, Vec<Edge>) {
        (self.nodes.into_values().collect(), self.edges)
    }
}
