//! Read-only petgraph projection of a [PipelineGraph] for dependency queries.

use crate::properties::{EdgeId, NodeId};
use petgraph::{
    algo::{is_cyclic_directed, toposort},
    graph::NodeIndex,
    visit::{depth_first_search, DfsEvent, Reversed},
    Graph,
};
use std::collections::{BTreeMap, BTreeSet};

use super::PipelineGraph;

/// Directed graph of node ids with edge ids as weights. Edges whose endpoints are missing from the
/// node set are left out.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    graph: Graph<NodeId, EdgeId>,
    id_to_index: BTreeMap<NodeId, NodeIndex>,
}

impl Relations {
    pub fn from_graph(pipeline: &PipelineGraph) -> Relations {
        let mut graph = Graph::new();
        let mut id_to_index = BTreeMap::new();
        for id in pipeline.node_ids() {
            let index = graph.add_node(id.clone());
            id_to_index.insert(id.clone(), index);
        }
        for edge in pipeline.edges() {
            match (id_to_index.get(&edge.source), id_to_index.get(&edge.target)) {
                (Some(source), Some(target)) => {
                    graph.add_edge(*source, *target, edge.id.clone());
                }
                _ => {
                    tracing::trace!("[Relations] skipping orphaned edge {edge}");
                }
            }
        }
        Relations { graph, id_to_index }
    }

    pub fn as_graph(&self) -> &Graph<NodeId, EdgeId> {
        &self.graph
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Every node `id` transitively reads from, excluding `id` itself unless it sits on a cycle.
    pub fn upstream(&self, id: &str) -> BTreeSet<NodeId> {
        let Some(start) = self.index_of(id) else {
            return BTreeSet::new();
        };
        let mut found = BTreeSet::new();
        depth_first_search(Reversed(&self.graph), Some(start), |event| {
            if let DfsEvent::TreeEdge(_, discovered) | DfsEvent::BackEdge(_, discovered) = event {
                found.insert(self.graph[discovered].clone());
            }
        });
        found
    }

    /// Every node that transitively reads from `id`, excluding `id` itself unless it sits on a
    /// cycle.
    pub fn downstream(&self, id: &str) -> BTreeSet<NodeId> {
        let Some(start) = self.index_of(id) else {
            return BTreeSet::new();
        };
        let mut found = BTreeSet::new();
        depth_first_search(&self.graph, Some(start), |event| {
            if let DfsEvent::TreeEdge(_, discovered) | DfsEvent::BackEdge(_, discovered) = event {
                found.insert(self.graph[discovered].clone());
            }
        });
        found
    }

    pub fn is_dag(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Node ids in dependency order (sources first), or `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }
}
