//! Snapshots of a pipeline for rendering and submission.
//!
//! The snapshot is the `(nodes, edges)` pair serialized as-is. Transport is up to the
//! [PipelineSubmitter] implementation handed to [crate::editor::PipelineEditor::submit].

use crate::{
    graph::PipelineGraph,
    properties::{Edge, PipelineNode},
    Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub nodes: Vec<PipelineNode>,
    pub edges: Vec<Edge>,
}

impl From<&PipelineGraph> for PipelineSnapshot {
    fn from(graph: &PipelineGraph) -> Self {
        PipelineSnapshot {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().to_vec(),
        }
    }
}

impl TryFrom<PipelineSnapshot> for PipelineGraph {
    type Error = crate::PipelineError;

    fn try_from(snapshot: PipelineSnapshot) -> Result<Self> {
        PipelineGraph::from_parts(snapshot.nodes, snapshot.edges)
    }
}

impl PipelineSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<PipelineSnapshot> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn summary(&self) -> Result<PipelineSummary> {
        let graph = PipelineGraph::from_parts(self.nodes.clone(), self.edges.clone())?;
        Ok(PipelineSummary::from(&graph))
    }
}

/// The shape of a pipeline: how many nodes and edges it has and whether it is acyclic.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
}

impl From<&PipelineGraph> for PipelineSummary {
    fn from(graph: &PipelineGraph) -> Self {
        PipelineSummary {
            num_nodes: graph.node_count(),
            num_edges: graph.edge_count(),
            is_dag: graph.relations().is_dag(),
        }
    }
}

/// Receives a finished pipeline. Implementations own transport, endpoints and response handling.
pub trait PipelineSubmitter {
    fn submit(&self, snapshot: &PipelineSnapshot) -> Result<()>;
}
