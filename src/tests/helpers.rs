//! Shared test utilities for graph and reconciliation testing

use crate::{
    graph::PipelineGraph,
    properties::{Connection, NodeKind, PipelineNode},
    schema::TEMPLATE_FIELD,
    sync::{sync_node, SyncReport},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A text node holding `text` as its template.
pub fn text_node(id: &str, text: &str) -> PipelineNode {
    PipelineNode::new(id, NodeKind::Text).with_field(TEMPLATE_FIELD, text)
}

/// Graph with `input_0`, `input_1` and an empty template node `text_0`.
pub fn create_test_graph() -> PipelineGraph {
    init_logging();
    let mut graph = PipelineGraph::new();
    graph
        .add_node(PipelineNode::new("input_0", NodeKind::Input))
        .unwrap();
    graph
        .add_node(PipelineNode::new("input_1", NodeKind::Input))
        .unwrap();
    graph.add_node(text_node("text_0", "")).unwrap();
    graph
}

/// Store `text` on `target` and reconcile it, as the editor does for a keystroke.
pub fn type_text(graph: &mut PipelineGraph, target: &str, text: &str) -> SyncReport {
    graph
        .update_node_field(target, TEMPLATE_FIELD, text.into())
        .unwrap();
    sync_node(graph, target)
}

/// (source, target) pairs of all synced edges, in edge-list order.
pub fn synced_pairs(graph: &PipelineGraph) -> Vec<(String, String)> {
    graph
        .edges()
        .iter()
        .filter(|edge| edge.is_synced())
        .map(|edge| (edge.source.to_string(), edge.target.to_string()))
        .collect()
}

pub fn manual(source: &str, target: &str) -> Connection {
    Connection::new(source, target)
}
