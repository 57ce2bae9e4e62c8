use crate::{
    allocator::IdAllocator,
    config::EditorConfig,
    error::PipelineError,
    event::GraphEvent,
    extract::extract_references,
    graph::PipelineGraph,
    properties::{Connection, Edge, EdgeId, NodeId, NodeKind, PipelineNode, Position},
    submit::{PipelineSnapshot, PipelineSubmitter, PipelineSummary},
    sync::{sync_node, SyncReport},
    Result,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// An editor shared between a UI thread and other readers (e.g. a submission task).
pub type SharedEditor = Arc<RwLock<PipelineEditor>>;

/// The state owner behind a pipeline editor canvas.
///
/// Every UI input maps onto one explicit method call: node creation and deletion, text changes,
/// connect and disconnect gestures. Each call runs to completion synchronously and reports what it
/// changed through the optional [GraphEvent] channel, so a UI knows when to re-render.
///
/// Text changes are reconciled right away in [crate::config::ReconcileMode::Immediate] mode. In
/// [crate::config::ReconcileMode::Deferred] mode the text is stored on the node but reconciliation
/// waits for [PipelineEditor::flush]. Since flushing reads the text the node holds at that time,
/// the newest edit always wins over earlier ones made in the same window.
#[derive(Debug, Default)]
pub struct PipelineEditor {
    graph: PipelineGraph,
    ids: IdAllocator,
    config: EditorConfig,
    tx: Option<UnboundedSender<GraphEvent>>,
    pending: BTreeSet<NodeId>,
}

impl PipelineEditor {
    /// Create an editor.
    ///
    /// # Arguments
    /// * `config` - Editor behavior (default template text, reconcile mode)
    /// * `tx` - Optional channel sender for GraphEvents (if None, events are not transmitted)
    pub fn new(config: EditorConfig, tx: Option<UnboundedSender<GraphEvent>>) -> PipelineEditor {
        PipelineEditor {
            graph: PipelineGraph::new(),
            ids: IdAllocator::new(),
            config,
            tx,
            pending: BTreeSet::new(),
        }
    }

    /// Create an editor with default configuration and no event receiver.
    pub fn simple() -> PipelineEditor {
        PipelineEditor::new(EditorConfig::default(), None)
    }

    /// Restore an editor from a snapshot. All template nodes are reconciled once so that the
    /// loaded auto edges agree with the loaded text.
    ///
    /// Id counters start past every id in use and every id still referenced by template text, so
    /// a reference to a node deleted before the snapshot was taken never re-attaches to a new one.
    pub fn from_snapshot(
        snapshot: PipelineSnapshot,
        config: EditorConfig,
        tx: Option<UnboundedSender<GraphEvent>>,
    ) -> Result<PipelineEditor> {
        let mut editor = PipelineEditor::new(config, tx);
        editor.graph = PipelineGraph::try_from(snapshot)?;
        editor.seed_allocator();
        editor.resync_all();
        Ok(editor)
    }

    fn seed_allocator(&mut self) {
        let PipelineEditor { graph, ids, .. } = self;
        for node in graph.nodes() {
            ids.observe(node.id.as_str());
            if let Some(text) = node.template_text() {
                for name in extract_references(text) {
                    ids.observe(name.as_str());
                }
            }
        }
    }

    pub fn into_shared(self) -> SharedEditor {
        Arc::new(RwLock::new(self))
    }

    /// Replace the event sender with a fresh channel and return its receiver.
    pub fn subscribe(&mut self) -> UnboundedReceiver<GraphEvent> {
        let (tx, rx) = unbounded_channel();
        self.tx = Some(tx);
        rx
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Nodes with text changes awaiting [PipelineEditor::flush].
    pub fn pending(&self) -> impl Iterator<Item = &NodeId> {
        self.pending.iter()
    }

    fn emit(&self, event: GraphEvent) {
        if let Some(tx) = self.tx.as_ref() {
            if let Err(e) = tx.send(event) {
                let err = PipelineError::from(e);
                tracing::warn!("[PipelineEditor] event receiver dropped: {err}");
            }
        }
    }

    fn emit_sync(&self, report: &SyncReport) {
        if !report.is_noop() {
            self.emit(GraphEvent::EdgesSynced {
                target: report.target.clone(),
                added: report.added.clone(),
                removed: report.removed.clone(),
            });
        }
    }

    /// Create a node of `kind` at `position` with a freshly allocated id and default field values.
    /// Template nodes start with the configured default text, which is reconciled right away.
    pub fn create_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId> {
        let graph = &self.graph;
        let id = self
            .ids
            .next_id(kind, |candidate| graph.contains_node(candidate.as_str()));
        let mut node = PipelineNode::new(id.clone(), kind).with_position(position);
        if let Some(field) = kind.template_field() {
            node.data.insert(
                field.to_string(),
                Value::String(self.config.default_text.clone()),
            );
        }
        self.insert_node(node)?;
        Ok(id)
    }

    /// Insert a fully built node. Its id must not already be in use.
    pub fn insert_node(&mut self, node: PipelineNode) -> Result<()> {
        let id = node.id.clone();
        let is_template = node.kind.is_template();
        self.graph.add_node(node)?;
        self.emit(GraphEvent::NodeAdded(id.clone()));
        if is_template {
            self.reconcile_or_defer(&id);
        }
        Ok(())
    }

    /// Delete a node. Edges attached to it stay until removed explicitly or, for auto edges, until
    /// the next reconciliation of their target.
    pub fn delete_node(&mut self, id: &str) -> Result<PipelineNode> {
        let node = self
            .graph
            .remove_node(id)
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))?;
        self.pending.remove(id);
        self.emit(GraphEvent::NodeRemoved(node.id.clone()));
        Ok(node)
    }

    /// Handle a text edit on a template node.
    ///
    /// Returns the reconciliation report in immediate mode, `None` in deferred mode or when the
    /// node has no template field.
    pub fn on_text_changed(&mut self, id: &str, text: &str) -> Result<Option<SyncReport>> {
        let kind = self
            .graph
            .node(id)
            .map(|node| node.kind)
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))?;
        let Some(field) = kind.template_field() else {
            tracing::debug!("[PipelineEditor] text change on non-template node {id} ignored");
            return Ok(None);
        };
        self.graph
            .update_node_field(id, field, Value::String(text.to_string()))?;
        self.emit(GraphEvent::NodeUpdated(NodeId::from(id), field.to_string()));
        Ok(self.reconcile_or_defer(&NodeId::from(id)))
    }

    /// Update any data field. Every write to a template field is reconciled: strings go through
    /// [PipelineEditor::on_text_changed], any other value counts as text without references.
    pub fn update_field(&mut self, id: &str, field: &str, value: Value) -> Result<()> {
        let template_field = self.graph.node(id).and_then(|node| node.kind.template_field());
        let is_template_write = template_field == Some(field);
        let value = match value {
            Value::String(text) if is_template_write => {
                self.on_text_changed(id, &text)?;
                return Ok(());
            }
            other => other,
        };
        self.graph.update_node_field(id, field, value)?;
        self.emit(GraphEvent::NodeUpdated(NodeId::from(id), field.to_string()));
        if is_template_write {
            self.reconcile_or_defer(&NodeId::from(id));
        }
        Ok(())
    }

    fn reconcile_or_defer(&mut self, id: &NodeId) -> Option<SyncReport> {
        if self.config.is_deferred() {
            self.pending.insert(id.clone());
            return None;
        }
        let report = sync_node(&mut self.graph, id.as_str());
        self.emit_sync(&report);
        Some(report)
    }

    /// Reconcile every node with a deferred text change, in node id order.
    pub fn flush(&mut self) -> Vec<SyncReport> {
        let pending = std::mem::take(&mut self.pending);
        let mut reports = Vec::with_capacity(pending.len());
        for id in pending {
            if !self.graph.contains_node(id.as_str()) {
                continue;
            }
            let report = sync_node(&mut self.graph, id.as_str());
            self.emit_sync(&report);
            reports.push(report);
        }
        reports
    }

    /// Reconcile every template node, clearing any pending work. Removes auto edges left dangling
    /// by deleted sources anywhere in the graph.
    pub fn resync_all(&mut self) -> Vec<SyncReport> {
        self.pending.clear();
        let templates = self
            .graph
            .nodes()
            .filter(|node| node.kind.is_template())
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();
        templates
            .into_iter()
            .map(|id| {
                let report = sync_node(&mut self.graph, id.as_str());
                self.emit_sync(&report);
                report
            })
            .collect()
    }

    /// Handle a manual connect gesture. Returns `None` if the same connection already exists.
    pub fn connect(&mut self, connection: &Connection) -> Result<Option<EdgeId>> {
        let added = self.graph.add_edge(connection)?;
        if let Some(id) = added.as_ref() {
            self.emit(GraphEvent::EdgeAdded(id.clone()));
        }
        Ok(added)
    }

    /// Delete an edge explicitly.
    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge> {
        let edge = self
            .graph
            .remove_edge(edge_id)
            .ok_or_else(|| PipelineError::EdgeNotFound(edge_id.to_string()))?;
        self.emit(GraphEvent::EdgeRemoved(edge.id.clone()));
        Ok(edge)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot::from(&self.graph)
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary::from(&self.graph)
    }

    /// Flush deferred text changes, then hand the snapshot to `submitter`.
    pub fn submit(&mut self, submitter: &dyn PipelineSubmitter) -> Result<PipelineSummary> {
        self.flush();
        let snapshot = self.snapshot();
        let summary = self.summary();
        tracing::info!(
            "[PipelineEditor] submitting pipeline: {} nodes, {} edges, dag: {}",
            summary.num_nodes,
            summary.num_edges,
            summary.is_dag
        );
        submitter.submit(&snapshot)?;
        Ok(summary)
    }
}
