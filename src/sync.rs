//! Reconciliation of text-derived (auto) edges.
//!
//! A template node owns the auto edges that point at it. Whenever its text changes, the set of
//! auto edges into it is recomputed from the identifiers the text references:
//!
//! 1. Edges are partitioned into those this pass may touch (synced edges whose target is the
//!    template node) and everything else (manual edges, auto edges of other targets), which is
//!    kept untouched.
//! 2. A touchable edge survives only if its source is still referenced **and** still exists.
//!    Everything else is removed. This is also where auto edges left dangling by a deleted source
//!    are cleaned up.
//! 3. Each referenced identifier, in order, gets a new auto edge unless it names no node, names the
//!    template node itself, or is already connected.
//! 4. If anything was added or removed, the edge list is swapped for `kept + added` in one step.
//!
//! Removal runs before addition, so replacing `{{a}}` with `{{b}}` in one edit drops `a -> t` and
//! adds `b -> t` in a single pass. Re-running with unchanged inputs changes nothing.

use crate::{
    extract::extract_references,
    graph::PipelineGraph,
    properties::{Edge, EdgeId, NodeId},
};
use std::collections::BTreeSet;

/// Non-fatal observations made during a reconciliation pass. None of these are errors: template
/// text is edited keystroke by keystroke and is expected to be incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDiagnostic {
    /// The text references an identifier that matches no node (yet). No edge was created; a later
    /// pass picks it up once the node exists.
    UnresolvedReference { name: NodeId },
    /// The text references its own node. Self edges are never created.
    SelfReference,
}

/// Outcome of one reconciliation pass over a single template node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub target: NodeId,
    pub added: Vec<EdgeId>,
    pub removed: Vec<EdgeId>,
    pub diagnostics: Vec<SyncDiagnostic>,
}

impl SyncReport {
    fn new(target: &str) -> SyncReport {
        SyncReport {
            target: NodeId::from(target),
            ..Default::default()
        }
    }

    /// True when the pass left the edge list untouched.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &NodeId> {
        self.diagnostics.iter().filter_map(|diagnostic| match diagnostic {
            SyncDiagnostic::UnresolvedReference { name } => Some(name),
            SyncDiagnostic::SelfReference => None,
        })
    }
}

/// A computed but not yet applied reconciliation.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub report: SyncReport,
    edges: Option<Vec<Edge>>,
}

impl SyncPlan {
    /// The edge list that applying this plan would install, or `None` when nothing changes.
    pub fn edges(&self) -> Option<&[Edge]> {
        self.edges.as_deref()
    }

    /// Install the planned edge list in one step.
    pub fn apply(self, graph: &mut PipelineGraph) -> SyncReport {
        if let Some(edges) = self.edges {
            tracing::debug!(
                "[reconcile] {}: +{:?} -{:?}",
                self.report.target,
                self.report.added,
                self.report.removed
            );
            graph.replace_edges(edges);
            #[cfg(debug_assertions)]
            {
                let errors = graph.built_in_test();
                if !errors.is_empty() {
                    tracing::warn!(
                        "[reconcile] graph invariants violated after syncing {}:\n- {}",
                        self.report.target,
                        errors.join("\n- ")
                    );
                }
            }
        }
        self.report
    }
}

/// Compute the edge delta that brings the auto edges into `target` in line with `referenced`,
/// without touching the graph.
pub fn plan(graph: &PipelineGraph, target: &str, referenced: &[NodeId]) -> SyncPlan {
    let mut report = SyncReport::new(target);
    if !graph.contains_node(target) {
        tracing::debug!("[reconcile] unknown target {target}, nothing to do");
        return SyncPlan {
            report,
            edges: None,
        };
    }

    let wanted = referenced
        .iter()
        .map(NodeId::as_str)
        .collect::<BTreeSet<_>>();

    let mut kept = Vec::with_capacity(graph.edge_count() + referenced.len());
    for edge in graph.edges() {
        let owned_here = edge.is_synced() && edge.target.as_str() == target;
        let source = edge.source.as_str();
        let survives =
            wanted.contains(source) && graph.contains_node(source) && source != target;
        if !owned_here || survives {
            kept.push(edge.clone());
        } else {
            report.removed.push(edge.id.clone());
        }
    }

    let target_id = NodeId::from(target);
    let mut present = kept
        .iter()
        .map(|edge| edge.id.clone())
        .collect::<BTreeSet<_>>();
    for name in referenced {
        if name.as_str() == target {
            if !report.diagnostics.contains(&SyncDiagnostic::SelfReference) {
                report.diagnostics.push(SyncDiagnostic::SelfReference);
            }
            continue;
        }
        if !graph.contains_node(name.as_str()) {
            tracing::trace!("[reconcile] {target}: unresolved reference {name}");
            report
                .diagnostics
                .push(SyncDiagnostic::UnresolvedReference { name: name.clone() });
            continue;
        }
        let edge = Edge::auto(name, &target_id);
        if !present.insert(edge.id.clone()) {
            continue;
        }
        report.added.push(edge.id.clone());
        kept.push(edge);
    }

    let edges = if report.is_noop() { None } else { Some(kept) };
    SyncPlan { report, edges }
}

/// Reconcile the auto edges into `target` against `referenced` and apply the result.
///
/// Unknown targets are a no-op. Identifiers that match no node produce no edge and are reported
/// as [SyncDiagnostic::UnresolvedReference].
pub fn reconcile(graph: &mut PipelineGraph, target: &str, referenced: &[NodeId]) -> SyncReport {
    plan(graph, target, referenced).apply(graph)
}

/// Extract the references of `text` and reconcile `target` against them.
pub fn sync_text(graph: &mut PipelineGraph, target: &str, text: &str) -> SyncReport {
    let referenced = extract_references(text);
    reconcile(graph, target, &referenced)
}

/// Reconcile `target` against the template text it currently stores. Nodes whose kind has no
/// template field are left alone; a template node with no text is treated as referencing nothing.
pub fn sync_node(graph: &mut PipelineGraph, target: &str) -> SyncReport {
    let Some(node) = graph.node(target).filter(|node| node.kind.is_template()) else {
        return SyncReport::new(target);
    };
    let text = node.template_text().unwrap_or_default().to_string();
    sync_text(graph, target, &text)
}
