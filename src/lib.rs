//! # pipeline-graph
//!
//! State engine for a visual pipeline editor: a canvas of typed nodes (inputs, LLM calls, text
//! templates, filters and friends) wired together by directed edges.
//!
//! ## Overview
//!
//! Edges come from two places. A user draws them by connecting a source handle to a target handle
//! (**manual** edges), and template nodes derive them from their own text: writing
//! `{{input_0}}` inside a text node wires `input_0` into it (**auto** edges). Whenever template
//! text changes, the auto edges into that node are reconciled against the references in the text,
//! while manual edges are never touched.
//!
//! ### Key Features
//!
//! - **Template reference extraction**: `{{ identifier }}` markers, deduplicated in first-seen order
//! - **Idempotent edge reconciliation**: at most one auto edge per (source, target) pair
//! - **Non-recycling id allocation**: deleted ids are never handed out again
//! - **Event streaming**: every applied mutation is announced on a tokio channel
//! - **Snapshots**: the `(nodes, edges)` pair as JSON, plus a `num_nodes / num_edges / is_dag` summary
//!
//! ## Architecture
//!
//! - **[`extract`]**: finds `{{ name }}` references in template text
//! - **[`graph`]**: the canonical node and edge store (`PipelineGraph`) and its petgraph projection
//! - **[`sync`]**: reconciliation of auto edges for one template node
//! - **[`allocator`]**: `{prefix}_{n}` node ids
//! - **[`schema`]**: per-kind ports, fields and defaults
//! - **[`editor`]**: the mutation surface a UI drives (`PipelineEditor`)
//! - **[`event`]**: `GraphEvent` notifications
//! - **[`submit`]**: snapshots, summaries and the `PipelineSubmitter` seam
//! - **[`config`]**: TOML-backed editor configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use pipeline_graph::{
//!     editor::PipelineEditor,
//!     properties::{NodeKind, Position},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut editor = PipelineEditor::simple();
//! let input = editor.create_node(NodeKind::Input, Position::default())?;
//! let text = editor.create_node(NodeKind::Text, Position::new(200.0, 0.0))?;
//!
//! editor.on_text_changed(text.as_str(), &format!("Summarize {{{{{input}}}}}"))?;
//! assert_eq!(editor.graph().edge_count(), 1);
//!
//! let summary = editor.summary();
//! assert!(summary.is_dag);
//! # Ok(())
//! # }
//! ```
//!
//! ### Deferred reconciliation
//!
//! With `reconcile = "deferred"` in the editor config, text changes are stored immediately but
//! reconciled only on [`editor::PipelineEditor::flush`]. Flushing always reconciles against the
//! text a node holds at that moment, so rapid keystrokes collapse into one pass.

pub mod allocator;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod extract;
pub mod graph;
pub mod properties;
pub mod schema;
pub mod submit;
pub mod sync;
#[cfg(test)]
mod tests;

pub use error::*;
