//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use parking_lot::Mutex;
use pipeline_graph::{
    editor::PipelineEditor,
    error::PipelineError,
    event::GraphEvent,
    properties::{NodeId, NodeKind, Position},
    submit::{PipelineSnapshot, PipelineSubmitter},
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Create `count` input nodes laid out in a column, returning their ids in creation order.
#[allow(dead_code)]
pub fn create_inputs(editor: &mut PipelineEditor, count: usize) -> Vec<NodeId> {
    (0..count)
        .map(|idx| {
            editor
                .create_node(NodeKind::Input, Position::new(0.0, 100.0 * idx as f64))
                .unwrap()
        })
        .collect()
}

/// Drain every event currently queued on `rx`.
#[allow(dead_code)]
pub fn drain(rx: &mut UnboundedReceiver<GraphEvent>) -> Vec<GraphEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Submitter that records every snapshot it receives, or rejects them all.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingSubmitter {
    pub received: Mutex<Vec<String>>,
    pub reject: bool,
}

impl PipelineSubmitter for RecordingSubmitter {
    fn submit(&self, snapshot: &PipelineSnapshot) -> Result<(), PipelineError> {
        if self.reject {
            return Err(PipelineError::Submit("backend unavailable".to_string()));
        }
        self.received.lock().push(snapshot.to_json()?);
        Ok(())
    }
}
