//! Integration tests for PipelineEditor (node lifecycle, text-driven edges, events, submission)
//!
//! These tests drive the editor only through its public API, the way a canvas UI would:
//! - node creation and deletion with allocated ids
//! - text changes in immediate and deferred reconcile modes
//! - manual connect/disconnect gestures
//! - event notifications, snapshots and submission

mod common;

use common::*;
use pipeline_graph::{
    config::{ConfigProvider, EditorConfig, ReconcileMode, TomlConfigProvider},
    editor::PipelineEditor,
    error::PipelineError,
    event::GraphEvent,
    properties::{Connection, EdgeId, NodeId, NodeKind, PipelineNode, Position},
    submit::PipelineSnapshot,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use test_log::test;

fn deferred() -> EditorConfig {
    EditorConfig {
        reconcile: ReconcileMode::Deferred,
        ..Default::default()
    }
}

fn auto_sources(editor: &PipelineEditor, target: &str) -> Vec<String> {
    editor
        .graph()
        .synced_edges_into(target)
        .map(|edge| edge.source.to_string())
        .collect()
}

#[test]
fn test_new_text_node_starts_with_default_template() {
    let mut editor = PipelineEditor::simple();
    let inputs = create_inputs(&mut editor, 2);
    assert_eq!(inputs, vec![NodeId::from("input_0"), NodeId::from("input_1")]);

    let text = editor
        .create_node(NodeKind::Text, Position::new(300.0, 0.0))
        .unwrap();
    assert_eq!(text.as_str(), "text_0");
    let node = editor.graph().node("text_0").unwrap();
    assert_eq!(node.template_text(), Some("{{input_1}}"));
    assert_eq!(node.position, Position::new(300.0, 0.0));
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_1"]);
}

#[test]
fn test_text_edits_drive_auto_edges() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 2);
    let llm = editor
        .create_node(NodeKind::Llm, Position::default())
        .unwrap();
    let manual = editor
        .connect(&Connection::new("input_0", llm.clone()).with_handles("input_0-value", "llm_0-prompt"))
        .unwrap()
        .unwrap();
    let text = editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();

    editor.on_text_changed(text.as_str(), "{{input_0}}").unwrap();
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_0"]);

    let report = editor
        .on_text_changed(text.as_str(), "{{input_1}}")
        .unwrap()
        .unwrap();
    assert_eq!(report.removed, vec![EdgeId::new("auto-input_0-text_0")]);
    assert_eq!(report.added, vec![EdgeId::new("auto-input_1-text_0")]);

    editor
        .on_text_changed(text.as_str(), "{{input_0}} {{input_1}}")
        .unwrap();
    let mut sources = auto_sources(&editor, "text_0");
    sources.sort();
    assert_eq!(sources, vec!["input_0", "input_1"]);
    assert!(editor.graph().edge(manual.as_str()).is_some());

    // Typing an incomplete marker keeps the text but drops the references it no longer holds.
    editor
        .on_text_changed(text.as_str(), "{{input_0}} {{input_")
        .unwrap();
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_0"]);
    assert_eq!(
        editor.graph().node("text_0").unwrap().template_text(),
        Some("{{input_0}} {{input_")
    );
}

#[test]
fn test_events_follow_mutations() {
    let mut editor = PipelineEditor::simple();
    let mut rx = editor.subscribe();

    editor
        .create_node(NodeKind::Input, Position::default())
        .unwrap();
    // The default template references input_1, which does not exist: no edges, no sync event.
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();
    editor
        .create_node(NodeKind::Llm, Position::default())
        .unwrap();
    let edge = editor
        .connect(&Connection::new("text_0", "llm_0").with_handles("text_0-output", "llm_0-prompt"))
        .unwrap()
        .unwrap();
    // A repeated gesture changes nothing and announces nothing.
    assert_eq!(
        editor
            .connect(&Connection::new("text_0", "llm_0").with_handles("text_0-output", "llm_0-prompt"))
            .unwrap(),
        None
    );
    editor.disconnect(edge.as_str()).unwrap();
    editor.delete_node("input_0").unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![
            GraphEvent::NodeAdded(NodeId::from("input_0")),
            GraphEvent::NodeAdded(NodeId::from("text_0")),
            GraphEvent::NodeUpdated(NodeId::from("text_0"), "text".to_string()),
            GraphEvent::EdgesSynced {
                target: NodeId::from("text_0"),
                added: vec![EdgeId::new("auto-input_0-text_0")],
                removed: vec![],
            },
            GraphEvent::NodeAdded(NodeId::from("llm_0")),
            GraphEvent::EdgeAdded(EdgeId::new(
                "edge-text_0-text_0-output-llm_0-llm_0-prompt"
            )),
            GraphEvent::EdgeRemoved(EdgeId::new(
                "edge-text_0-text_0-output-llm_0-llm_0-prompt"
            )),
            GraphEvent::NodeRemoved(NodeId::from("input_0")),
        ]
    );
}

#[test(tokio::test)]
async fn test_events_can_be_awaited() {
    let mut editor = PipelineEditor::simple();
    let mut rx = editor.subscribe();
    editor
        .create_node(NodeKind::Input, Position::default())
        .unwrap();
    let event = rx.recv().await.unwrap();
    assert_eq!(event.node(), Some(&NodeId::from("input_0")));
    assert!(!event.touches_edges());
}

#[test]
fn test_dropped_receiver_does_not_fail_mutations() {
    let mut editor = PipelineEditor::simple();
    let rx = editor.subscribe();
    drop(rx);
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();
    assert_eq!(editor.graph().edge_count(), 1);
}

#[test]
fn test_deferred_mode_newest_text_wins() {
    let mut editor = PipelineEditor::new(deferred(), None);
    create_inputs(&mut editor, 2);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();

    assert_eq!(editor.on_text_changed("text_0", "{{input_0}}").unwrap(), None);
    assert_eq!(editor.on_text_changed("text_0", "{{input_1}} {{input_").unwrap(), None);
    assert_eq!(editor.on_text_changed("text_0", "{{input_1}}").unwrap(), None);
    assert_eq!(editor.graph().edge_count(), 0);
    assert_eq!(editor.pending().collect::<Vec<_>>(), vec![&NodeId::from("text_0")]);

    let reports = editor.flush();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].added, vec![EdgeId::new("auto-input_1-text_0")]);
    assert!(reports[0].removed.is_empty());
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_1"]);
    assert_eq!(editor.pending().count(), 0);
    assert!(editor.flush().is_empty());
}

#[test]
fn test_deferred_flush_skips_deleted_nodes() {
    let mut editor = PipelineEditor::new(deferred(), None);
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_1", "{{input_0}}").unwrap();
    editor.delete_node("text_0").unwrap();

    let reports = editor.flush();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].target, NodeId::from("text_1"));
}

#[test]
fn test_ids_are_never_recycled() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 2);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_1"]);

    editor.delete_node("input_1").unwrap();
    let next = editor
        .create_node(NodeKind::Input, Position::default())
        .unwrap();
    assert_eq!(next.as_str(), "input_2");

    // The stale reference does not attach to the newer node.
    editor.on_text_changed("text_0", "{{input_1}}").unwrap();
    assert!(auto_sources(&editor, "text_0").is_empty());
    assert!(editor.graph().find_orphaned_edges().is_empty());
}

#[test]
fn test_allocator_skips_explicitly_inserted_ids() {
    let mut editor = PipelineEditor::simple();
    editor
        .insert_node(PipelineNode::new("input_0", NodeKind::Input))
        .unwrap();
    let id = editor
        .create_node(NodeKind::Input, Position::default())
        .unwrap();
    assert_eq!(id.as_str(), "input_1");
}

#[test]
fn test_text_change_errors_and_no_ops() {
    let mut editor = PipelineEditor::simple();
    let err = editor.on_text_changed("text_9", "{{input_0}}").unwrap_err();
    assert_eq!(err, PipelineError::NodeNotFound("text_9".to_string()));

    create_inputs(&mut editor, 1);
    assert_eq!(editor.on_text_changed("input_0", "{{input_0}}").unwrap(), None);
    assert_eq!(editor.graph().edge_count(), 0);

    let err = editor.disconnect("edge-missing").unwrap_err();
    assert!(matches!(err, PipelineError::EdgeNotFound(_)));
    let err = editor.delete_node("input_9").unwrap_err();
    assert!(matches!(err, PipelineError::NodeNotFound(_)));
}

#[test]
fn test_update_field_routes_template_text() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();

    editor
        .update_field("text_0", "text", json!("{{input_0}}"))
        .unwrap();
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_0"]);

    editor
        .update_field("input_0", "inputName", json!("question"))
        .unwrap();
    assert_eq!(
        editor.graph().node("input_0").unwrap().field("inputName"),
        Some(&json!("question"))
    );
}

#[test]
fn test_resync_all_cleans_dangling_auto_edges() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();
    editor.delete_node("input_0").unwrap();
    assert_eq!(editor.graph().find_orphaned_edges().len(), 1);

    let reports = editor.resync_all();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].removed, vec![EdgeId::new("auto-input_0-text_0")]);
    assert!(editor.graph().find_orphaned_edges().is_empty());
}

#[test]
fn test_snapshot_json_shape() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "Hi {{input_0}}").unwrap();

    let json: Value = serde_json::from_str(&editor.snapshot().to_json().unwrap()).unwrap();
    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1]["id"], "text_0");
    assert_eq!(nodes[1]["type"], "text");
    assert_eq!(nodes[1]["data"]["text"], "Hi {{input_0}}");

    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["id"], "auto-input_0-text_0");
    assert_eq!(edges[0]["source"], "input_0");
    assert_eq!(edges[0]["sourceHandle"], "input_0-value");
    assert_eq!(edges[0]["targetHandle"], "text_0-variable-input");
    assert_eq!(edges[0]["provenance"], "auto");
}

#[test]
fn test_restore_from_snapshot_reconciles_text() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 2);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();

    let json = editor.snapshot().to_json_pretty().unwrap();
    let restored =
        PipelineEditor::from_snapshot(PipelineSnapshot::from_json(&json).unwrap(), EditorConfig::default(), None)
            .unwrap();
    assert_eq!(restored.graph(), editor.graph());

    // A snapshot whose edges disagree with its text is repaired on load.
    let mut stale = editor.snapshot();
    stale.edges.clear();
    let restored = PipelineEditor::from_snapshot(stale, EditorConfig::default(), None).unwrap();
    assert_eq!(auto_sources(&restored, "text_0"), vec!["input_0"]);
}

#[test]
fn test_submit_flushes_and_hands_over_snapshot() {
    let mut editor = PipelineEditor::new(deferred(), None);
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();

    let submitter = RecordingSubmitter::default();
    let summary = editor.submit(&submitter).unwrap();
    assert_eq!(summary.num_nodes, 2);
    assert_eq!(summary.num_edges, 1);
    assert!(summary.is_dag);

    let received = submitter.received.lock();
    assert_eq!(received.len(), 1);
    let snapshot = PipelineSnapshot::from_json(&received[0]).unwrap();
    assert_eq!(snapshot.summary().unwrap(), summary);
}

#[test]
fn test_submit_error_propagates() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 1);
    let submitter = RecordingSubmitter {
        reject: true,
        ..Default::default()
    };
    let err = editor.submit(&submitter).unwrap_err();
    assert!(matches!(err, PipelineError::Submit(_)));
}

#[test]
fn test_summary_detects_cycles() {
    let mut editor = PipelineEditor::simple();
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{text_1}}").unwrap();
    assert!(editor.summary().is_dag);
    editor.on_text_changed("text_1", "{{text_0}}").unwrap();
    assert!(!editor.summary().is_dag);
}

#[test]
fn test_shared_editor_across_threads() {
    let shared = PipelineEditor::simple().into_shared();
    {
        let mut editor = shared.write();
        create_inputs(&mut editor, 1);
        editor
            .create_node(NodeKind::Text, Position::default())
            .unwrap();
        editor.on_text_changed("text_0", "{{input_0}}").unwrap();
    }

    let reader = std::sync::Arc::clone(&shared);
    let summary = std::thread::spawn(move || reader.read().summary())
        .join()
        .unwrap();
    assert_eq!(summary.num_edges, 1);
}

#[test]
fn test_editor_config_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("editor.toml");
    std::fs::write(&path, "default_text = \"Answer: {{input_0}}\"\nreconcile = \"deferred\"\n").unwrap();
    let config = TomlConfigProvider::new(&path).get_config().unwrap();

    let mut editor = PipelineEditor::new(config, None);
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    assert!(editor.config().is_deferred());
    assert_eq!(editor.graph().edge_count(), 0);

    editor.flush();
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_0"]);
}

#[test]
fn test_restore_rekeys_foreign_auto_edges() {
    let json = r#"{
        "nodes": [
            {"id": "input_0", "type": "input", "data": {}},
            {"id": "text_0", "type": "text", "data": {"text": "{{input_0}}"}}
        ],
        "edges": [
            {"id": "reactflow__edge-1", "source": "input_0", "target": "text_0", "provenance": "auto"}
        ]
    }"#;
    let mut editor = PipelineEditor::from_snapshot(
        PipelineSnapshot::from_json(json).unwrap(),
        EditorConfig::default(),
        None,
    )
    .unwrap();
    assert_eq!(editor.graph().edge_count(), 1);
    assert_eq!(editor.graph().edges()[0].id.as_str(), "auto-input_0-text_0");
    assert!(editor.graph().built_in_test().is_empty());

    // The re-keyed edge is owned by reconciliation and goes away with its reference.
    editor.on_text_changed("text_0", "no refs").unwrap();
    assert_eq!(editor.graph().edge_count(), 0);
}

#[test]
fn test_restore_does_not_reissue_referenced_ids() {
    let mut editor = PipelineEditor::simple();
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();
    editor.delete_node("input_0").unwrap();

    let json = editor.snapshot().to_json().unwrap();
    let mut restored = PipelineEditor::from_snapshot(
        PipelineSnapshot::from_json(&json).unwrap(),
        EditorConfig::default(),
        None,
    )
    .unwrap();
    let input = restored
        .create_node(NodeKind::Input, Position::default())
        .unwrap();
    assert_eq!(input.as_str(), "input_1");
    let text = restored
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    assert_eq!(text.as_str(), "text_1");
    assert!(auto_sources(&restored, "text_0").is_empty());
}

#[test]
fn test_non_string_template_write_is_reconciled() {
    let mut editor = PipelineEditor::simple();
    let mut rx = editor.subscribe();
    create_inputs(&mut editor, 1);
    editor
        .create_node(NodeKind::Text, Position::default())
        .unwrap();
    editor.on_text_changed("text_0", "{{input_0}}").unwrap();
    assert_eq!(auto_sources(&editor, "text_0"), vec!["input_0"]);
    drain(&mut rx);

    editor.update_field("text_0", "text", Value::Null).unwrap();
    assert!(auto_sources(&editor, "text_0").is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![
            GraphEvent::NodeUpdated(NodeId::from("text_0"), "text".to_string()),
            GraphEvent::EdgesSynced {
                target: NodeId::from("text_0"),
                added: vec![],
                removed: vec![EdgeId::new("auto-input_0-text_0")],
            },
        ]
    );
}
