//! Performance benchmarks for template reconciliation
//!
//! These benchmarks measure the per-keystroke cost of:
//! - Reference extraction over template text
//! - Reconciling one template node in a graph with many unrelated edges
//! - The full editor text-change path
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pipeline_graph::{
    editor::PipelineEditor,
    extract::extract_references,
    graph::PipelineGraph,
    properties::{Connection, NodeKind, PipelineNode, Position},
    sync::sync_text,
};

fn template_text(references: usize) -> String {
    (0..references)
        .map(|idx| format!("Section {idx}: {{{{ input_{idx} }}}}\n"))
        .collect()
}

/// `inputs` input nodes, `texts` template nodes, and a chain of manual edges between the inputs.
fn build_graph(inputs: usize, texts: usize) -> PipelineGraph {
    let mut graph = PipelineGraph::new();
    for idx in 0..inputs {
        graph
            .add_node(PipelineNode::new(format!("input_{idx}"), NodeKind::Input))
            .unwrap();
    }
    for idx in 0..texts {
        graph
            .add_node(PipelineNode::new(format!("text_{idx}"), NodeKind::Text))
            .unwrap();
    }
    for idx in 1..inputs {
        graph
            .add_edge(&Connection::new(
                format!("input_{}", idx - 1),
                format!("input_{idx}"),
            ))
            .unwrap();
    }
    graph
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_references");
    for references in [1, 10, 100] {
        let text = template_text(references);
        group.bench_with_input(BenchmarkId::from_parameter(references), &text, |b, text| {
            b.iter(|| extract_references(black_box(text)))
        });
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for size in [10, 100, 1000] {
        let mut graph = build_graph(size, 10);
        for idx in 1..10 {
            sync_text(&mut graph, &format!("text_{idx}"), &template_text(size.min(20)));
        }
        let texts = [template_text(size.min(20)), template_text(size.min(20) / 2)];
        group.bench_function(BenchmarkId::new("alternating_edit", size), |b| {
            let mut flip = 0;
            b.iter(|| {
                flip ^= 1;
                sync_text(&mut graph, "text_0", black_box(&texts[flip]))
            })
        });
        group.bench_function(BenchmarkId::new("unchanged_edit", size), |b| {
            b.iter(|| sync_text(&mut graph, "text_0", black_box(&texts[0])))
        });
    }
    group.finish();
}

fn bench_editor_keystrokes(c: &mut Criterion) {
    c.bench_function("editor_typing_template", |b| {
        let mut editor = PipelineEditor::simple();
        for _ in 0..20 {
            editor
                .create_node(NodeKind::Input, Position::default())
                .unwrap();
        }
        let text = editor
            .create_node(NodeKind::Text, Position::default())
            .unwrap();
        let full = template_text(20);
        let prefixes = full
            .char_indices()
            .step_by(7)
            .map(|(idx, _)| full[..idx].to_string())
            .collect::<Vec<_>>();
        b.iter(|| {
            for prefix in prefixes.iter() {
                editor.on_text_changed(text.as_str(), prefix).unwrap();
            }
        })
    });
}

criterion_group!(benches, bench_extract, bench_reconcile, bench_editor_keystrokes);
criterion_main!(benches);
