mod common;

use common::{block_data, media_pipeline, prompt_pipeline};
use flowcanvas::blocks::BlockKind;
use flowcanvas::document::{DEFAULT_PORT, DocumentError, WorkflowDocument};
use flowcanvas::graph::{GraphError, Position, WorkflowGraph};
use serde_json::json;

#[test]
fn inputs_are_derived_from_edges() {
    let document = WorkflowDocument::from_graph(&prompt_pipeline());

    assert_eq!(document.blocks.len(), 2);
    let generate = &document.blocks[0];
    let display = &document.blocks[1];

    assert!(generate.inputs.is_empty());
    assert_eq!(display.inputs.len(), 1);
    assert_eq!(display.inputs[DEFAULT_PORT], "generateText-1");
}

#[test]
fn named_handles_become_port_bindings() {
    let mut graph = WorkflowGraph::new();
    let caption = graph.drop_block(BlockKind::GenerateText, Position::default());
    let image = graph.drop_block(BlockKind::GenerateImage, Position::default());
    graph
        .connect(&caption.id, &image.id, Some("style"))
        .expect("connect");

    let document = WorkflowDocument::from_graph(&graph);
    assert_eq!(document.blocks[1].inputs["style"], caption.id);
    assert!(!document.blocks[1].inputs.contains_key(DEFAULT_PORT));
}

#[test]
fn two_edges_into_one_port_collapse_to_the_last() {
    let mut graph = WorkflowGraph::new();
    let first = graph.drop_block(BlockKind::GenerateText, Position::default());
    let second = graph.drop_block(BlockKind::GenerateText, Position::default());
    let display = graph.drop_block(BlockKind::DisplayText, Position::default());
    graph.connect(&first.id, &display.id, None).expect("first");
    graph
        .connect(&second.id, &display.id, None)
        .expect("second");

    let document = WorkflowDocument::from_graph(&graph);
    let display_block = &document.blocks[2];
    assert_eq!(display_block.inputs.len(), 1);
    assert_eq!(display_block.inputs[DEFAULT_PORT], second.id);
}

#[test]
fn documents_carry_no_layout_or_edge_ids() {
    let value = serde_json::to_value(WorkflowDocument::from_graph(&prompt_pipeline()))
        .expect("document json");

    assert!(value.get("edges").is_none());
    for block in value["blocks"].as_array().expect("blocks array") {
        let object = block.as_object().expect("block object");
        assert!(object.contains_key("id"));
        assert!(object.contains_key("type"));
        assert!(!object.contains_key("position"));
        assert!(!object.contains_key("targetHandle"));
    }
}

#[test]
fn block_order_follows_node_insertion_order() {
    let document = WorkflowDocument::from_graph(&media_pipeline());
    let ids: Vec<&str> = document.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["generateText-1", "generateImage-1", "displayImage-1"]
    );
}

#[test]
fn round_trip_preserves_execution_semantics() {
    let original = WorkflowDocument::from_graph(&media_pipeline());
    let rebuilt = original.clone().into_graph().expect("rebuild");
    assert_eq!(WorkflowDocument::from_graph(&rebuilt), original);
}

#[test]
fn reload_places_blocks_at_the_placeholder_position() {
    let document = WorkflowDocument::from_graph(&prompt_pipeline());
    let rebuilt = document.into_graph().expect("rebuild");

    for node in rebuilt.nodes() {
        assert_eq!(node.position, Position::PLACEHOLDER);
    }
}

#[test]
fn reload_synthesizes_conventional_edges() {
    let mut graph = WorkflowGraph::new();
    let caption = graph.drop_block(BlockKind::GenerateText, Position::default());
    let image = graph.drop_block(BlockKind::GenerateImage, Position::default());
    graph
        .connect(&caption.id, &image.id, Some("style"))
        .expect("connect");

    let rebuilt = WorkflowDocument::from_graph(&graph)
        .into_graph()
        .expect("rebuild");

    let edge = rebuilt.edge("generateText-1-generateImage-1").expect("edge");
    assert_eq!(edge.source, "generateText-1");
    assert_eq!(edge.target, "generateImage-1");
    // Non-default ports survive as handles; default ports do not.
    assert_eq!(edge.target_handle.as_deref(), Some("style"));
}

#[test]
fn reload_seeds_the_id_allocator() {
    let mut rebuilt = WorkflowDocument::from_graph(&prompt_pipeline())
        .into_graph()
        .expect("rebuild");

    let next = rebuilt.drop_block(BlockKind::GenerateText, Position::default());
    assert_eq!(next.id, "generateText-2");
}

#[test]
fn reload_preserves_block_payloads() {
    let mut graph = WorkflowGraph::new();
    let node = graph.drop_block(BlockKind::DisplayText, Position::default());
    graph.update_node_data(&node.id, &block_data(json!({"text": "kept"})));

    let rebuilt = WorkflowDocument::from_graph(&graph)
        .into_graph()
        .expect("rebuild");
    let reloaded = rebuilt.node(&node.id).expect("node");
    assert_eq!(reloaded.data["text"], "kept");
    assert_eq!(reloaded.data["label"], "displayText node");
}

#[test]
fn unknown_producers_are_rejected() {
    let document: WorkflowDocument = serde_json::from_value(json!({
        "blocks": [{
            "id": "displayText-1",
            "type": "displayText",
            "inputs": {"input": "ghost-1"},
        }]
    }))
    .expect("parse");

    let err = document.into_graph().unwrap_err();
    match err {
        DocumentError::UnknownProducer {
            block,
            port,
            source,
        } => {
            assert_eq!(block, "displayText-1");
            assert_eq!(port, "input");
            assert_eq!(source, "ghost-1");
        }
        other => panic!("expected unknown producer, got: {other}"),
    }
}

#[test]
fn duplicate_block_ids_are_rejected() {
    let document: WorkflowDocument = serde_json::from_value(json!({
        "blocks": [
            {"id": "generateText-1", "type": "generateText"},
            {"id": "generateText-1", "type": "generateText"},
        ]
    }))
    .expect("parse");

    let err = document.into_graph().unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Graph(GraphError::DuplicateNode { id }) if id == "generateText-1"
    ));
}

#[test]
fn an_empty_document_builds_an_empty_graph() {
    let graph = WorkflowDocument::default().into_graph().expect("empty");
    assert!(graph.nodes().is_empty());
    assert!(graph.edges().is_empty());

    let document = WorkflowDocument::from_graph(&graph);
    assert!(document.blocks.is_empty());
}

#[test]
fn custom_kinds_survive_the_round_trip() {
    let document: WorkflowDocument = serde_json::from_value(json!({
        "blocks": [
            {"id": "summarize-1", "type": "summarize", "data": {"label": "summarize node"}},
            {"id": "displayText-1", "type": "displayText",
             "inputs": {"input": "summarize-1"}},
        ]
    }))
    .expect("parse");

    let graph = document.clone().into_graph().expect("rebuild");
    let node = graph.node("summarize-1").expect("custom node");
    assert_eq!(node.kind, BlockKind::Custom("summarize".to_string()));
    assert_eq!(WorkflowDocument::from_graph(&graph), document);
}
