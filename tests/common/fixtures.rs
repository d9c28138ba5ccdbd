#![allow(dead_code)]

use flowcanvas::blocks::{BlockData, BlockKind};
use flowcanvas::graph::{Position, WorkflowGraph};
use flowcanvas::tracking::NodeResults;
use serde_json::Value;

/// Builds a [`BlockData`] map from a JSON object literal.
pub fn block_data(fields: Value) -> BlockData {
    serde_json::from_value(fields).expect("object literal")
}

/// Builds a [`NodeResults`] map from a JSON object literal.
pub fn node_results(fields: Value) -> NodeResults {
    serde_json::from_value(fields).expect("results literal")
}

/// `generateText-1` feeding `displayText-1` on the default port, with the
/// generator's prompt filled in.
pub fn prompt_pipeline() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    let generate = graph.drop_block(BlockKind::GenerateText, Position::new(100.0, 80.0));
    let display = graph.drop_block(BlockKind::DisplayText, Position::new(380.0, 80.0));
    graph.update_node_data(
        &generate.id,
        &block_data(serde_json::json!({"prompt": "Say hello"})),
    );
    graph
        .connect(&generate.id, &display.id, None)
        .expect("connect pipeline");
    graph
}

/// A three-stage pipeline mixing media kinds:
/// `generateText-1 -> generateImage-1 -> displayImage-1`.
pub fn media_pipeline() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    let caption = graph.drop_block(BlockKind::GenerateText, Position::new(60.0, 40.0));
    let image = graph.drop_block(BlockKind::GenerateImage, Position::new(300.0, 40.0));
    let display = graph.drop_block(BlockKind::DisplayImage, Position::new(540.0, 40.0));
    graph
        .connect(&caption.id, &image.id, None)
        .expect("connect caption");
    graph
        .connect(&image.id, &display.id, None)
        .expect("connect image");
    graph
}
