//! Run a workflow against a live backend and follow it to completion.
//!
//! This example submits a two-block pipeline to the execution backend,
//! tracks the task over its WebSocket channel, and prints the display
//! block's text once the results are reconciled.
//!
//! Requires the workflow backend to be reachable; the base URL comes from
//! `FLOWCANVAS_BASE_URL` (default `http://localhost:8000`).
//!
//! Run with:
//!   cargo run --example run_workflow

use miette::Result;
use serde_json::json;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use flowcanvas::blocks::{BlockData, BlockKind, display_text};
use flowcanvas::config::EndpointConfig;
use flowcanvas::graph::{Position, WorkflowGraph};
use flowcanvas::session::ExecutionSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Simple tracing setup so channel and session events are visible.
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = EndpointConfig::from_env()?;
    info!(base = %config.base(), "submitting to backend");

    let mut graph = WorkflowGraph::new();
    let generate = graph.drop_block(BlockKind::GenerateText, Position::new(100.0, 80.0));
    let display = graph.drop_block(BlockKind::DisplayText, Position::new(380.0, 80.0));

    let mut prompt = BlockData::default();
    prompt.insert("prompt".into(), json!("Write a one-line greeting"));
    graph.update_node_data(&generate.id, &prompt);
    graph.connect(&generate.id, &display.id, None)?;

    let mut session = ExecutionSession::new(config);
    let handle = session.execute(&graph).await?;
    info!(task_id = %handle.id, "task accepted, waiting for results");

    let report = session.run_to_completion(&mut graph).await?;
    info!(
        applied = report.outcome.applied,
        dropped = report.outcome.dropped,
        "results reconciled"
    );

    match display_text(&graph.node(&display.id).unwrap().data) {
        Some(text) => info!("display block says: {text}"),
        None => info!("the backend returned no display text"),
    }

    Ok(())
}
