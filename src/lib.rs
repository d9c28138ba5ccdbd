//! # Flowcanvas: Workflow Canvas Execution Engine
//!
//! Flowcanvas is the execution and synchronization engine behind a visual
//! AI-block composer: it models the workflow graph a user edits, serializes
//! it into an execution request, tracks the submitted task over a
//! reconnecting event stream, and folds per-node results back into the
//! graph.
//!
//! ## Core Concepts
//!
//! - **Blocks**: Typed units on the canvas (`generateText`, `displayImage`, ...)
//! - **Graph**: The authoritative in-memory model of blocks and edges
//! - **Document**: The wire form of a graph, `{blocks: [{id, type, inputs, data}]}`
//! - **Task**: One asynchronous remote execution, tracked until terminal
//! - **Reconciliation**: Shallow-merging task results into node data
//!
//! ## Quick Start
//!
//! ### Building and Serializing a Graph
//!
//! ```
//! use flowcanvas::blocks::BlockKind;
//! use flowcanvas::document::WorkflowDocument;
//! use flowcanvas::graph::{Position, WorkflowGraph};
//!
//! let mut graph = WorkflowGraph::new();
//!
//! // Blocks get `{kind}-{ordinal}` ids and per-kind default data
//! let generate = graph.drop_block(BlockKind::GenerateText, Position::new(100.0, 80.0));
//! let display = graph.drop_block(BlockKind::DisplayText, Position::new(380.0, 80.0));
//! assert_eq!(generate.id, "generateText-1");
//!
//! // Edges bind a producer to an input port (the default port here)
//! graph.connect(&generate.id, &display.id, None).unwrap();
//!
//! // The document derives inputs purely from edges
//! let document = WorkflowDocument::from_graph(&graph);
//! assert_eq!(document.blocks[1].inputs["input"], "generateText-1");
//! ```
//!
//! ### Executing and Tracking
//!
//! ```no_run
//! use flowcanvas::config::EndpointConfig;
//! use flowcanvas::graph::WorkflowGraph;
//! use flowcanvas::session::ExecutionSession;
//!
//! # async fn demo(mut graph: WorkflowGraph) -> Result<(), Box<dyn std::error::Error>> {
//! // FLOWCANVAS_BASE_URL, defaulting to http://localhost:8000
//! let mut session = ExecutionSession::new(EndpointConfig::from_env()?);
//!
//! let handle = session.execute(&graph).await?;
//! println!("submitted task {handle}");
//!
//! // Follows updates over the reconnecting channel; on SUCCESS the
//! // per-node results land in the graph's node data.
//! let report = session.run_to_completion(&mut graph).await?;
//! println!("applied {} node results", report.outcome.applied);
//! # Ok(())
//! # }
//! ```
//!
//! ### Observing Updates Directly
//!
//! For custom consumers, attach listeners to a [`tracking::TaskChannel`]:
//!
//! ```no_run
//! use flowcanvas::config::EndpointConfig;
//! use flowcanvas::tracking::{ChannelListener, TaskChannel};
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = TaskChannel::new(EndpointConfig::from_env()?);
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! channel.add_listener(ChannelListener::new(tx));
//! channel.connect("some-task-id").await;
//!
//! while let Some(update) = rx.recv().await {
//!     println!("task is {}", update.state);
//!     if update.is_terminal() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`blocks`] - Block kinds, wire names, default payloads
//! - [`graph`] - Graph model, mutation operations, id allocation
//! - [`document`] - Wire document form and graph conversion
//! - [`config`] - Backend endpoint resolution and URL derivation
//! - [`client`] - REST client: submit, poll, save/load/list
//! - [`tracking`] - Reconnecting task channel, listeners, transport seam
//! - [`reconcile`] - Merging task results into the graph
//! - [`session`] - Caller-owned submit/track/reconcile coordinator

pub mod blocks;
pub mod client;
pub mod config;
pub mod document;
pub mod graph;
pub mod reconcile;
pub mod session;
pub mod tracking;
