//! Workflow graph model: nodes, edges, positions, and id allocation.
//!
//! The graph is the authoritative client-side state of a canvas. The wire
//! form of a graph is a [`WorkflowDocument`](crate::document::WorkflowDocument);
//! conversion in both directions lives in [`crate::document`].
//!
//! # Quick Start
//!
//! ```rust
//! use flowcanvas::blocks::BlockKind;
//! use flowcanvas::graph::{Position, WorkflowGraph};
//!
//! let mut graph = WorkflowGraph::new();
//! let prompt = graph.drop_block(BlockKind::GenerateText, Position::new(100.0, 60.0));
//! let output = graph.drop_block(BlockKind::DisplayText, Position::new(380.0, 60.0));
//!
//! // Feed the generator's output into the display block's default port
//! graph.connect(&prompt.id, &output.id, None).unwrap();
//!
//! assert_eq!(prompt.id, "generateText-1");
//! assert!(graph.node(&output.id).is_some());
//! ```

mod elements;
mod ids;
mod model;

pub use elements::{BlockNode, Edge, Position};
pub use ids::BlockIdAllocator;
pub use model::{GraphError, WorkflowGraph};
