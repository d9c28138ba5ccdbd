//! Wire document form of a workflow and its conversion to/from the graph.
//!
//! A [`WorkflowDocument`] is the backend-agnostic execution request: each
//! block carries its id, kind, `data` payload, and an `inputs` map binding
//! input-port names to producing block ids. Inputs are derived purely from
//! the graph's edges at serialization time; positions and edge ids are
//! presentation state and are not part of the document.
//!
//! Deserialization rebuilds a graph at placeholder positions, so layout does
//! not survive a save/load round-trip. Everything that affects execution
//! does: `serialize(deserialize(serialize(g)))` equals `serialize(g)`.
//!
//! Two edges into the same port of the same block collapse to one binding,
//! last edge wins. The model allows the shape; the document cannot express
//! it.
//!
//! # Examples
//!
//! ```rust
//! use flowcanvas::blocks::BlockKind;
//! use flowcanvas::document::WorkflowDocument;
//! use flowcanvas::graph::{Position, WorkflowGraph};
//!
//! let mut graph = WorkflowGraph::new();
//! let generate = graph.drop_block(BlockKind::GenerateText, Position::new(0.0, 0.0));
//! let display = graph.drop_block(BlockKind::DisplayText, Position::new(240.0, 0.0));
//! graph.connect(&generate.id, &display.id, None).unwrap();
//!
//! let document = WorkflowDocument::from_graph(&graph);
//! assert_eq!(document.blocks.len(), 2);
//! assert_eq!(document.blocks[1].inputs["input"], generate.id);
//!
//! let rebuilt = document.clone().into_graph().unwrap();
//! assert_eq!(WorkflowDocument::from_graph(&rebuilt), document);
//! ```

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blocks::{BlockData, BlockKind};
use crate::graph::{BlockNode, GraphError, Position, WorkflowGraph};

/// Input-port name an edge binds to when it names no handle.
pub const DEFAULT_PORT: &str = "input";

/// Errors raised while interpreting a workflow document.
#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    /// The payload is not a workflow document at all.
    #[error("workflow document has no blocks field")]
    #[diagnostic(
        code(flowcanvas::document::missing_blocks),
        help("Expected an object with a `blocks` array.")
    )]
    MissingBlocks,

    /// An input binding names a producer that is not in the document.
    #[error("block {block} input {port:?} references missing producer: {source}")]
    #[diagnostic(code(flowcanvas::document::unknown_producer))]
    UnknownProducer {
        block: String,
        port: String,
        source: String,
    },

    /// The document violates a graph invariant (duplicate ids, ...).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// The payload is not valid document JSON.
    #[error(transparent)]
    #[diagnostic(code(flowcanvas::document::serde_json))]
    Serde(#[from] serde_json::Error),
}

/// One block of an execution request: `{id, type, inputs, data}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Input-port name to producing block id.
    #[serde(default)]
    pub inputs: FxHashMap<String, String>,
    #[serde(default)]
    pub data: BlockData,
}

/// The execution request for a workflow: `{blocks: [...]}`.
///
/// Block order follows the graph's node insertion order and is
/// deterministic, but consumers must treat the list as a set keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub blocks: Vec<Block>,
}

impl WorkflowDocument {
    /// Serializes a graph into its document form.
    ///
    /// Each node becomes one block; its `inputs` come from the node's
    /// incoming edges, bound to the edge's handle or [`DEFAULT_PORT`].
    /// The graph is not modified.
    #[must_use]
    pub fn from_graph(graph: &WorkflowGraph) -> Self {
        let blocks = graph
            .nodes()
            .iter()
            .map(|node| {
                let mut inputs = FxHashMap::default();
                for edge in graph.incoming_edges(&node.id) {
                    let port = edge.target_handle.as_deref().unwrap_or(DEFAULT_PORT);
                    inputs.insert(port.to_string(), edge.source.clone());
                }
                Block {
                    id: node.id.clone(),
                    kind: node.kind.clone(),
                    inputs,
                    data: node.data.clone(),
                }
            })
            .collect();
        Self { blocks }
    }

    /// Rebuilds a graph from this document.
    ///
    /// Nodes land at [`Position::PLACEHOLDER`] since the document carries no
    /// layout. Edges are synthesized from input bindings with the
    /// conventional `{source}-{target}` ids; non-default ports are kept as
    /// handles so bindings survive the next serialization.
    pub fn into_graph(self) -> Result<WorkflowGraph, DocumentError> {
        let mut graph = WorkflowGraph::new();
        for block in &self.blocks {
            graph.add_node(
                BlockNode::new(&block.id, block.kind.clone(), Position::PLACEHOLDER)
                    .with_data(block.data.clone()),
            )?;
        }
        // Second pass, nodes all exist; forward references resolve.
        for block in &self.blocks {
            for (port, source) in &block.inputs {
                if graph.node(source).is_none() {
                    return Err(DocumentError::UnknownProducer {
                        block: block.id.clone(),
                        port: port.clone(),
                        source: source.clone(),
                    });
                }
                let handle = (port != DEFAULT_PORT).then_some(port.as_str());
                graph.connect(source, &block.id, handle)?;
            }
        }
        Ok(graph)
    }

    /// Parses a document out of raw JSON, insisting on the `blocks` field
    /// first so a foreign payload yields a format error rather than a
    /// field-by-field serde failure.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, DocumentError> {
        if value.get("blocks").is_none() {
            return Err(DocumentError::MissingBlocks);
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}
