//! The mutable workflow graph store.
//!
//! [`WorkflowGraph`] is the authoritative in-memory model of a canvas: block
//! nodes, the directed edges between them, and the id allocator that names
//! new blocks. All mutation goes through validated operations so the
//! structural invariants hold at every point:
//!
//! - node and edge ids are unique within the graph
//! - every edge endpoint references an existing node
//! - removing a node removes every edge touching it in the same operation
//!
//! Consumers never mutate node payloads directly; changes flow through
//! [`update_node_data`](WorkflowGraph::update_node_data) patches, which is
//! also how execution results are folded back in (see
//! [`reconcile`](crate::reconcile::reconcile)).

use miette::Diagnostic;
use thiserror::Error;

use super::elements::{BlockNode, Edge, Position};
use super::ids::BlockIdAllocator;
use crate::blocks::{BlockData, BlockKind};

/// Errors raised by graph mutations. No partial mutation: a failed
/// operation leaves the graph exactly as it was.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// A node with this id is already in the graph.
    #[error("duplicate node id: {id}")]
    #[diagnostic(
        code(flowcanvas::graph::duplicate_node),
        help("Allocate ids through the graph (drop_block) to avoid collisions.")
    )]
    DuplicateNode { id: String },

    /// An edge with this id is already in the graph.
    #[error("duplicate edge id: {id}")]
    #[diagnostic(code(flowcanvas::graph::duplicate_edge))]
    DuplicateEdge { id: String },

    /// An edge endpoint does not reference an existing node.
    #[error("edge {edge_id} references missing node: {node_id}")]
    #[diagnostic(
        code(flowcanvas::graph::missing_endpoint),
        help("Add both endpoint nodes before connecting them.")
    )]
    MissingEndpoint { edge_id: String, node_id: String },

    /// The referenced node is not in the graph.
    #[error("unknown node id: {id}")]
    #[diagnostic(code(flowcanvas::graph::unknown_node))]
    UnknownNode { id: String },
}

/// Mutable store of block nodes and edges for one editing session.
///
/// Nodes and edges keep insertion order, which is also the block order of
/// serialized documents.
///
/// # Examples
///
/// ```rust
/// use flowcanvas::blocks::BlockKind;
/// use flowcanvas::graph::{Position, WorkflowGraph};
///
/// let mut graph = WorkflowGraph::new();
/// let generate = graph.drop_block(BlockKind::GenerateText, Position::new(80.0, 40.0));
/// let display = graph.drop_block(BlockKind::DisplayText, Position::new(320.0, 40.0));
/// graph.connect(&generate.id, &display.id, None).unwrap();
///
/// assert_eq!(graph.nodes().len(), 2);
/// assert_eq!(graph.edges().len(), 1);
///
/// // Removing a node cascades to its edges
/// graph.remove_node(&display.id).unwrap();
/// assert!(graph.edges().is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct WorkflowGraph {
    nodes: Vec<BlockNode>,
    edges: Vec<Edge>,
    ids: BlockIdAllocator,
}

impl WorkflowGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Node operations
    // ------------------------------------------------------------------

    /// Places a new block of `kind` at `position`, with a freshly allocated
    /// id and the kind's default data. Returns the inserted node.
    pub fn drop_block(&mut self, kind: BlockKind, position: Position) -> BlockNode {
        let id = self.ids.allocate(&kind);
        let node = BlockNode::new(id, kind, position);
        tracing::debug!(node_id = %node.id, kind = %node.kind, "placing block");
        self.nodes.push(node.clone());
        node
    }

    /// Inserts an externally constructed node, rejecting duplicate ids.
    ///
    /// The node's id is observed by the allocator so later
    /// [`drop_block`](Self::drop_block) calls stay ahead of it.
    pub fn add_node(&mut self, node: BlockNode) -> Result<(), GraphError> {
        if self.node(&node.id).is_some() {
            return Err(GraphError::DuplicateNode { id: node.id });
        }
        self.ids.observe(&node.id);
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node and every edge referencing it, returning the node.
    pub fn remove_node(&mut self, id: &str) -> Result<BlockNode, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| GraphError::UnknownNode { id: id.to_string() })?;
        let node = self.nodes.remove(index);
        let edges_before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        tracing::debug!(
            node_id = %node.id,
            removed_edges = edges_before - self.edges.len(),
            "removed block"
        );
        Ok(node)
    }

    /// Shallow-merges `patch` into the node's data, keeping fields the
    /// patch does not mention. Returns whether the node exists.
    pub fn update_node_data(&mut self, id: &str, patch: &BlockData) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) else {
            return false;
        };
        for (key, value) in patch {
            node.data.insert(key.clone(), value.clone());
        }
        true
    }

    // ------------------------------------------------------------------
    // Edge operations
    // ------------------------------------------------------------------

    /// Inserts an edge, validating both endpoints and id uniqueness.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edge(&edge.id).is_some() {
            return Err(GraphError::DuplicateEdge { id: edge.id });
        }
        for endpoint in [&edge.source, &edge.target] {
            if self.node(endpoint).is_none() {
                return Err(GraphError::MissingEndpoint {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Connects `source` to `target`, optionally on a named input port.
    /// Returns the inserted edge.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        handle: Option<&str>,
    ) -> Result<Edge, GraphError> {
        let mut edge = Edge::new(source, target);
        if let Some(handle) = handle {
            edge = edge.with_handle(handle);
        }
        self.add_edge(edge.clone())?;
        Ok(edge)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&BlockNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[BlockNode] {
        &self.nodes
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges feeding into `target`, in insertion order.
    pub fn incoming_edges<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |edge| edge.target == target)
    }
}
