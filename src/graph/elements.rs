//! Node and edge element types for workflow graphs.

use serde::{Deserialize, Serialize};

use crate::blocks::{BlockData, BlockKind};

/// 2D canvas coordinate of a block. Presentation-only: positions never
/// influence execution and are not part of the wire document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Position assigned to blocks reconstructed from a document, which
    /// carries no layout information.
    pub const PLACEHOLDER: Position = Position { x: 100.0, y: 100.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position of a block dropped at `cursor`, relative to the canvas
    /// origin (both in the same screen coordinate space).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flowcanvas::graph::Position;
    ///
    /// let dropped = Position::from_drop(Position::new(640.0, 300.0), Position::new(200.0, 80.0));
    /// assert_eq!(dropped, Position::new(440.0, 220.0));
    /// ```
    #[must_use]
    pub fn from_drop(cursor: Position, canvas_origin: Position) -> Self {
        Self {
            x: cursor.x - canvas_origin.x,
            y: cursor.y - canvas_origin.y,
        }
    }
}

/// One block instance on the canvas.
///
/// The `id` is unique within a graph and stable for the node's lifetime;
/// it follows the `{kind}-{ordinal}` pattern issued by the graph's id
/// allocator. `data` is the block's open payload, see
/// [`BlockData`](crate::blocks::BlockData) for its merge semantics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub position: Position,
    #[serde(default)]
    pub data: BlockData,
}

impl BlockNode {
    /// Creates a node carrying the kind's default data.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flowcanvas::blocks::BlockKind;
    /// use flowcanvas::graph::{BlockNode, Position};
    ///
    /// let node = BlockNode::new("generateText-1", BlockKind::GenerateText, Position::default());
    /// assert_eq!(node.data["label"], "generateText node");
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, kind: BlockKind, position: Position) -> Self {
        let data = kind.default_data();
        Self {
            id: id.into(),
            kind,
            position,
            data,
        }
    }

    /// Replaces the node's payload, e.g. when rebuilding from a document.
    #[must_use]
    pub fn with_data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }
}

/// Directed connection feeding one block's output into another's input port.
///
/// `target_handle` names the logical port on the target; when absent the
/// serializer binds the edge to the default port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(
        default,
        rename = "targetHandle",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

impl Edge {
    /// Creates an edge with the conventional `{source}-{target}` id.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{source}-{target}"),
            source,
            target,
            target_handle: None,
        }
    }

    /// Binds the edge to a named input port on the target.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    /// Returns `true` if the edge references `node_id` on either end.
    #[must_use]
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
