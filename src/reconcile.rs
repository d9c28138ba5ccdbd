//! Folding task results back into the graph.
//!
//! A successful task reports per-node partial data; reconciliation applies
//! each partial as a shallow merge onto the matching node and leaves every
//! other node untouched. Results for nodes that left the graph while the
//! task ran are dropped, counted, and logged, never an error: by the time a
//! result arrives, the user may have edited the canvas.
//!
//! Reconciling the same results twice is idempotent, and a merge never
//! deletes fields the partial does not mention.

use crate::graph::WorkflowGraph;
use crate::tracking::NodeResults;

/// Tally of one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Nodes whose data was patched.
    pub applied: usize,
    /// Results silently dropped because the node is gone.
    pub dropped: usize,
}

/// Merges `results` into `graph`, node by node.
///
/// # Examples
///
/// ```rust
/// use flowcanvas::blocks::BlockKind;
/// use flowcanvas::graph::{Position, WorkflowGraph};
/// use flowcanvas::reconcile::reconcile;
/// use flowcanvas::tracking::NodeResults;
/// use serde_json::json;
///
/// let mut graph = WorkflowGraph::new();
/// let node = graph.drop_block(BlockKind::GenerateText, Position::default());
///
/// let results: NodeResults = serde_json::from_value(json!({
///     node.id.clone(): {"text": "Hello!"}
/// })).unwrap();
///
/// let outcome = reconcile(&mut graph, &results);
/// assert_eq!(outcome.applied, 1);
/// assert_eq!(graph.node(&node.id).unwrap().data["text"], "Hello!");
/// ```
pub fn reconcile(graph: &mut WorkflowGraph, results: &NodeResults) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    for (node_id, patch) in results {
        if graph.update_node_data(node_id, patch) {
            outcome.applied += 1;
        } else {
            tracing::debug!(%node_id, "dropping result for a node no longer in the graph");
            outcome.dropped += 1;
        }
    }
    outcome
}
