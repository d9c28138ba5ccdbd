//! Caller-owned execution session tying the engine together.
//!
//! [`ExecutionSession`] coordinates one graph's submit/track/reconcile
//! cycle: serialize the graph, submit it, follow the task's channel, and on
//! success fold the results back into the graph. It enforces the one
//! tracking channel per in-flight task invariant, so starting a new
//! execution always disconnects the previous one first.
//!
//! Sessions are values owned by their caller; there is no process-global
//! session or channel.
//!
//! # Examples
//!
//! ```no_run
//! use flowcanvas::blocks::BlockKind;
//! use flowcanvas::config::EndpointConfig;
//! use flowcanvas::graph::{Position, WorkflowGraph};
//! use flowcanvas::session::ExecutionSession;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = WorkflowGraph::new();
//! let generate = graph.drop_block(BlockKind::GenerateText, Position::default());
//! let display = graph.drop_block(BlockKind::DisplayText, Position::new(240.0, 0.0));
//! graph.connect(&generate.id, &display.id, None)?;
//!
//! let mut session = ExecutionSession::new(EndpointConfig::from_env()?);
//! session.execute(&graph).await?;
//! let report = session.run_to_completion(&mut graph).await?;
//! println!("applied {} node results", report.outcome.applied);
//! # Ok(())
//! # }
//! ```

use miette::Diagnostic;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::client::{ClientError, ExecutionClient, TaskHandle};
use crate::config::EndpointConfig;
use crate::document::WorkflowDocument;
use crate::graph::WorkflowGraph;
use crate::reconcile::{ReconcileOutcome, reconcile};
use crate::tracking::{ChannelListener, StatusTransport, TaskChannel, TaskState, TaskUpdate};

/// Errors raised while driving an execution.
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// Waiting for completion with nothing submitted.
    #[error("no task in flight")]
    #[diagnostic(
        code(flowcanvas::session::no_task),
        help("Call execute before waiting for completion.")
    )]
    NoTaskInFlight,

    /// The backend reported the task as failed; the message is verbatim.
    #[error("task {task_id} failed: {message}")]
    #[diagnostic(code(flowcanvas::session::task_failed))]
    TaskFailed { task_id: String, message: String },

    /// The tracking channel went away before a terminal update.
    #[error("tracking channel closed before task {task_id} finished")]
    #[diagnostic(code(flowcanvas::session::channel_closed))]
    ChannelClosed { task_id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),
}

/// User-facing view of the session's execution lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Nothing submitted, or the last execution was cancelled.
    Idle,
    /// Submitted and not yet terminal; `state` follows the latest update.
    InFlight { task_id: String, state: TaskState },
    /// Finished successfully; results were reconciled into the graph.
    Completed { task_id: String },
    /// The backend reported failure.
    Failed { task_id: String, error: String },
}

/// Result of a completed execution.
#[derive(Clone, Debug)]
pub struct ExecutionReport {
    pub task_id: String,
    pub outcome: ReconcileOutcome,
}

/// Coordinates submit, tracking, and reconciliation for one caller.
pub struct ExecutionSession {
    id: Uuid,
    client: ExecutionClient,
    channel: TaskChannel,
    updates: mpsc::UnboundedReceiver<TaskUpdate>,
    status: ExecutionStatus,
}

impl ExecutionSession {
    /// Session against the configured backend over WebSocket tracking.
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        let channel = TaskChannel::new(config.clone());
        Self::assemble(config, channel)
    }

    /// Session with a custom tracking transport.
    #[must_use]
    pub fn with_transport(config: EndpointConfig, transport: Arc<dyn StatusTransport>) -> Self {
        let channel = TaskChannel::with_transport(config.clone(), transport);
        Self::assemble(config, channel)
    }

    fn assemble(config: EndpointConfig, channel: TaskChannel) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        channel.add_listener(ChannelListener::new(tx));
        Self {
            id: Uuid::new_v4(),
            client: ExecutionClient::new(config),
            channel,
            updates: rx,
            status: ExecutionStatus::Idle,
        }
    }

    /// Session id, for diagnostics only.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> &ExecutionStatus {
        &self.status
    }

    /// The underlying REST client, for save/load/list calls.
    #[must_use]
    pub fn client(&self) -> &ExecutionClient {
        &self.client
    }

    /// The tracking channel, for extra listeners or phase inspection.
    #[must_use]
    pub fn channel(&self) -> &TaskChannel {
        &self.channel
    }

    /// Serializes and submits `graph`, then starts tracking the task.
    ///
    /// Any previous execution's channel is disconnected first. On a
    /// submission error the session is back to idle and nothing tracks.
    pub async fn execute(&mut self, graph: &WorkflowGraph) -> Result<TaskHandle, SessionError> {
        self.channel.disconnect().await;
        // Flush updates a previous, abandoned execution left behind.
        while self.updates.try_recv().is_ok() {}

        let document = WorkflowDocument::from_graph(graph);
        let handle = match self.client.submit(&document).await {
            Ok(handle) => handle,
            Err(error) => {
                self.status = ExecutionStatus::Idle;
                return Err(error.into());
            }
        };
        self.channel.connect(&handle.id).await;
        tracing::info!(session = %self.id, task_id = %handle.id, "tracking execution");
        self.status = ExecutionStatus::InFlight {
            task_id: handle.id.clone(),
            state: TaskState::Pending,
        };
        Ok(handle)
    }

    /// Follows the in-flight task until terminal.
    ///
    /// On `SUCCESS` the per-node results are reconciled into `graph` and
    /// the report tallies the merge. On `FAILURE` the backend's error is
    /// surfaced verbatim. There is no client-side timeout: a task whose
    /// terminal update never arrives keeps this future pending, bounding
    /// waits is the caller's policy.
    pub async fn run_to_completion(
        &mut self,
        graph: &mut WorkflowGraph,
    ) -> Result<ExecutionReport, SessionError> {
        let ExecutionStatus::InFlight { task_id, .. } = &self.status else {
            return Err(SessionError::NoTaskInFlight);
        };
        let task_id = task_id.clone();

        loop {
            let Some(update) = self.updates.recv().await else {
                self.status = ExecutionStatus::Idle;
                return Err(SessionError::ChannelClosed { task_id });
            };
            match update.state {
                TaskState::Success => {
                    let results = update.result.unwrap_or_default();
                    let outcome = reconcile(graph, &results);
                    tracing::info!(
                        session = %self.id,
                        %task_id,
                        applied = outcome.applied,
                        dropped = outcome.dropped,
                        "execution completed"
                    );
                    self.status = ExecutionStatus::Completed {
                        task_id: task_id.clone(),
                    };
                    return Ok(ExecutionReport { task_id, outcome });
                }
                TaskState::Failure => {
                    let message = update
                        .error
                        .unwrap_or_else(|| "task failed without detail".to_string());
                    self.status = ExecutionStatus::Failed {
                        task_id: task_id.clone(),
                        error: message.clone(),
                    };
                    return Err(SessionError::TaskFailed { task_id, message });
                }
                state => {
                    self.status = ExecutionStatus::InFlight {
                        task_id: task_id.clone(),
                        state,
                    };
                }
            }
        }
    }

    /// Abandons the in-flight execution, if any.
    ///
    /// The channel disconnects (cancelling a pending reconnect) and the
    /// session returns to idle. The remote task keeps running; the backend
    /// offers no cancellation.
    pub async fn cancel(&mut self) {
        self.channel.disconnect().await;
        if matches!(self.status, ExecutionStatus::InFlight { .. }) {
            self.status = ExecutionStatus::Idle;
        }
    }
}
