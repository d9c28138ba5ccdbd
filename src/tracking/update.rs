//! Inbound task tracking messages.
//!
//! One [`TaskUpdate`] arrives per backend state transition. `SUCCESS` and
//! `FAILURE` are terminal; everything else, including backend states this
//! client has never heard of, means the task is still in progress.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::blocks::BlockData;

/// Per-node result payload of a successful task: block id to the partial
/// data patch for that block.
pub type NodeResults = FxHashMap<String, BlockData>;

/// Execution state reported by the backend.
///
/// States travel as bare uppercase strings. Unrecognized states are kept
/// verbatim in [`Other`](Self::Other) and treated as in-progress, so a
/// backend emitting extra intermediate states (`STARTED`, `RETRY`, ...)
/// never terminates tracking early.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Pending,
    Running,
    Success,
    Failure,
    Other(String),
}

impl TaskState {
    /// Terminal states end tracking; nothing arrives after them.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failure)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Pending => "PENDING",
            TaskState::Running => "RUNNING",
            TaskState::Success => "SUCCESS",
            TaskState::Failure => "FAILURE",
            TaskState::Other(s) => s,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for TaskState {
    fn from(s: &str) -> Self {
        match s {
            "PENDING" => TaskState::Pending,
            "RUNNING" => TaskState::Running,
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            other => TaskState::Other(other.to_string()),
        }
    }
}

impl From<String> for TaskState {
    fn from(s: String) -> Self {
        TaskState::from(s.as_str())
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// One tracking message: `{state, result?, error?}`.
///
/// `result` accompanies `SUCCESS`, `error` accompanies `FAILURE`; both are
/// tolerated on any state. `received_at` is stamped locally at parse time
/// and never travels on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<NodeResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl TaskUpdate {
    #[must_use]
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            result: None,
            error: None,
            received_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: NodeResults) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Parses one wire payload, stamping the receipt time.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
