//! HTTP client for the workflow backend.
//!
//! [`ExecutionClient`] covers the backend's REST surface: submitting a
//! workflow for asynchronous execution, a one-shot status poll, and the
//! save/load/list endpoints for named workflows. Submission is a single
//! attempt by design: retrying would duplicate remote work, so retry is
//! always an explicit caller action.
//!
//! # Examples
//!
//! ```no_run
//! use flowcanvas::client::ExecutionClient;
//! use flowcanvas::document::WorkflowDocument;
//!
//! # async fn demo(document: WorkflowDocument) -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExecutionClient::from_env()?;
//! let handle = client.submit(&document).await?;
//! println!("tracking task {handle}");
//!
//! // Fallback poll, when the event stream is not an option
//! let update = client.task_status(&handle.id).await?;
//! println!("task is {}", update.state);
//! # Ok(())
//! # }
//! ```

use miette::Diagnostic;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::config::{ConfigError, EndpointConfig};
use crate::document::{DocumentError, WorkflowDocument};
use crate::tracking::TaskUpdate;

/// Errors raised by backend requests.
#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    /// The request never completed: connection refused, timeout, ...
    #[error("request failed: {0}")]
    #[diagnostic(
        code(flowcanvas::client::transport),
        help("Check that the workflow backend is reachable.")
    )]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend's `detail` field when one is present,
    /// otherwise the raw response body.
    #[error("backend rejected the request ({status}): {message}")]
    #[diagnostic(code(flowcanvas::client::rejected))]
    Rejected { status: u16, message: String },

    /// The response body was not the expected JSON shape.
    #[error("unexpected response payload: {0}")]
    #[diagnostic(code(flowcanvas::client::invalid_response))]
    InvalidResponse(#[from] serde_json::Error),
}

/// Handle to a submitted task, tracked until terminal and then discarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    #[serde(rename = "task_id")]
    pub id: String,
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A persisted named workflow, as the backend stores it.
///
/// Only `id` is required on the wire: the save endpoint answers with a
/// reduced `{id, message}` record, while load and list return the full row.
/// The document itself is held as raw JSON and validated on access.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedWorkflow {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workflow: Value,
}

impl SavedWorkflow {
    /// The stored document, validated before any graph is built from it.
    ///
    /// A record whose payload has no `blocks` field yields
    /// [`DocumentError::MissingBlocks`] and no graph mutation anywhere.
    pub fn document(&self) -> Result<WorkflowDocument, DocumentError> {
        WorkflowDocument::from_value(&self.workflow)
    }
}

/// Client for the workflow backend's REST endpoints.
#[derive(Clone, Debug)]
pub struct ExecutionClient {
    http: reqwest::Client,
    config: EndpointConfig,
}

impl ExecutionClient {
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Builds a client for the environment-configured backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(EndpointConfig::from_env()?))
    }

    #[must_use]
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Submits a workflow for asynchronous execution.
    ///
    /// Single attempt, no retry: a duplicate submission is duplicate remote
    /// work. The document is not modified.
    pub async fn submit(&self, document: &WorkflowDocument) -> Result<TaskHandle, ClientError> {
        let url = self.config.execute_url();
        tracing::debug!(%url, blocks = document.blocks.len(), "submitting workflow");
        let response = self.http.post(url).json(document).send().await?;
        let handle: TaskHandle = read_json(response).await?;
        tracing::info!(task_id = %handle.id, "workflow accepted");
        Ok(handle)
    }

    /// One-shot status poll for a task, the fallback to the event stream.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskUpdate, ClientError> {
        let url = self.config.task_status_url(task_id);
        tracing::debug!(%url, "polling task status");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    /// Persists a workflow under a name, returning the stored record.
    pub async fn save_workflow(
        &self,
        name: &str,
        description: Option<&str>,
        document: &WorkflowDocument,
    ) -> Result<SavedWorkflow, ClientError> {
        let url = self.config.save_workflow_url();
        tracing::debug!(%url, name, "saving workflow");
        let response = self
            .http
            .post(url)
            .json(&SaveWorkflowRequest {
                name,
                description,
                workflow: document,
            })
            .send()
            .await?;
        read_json(response).await
    }

    /// Fetches one saved workflow by id.
    pub async fn load_workflow(&self, workflow_id: i64) -> Result<SavedWorkflow, ClientError> {
        let url = self.config.workflow_url(workflow_id);
        tracing::debug!(%url, "loading workflow");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    /// Lists every saved workflow.
    pub async fn list_workflows(&self) -> Result<Vec<SavedWorkflow>, ClientError> {
        let url = self.config.workflows_url();
        tracing::debug!(%url, "listing workflows");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }
}

#[derive(Serialize)]
struct SaveWorkflowRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    workflow: &'a WorkflowDocument,
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(rejection(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Surfaces the backend's `detail` message when the error body carries one.
fn rejection(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").map(detail_message))
        .unwrap_or_else(|| body.to_string());
    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn detail_message(detail: &Value) -> String {
    match detail.as_str() {
        Some(text) => text.to_string(),
        // Validation errors arrive as structured arrays; keep them whole.
        None => detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_handle_wire_shape() {
        let handle: TaskHandle = serde_json::from_value(json!({"task_id": "abc-123"})).unwrap();
        assert_eq!(handle.id, "abc-123");
        assert_eq!(handle.to_string(), "abc-123");
    }

    #[test]
    /// The save endpoint's reduced `{id, message}` answer still parses.
    fn saved_workflow_tolerates_reduced_records() {
        let record: SavedWorkflow =
            serde_json::from_value(json!({"id": 7, "message": "Workflow saved successfully"}))
                .unwrap();
        assert_eq!(record.id, 7);
        assert!(record.name.is_empty());
        assert!(matches!(
            record.document(),
            Err(DocumentError::MissingBlocks)
        ));
    }

    #[test]
    fn saved_workflow_document_round_trips() {
        let record: SavedWorkflow = serde_json::from_value(json!({
            "id": 1,
            "name": "greeting",
            "workflow": {"blocks": [{"id": "generateText-1", "type": "generateText"}]}
        }))
        .unwrap();
        let document = record.document().unwrap();
        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].id, "generateText-1");
    }

    #[test]
    fn rejection_prefers_the_detail_field() {
        let err = rejection(StatusCode::BAD_REQUEST, "{\"detail\": \"no blocks\"}");
        assert!(matches!(
            err,
            ClientError::Rejected { status: 400, message } if message == "no blocks"
        ));

        let err = rejection(StatusCode::INTERNAL_SERVER_ERROR, "plain text failure");
        assert!(matches!(
            err,
            ClientError::Rejected { status: 500, message } if message == "plain text failure"
        ));
    }
}
