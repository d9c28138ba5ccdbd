//! Endpoint configuration for the workflow backend.
//!
//! One base URL drives everything: the REST endpoints and the task channel
//! address are all derived from it, with the channel swapping `http`/`https`
//! for `ws`/`wss`. The base comes from `FLOWCANVAS_BASE_URL` (after loading a
//! `.env` file if present) and defaults to the local development backend.
//!
//! # Examples
//!
//! ```rust
//! use flowcanvas::config::EndpointConfig;
//!
//! let config = EndpointConfig::new("http://localhost:8000").unwrap();
//! assert_eq!(config.execute_url().as_str(), "http://localhost:8000/execute-workflow");
//! assert_eq!(config.task_channel_url("abc").as_str(), "ws://localhost:8000/ws/abc");
//! ```

use miette::Diagnostic;
use thiserror::Error;
use url::Url;

/// Environment variable naming the backend base URL.
pub const BASE_URL_ENV: &str = "FLOWCANVAS_BASE_URL";

/// Base URL used when the environment provides none.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Errors raised while resolving the endpoint configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid base endpoint {value:?}")]
    #[diagnostic(
        code(flowcanvas::config::invalid_url),
        help("Set FLOWCANVAS_BASE_URL to a full URL, e.g. http://localhost:8000.")
    )]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported base endpoint scheme: {scheme}")]
    #[diagnostic(
        code(flowcanvas::config::unsupported_scheme),
        help("Only http and https backends are supported.")
    )]
    UnsupportedScheme { scheme: String },
}

/// Resolved backend endpoints, cheap to clone and share.
#[derive(Clone, Debug)]
pub struct EndpointConfig {
    base: Url,
}

impl EndpointConfig {
    /// Builds a configuration for an explicit base URL.
    pub fn new(base: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base).map_err(|source| ConfigError::InvalidBaseUrl {
            value: base.to_string(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self { base: url }),
            scheme => Err(ConfigError::UnsupportedScheme {
                scheme: scheme.to_string(),
            }),
        }
    }

    /// Resolves the base URL from the environment.
    ///
    /// Loads `.env` if one is present, then reads [`BASE_URL_ENV`], falling
    /// back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let base =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base)
    }

    /// The configured base URL.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `POST` endpoint submitting a workflow for execution.
    #[must_use]
    pub fn execute_url(&self) -> Url {
        self.endpoint("/execute-workflow")
    }

    /// `GET` endpoint for a one-shot task status poll.
    #[must_use]
    pub fn task_status_url(&self, task_id: &str) -> Url {
        self.endpoint(&format!("/task-status/{task_id}"))
    }

    /// `POST` endpoint persisting a named workflow.
    #[must_use]
    pub fn save_workflow_url(&self) -> Url {
        self.endpoint("/workflows/save")
    }

    /// `GET` endpoint for one saved workflow.
    #[must_use]
    pub fn workflow_url(&self, workflow_id: i64) -> Url {
        self.endpoint(&format!("/workflows/{workflow_id}"))
    }

    /// `GET` endpoint listing saved workflows.
    #[must_use]
    pub fn workflows_url(&self) -> Url {
        self.endpoint("/workflows")
    }

    /// Event-stream address for one task's tracking channel.
    ///
    /// Same host as the base URL with the scheme swapped to `ws` (`wss`
    /// for `https` backends).
    #[must_use]
    pub fn task_channel_url(&self, task_id: &str) -> Url {
        let mut url = self.endpoint(&format!("/ws/{task_id}"));
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) and ws(s) are interchangeable for set_scheme; the
        // constructor admits nothing else.
        let _ = url.set_scheme(scheme);
        url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }
}
