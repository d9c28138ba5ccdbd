#![allow(dead_code)]

use async_trait::async_trait;
use flowcanvas::tracking::{StatusStream, StatusTransport, TransportError};
use serde_json::json;
use std::collections::VecDeque;
use std::future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use url::Url;

/// Scripted reaction to one connection attempt.
pub enum Connection {
    /// Refuse the attempt with an error.
    Refuse(&'static str),
    /// Accept and serve the frames in order.
    Serve(Vec<Frame>),
}

/// Scripted frame on an accepted connection.
pub enum Frame {
    /// Deliver a text payload.
    Text(String),
    /// Fault the transport without closing the stream.
    Fault(&'static str),
    /// Close the stream from the server side.
    Close,
    /// Deliver nothing more; the stream only ends when the channel shuts
    /// down and drops it.
    Stall,
}

impl Frame {
    /// Frame carrying a bare `{state}` update.
    pub fn state(state: &str) -> Self {
        Frame::Text(json!({"state": state}).to_string())
    }

    /// Frame carrying a terminal `SUCCESS` update with per-node results.
    pub fn success(results: serde_json::Value) -> Self {
        Frame::Text(json!({"state": "SUCCESS", "result": results}).to_string())
    }

    /// Frame carrying a terminal `FAILURE` update with an error message.
    pub fn failure(message: &str) -> Self {
        Frame::Text(json!({"state": "FAILURE", "error": message}).to_string())
    }
}

/// Transport that answers connection attempts from a fixed script.
///
/// Attempts past the end of the script are refused, so a channel that
/// should have stopped shows up as extra counted attempts instead of a
/// hang.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Connection>>,
    attempts: AtomicUsize,
    closed_streams: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Connection>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            attempts: AtomicUsize::new(0),
            closed_streams: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// How many connection attempts the channel has made.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// How many served streams were explicitly closed.
    pub fn closed_streams(&self) -> usize {
        self.closed_streams.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusTransport for ScriptedTransport {
    async fn connect(&self, _url: &Url) -> Result<Box<dyn StatusStream>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Connection::Serve(frames)) => Ok(Box::new(ScriptedStream {
                frames: frames.into(),
                closed: self.closed_streams.clone(),
            })),
            Some(Connection::Refuse(message)) => Err(TransportError::Connect {
                message: message.to_string(),
            }),
            None => Err(TransportError::Connect {
                message: "script exhausted".to_string(),
            }),
        }
    }
}

struct ScriptedStream {
    frames: VecDeque<Frame>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl StatusStream for ScriptedStream {
    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        match self.frames.pop_front() {
            Some(Frame::Text(payload)) => Some(Ok(payload)),
            Some(Frame::Fault(message)) => Some(Err(TransportError::Connect {
                message: message.to_string(),
            })),
            Some(Frame::Close) | None => None,
            Some(Frame::Stall) => future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Polls `cond` every few milliseconds, panicking if it does not hold
/// within two seconds.
pub async fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        sleep(Duration::from_millis(5)).await;
    }
}
