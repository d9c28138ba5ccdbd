//! Listener abstractions for task update delivery.

use std::io::{self, Result as IoResult};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::update::TaskUpdate;

/// Identity of a registered listener, returned by
/// [`TaskChannel::add_listener`](super::TaskChannel::add_listener) and used
/// to remove it again.
pub type ListenerId = u64;

/// Abstraction over a consumer of task updates.
///
/// Listeners are registered on a [`TaskChannel`](super::TaskChannel) and
/// receive every parsed update, terminal ones included. Errors are logged
/// by the channel and never stop delivery to other listeners.
pub trait UpdateListener: Send + Sync {
    /// Handle one update. The listener decides what to do with it.
    fn on_update(&mut self, update: &TaskUpdate) -> IoResult<()>;
}

/// In-memory listener for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemoryListener {
    entries: Arc<Mutex<Vec<TaskUpdate>>>,
}

impl MemoryListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured updates.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TaskUpdate> {
        self.entries.lock().unwrap().clone()
    }

    /// Clear all captured updates.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl UpdateListener for MemoryListener {
    fn on_update(&mut self, update: &TaskUpdate) -> IoResult<()> {
        self.entries.lock().unwrap().push(update.clone());
        Ok(())
    }
}

/// Channel-forwarding listener for async consumers.
///
/// Updates are forwarded to a tokio mpsc channel without blocking, which is
/// how a driving loop (or a UI) consumes tracking progress.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<TaskUpdate>,
}

impl ChannelListener {
    /// Create a new channel listener.
    ///
    /// # Example
    /// ```no_run
    /// use tokio::sync::mpsc;
    /// use flowcanvas::config::EndpointConfig;
    /// use flowcanvas::tracking::{ChannelListener, TaskChannel};
    ///
    /// # async fn demo() {
    /// let config = EndpointConfig::new("http://localhost:8000").unwrap();
    /// let channel = TaskChannel::new(config);
    ///
    /// let (tx, mut rx) = mpsc::unbounded_channel();
    /// channel.add_listener(ChannelListener::new(tx));
    /// channel.connect("task-id").await;
    ///
    /// while let Some(update) = rx.recv().await {
    ///     println!("task is {}", update.state);
    ///     if update.is_terminal() {
    ///         break;
    ///     }
    /// }
    /// # }
    /// ```
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<TaskUpdate>) -> Self {
        Self { tx }
    }
}

impl UpdateListener for ChannelListener {
    fn on_update(&mut self, update: &TaskUpdate) -> IoResult<()> {
        self.tx
            .send(update.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel receiver dropped"))
    }
}
