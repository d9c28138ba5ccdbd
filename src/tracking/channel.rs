//! Reconnecting task tracking channel.
//!
//! A [`TaskChannel`] subscribes to one task's event stream and broadcasts
//! every parsed [`TaskUpdate`] to its registered listeners. The connection
//! runs on a background task driving an explicit state machine:
//!
//! ```text
//! Idle -> Connecting -> Open -> Finished        (terminal update)
//!            ^            |
//!            |            v
//!            +------ Reconnecting               (unexpected close)
//! ```
//!
//! An unexpected close, including a failed connection attempt, schedules
//! exactly one reconnect after a fixed delay; the cycle repeats for as long
//! as the task stays alive. A terminal update (`SUCCESS`/`FAILURE`) or an
//! explicit [`disconnect`](TaskChannel::disconnect) stops the machine for
//! good: the shutdown signal is checked at every suspension point, so a
//! backoff timer that is already pending cannot resurrect a cancelled
//! subscription.
//!
//! Malformed payloads and mid-stream transport faults are logged and
//! dropped; the channel does not own task outcome and never invents a
//! terminal state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::{sync::oneshot, task, time};
use url::Url;

use super::listener::{ListenerId, UpdateListener};
use super::transport::{StatusTransport, WebSocketTransport};
use super::update::TaskUpdate;
use crate::config::EndpointConfig;

/// Delay before the single reconnect attempt that follows an unexpected
/// close.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Observable state of a channel's connection machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelPhase {
    /// No connection; nothing tracked yet or disconnected.
    Idle,
    /// Connection attempt in flight.
    Connecting,
    /// Connected and receiving updates.
    Open,
    /// Unexpectedly closed; waiting out the backoff before retrying.
    Reconnecting,
    /// A terminal update arrived; the channel is done with this task.
    Finished,
}

/// TaskChannel subscribes to one task's updates and broadcasts them to
/// multiple listeners.
///
/// The channel is a caller-owned value: construct one per place that tracks
/// tasks and drop it when done. Dropping aborts the connection task.
pub struct TaskChannel {
    config: EndpointConfig,
    transport: Arc<dyn StatusTransport>,
    reconnect_delay: Duration,
    listeners: Arc<Mutex<ListenerRegistry>>,
    phase: Arc<Mutex<ChannelPhase>>,
    worker: Arc<Mutex<Option<WorkerState>>>,
}

impl TaskChannel {
    /// Create a channel speaking WebSocket to the configured backend.
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        Self::with_transport(config, Arc::new(WebSocketTransport))
    }

    /// Create a channel over a custom transport.
    #[must_use]
    pub fn with_transport(config: EndpointConfig, transport: Arc<dyn StatusTransport>) -> Self {
        Self {
            config,
            transport,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            phase: Arc::new(Mutex::new(ChannelPhase::Idle)),
            worker: Arc::new(Mutex::new(None)),
        }
    }

    /// Override the reconnect backoff delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Register a listener; every subsequent update is delivered to it.
    ///
    /// Listener identity is the returned id, so registering the same
    /// consumer twice yields two deliveries under two ids.
    pub fn add_listener<L: UpdateListener + 'static>(&self, listener: L) -> ListenerId {
        let mut guard = self.listeners.lock().unwrap();
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.insert(id, Box::new(listener));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    ///
    /// Removal is observed from the next update on; a delivery already in
    /// progress completes against the previous listener set.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.lock().unwrap().entries.remove(&id).is_some()
    }

    /// Current phase of the connection machine.
    #[must_use]
    pub fn phase(&self) -> ChannelPhase {
        *self.phase.lock().unwrap()
    }

    /// Id of the task currently tracked, if any.
    #[must_use]
    pub fn task_id(&self) -> Option<String> {
        self.worker
            .lock()
            .unwrap()
            .as_ref()
            .map(|state| state.task_id.clone())
    }

    /// Start tracking `task_id`.
    ///
    /// At most one connection is live per channel: a prior connection, to
    /// any task, is disconnected first. Listeners carry over.
    pub async fn connect(&self, task_id: &str) {
        self.disconnect().await;

        let url = self.config.task_channel_url(task_id);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = task::spawn(run_channel(
            self.transport.clone(),
            url,
            task_id.to_string(),
            self.listeners.clone(),
            self.phase.clone(),
            self.reconnect_delay,
            shutdown_rx,
        ));

        let displaced = {
            self.worker.lock().unwrap().replace(WorkerState {
                shutdown_tx,
                handle,
                task_id: task_id.to_string(),
            })
        };
        // Two racing connect calls: keep the later worker, stop the other.
        if let Some(displaced) = displaced {
            let _ = displaced.shutdown_tx.send(());
            displaced.handle.abort();
        }
    }

    /// Stop tracking and close any open connection.
    ///
    /// Safe to call at any time, including when nothing is connected; a
    /// reconnect pending its backoff is cancelled before it can fire.
    pub async fn disconnect(&self) {
        let state = { self.worker.lock().unwrap().take() };
        if let Some(state) = state {
            let _ = state.shutdown_tx.send(());
            let _ = state.handle.await;
        }
        let mut phase = self.phase.lock().unwrap();
        if *phase != ChannelPhase::Finished {
            *phase = ChannelPhase::Idle;
        }
    }
}

impl Drop for TaskChannel {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.worker.lock() {
            if let Some(state) = guard.take() {
                let _ = state.shutdown_tx.send(());
                state.handle.abort();
            }
        }
    }
}

struct WorkerState {
    shutdown_tx: oneshot::Sender<()>,
    handle: task::JoinHandle<()>,
    task_id: String,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: ListenerId,
    entries: FxHashMap<ListenerId, Box<dyn UpdateListener>>,
}

/// Why one connection's read loop ended.
enum ReadOutcome {
    /// Shutdown signal received.
    Shutdown,
    /// Peer closed without a terminal update.
    Closed,
    /// A terminal update was delivered.
    Terminal,
}

async fn run_channel(
    transport: Arc<dyn StatusTransport>,
    url: Url,
    task_id: String,
    listeners: Arc<Mutex<ListenerRegistry>>,
    phase: Arc<Mutex<ChannelPhase>>,
    reconnect_delay: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        set_phase(&phase, ChannelPhase::Connecting);
        let connected = tokio::select! {
            _ = &mut shutdown_rx => return,
            connected = transport.connect(&url) => connected,
        };
        let mut stream = match connected {
            Ok(stream) => stream,
            Err(error) => {
                // A failed attempt counts as an unexpected close: retry
                // after the same backoff.
                tracing::warn!(%task_id, %error, "task channel connect failed");
                set_phase(&phase, ChannelPhase::Reconnecting);
                tokio::select! {
                    _ = &mut shutdown_rx => return,
                    () = time::sleep(reconnect_delay) => continue,
                }
            }
        };
        set_phase(&phase, ChannelPhase::Open);
        tracing::debug!(%task_id, "task channel open");

        let outcome = loop {
            let message = tokio::select! {
                _ = &mut shutdown_rx => break ReadOutcome::Shutdown,
                message = stream.next_message() => message,
            };
            match message {
                None => break ReadOutcome::Closed,
                Some(Err(error)) => {
                    // Not a close: log and keep the stream.
                    tracing::warn!(%task_id, %error, "task channel transport error");
                }
                Some(Ok(payload)) => match TaskUpdate::parse(&payload) {
                    Err(error) => {
                        tracing::warn!(%task_id, %error, %payload, "dropping malformed task update");
                    }
                    Ok(update) => {
                        let terminal = update.is_terminal();
                        notify_listeners(&listeners, &update);
                        if terminal {
                            break ReadOutcome::Terminal;
                        }
                    }
                },
            }
        };

        match outcome {
            ReadOutcome::Shutdown => {
                stream.close().await;
                return;
            }
            ReadOutcome::Terminal => {
                stream.close().await;
                set_phase(&phase, ChannelPhase::Finished);
                tracing::debug!(%task_id, "task reached a terminal state");
                return;
            }
            ReadOutcome::Closed => {
                tracing::info!(%task_id, "task channel closed unexpectedly, reconnecting");
                set_phase(&phase, ChannelPhase::Reconnecting);
                tokio::select! {
                    _ = &mut shutdown_rx => return,
                    () = time::sleep(reconnect_delay) => {}
                }
            }
        }
    }
}

fn set_phase(phase: &Mutex<ChannelPhase>, next: ChannelPhase) {
    *phase.lock().unwrap() = next;
}

fn notify_listeners(listeners: &Mutex<ListenerRegistry>, update: &TaskUpdate) {
    // Held across delivery: the listener set is stable for one update and
    // a concurrent remove waits for the lock.
    let mut guard = listeners.lock().unwrap();
    for (id, listener) in guard.entries.iter_mut() {
        if let Err(error) = listener.on_update(update) {
            tracing::warn!(listener = *id, %error, "task update listener failed");
        }
    }
}
