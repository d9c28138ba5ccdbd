//! Asynchronous task tracking over a reconnecting event stream.
//!
//! After a workflow is submitted, its progress arrives as a stream of
//! [`TaskUpdate`] messages on a per-task channel. [`TaskChannel`] owns the
//! connection and its reconnect policy; [`UpdateListener`] implementations
//! consume the updates; [`StatusTransport`] is the seam between the state
//! machine and the actual WebSocket.

pub mod channel;
pub mod listener;
pub mod transport;
pub mod update;

pub use channel::{ChannelPhase, DEFAULT_RECONNECT_DELAY, TaskChannel};
pub use listener::{ChannelListener, ListenerId, MemoryListener, UpdateListener};
pub use transport::{StatusStream, StatusTransport, TransportError, WebSocketTransport};
pub use update::{NodeResults, TaskState, TaskUpdate};
