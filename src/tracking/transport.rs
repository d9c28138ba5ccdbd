//! Transport seam for the task tracking channel.
//!
//! [`TaskChannel`](super::TaskChannel) drives its state machine against the
//! [`StatusTransport`] trait rather than a concrete socket, so reconnect and
//! delivery semantics are testable with scripted streams. Production use is
//! [`WebSocketTransport`].

use async_trait::async_trait;
use futures_util::StreamExt;
use miette::Diagnostic;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// Errors raised by a status transport.
#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    /// WebSocket-level failure, connecting or mid-stream.
    #[error("websocket error: {0}")]
    #[diagnostic(
        code(flowcanvas::tracking::websocket),
        help("Check the task channel endpoint and backend availability.")
    )]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection could not be established.
    #[error("connection failed: {message}")]
    #[diagnostic(code(flowcanvas::tracking::connect))]
    Connect { message: String },
}

/// Factory for status streams, one per tracked task connection.
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Opens a message stream to `url`.
    async fn connect(&self, url: &Url) -> Result<Box<dyn StatusStream>, TransportError>;
}

/// One open message stream.
#[async_trait]
pub trait StatusStream: Send {
    /// Next text payload. `None` means the peer closed the stream;
    /// `Some(Err(_))` is a transport fault that does not end the stream.
    async fn next_message(&mut self) -> Option<Result<String, TransportError>>;

    /// Close the stream. Dropping without closing is also fine.
    async fn close(&mut self) {}
}

/// Production transport speaking WebSocket via tokio-tungstenite.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl StatusTransport for WebSocketTransport {
    async fn connect(&self, url: &Url) -> Result<Box<dyn StatusStream>, TransportError> {
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(Box::new(WebSocketStatusStream { inner: stream }))
    }
}

struct WebSocketStatusStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl StatusStream for WebSocketStatusStream {
    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.inner.next().await {
                None => return None,
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Close(_))) => return None,
                // Binary, ping and pong frames carry no task updates.
                Some(Ok(_)) => continue,
                Some(Err(error)) => return Some(Err(error.into())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.inner.close(None).await;
    }
}
