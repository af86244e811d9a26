// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for delivering queued writes to a remote store.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;

use pk_core::protocol::{ClientMessage, ServerMessage};
use pk_core::QueueItem;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The remote refused the write.
    #[error("rejected by remote: {0}")]
    Rejected(String),

    /// The remote reported an error unrelated to a specific write.
    #[error("remote error: {0}")]
    Remote(String),

    /// No answer within the allotted time.
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A single write handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    /// Idempotency key.
    pub id: String,
    pub record_type: String,
    pub payload: serde_json::Value,
}

impl From<&QueueItem> for WriteRequest {
    fn from(item: &QueueItem) -> Self {
        WriteRequest {
            id: item.id.clone(),
            record_type: item.record_type.clone(),
            payload: item.payload.clone(),
        }
    }
}

impl From<WriteRequest> for ClientMessage {
    fn from(req: WriteRequest) -> Self {
        ClientMessage::write(req.id, req.record_type, req.payload)
    }
}

/// Acknowledgement that a write is durably applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub id: String,
    /// The remote had already applied this id.
    pub duplicate: bool,
}

/// Transport trait for request/acknowledge delivery.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Connect to a remote store.
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Disconnect from the remote store.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Deliver a write and wait for the remote's answer.
    ///
    /// Resolves to an [`Ack`] only once the remote has durably applied the
    /// write; a rejection resolves to [`TransportError::Rejected`].
    fn send(
        &mut self,
        request: WriteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Ack>> + Send + '_>>;

    /// Check if connected.
    fn is_connected(&self) -> bool;
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Delivers writes over a WebSocket, one request in flight at a time.
pub struct WebSocketTransport {
    ws: Option<Connection>,
}

/// The two halves of an open socket.
struct Connection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;

            let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(Connection { sink, stream });
            tracing::debug!(url = %url, "connected to remote");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                use futures_util::SinkExt;
                let _ = ws.sink.close().await;
            }
            Ok(())
        })
    }

    fn send(
        &mut self,
        request: WriteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Ack>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::{SinkExt, StreamExt};
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            let id = request.id.clone();
            let json = ClientMessage::from(request)
                .to_json()
                .map_err(|e| TransportError::SerializationError(e.to_string()))?;

            if let Err(e) = ws.sink.send(Message::Text(json.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            // Wait for the answer to this id; answers to earlier, timed-out
            // writes and keepalive frames are skipped.
            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        let msg = ServerMessage::from_json(&text)
                            .map_err(|e| TransportError::SerializationError(e.to_string()))?;
                        match msg {
                            ServerMessage::Ack {
                                id: acked,
                                duplicate,
                            } if acked == id => {
                                return Ok(Ack {
                                    id: acked,
                                    duplicate,
                                });
                            }
                            ServerMessage::Rejected {
                                id: rejected,
                                reason,
                            } if rejected == id => {
                                return Err(TransportError::Rejected(reason));
                            }
                            ServerMessage::Error { message } => {
                                return Err(TransportError::Remote(message));
                            }
                            other => {
                                tracing::trace!(?other, "skipping unrelated frame");
                                continue;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Connection closed, clear it
                        self.ws = None;
                        return Err(TransportError::ConnectionClosed);
                    }
                    Some(Ok(_)) => {
                        // Ignore ping/pong and binary frames
                        continue;
                    }
                    Some(Err(e)) => {
                        // Connection is broken, clear it
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}
