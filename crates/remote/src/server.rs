// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Every text frame is one client message; every message gets exactly one
//! reply on the same connection.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use pk_core::protocol::{ClientMessage, ServerMessage};

use crate::state::{ServerState, WriteOutcome};

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", listener.local_addr()?);
    serve(listener, state)
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    Ok(())
}

/// Accept connections on an already-bound listener until it fails.
pub(crate) async fn serve(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = handle_client_message(&text, &state).await;
                let json = response.to_json()?;
                ws_sink.send(Message::Text(json.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(_) => {
                // Ignore other message types (Binary, Pong, Frame)
            }
            Err(e) => {
                warn!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process one client frame and produce its reply.
pub(crate) async fn handle_client_message(text: &str, state: &ServerState) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Malformed frame: {}", e);
            return ServerMessage::error(format!("malformed message: {}", e));
        }
    };

    match msg {
        ClientMessage::Write {
            id,
            record_type,
            payload,
        } => match state.apply_write(&id, &record_type, payload).await {
            Ok(WriteOutcome::Applied) => {
                info!(%id, %record_type, "write applied");
                ServerMessage::ack(id, false)
            }
            Ok(WriteOutcome::Duplicate) => {
                debug!(%id, "duplicate write acknowledged");
                ServerMessage::ack(id, true)
            }
            Ok(WriteOutcome::Rejected(reason)) => {
                warn!(%id, %record_type, %reason, "write rejected");
                ServerMessage::rejected(id, reason)
            }
            Err(e) => {
                // Not applied and not refused; the client keeps the item and retries.
                error!(%id, error = %e, "failed to persist write");
                ServerMessage::error(format!("failed to persist {}: {}", id, e))
            }
        },

        ClientMessage::Ping { id } => {
            debug!("Ping received: {}", id);
            ServerMessage::pong(id)
        }
    }
}
