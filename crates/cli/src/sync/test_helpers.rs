// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use futures_util::{SinkExt, StreamExt};
use pk_core::protocol::{ClientMessage, ServerMessage};
use pk_core::QueueItem;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use super::queue::SyncConfig;

/// A fixed timestamp `secs` seconds into the test epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_780_000_000 + secs, 0).unwrap()
}

/// A chemical test item created `secs` seconds into the test epoch.
pub fn make_item(id: &str, secs: i64) -> QueueItem {
    QueueItem::new(id, "chemical_test", json!({"poolId": "pool-1", "ph": 7.4}), at(secs))
}

/// Config with timeouts short enough for tests.
pub fn fast_config() -> SyncConfig {
    SyncConfig {
        url: "ws://mock".to_string(),
        send_timeout: Duration::from_millis(100),
        connect_timeout: Duration::from_millis(100),
        max_attempts: None,
    }
}

/// Start a WebSocket server on an ephemeral port.
///
/// `respond` maps each client frame to the frames sent back; returning
/// `None` closes the connection instead.
pub async fn spawn_ws_server<F>(respond: F) -> String
where
    F: Fn(ClientMessage) -> Option<Vec<ServerMessage>> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (mut sink, mut stream) = ws.split();
                while let Some(Ok(msg)) = stream.next().await {
                    let Message::Text(text) = msg else {
                        continue;
                    };
                    let Ok(client) = ClientMessage::from_json(&text) else {
                        continue;
                    };
                    let Some(replies) = respond(client) else {
                        let _ = sink.close().await;
                        return;
                    };
                    for reply in replies {
                        let json = reply.to_json().unwrap();
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    format!("ws://{}", addr)
}

/// Acknowledge every write.
pub fn ack_all(msg: ClientMessage) -> Option<Vec<ServerMessage>> {
    match msg {
        ClientMessage::Write { id, .. } => Some(vec![ServerMessage::ack(id, false)]),
        ClientMessage::Ping { id } => Some(vec![ServerMessage::pong(id)]),
    }
}
