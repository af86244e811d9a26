// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::test_helpers::{ack_all, make_item, spawn_ws_server};
use super::transport::{Ack, Transport, TransportError, TransportResult, WebSocketTransport, WriteRequest};
use pk_core::protocol::{ClientMessage, ServerMessage};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct MockState {
    connected: bool,
    connect_attempts: usize,
    fail_connect: bool,
    fail_disconnect: bool,
    sent: Vec<WriteRequest>,
    applied: HashSet<String>,
    rejections: HashMap<String, String>,
    reject_all: Option<String>,
    stalled: HashSet<String>,
    gate: Option<Arc<Notify>>,
}

/// Mock transport for testing without real sockets.
///
/// Clones share state, so a test keeps one clone to script and inspect the
/// transport after handing the other to a queue.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    started: Arc<Notify>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write sent, in order, including rejected ones.
    pub fn sent(&self) -> Vec<WriteRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_ids(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.id).collect()
    }

    /// Ids the mock remote has durably applied.
    pub fn applied(&self) -> HashSet<String> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.lock().unwrap().connect_attempts
    }

    pub fn set_connect_fail(&self, fail: bool) {
        self.state.lock().unwrap().fail_connect = fail;
    }

    pub fn set_disconnect_fail(&self, fail: bool) {
        self.state.lock().unwrap().fail_disconnect = fail;
    }

    /// Reject the write with this id.
    pub fn reject(&self, id: &str, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .rejections
            .insert(id.to_string(), reason.to_string());
    }

    /// Reject every write.
    pub fn reject_all(&self, reason: &str) {
        self.state.lock().unwrap().reject_all = Some(reason.to_string());
    }

    /// Accept every write again.
    pub fn accept_all(&self) {
        let mut state = self.state.lock().unwrap();
        state.reject_all = None;
        state.rejections.clear();
        state.stalled.clear();
    }

    /// Never answer the write with this id.
    pub fn stall(&self, id: &str) {
        self.state.lock().unwrap().stalled.insert(id.to_string());
    }

    /// Hold the next write until the returned notify fires.
    pub fn gate_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().gate = Some(Arc::clone(&gate));
        gate
    }

    /// Resolves once a write has reached the transport.
    pub async fn wait_for_send(&self) {
        self.started.notified().await;
    }
}

impl Transport for MockTransport {
    fn connect(
        &mut self,
        _url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.connect_attempts += 1;
            if state.fail_connect {
                Err(TransportError::ConnectionFailed("mock failure".into()))
            } else {
                state.connected = true;
                Ok(())
            }
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.fail_disconnect {
                return Err(TransportError::SendFailed("mock close failure".into()));
            }
            state.connected = false;
            Ok(())
        })
    }

    fn send(
        &mut self,
        request: WriteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Ack>> + Send + '_>> {
        let state = Arc::clone(&self.state);
        let started = Arc::clone(&self.started);
        Box::pin(async move {
            let (gate, stalled) = {
                let mut state = state.lock().unwrap();
                if !state.connected {
                    return Err(TransportError::ConnectionClosed);
                }
                state.sent.push(request.clone());
                (state.gate.take(), state.stalled.contains(&request.id))
            };
            started.notify_one();

            if let Some(gate) = gate {
                gate.notified().await;
            }
            if stalled {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }

            let mut state = state.lock().unwrap();
            let rejection = state
                .rejections
                .get(&request.id)
                .cloned()
                .or_else(|| state.reject_all.clone());
            if let Some(reason) = rejection {
                return Err(TransportError::Rejected(reason));
            }
            let duplicate = !state.applied.insert(request.id.clone());
            Ok(Ack {
                id: request.id,
                duplicate,
            })
        })
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}

fn request(id: &str) -> WriteRequest {
    WriteRequest {
        id: id.to_string(),
        record_type: "chemical_test".to_string(),
        payload: json!({"ph": 7.4}),
    }
}

#[tokio::test]
async fn test_mock_transport_connect() {
    let mut transport = MockTransport::new();
    assert!(!transport.is_connected());

    transport.connect("ws://localhost:1234").await.unwrap();
    assert!(transport.is_connected());

    transport.disconnect().await.unwrap();
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_mock_transport_connect_fail() {
    let mut transport = MockTransport::new();
    transport.set_connect_fail(true);

    let result = transport.connect("ws://localhost:1234").await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_mock_transport_reports_duplicates() {
    let mut transport = MockTransport::new();
    transport.connect("ws://mock").await.unwrap();

    let first = transport.send(request("q-1")).await.unwrap();
    let second = transport.send(request("q-1")).await.unwrap();
    assert!(!first.duplicate);
    assert!(second.duplicate);
    assert_eq!(transport.sent_ids(), vec!["q-1", "q-1"]);
}

#[tokio::test]
async fn test_mock_transport_send_requires_connection() {
    let mut transport = MockTransport::new();
    let result = transport.send(request("q-1")).await;
    assert!(matches!(result, Err(TransportError::ConnectionClosed)));
    assert!(transport.sent().is_empty());
}

#[test]
fn write_request_carries_item_fields() {
    let item = make_item("q-7", 3);
    let req = WriteRequest::from(&item);
    assert_eq!(req.id, "q-7");
    assert_eq!(req.record_type, "chemical_test");
    assert_eq!(req.payload, item.payload);

    match ClientMessage::from(req) {
        ClientMessage::Write { id, record_type, .. } => {
            assert_eq!(id, "q-7");
            assert_eq!(record_type, "chemical_test");
        }
        other => panic!("expected write, got {:?}", other),
    }
}

#[tokio::test]
async fn test_websocket_send_receives_ack() {
    let url = spawn_ws_server(ack_all).await;
    let mut transport = WebSocketTransport::new();
    transport.connect(&url).await.unwrap();
    assert!(transport.is_connected());

    let ack = transport.send(request("q-1")).await.unwrap();
    assert_eq!(ack.id, "q-1");
    assert!(!ack.duplicate);
}

#[tokio::test]
async fn test_websocket_rejection_is_an_error() {
    let url = spawn_ws_server(|msg| match msg {
        ClientMessage::Write { id, .. } => Some(vec![ServerMessage::rejected(id, "bad pool")]),
        ClientMessage::Ping { .. } => Some(vec![]),
    })
    .await;
    let mut transport = WebSocketTransport::new();
    transport.connect(&url).await.unwrap();

    let result = transport.send(request("q-1")).await;
    match result {
        Err(TransportError::Rejected(reason)) => assert_eq!(reason, "bad pool"),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(transport.is_connected());
}

#[tokio::test]
async fn test_websocket_skips_answers_for_other_ids() {
    let url = spawn_ws_server(|msg| match msg {
        ClientMessage::Write { id, .. } => Some(vec![
            ServerMessage::pong(9),
            ServerMessage::ack("q-stale", false),
            ServerMessage::ack(id, true),
        ]),
        ClientMessage::Ping { .. } => Some(vec![]),
    })
    .await;
    let mut transport = WebSocketTransport::new();
    transport.connect(&url).await.unwrap();

    let ack = transport.send(request("q-1")).await.unwrap();
    assert_eq!(ack.id, "q-1");
    assert!(ack.duplicate);
}

#[tokio::test]
async fn test_websocket_close_clears_connection() {
    let url = spawn_ws_server(|_| None).await;
    let mut transport = WebSocketTransport::new();
    transport.connect(&url).await.unwrap();

    let result = transport.send(request("q-1")).await;
    assert!(result.is_err());
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_websocket_send_without_connect() {
    let mut transport = WebSocketTransport::new();
    let result = transport.send(request("q-1")).await;
    assert!(matches!(result, Err(TransportError::ConnectionClosed)));
}

#[tokio::test]
async fn test_websocket_connect_refused() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut transport = WebSocketTransport::new();
    let result = transport.connect(&format!("ws://{}", addr)).await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    assert!(!transport.is_connected());
}
