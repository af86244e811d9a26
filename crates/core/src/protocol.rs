// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between the offline queue and a remote store.
//!
//! The protocol is request/acknowledge:
//! - Client sends a write tagged with its idempotency key
//! - Server answers with an ack (possibly marking a duplicate) or a rejection

use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Apply a record. `id` is the idempotency key.
    Write {
        id: String,
        record_type: String,
        payload: serde_json::Value,
    },

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The write with this id is durably applied.
    Ack {
        id: String,
        /// True if the id had already been applied and this delivery was ignored.
        #[serde(default)]
        duplicate: bool,
    },

    /// The write with this id was refused and will not be applied.
    Rejected { id: String, reason: String },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error not tied to a specific write (e.g. a malformed frame).
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Write message.
    pub fn write(
        id: impl Into<String>,
        record_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        ClientMessage::Write {
            id: id.into(),
            record_type: record_type.into(),
            payload,
        }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Ack message.
    pub fn ack(id: impl Into<String>, duplicate: bool) -> Self {
        ServerMessage::Ack {
            id: id.into(),
            duplicate,
        }
    }

    /// Creates a Rejected message.
    pub fn rejected(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ServerMessage::Rejected {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// The write id this message answers, if any.
    pub fn write_id(&self) -> Option<&str> {
        match self {
            ServerMessage::Ack { id, .. } | ServerMessage::Rejected { id, .. } => {
                Some(id.as_str())
            }
            ServerMessage::Pong { .. } | ServerMessage::Error { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
