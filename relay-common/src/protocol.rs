//! Protocol definitions for the relay chat server
//!
//! All envelopes are sent as JSON text frames over WebSocket. Each envelope
//! carries a `type` discriminant; all other fields are kind-specific.
//! Unknown or malformed envelopes are dropped by the server without closing
//! the connection.

use serde::{Deserialize, Serialize};

/// Client request envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEnvelope {
    /// Register a display name for this connection - must precede any Message
    Register { pseudo: String },
    /// Send a chat message, public by default
    Message {
        message: String,
        /// Private messages are delivered to the target and echoed to the
        /// sender only; they never enter the history buffer.
        #[serde(default, rename = "isPrivate")]
        is_private: bool,
        /// Display name of the recipient (private messages only)
        #[serde(default, rename = "targetUser")]
        target_user: Option<String>,
    },
}

/// Server envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEnvelope {
    /// Recent public messages, oldest first - sent once on registration
    History { messages: Vec<ChatMessage> },
    /// A routed chat message
    NewMessage {
        #[serde(flatten)]
        message: ChatMessage,
    },
    /// Broadcast to other clients when a user registers
    UserConnected { pseudo: String, users: Vec<UserEntry> },
    /// Broadcast to remaining clients when a registered connection closes
    UserDisconnected { pseudo: String, users: Vec<UserEntry> },
    /// Full roster snapshot, sent to the newly registered client
    UsersList { users: Vec<UserEntry> },
}

/// A single chat message as it appears on the wire
///
/// Immutable once constructed; public messages are also retained verbatim
/// in the history buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the sender
    pub pseudo: String,
    /// Message text
    pub message: String,
    /// Local time-of-day when the relay routed the message (HH:MM:SS)
    pub timestamp: String,
    #[serde(default, rename = "isPrivate")]
    pub is_private: bool,
    /// Recipient display name; always null for public messages
    #[serde(default, rename = "targetUser")]
    pub target_user: Option<String>,
}

/// One roster entry
///
/// `id` is the stringified session id, which disambiguates multiple
/// connections registered under the same pseudo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub pseudo: String,
    pub id: String,
}
