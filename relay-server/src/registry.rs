//! Connection registry: the authoritative map of registered sessions

use std::collections::HashMap;

use tokio::sync::mpsc;

use relay_common::protocol::{ServerEnvelope, UserEntry};
use relay_common::time::unix_timestamp;

/// A registered connection and its identity
///
/// Exists only between a successful `register` and the transport closing.
/// The `tx` handle feeds the connection's own writer task, so holding a
/// clone of a `Session` never blocks on that client's socket.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier for this connection, assigned at accept time
    pub session_id: u32,
    /// Registered display name (uniqueness is not enforced)
    pub pseudo: String,
    /// When this identity was registered (Unix seconds)
    pub joined_at: i64,
    /// Outbound envelope queue for this connection
    pub tx: mpsc::UnboundedSender<ServerEnvelope>,
}

impl Session {
    /// Roster entry for this session
    pub fn user_entry(&self) -> UserEntry {
        UserEntry {
            pseudo: self.pseudo.clone(),
            id: self.session_id.to_string(),
        }
    }
}

/// Maps session id to registered identity
///
/// Plain data structure with no interior locking; the router serializes all
/// access behind a single lock. Never performs network I/O.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<u32, Session>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Register an identity for a connection, overwriting any prior one
    ///
    /// Last write wins: a re-register replaces the pseudo and re-stamps
    /// `joined_at`. No uniqueness check across connections.
    pub fn register(
        &mut self,
        session_id: u32,
        pseudo: String,
        tx: mpsc::UnboundedSender<ServerEnvelope>,
    ) -> Session {
        let session = Session {
            session_id,
            pseudo,
            joined_at: unix_timestamp(),
            tx,
        };
        self.sessions.insert(session_id, session.clone());
        session
    }

    /// Remove and return the identity for a connection, if registered
    pub fn unregister(&mut self, session_id: u32) -> Option<Session> {
        self.sessions.remove(&session_id)
    }

    /// Look up a session by id
    pub fn get(&self, session_id: u32) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    /// All sessions currently registered under a pseudo (zero, one, or many)
    pub fn find(&self, pseudo: &str) -> Vec<Session> {
        self.sessions
            .values()
            .filter(|s| s.pseudo == pseudo)
            .cloned()
            .collect()
    }

    /// Point-in-time copy of every registered session
    ///
    /// Safe to hand to a fanout without holding the registry lock during
    /// delivery.
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.values().cloned().collect()
    }

    /// Current roster, derived on demand
    pub fn roster(&self) -> Vec<UserEntry> {
        self.sessions.values().map(Session::user_entry).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
