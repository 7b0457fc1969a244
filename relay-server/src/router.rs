//! Message router: sole interpreter of inbound envelopes
//!
//! Drives the connection registry, the history buffer, and broadcast
//! fanout. Registry and history share a single lock so a recipient
//! snapshot can never observe a half-applied mutation; all delivery
//! happens on snapshots taken under that lock, after it is released.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::{RwLock, mpsc};

use relay_common::protocol::{ChatMessage, ServerEnvelope};
use relay_common::time::message_timestamp;

use crate::fanout::{deliver_one, fanout};
use crate::history::HistoryBuffer;
use crate::registry::ConnectionRegistry;

/// Mutable relay state guarded by one lock
#[derive(Debug, Default)]
struct RelayState {
    registry: ConnectionRegistry,
    history: HistoryBuffer,
}

/// Routes envelopes between connections
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct MessageRouter {
    state: Arc<RwLock<RelayState>>,
    next_id: Arc<AtomicU32>,
    debug: bool,
}

impl MessageRouter {
    pub fn new(debug: bool) -> Self {
        Self {
            state: Arc::new(RwLock::new(RelayState::default())),
            next_id: Arc::new(AtomicU32::new(1)),
            debug,
        }
    }

    /// Assign an id to a newly accepted connection
    pub fn allocate_session_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Handle a `register` envelope
    ///
    /// Replays history and the current roster to the requester, in that
    /// order, then announces the arrival to every other session. A
    /// re-register from the same connection re-arms the identity with the
    /// new name and runs the same sequence again.
    pub async fn handle_register(
        &self,
        session_id: u32,
        pseudo: String,
        tx: &mpsc::UnboundedSender<ServerEnvelope>,
    ) {
        if pseudo.trim().is_empty() {
            if self.debug {
                eprintln!("Ignored register with empty pseudo from session {}", session_id);
            }
            return;
        }

        let (session, roster, recipients) = {
            let mut state = self.state.write().await;
            let session = state.registry.register(session_id, pseudo, tx.clone());

            // Queue history and the roster to the requester while the lock
            // is still held, so no concurrent broadcast can land in its
            // channel first. Unbounded sends never block.
            deliver_one(
                &ServerEnvelope::History {
                    messages: state.history.snapshot(),
                },
                &session,
            );
            let roster = state.registry.roster();
            deliver_one(
                &ServerEnvelope::UsersList {
                    users: roster.clone(),
                },
                &session,
            );

            (session, roster, state.registry.snapshot())
        };

        fanout(
            &ServerEnvelope::UserConnected {
                pseudo: session.pseudo.clone(),
                users: roster,
            },
            &recipients,
            Some(session_id),
        );

        if self.debug {
            println!("User '{}' registered (session {})", session.pseudo, session_id);
        }
    }

    /// Handle a `message` envelope
    ///
    /// Envelopes from unregistered connections are dropped. Public messages
    /// enter the history buffer and go to every registered session,
    /// including the sender. Private messages go to every session matching
    /// the target plus an echo to the sender, bypassing history; with no
    /// matching target nothing is delivered.
    pub async fn handle_chat_message(
        &self,
        session_id: u32,
        text: String,
        is_private: bool,
        target_user: Option<String>,
    ) {
        let mut state = self.state.write().await;

        let Some(sender) = state.registry.get(session_id).cloned() else {
            if self.debug {
                eprintln!("Dropped message from unregistered session {}", session_id);
            }
            return;
        };

        let message = ChatMessage {
            pseudo: sender.pseudo.clone(),
            message: text,
            timestamp: message_timestamp(),
            is_private,
            target_user: target_user.clone(),
        };

        if is_private {
            let Some(target) = target_user else {
                if self.debug {
                    eprintln!("Dropped private message without target from session {}", session_id);
                }
                return;
            };

            let mut recipients = state.registry.find(&target);
            drop(state);

            if recipients.is_empty() {
                // Target not online: nothing is delivered, no notice is sent
                if self.debug {
                    eprintln!("Dropped private message to offline user '{}'", target);
                }
                return;
            }

            // Echo to the sender, unless the sender already matched
            if !recipients.iter().any(|s| s.session_id == session_id) {
                recipients.push(sender);
            }

            fanout(&ServerEnvelope::NewMessage { message }, &recipients, None);
        } else {
            state.history.append(message.clone());
            let recipients = state.registry.snapshot();
            drop(state);

            fanout(&ServerEnvelope::NewMessage { message }, &recipients, None);
        }
    }

    /// Handle transport closure of a connection
    ///
    /// No-op for connections that never registered.
    pub async fn handle_disconnect(&self, session_id: u32) {
        let removed = {
            let mut state = self.state.write().await;
            state.registry.unregister(session_id).map(|session| {
                (
                    session,
                    state.registry.roster(),
                    state.registry.snapshot(),
                )
            })
        };

        let Some((session, roster, recipients)) = removed else {
            return;
        };

        fanout(
            &ServerEnvelope::UserDisconnected {
                pseudo: session.pseudo.clone(),
                users: roster,
            },
            &recipients,
            None,
        );

        if self.debug {
            println!("User '{}' disconnected (session {})", session.pseudo, session_id);
        }
    }

    /// Number of currently registered sessions
    pub async fn registered_count(&self) -> usize {
        self.state.read().await.registry.len()
    }

    /// Number of messages currently retained in history
    pub async fn history_len(&self) -> usize {
        self.state.read().await.history.len()
    }
}
