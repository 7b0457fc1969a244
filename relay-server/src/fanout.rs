//! Best-effort envelope delivery to session snapshots

use relay_common::protocol::ServerEnvelope;

use crate::constants::ERR_DELIVERY;
use crate::registry::Session;

/// Deliver an envelope to every session in the snapshot
///
/// Skips `exclude` if present. A failed send (the recipient's connection
/// task has already dropped its receiver) is logged and never aborts
/// delivery to the remaining sessions.
pub fn fanout(envelope: &ServerEnvelope, recipients: &[Session], exclude: Option<u32>) {
    for session in recipients {
        if Some(session.session_id) == exclude {
            continue;
        }
        deliver_one(envelope, session);
    }
}

/// Single best-effort send; returns whether the envelope was queued
pub fn deliver_one(envelope: &ServerEnvelope, recipient: &Session) -> bool {
    if recipient.tx.send(envelope.clone()).is_err() {
        // Connection already closed; its registry entry is removed when the
        // connection task runs disconnect cleanup.
        eprintln!("{}{}", ERR_DELIVERY, recipient.session_id);
        return false;
    }
    true
}
