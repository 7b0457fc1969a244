//! Relay Common Library
//!
//! Shared protocol types and utilities for the relay chat server.

pub mod protocol;
pub mod time;

/// Default port for relay WebSocket connections
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum number of public messages retained in the history buffer
///
/// When the buffer is full, the oldest message is evicted first (FIFO).
pub const MAX_HISTORY_MESSAGES: usize = 100;

/// Maximum size of a single inbound WebSocket frame (64 KB)
///
/// This prevents memory exhaustion from malicious clients sending huge
/// envelopes. Legitimate chat envelopes are well under 1 KB.
pub const MAX_ENVELOPE_BYTES: usize = 64 * 1024;
