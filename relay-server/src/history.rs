//! Bounded history of recent public messages

use std::collections::VecDeque;

use relay_common::MAX_HISTORY_MESSAGES;
use relay_common::protocol::ChatMessage;

/// Insertion-ordered buffer of the most recent public messages
///
/// Replayed to newly registered clients. Capacity is
/// [`MAX_HISTORY_MESSAGES`]; the oldest message is evicted first once the
/// buffer is full. Private messages never enter the buffer.
#[derive(Debug)]
pub struct HistoryBuffer {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_MESSAGES)
    }

    /// Buffer with a custom capacity, used by tests
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a public message, evicting from the front past capacity
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// All retained messages, oldest first
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
