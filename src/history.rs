//! history.rs — bounded in-memory log of accepted chat messages per topic.
//! Oldest entries are dropped once the capacity is reached.

use std::collections::VecDeque;

use crate::model::ChatMessage;

/// Hard upper bound regardless of configuration.
pub const MAX_HISTORY_CAPACITY: usize = 100_000;

#[derive(Debug, Clone)]
pub struct MessageLog {
    inner: VecDeque<ChatMessage>,
    cap: usize,
}

impl MessageLog {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_HISTORY_CAPACITY);
        Self {
            inner: VecDeque::with_capacity(cap.min(1024)),
            cap,
        }
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.inner.push_back(msg);
        while self.inner.len() > self.cap {
            self.inner.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Last `n` messages, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<ChatMessage> {
        let start = self.inner.len().saturating_sub(n);
        self.inner.iter().skip(start).cloned().collect()
    }
}
