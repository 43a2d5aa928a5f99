use std::time::Instant;

use crate::clock::seconds_between;

/// Shortest duration recorded for a word, so duplicate events never log zero
pub const MIN_WORD_SECS: f64 = 0.01;

/// Per-word elapsed times captured while a session is active
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordTimingLog {
    /// Seconds per completed word, in typing order
    pub entries: Vec<f64>,
    /// Completed words seen so far
    pub last_word_count: usize,
    pub last_event_time: Option<Instant>,
}

impl WordTimingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe an input event. Returns the recorded duration if this event
    /// crossed a word boundary and a previous anchor existed.
    pub fn observe(&mut self, words_typed: usize, now: Instant) -> Option<f64> {
        if words_typed <= self.last_word_count {
            return None;
        }

        let recorded = self.last_event_time.map(|prev| {
            let secs = seconds_between(prev, now).max(MIN_WORD_SECS);
            self.entries.push(secs);
            secs
        });

        self.last_event_time = Some(now);
        self.last_word_count = words_typed;

        recorded
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
