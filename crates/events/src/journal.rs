use crate::messages::EventEnvelope;
use core_types::ProtocolEvent;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// A bounded, in-memory record of the most recently published events.
///
/// Oldest entries are dropped once `capacity` is reached. Sequence numbers keep
/// counting regardless, so a client can tell when it has missed something.
#[derive(Debug)]
pub struct EventJournal {
    capacity: usize,
    next_sequence: u64,
    entries: VecDeque<EventEnvelope>,
}

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_sequence: 1,
            entries: VecDeque::new(),
        }
    }

    /// Wraps each event in an envelope, appends it, and returns the envelopes
    /// in publication order.
    pub fn record(&mut self, events: Vec<ProtocolEvent>) -> Vec<EventEnvelope> {
        let mut published = Vec::with_capacity(events.len());
        for event in events {
            let envelope = EventEnvelope::new(self.next_sequence, event);
            self.next_sequence += 1;
            if self.entries.len() == self.capacity {
                if let Some(dropped) = self.entries.pop_front() {
                    trace!(sequence = dropped.sequence, "journal full, dropping oldest event");
                }
            }
            self.entries.push_back(envelope.clone());
            published.push(envelope);
        }
        if !published.is_empty() {
            debug!(
                count = published.len(),
                last_sequence = self.next_sequence - 1,
                retained = self.entries.len(),
                "events journaled"
            );
        }
        published
    }

    /// Up to `limit` most recent envelopes, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<EventEnvelope> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::StrategyEvent;

    fn reset() -> ProtocolEvent {
        StrategyEvent::AllocationsReset.into()
    }

    #[test]
    fn drops_oldest_beyond_capacity() {
        let mut journal = EventJournal::new(2);
        journal.record(vec![reset(), reset(), reset()]);

        let recent = journal.recent(10);
        assert_eq!(journal.len(), 2);
        assert_eq!(recent[0].sequence, 2);
        assert_eq!(recent[1].sequence, 3);
    }

    #[test]
    fn recent_returns_the_tail() {
        let mut journal = EventJournal::new(10);
        let published = journal.record(vec![reset(), reset(), reset()]);
        assert_eq!(published.len(), 3);

        let tail = journal.recent(1);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].sequence, 3);
    }
}
