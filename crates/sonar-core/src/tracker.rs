use crate::types::Sequence;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Round-trip bookkeeping for in-flight echo requests.
///
/// The engine does not retain send timestamps; a driver that wants
/// round-trip intervals or per-packet timeouts records each `Sent` event
/// here and retires the entry when the matching `Received` event arrives or
/// when its own timeout expires.
#[derive(Debug, Default)]
pub struct RttTracker {
    in_flight: HashMap<Sequence, Instant>,
}

impl RttTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the send time of a sequence number.
    pub fn record_sent(&mut self, sequence: Sequence) {
        self.in_flight.insert(sequence, Instant::now());
    }

    /// Retire the entry for a reply and return the round-trip interval.
    ///
    /// Returns `None` for a sequence number with no outstanding entry, e.g.
    /// a duplicate reply.
    pub fn record_received(&mut self, sequence: Sequence) -> Option<Duration> {
        self.in_flight.remove(&sequence).map(|sent| sent.elapsed())
    }

    /// Retire entries older than `max_age`, returning the timed out
    /// sequence numbers.
    pub fn retire(&mut self, max_age: Duration) -> Vec<Sequence> {
        let mut timed_out = Vec::new();
        self.in_flight.retain(|sequence, sent| {
            if sent.elapsed() > max_age {
                timed_out.push(*sequence);
                false
            } else {
                true
            }
        });
        timed_out
    }

    /// The number of requests awaiting a reply.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
