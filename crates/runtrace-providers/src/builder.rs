use chrono::{DateTime, Utc};
use runtrace_types::{CanonicalEvent, EventPayload, Source, parse_timestamp};
use serde_json::Value;
use std::sync::Arc;

/// Source of emission timestamps for events whose raw input carries none.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Makes normalization reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// EventBuilder stamps payloads into canonical events for one normalizer
/// and buffers them until drained.
///
/// A raw event's own RFC 3339 `timestamp` field wins over the clock for
/// every event emitted while that raw event is being processed.
pub struct EventBuilder {
    source: Source,
    clock: Arc<dyn Clock>,

    /// Timestamp taken from the raw event currently being processed
    stamp: Option<DateTime<Utc>>,

    events: Vec<CanonicalEvent>,
}

impl EventBuilder {
    pub fn new(source: Source, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            stamp: None,
            events: Vec::new(),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Start processing a raw event: adopt its timestamp if it has a valid one.
    pub fn begin(&mut self, raw: &Value) {
        self.stamp = raw
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);
    }

    /// Forget any raw timestamp; subsequent events use the clock.
    pub fn clear_stamp(&mut self) {
        self.stamp = None;
    }

    pub fn push(&mut self, payload: EventPayload) {
        let timestamp = self.stamp.unwrap_or_else(|| self.clock.now());
        self.events
            .push(CanonicalEvent::new(self.source, timestamp, payload));
    }

    /// Number of buffered, not yet drained events.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn drain(&mut self) -> Vec<CanonicalEvent> {
        std::mem::take(&mut self.events)
    }
}
