use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::EventPayload;
use super::source::Source;

/// One canonical event, emitted once by a normalizer and never mutated.
///
/// Serialized flat: the payload's `type` tag and fields sit next to
/// `source` and `timestamp`. Readers also accept `ts` for the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    #[serde(flatten)]
    pub payload: EventPayload,

    pub source: Source,

    /// Millisecond precision, UTC
    #[serde(with = "crate::util::timestamp_millis", alias = "ts")]
    pub timestamp: DateTime<Utc>,
}

impl CanonicalEvent {
    pub fn new(source: Source, timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            payload,
            source,
            timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    pub fn turn_index(&self) -> Option<i64> {
        self.payload.turn_index()
    }
}
