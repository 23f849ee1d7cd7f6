use runtrace_types::{CanonicalEvent, Source};
use serde_json::Value;

/// Capability shared by every per-vendor normalizer.
///
/// A normalizer is stateful and owned by exactly one stream. Emitted
/// events are buffered until the caller drains them, so a streaming
/// driver can forward them line by line while a batch driver drains once.
pub trait EventNormalizer {
    /// Vendor this normalizer translates.
    fn source(&self) -> Source;

    /// Translate one raw vendor event. Never fails: anything it cannot use
    /// comes back as [`Outcome::Skipped`].
    fn process(&mut self, raw: &Value) -> Outcome;

    /// Close the stream. Always emits `session.end`.
    fn finalize(&mut self) -> Outcome;

    /// Take the events emitted since the previous drain, in emission order.
    fn drain(&mut self) -> Vec<CanonicalEvent>;
}

/// What a single `process` call did with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// One or more canonical events were emitted
    Emitted(usize),
    /// State was updated but nothing emitted (e.g. `message_delta`)
    Recorded,
    /// Input was dropped; the stream continues
    Skipped(SkipReason),
}

impl Outcome {
    pub(crate) fn settle(step: Step, emitted: usize) -> Self {
        match step {
            Err(reason) => Outcome::Skipped(reason),
            Ok(()) if emitted > 0 => Outcome::Emitted(emitted),
            Ok(()) => Outcome::Recorded,
        }
    }

    pub fn emitted(&self) -> usize {
        match self {
            Outcome::Emitted(n) => *n,
            _ => 0,
        }
    }
}

/// Why a raw event produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Known event type that carries nothing canonical (`ping`, `user`, ...)
    Inert,
    /// Event type this normalizer does not know, or no `type` at all
    Unrecognized,
    /// Known event type whose fields did not have the expected shape
    Malformed(String),
    /// Content-block event for an index that was never opened
    UnknownBlock(u64),
}

/// Result of one handler branch: `Err` carries the named skip.
pub(crate) type Step = std::result::Result<(), SkipReason>;
