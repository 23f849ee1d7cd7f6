use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use runtrace_types::{CanonicalEvent, Source};
use serde_json::Value;

use crate::builder::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::normalizer::Normalizer;
use crate::registry::{create_normalizer, detect_source, get_provider_metadata};
use crate::traits::{EventNormalizer, Outcome, SkipReason};

/// Canonical events of one stream plus the normalizer that produced them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizationResult {
    pub events: Vec<CanonicalEvent>,
    /// `None` when no entry was ever classified; `events` is then empty
    pub normalizer: Option<Source>,
}

/// Normalize persisted entries, stamping events with the wall clock.
pub fn normalize(entries: &[Value]) -> NormalizationResult {
    normalize_with_clock(entries, Arc::new(SystemClock))
}

/// Normalize persisted entries in order.
///
/// Entries may be decoded objects or JSON text. Undecodable, null,
/// non-object and empty entries are skipped. Detection runs until the first
/// classifiable entry locks in a normalizer; that entry and every later one
/// go to it, and it is finalized once the input is exhausted.
pub fn normalize_with_clock(entries: &[Value], clock: Arc<dyn Clock>) -> NormalizationResult {
    let mut normalizer: Option<Normalizer> = None;

    for (index, entry) in entries.iter().enumerate() {
        let Some(data) = decode_entry(entry) else {
            tracing::debug!(entry = index, "skipping unusable entry");
            continue;
        };

        if normalizer.is_none() {
            match detect_source(&data) {
                Some(source) => {
                    tracing::debug!(
                        entry = index,
                        normalizer = get_provider_metadata(source).normalizer,
                        "source detected"
                    );
                    normalizer = Some(create_normalizer(source, clock.clone()));
                }
                None => {
                    tracing::debug!(
                        entry = index,
                        event_type = %event_type(&data),
                        "skipping unclassified entry"
                    );
                    continue;
                }
            }
        }

        if let Some(n) = normalizer.as_mut() {
            let outcome = n.process(&data);
            log_outcome(index, &data, &outcome);
        }
    }

    match normalizer {
        Some(mut n) => {
            n.finalize();
            NormalizationResult {
                events: n.drain(),
                normalizer: Some(n.source()),
            }
        }
        None => NormalizationResult::default(),
    }
}

/// Decode one persisted entry into a non-empty JSON object.
pub fn decode_entry(entry: &Value) -> Option<Cow<'_, Value>> {
    let data = match entry {
        Value::String(text) => Cow::Owned(serde_json::from_str::<Value>(text).ok()?),
        other => Cow::Borrowed(other),
    };

    match data.as_object() {
        Some(map) if !map.is_empty() => Some(data),
        _ => None,
    }
}

/// Raw `type` rendered for diagnostics: the string itself, `""` when absent.
fn event_type(data: &Value) -> String {
    match data.get("type") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(kind)) => kind.clone(),
        Some(other) => other.to_string(),
    }
}

fn log_outcome(index: usize, data: &Value, outcome: &Outcome) {
    match outcome {
        Outcome::Emitted(count) => {
            tracing::trace!(entry = index, count, "emitted");
        }
        Outcome::Recorded => {
            tracing::trace!(entry = index, "recorded");
        }
        Outcome::Skipped(SkipReason::Malformed(reason)) => {
            tracing::debug!(
                entry = index,
                event_type = %event_type(data),
                reason = %reason,
                "skipping malformed event"
            );
        }
        Outcome::Skipped(reason) => {
            tracing::debug!(
                entry = index,
                event_type = %event_type(data),
                ?reason,
                "skipping event"
            );
        }
    }
}

/// Line-at-a-time driver for filter mode.
///
/// Unlike [`normalize`], an unclassifiable first usable line is an error:
/// a filter must not guess which protocol it is reading.
pub struct StreamNormalizer {
    clock: Arc<dyn Clock>,
    normalizer: Option<Normalizer>,
    line: usize,
}

impl Default for StreamNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamNormalizer {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            normalizer: None,
            line: 0,
        }
    }

    /// Source locked in so far.
    pub fn source(&self) -> Option<Source> {
        self.normalizer.as_ref().map(|n| n.source())
    }

    /// Feed one line; returns the canonical events it produced.
    pub fn push_line(&mut self, line: &str) -> Result<Vec<CanonicalEvent>> {
        self.line += 1;

        let line = line.trim();
        if line.is_empty() {
            return Ok(Vec::new());
        }

        let data: Value = match serde_json::from_str(line) {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(line = self.line, error = %err, "skipping undecodable line");
                return Ok(Vec::new());
            }
        };
        if !data.as_object().is_some_and(|map| !map.is_empty()) {
            tracing::debug!(line = self.line, "skipping non-object line");
            return Ok(Vec::new());
        }

        if self.normalizer.is_none() {
            let source = detect_source(&data).ok_or_else(|| Error::UndetectedSource {
                event_type: event_type(&data),
            })?;
            tracing::debug!(
                line = self.line,
                normalizer = get_provider_metadata(source).normalizer,
                "source detected"
            );
            self.normalizer = Some(create_normalizer(source, self.clock.clone()));
        }
        let Some(normalizer) = self.normalizer.as_mut() else {
            return Ok(Vec::new());
        };

        let outcome = normalizer.process(&data);
        log_outcome(self.line, &data, &outcome);
        Ok(normalizer.drain())
    }

    /// Finalize the locked normalizer. Empty if nothing was ever detected.
    pub fn finish(self) -> Vec<CanonicalEvent> {
        match self.normalizer {
            Some(mut n) => {
                n.finalize();
                n.drain()
            }
            None => Vec::new(),
        }
    }

    /// Run the filter: read NDJSON from `reader`, write canonical NDJSON to
    /// `writer`, flushing after each event when `flush_each_event` is set.
    pub fn pipe<R: BufRead, W: Write>(
        mut self,
        reader: R,
        writer: &mut W,
        flush_each_event: bool,
    ) -> Result<usize> {
        let mut written = 0;

        for line in NdjsonLines::new(reader) {
            let events = self.push_line(&line?)?;
            written += write_events(writer, &events, flush_each_event)?;
        }

        let events = self.finish();
        written += write_events(writer, &events, flush_each_event)?;
        writer.flush()?;
        Ok(written)
    }
}

/// Line reader for NDJSON input that tolerates bytes which are not UTF-8.
///
/// A line that fails to decode is logged and comes back empty, so callers
/// drop it like any blank line while their line numbers stay aligned.
/// Only read errors are yielded as `Err`.
pub struct NdjsonLines<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> NdjsonLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for NdjsonLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        self.line += 1;

        let bytes = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => Some(Ok(text.to_string())),
            Err(err) => {
                tracing::debug!(line = self.line, error = %err, "skipping line that is not UTF-8");
                Some(Ok(String::new()))
            }
        }
    }
}

fn write_events<W: Write>(writer: &mut W, events: &[CanonicalEvent], flush: bool) -> Result<usize> {
    for event in events {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        if flush {
            writer.flush()?;
        }
    }
    Ok(events.len())
}
