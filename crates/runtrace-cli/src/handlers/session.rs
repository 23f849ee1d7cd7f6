use super::open_input;
use anyhow::{Context, Result};
use runtrace_engine::{SessionSummary, assemble_session, summarize};
use runtrace_providers::{NdjsonLines, normalize};
use runtrace_types::{CanonicalEvent, Session};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Pretty,
    Compact,
    Summary,
}

pub fn handle(file: Option<&Path>, canonical: bool, output: Output) -> Result<()> {
    let reader = open_input(file)?;

    let events = if canonical {
        read_canonical(reader)?
    } else {
        read_raw(reader)?
    };
    let session = assemble_session(&events);

    let mut stdout = io::stdout().lock();
    match output {
        Output::Pretty => serde_json::to_writer_pretty(&mut stdout, &session)?,
        Output::Compact => serde_json::to_writer(&mut stdout, &session)?,
        Output::Summary => write!(stdout, "{}", summary_line(&session))?,
    }
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

fn read_raw(reader: Box<dyn BufRead>) -> Result<Vec<CanonicalEvent>> {
    let mut entries = Vec::new();
    for line in NdjsonLines::new(reader) {
        entries.push(Value::String(line.context("failed to read input")?));
    }

    let result = normalize(&entries);
    if result.normalizer.is_none() {
        tracing::warn!(entries = entries.len(), "no Claude or Codex events found in input");
    }
    Ok(result.events)
}

fn read_canonical(reader: Box<dyn BufRead>) -> Result<Vec<CanonicalEvent>> {
    let mut events = Vec::new();
    for (index, line) in NdjsonLines::new(reader).enumerate() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: CanonicalEvent = serde_json::from_str(line)
            .with_context(|| format!("invalid canonical event on line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

fn summary_line(session: &Session) -> String {
    format_summary(&summarize(session))
}

fn format_summary(summary: &SessionSummary) -> String {
    let source = summary.source.map_or("unknown", |s| s.as_str());
    let duration = summary
        .duration_ms
        .map_or_else(|| "-".to_string(), |ms| format!("{}ms", ms));

    format!(
        "{} {}: {} turns, {} tool calls, {} errors, {} input / {} output tokens, {}",
        source,
        summary.status,
        summary.turns,
        summary.tool_calls,
        summary.errors,
        summary.input_tokens,
        summary.output_tokens,
        duration
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtrace_types::{Source, Status};

    #[test]
    fn test_format_summary() {
        let summary = SessionSummary {
            source: Some(Source::Codex),
            status: Status::Completed,
            turns: 2,
            tool_calls: 3,
            errors: 0,
            input_tokens: 120,
            output_tokens: 45,
            duration_ms: Some(1500),
        };
        assert_eq!(
            format_summary(&summary),
            "codex completed: 2 turns, 3 tool calls, 0 errors, 120 input / 45 output tokens, 1500ms"
        );
    }

    #[test]
    fn test_format_summary_of_empty_session() {
        assert_eq!(
            summary_line(&Session::default()),
            "unknown running: 0 turns, 0 tool calls, 0 errors, 0 input / 0 output tokens, -"
        );
    }

    #[test]
    fn test_lines_that_are_not_utf8_are_dropped() {
        let mut input = b"{\"type\":\"thread.started\",\"thread_id\":\"t1\"}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe\n{\"type\":\"turn.started\"}\n");
        let events = read_raw(Box::new(std::io::Cursor::new(input))).unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["session.start", "turn.start", "session.end"]);

        let mut input = b"{\"type\":\"session.start\",\"session_id\":\"s\",\"source\":\"codex\",\"timestamp\":\"2026-02-10T12:00:00.000Z\"}\n".to_vec();
        input.extend_from_slice(b"\xc3\x28\n");
        let events = read_canonical(Box::new(std::io::Cursor::new(input))).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_read_canonical_reports_line() {
        let input = "\n{\"type\":\"session.start\",\"session_id\":\"s\",\"source\":\"codex\",\"timestamp\":\"2026-02-10T12:00:00.000Z\"}\n{\"type\":\"bogus\"}\n";
        let err = read_canonical(Box::new(input.as_bytes())).unwrap_err();
        assert_eq!(err.to_string(), "invalid canonical event on line 3");
    }
}
