use runtrace_types::{Session, Source, Status};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Aggregate numbers for one reconstructed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub source: Option<Source>,
    pub status: Status,
    pub turns: usize,
    pub tool_calls: usize,
    /// Turn-level and session-level errors together
    pub errors: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// `None` unless the session both started and ended
    pub duration_ms: Option<i64>,
}

pub fn summarize(session: &Session) -> SessionSummary {
    let mut input_tokens = 0u64;
    let mut output_tokens = 0u64;

    for turn in &session.turns {
        if let Some(usage) = &turn.usage {
            input_tokens = input_tokens.saturating_add(token_count(usage, "input_tokens"));
            output_tokens = output_tokens.saturating_add(token_count(usage, "output_tokens"));
        }
    }

    let duration_ms = match (session.started_at, session.ended_at) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
        _ => None,
    };

    SessionSummary {
        source: session.source,
        status: session.status,
        turns: session.turns.len(),
        tool_calls: session.turns.iter().map(|t| t.tools.len()).sum(),
        errors: session.errors.len()
            + session.turns.iter().map(|t| t.errors.len()).sum::<usize>(),
        input_tokens,
        output_tokens,
        duration_ms,
    }
}

fn token_count(usage: &Value, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use runtrace_types::{ErrorEntry, ToolCall, ToolStatus, Turn};
    use serde_json::json;

    fn turn(index: i64, usage: Option<Value>) -> Turn {
        let mut turn = Turn::new(index, None, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        turn.usage = usage;
        turn
    }

    #[test]
    fn test_empty_session() {
        let summary = summarize(&Session::default());
        assert_eq!(summary.turns, 0);
        assert_eq!(summary.input_tokens, 0);
        assert_eq!(summary.duration_ms, None);
        assert_eq!(summary.status, Status::Running);
    }

    #[test]
    fn test_token_totals_saturate() {
        let session = Session {
            turns: vec![
                turn(0, Some(json!({"input_tokens": u64::MAX, "output_tokens": 1}))),
                turn(1, Some(json!({"input_tokens": 5, "output_tokens": u64::MAX}))),
            ],
            ..Session::default()
        };

        let summary = summarize(&session);
        assert_eq!(summary.input_tokens, u64::MAX);
        assert_eq!(summary.output_tokens, u64::MAX);
    }

    #[test]
    fn test_totals() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut first = turn(0, Some(json!({"input_tokens": 35210, "output_tokens": 295})));
        first.tools.push(ToolCall {
            tool_use_id: "i0".to_string(),
            tool: "bash".to_string(),
            input: json!({"command": "ls"}),
            status: ToolStatus::Completed,
            started_at: Some(start),
            ended_at: Some(start),
        });
        first.errors.push(ErrorEntry {
            message: "x".to_string(),
            timestamp: start,
        });
        // Missing or non-numeric counts contribute nothing
        let second = turn(1, Some(json!({"input_tokens": "many"})));
        let third = turn(2, None);

        let session = Session {
            source: Some(Source::Codex),
            status: Status::Completed,
            turns: vec![first, second, third],
            errors: vec![ErrorEntry {
                message: "y".to_string(),
                timestamp: start,
            }],
            started_at: Some(start),
            ended_at: Some(start + chrono::Duration::milliseconds(1500)),
            ..Session::default()
        };

        let summary = summarize(&session);
        assert_eq!(
            summary,
            SessionSummary {
                source: Some(Source::Codex),
                status: Status::Completed,
                turns: 3,
                tool_calls: 1,
                errors: 2,
                input_tokens: 35210,
                output_tokens: 295,
                duration_ms: Some(1500),
            }
        );
    }
}
