use std::sync::Arc;

use runtrace_types::*;
use serde::Deserialize;
use serde_json::{Value, json};

use super::schema::*;
use crate::builder::{Clock, EventBuilder};
use crate::tool_mapping::canonical_tool_name;
use crate::traits::{EventNormalizer, Outcome, SkipReason, Step};

/// Item kinds that represent a tool invocation
pub const CODEX_TOOL_ITEM_TYPES: &[&str] = &[
    "command_execution",
    "file_change",
    "mcp_tool_call",
    "web_search",
    "todo_list",
];

fn is_tool_item(kind: &str) -> bool {
    CODEX_TOOL_ITEM_TYPES.contains(&kind)
}

/// Codex normalizer. Terminal item events carry full text, so deltas are
/// forwarded without local accumulation.
pub struct CodexNormalizer {
    builder: EventBuilder,
    turn_index: i64,
    session_id: Option<String>,
}

impl CodexNormalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            builder: EventBuilder::new(Source::Codex, clock),
            turn_index: -1,
            session_id: None,
        }
    }

    fn handle(&mut self, raw: &Value) -> Step {
        if raw.get("type").and_then(Value::as_str).is_none() {
            return Err(SkipReason::Unrecognized);
        }

        let record =
            CodexRecord::deserialize(raw).map_err(|e| SkipReason::Malformed(e.to_string()))?;

        match record {
            CodexRecord::ThreadStarted(thread) => {
                self.session_id = thread.thread_id;
                self.builder
                    .push(EventPayload::SessionStart(SessionStartPayload {
                        session_id: self.session_id.clone(),
                        model: thread.model,
                    }));
            }
            CodexRecord::TurnStarted(turn) => {
                self.turn_index += 1;
                self.builder.push(EventPayload::TurnStart(TurnStartPayload {
                    turn_index: self.turn_index,
                    message_id: turn.message_id,
                }));
            }
            CodexRecord::TurnCompleted(turn) => {
                self.builder.push(EventPayload::TurnEnd(TurnEndPayload {
                    turn_index: self.turn_index,
                    status: Status::Completed,
                    stop_reason: turn.stop_reason,
                    usage: turn.usage,
                }));
            }
            CodexRecord::TurnFailed(failed) => {
                self.builder.push(EventPayload::TurnEnd(TurnEndPayload {
                    turn_index: self.turn_index,
                    status: Status::Failed,
                    stop_reason: None,
                    usage: None,
                }));
                let message =
                    error_message(failed.error.as_ref()).unwrap_or_else(|| "turn failed".to_string());
                self.builder
                    .push(EventPayload::Error(ErrorPayload { message }));
            }
            CodexRecord::ItemStarted(item) => return self.handle_item_started(item, raw),
            CodexRecord::ItemCompleted(item) => return self.handle_item_completed(item, raw),
            CodexRecord::AgentMessageDelta(delta) => {
                self.builder.push(EventPayload::MessageDelta(TextPayload {
                    turn_index: self.turn_index,
                    text: delta.delta.unwrap_or_default(),
                }));
            }
            CodexRecord::ReasoningDelta(delta) => {
                self.builder.push(EventPayload::ThinkingDelta(TextPayload {
                    turn_index: self.turn_index,
                    text: delta.delta.unwrap_or_default(),
                }));
            }
            CodexRecord::Error(error) => {
                let message = error_message(error.message.as_ref())
                    .or_else(|| error_message(error.error.as_ref()))
                    .unwrap_or_else(|| "unknown error".to_string());
                self.builder
                    .push(EventPayload::Error(ErrorPayload { message }));
            }
            CodexRecord::Unknown => return Err(SkipReason::Unrecognized),
        }

        Ok(())
    }

    fn handle_item_started(&mut self, record: ItemRecord, raw: &Value) -> Step {
        let item = item_body(&record, raw);
        let kind = record
            .item_type
            .clone()
            .or_else(|| item_str(item, "type").map(str::to_string))
            .unwrap_or_default();

        if !is_tool_item(&kind) {
            return Err(SkipReason::Inert);
        }

        let tool_use_id = record
            .item_id
            .clone()
            .or_else(|| item_str(item, "id").map(str::to_string))
            .unwrap_or_default();

        self.builder.push(EventPayload::ToolStart(ToolCallPayload {
            turn_index: self.turn_index,
            tool_use_id,
            tool: canonical_tool_name(&kind),
            input: extract_tool_input(item),
        }));
        Ok(())
    }

    fn handle_item_completed(&mut self, record: ItemRecord, raw: &Value) -> Step {
        let item = item_body(&record, raw);
        let kind = item_str(item, "type").unwrap_or_default();

        let payload = match kind {
            "agent_message" => EventPayload::Message(TextPayload {
                turn_index: self.turn_index,
                text: extract_text(item),
            }),
            "reasoning" => EventPayload::Thinking(TextPayload {
                turn_index: self.turn_index,
                text: extract_text(item),
            }),
            kind if is_tool_item(kind) => EventPayload::ToolEnd(ToolCallPayload {
                turn_index: self.turn_index,
                tool_use_id: item_str(item, "id").unwrap_or_default().to_string(),
                tool: canonical_tool_name(kind),
                input: extract_tool_input(item),
            }),
            // user_message, error items and anything newer
            _ => return Err(SkipReason::Inert),
        };

        self.builder.push(payload);
        Ok(())
    }
}

/// The nested `item` object, or the event itself when the fields are inlined.
fn item_body<'a>(record: &'a ItemRecord, raw: &'a Value) -> &'a Value {
    match &record.item {
        Some(item) if item.is_object() => item,
        _ => raw,
    }
}

fn item_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

/// A bare string, or the `message` of an error object.
fn error_message(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(message) => Some(message.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Text of an item: `text`, else string `content`, else the concatenated
/// `text` of each element of a `content` list, else empty.
pub fn extract_text(item: &Value) -> String {
    if let Some(text) = item_str(item, "text") {
        return text.to_string();
    }
    match item.get("content") {
        Some(Value::String(content)) => content.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|part| item_str(part, "text").unwrap_or_default())
            .collect(),
        _ => String::new(),
    }
}

/// Tool input of an item: object `input`, else `{"command": command}`
/// when a command is present, else `{}`.
pub fn extract_tool_input(item: &Value) -> Value {
    if let Some(input) = item.get("input").filter(|v| v.is_object()) {
        return input.clone();
    }
    match item.get("command") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => empty_object(),
        Some(command) => json!({ "command": command }),
    }
}

impl EventNormalizer for CodexNormalizer {
    fn source(&self) -> Source {
        Source::Codex
    }

    fn process(&mut self, raw: &Value) -> Outcome {
        self.builder.begin(raw);
        let before = self.builder.pending();
        let step = self.handle(raw);
        Outcome::settle(step, self.builder.pending() - before)
    }

    fn finalize(&mut self) -> Outcome {
        self.builder.clear_stamp();
        self.builder.push(EventPayload::SessionEnd(SessionEndPayload {
            status: Status::Completed,
        }));
        Outcome::Emitted(1)
    }

    fn drain(&mut self) -> Vec<CanonicalEvent> {
        self.builder.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FixedClock;
    use chrono::{TimeZone, Utc};

    fn normalizer() -> CodexNormalizer {
        CodexNormalizer::new(Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
        )))
    }

    fn run(records: &[Value]) -> Vec<CanonicalEvent> {
        let mut n = normalizer();
        for record in records {
            n.process(record);
        }
        n.finalize();
        n.drain()
    }

    #[test]
    fn test_command_execution_becomes_bash_tool() {
        let events = run(&[
            json!({"type": "thread.started", "thread_id": "t1"}),
            json!({"type": "turn.started"}),
            json!({"type": "item.started", "item": {"id": "i0", "type": "command_execution", "command": "ls", "status": "in_progress"}}),
            json!({"type": "item.completed", "item": {"id": "i0", "type": "command_execution", "command": "ls", "exit_code": 0}}),
            json!({"type": "turn.completed", "usage": {"input_tokens": 35210, "output_tokens": 295}}),
        ]);

        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec!["session.start", "turn.start", "tool.start", "tool.end", "turn.end", "session.end"]
        );

        match &events[0].payload {
            EventPayload::SessionStart(p) => {
                assert_eq!(p.session_id.as_deref(), Some("t1"));
                assert_eq!(p.model, None);
            }
            _ => panic!("Expected SessionStart payload"),
        }
        match &events[2].payload {
            EventPayload::ToolStart(p) => {
                assert_eq!(p.turn_index, 0);
                assert_eq!(p.tool_use_id, "i0");
                assert_eq!(p.tool, "bash");
                assert_eq!(p.input, json!({"command": "ls"}));
            }
            _ => panic!("Expected ToolStart payload"),
        }
        match &events[4].payload {
            EventPayload::TurnEnd(p) => {
                assert_eq!(p.status, Status::Completed);
                assert_eq!(p.stop_reason, None);
                assert_eq!(p.usage, Some(json!({"input_tokens": 35210, "output_tokens": 295})));
            }
            _ => panic!("Expected TurnEnd payload"),
        }
    }

    #[test]
    fn test_inline_item_fields() {
        let events = run(&[
            json!({"type": "turn.started"}),
            json!({"type": "item.started", "item_type": "mcp_tool_call", "item_id": "call_7", "input": {"server": "docs"}}),
        ]);

        match &events[1].payload {
            EventPayload::ToolStart(p) => {
                assert_eq!(p.tool_use_id, "call_7");
                assert_eq!(p.tool, "mcp");
                assert_eq!(p.input, json!({"server": "docs"}));
            }
            _ => panic!("Expected ToolStart payload"),
        }
    }

    #[test]
    fn test_non_tool_item_start_is_inert() {
        let mut n = normalizer();
        let outcome = n.process(&json!({"type": "item.started", "item": {"id": "i1", "type": "agent_message"}}));
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Inert));
    }

    #[test]
    fn test_agent_message_and_reasoning_items() {
        let events = run(&[
            json!({"type": "turn.started"}),
            json!({"type": "reasoning.content.delta", "delta": "Plan"}),
            json!({"type": "item.completed", "item": {"id": "r0", "type": "reasoning", "text": "Planning the listing"}}),
            json!({"type": "agent_message.content.delta", "delta": "Do"}),
            json!({"type": "agent_message.content.delta"}),
            json!({"type": "item.completed", "item": {"id": "a0", "type": "agent_message", "content": [{"text": "Done"}, {"type": "x"}, {"text": "."}]}}),
        ]);

        let texts: Vec<(&str, String)> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Message(p)
                | EventPayload::MessageDelta(p)
                | EventPayload::Thinking(p)
                | EventPayload::ThinkingDelta(p) => Some((e.kind(), p.text.clone())),
                _ => None,
            })
            .collect();

        assert_eq!(
            texts,
            vec![
                ("thinking.delta", "Plan".to_string()),
                ("thinking", "Planning the listing".to_string()),
                ("message.delta", "Do".to_string()),
                ("message.delta", String::new()),
                ("message", "Done.".to_string()),
            ]
        );
    }

    #[test]
    fn test_turn_failed_then_error() {
        let events = run(&[
            json!({"type": "thread.started", "thread_id": "t2"}),
            json!({"type": "turn.started"}),
            json!({"type": "turn.failed", "error": "context window exceeded"}),
            json!({"type": "error", "message": "fatal: something went wrong"}),
        ]);

        let errors: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Error(p) => Some(p.message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            errors,
            vec!["context window exceeded", "fatal: something went wrong"]
        );

        match &events[2].payload {
            EventPayload::TurnEnd(p) => {
                assert_eq!(p.status, Status::Failed);
                assert_eq!(p.stop_reason, None);
                assert_eq!(p.usage, None);
            }
            _ => panic!("Expected TurnEnd payload"),
        }
    }

    #[test]
    fn test_error_message_fallbacks() {
        let events = run(&[
            json!({"type": "turn.failed", "error": {"message": "rate limited"}}),
            json!({"type": "turn.failed"}),
            json!({"type": "error", "error": "socket closed"}),
            json!({"type": "error"}),
        ]);

        let errors: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Error(p) => Some(p.message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            errors,
            vec!["rate limited", "turn failed", "socket closed", "unknown error"]
        );
    }

    #[test]
    fn test_unknown_types_are_unrecognized() {
        let mut n = normalizer();
        assert_eq!(
            n.process(&json!({"type": "message_start"})),
            Outcome::Skipped(SkipReason::Unrecognized)
        );
        assert_eq!(
            n.process(&json!({"type": "item.updated", "item": {"type": "todo_list"}})),
            Outcome::Skipped(SkipReason::Unrecognized)
        );
        assert!(n.drain().is_empty());
    }

    #[test]
    fn test_mistyped_fields_do_not_drop_turns() {
        let events = run(&[
            json!({"type": "thread.started", "thread_id": 99, "model": false}),
            json!({"type": "turn.started"}),
            json!({"type": "turn.completed", "stop_reason": 1}),
            json!({"type": "turn.started", "message_id": 5}),
            json!({"type": "agent_message.content.delta", "delta": {"text": "x"}}),
            json!({"type": "turn.completed"}),
        ]);

        let turn_indexes: Vec<_> = events
            .iter()
            .filter(|e| e.kind() == "turn.start" || e.kind() == "turn.end")
            .map(|e| (e.kind(), e.turn_index()))
            .collect();
        assert_eq!(
            turn_indexes,
            vec![
                ("turn.start", Some(0)),
                ("turn.end", Some(0)),
                ("turn.start", Some(1)),
                ("turn.end", Some(1)),
            ]
        );
        assert_eq!(
            events[0].payload,
            EventPayload::SessionStart(SessionStartPayload {
                session_id: None,
                model: None,
            })
        );
    }

    #[test]
    fn test_extract_text_precedence() {
        assert_eq!(extract_text(&json!({"text": "a", "content": "b"})), "a");
        assert_eq!(extract_text(&json!({"text": 5, "content": "b"})), "b");
        assert_eq!(extract_text(&json!({"content": [{"text": "x"}, {}, {"text": "y"}]})), "xy");
        assert_eq!(extract_text(&json!({"content": 3})), "");
        assert_eq!(extract_text(&json!({})), "");
    }

    #[test]
    fn test_extract_tool_input_precedence() {
        assert_eq!(
            extract_tool_input(&json!({"input": {"path": "a.rs"}, "command": "ls"})),
            json!({"path": "a.rs"})
        );
        assert_eq!(
            extract_tool_input(&json!({"input": "raw", "command": ["bash", "-lc", "ls"]})),
            json!({"command": ["bash", "-lc", "ls"]})
        );
        assert_eq!(extract_tool_input(&json!({"command": null})), json!({}));
        assert_eq!(extract_tool_input(&json!({"command": false})), json!({}));
        assert_eq!(extract_tool_input(&json!({"changes": []})), json!({}));
    }
}
