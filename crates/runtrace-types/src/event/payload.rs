use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::Status;

/// Canonical event vocabulary shared by every normalizer.
///
/// The tag values are wire-stable: downstream consumers (the session
/// assembler, `runtrace normalize` readers) match on them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    /// Session opened (explicit init marker or first turn)
    #[serde(rename = "session.start")]
    SessionStart(SessionStartPayload),

    /// Session closed; always emitted once when a normalizer finalizes
    #[serde(rename = "session.end")]
    SessionEnd(SessionEndPayload),

    #[serde(rename = "turn.start")]
    TurnStart(TurnStartPayload),

    #[serde(rename = "turn.end")]
    TurnEnd(TurnEndPayload),

    /// Full assistant text of one block; supersedes preceding deltas
    #[serde(rename = "message")]
    Message(TextPayload),

    /// Incremental assistant text fragment
    #[serde(rename = "message.delta")]
    MessageDelta(TextPayload),

    /// Full reasoning text of one block; supersedes preceding deltas
    #[serde(rename = "thinking")]
    Thinking(TextPayload),

    /// Incremental reasoning fragment
    #[serde(rename = "thinking.delta")]
    ThinkingDelta(TextPayload),

    /// Tool invocation began. Input may still be empty for streamed calls.
    #[serde(rename = "tool.start")]
    ToolStart(ToolCallPayload),

    /// Raw partial-input fragment of a streamed tool call
    #[serde(rename = "tool.delta")]
    ToolDelta(ToolDeltaPayload),

    /// Tool invocation finished with its complete input
    #[serde(rename = "tool.end")]
    ToolEnd(ToolCallPayload),

    /// Agent-reported failure (not a failure of runtrace itself)
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

impl EventPayload {
    /// Wire tag of this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::SessionStart(_) => "session.start",
            EventPayload::SessionEnd(_) => "session.end",
            EventPayload::TurnStart(_) => "turn.start",
            EventPayload::TurnEnd(_) => "turn.end",
            EventPayload::Message(_) => "message",
            EventPayload::MessageDelta(_) => "message.delta",
            EventPayload::Thinking(_) => "thinking",
            EventPayload::ThinkingDelta(_) => "thinking.delta",
            EventPayload::ToolStart(_) => "tool.start",
            EventPayload::ToolDelta(_) => "tool.delta",
            EventPayload::ToolEnd(_) => "tool.end",
            EventPayload::Error(_) => "error",
        }
    }

    /// Turn this payload addresses, if it is turn-scoped.
    pub fn turn_index(&self) -> Option<i64> {
        match self {
            EventPayload::TurnStart(p) => Some(p.turn_index),
            EventPayload::TurnEnd(p) => Some(p.turn_index),
            EventPayload::Message(p)
            | EventPayload::MessageDelta(p)
            | EventPayload::Thinking(p)
            | EventPayload::ThinkingDelta(p) => Some(p.turn_index),
            EventPayload::ToolStart(p) | EventPayload::ToolEnd(p) => Some(p.turn_index),
            EventPayload::ToolDelta(p) => Some(p.turn_index),
            EventPayload::SessionStart(_) | EventPayload::SessionEnd(_) | EventPayload::Error(_) => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStartPayload {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEndPayload {
    #[serde(default = "Status::completed")]
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnStartPayload {
    /// Zero-based, gap-free within one stream
    pub turn_index: i64,
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEndPayload {
    pub turn_index: i64,
    #[serde(default = "Status::completed")]
    pub status: Status,
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Vendor usage object, passed through untouched
    #[serde(default)]
    pub usage: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub turn_index: i64,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub turn_index: i64,
    /// Vendor call id; empty when the vendor omitted it
    #[serde(default)]
    pub tool_use_id: String,
    /// Canonical tool name
    #[serde(default)]
    pub tool: String,
    #[serde(default = "empty_object")]
    pub input: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeltaPayload {
    pub turn_index: i64,
    #[serde(default)]
    pub tool_use_id: String,
    #[serde(default)]
    pub partial_json: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// `{}`; the input of a tool call whose arguments are unknown.
pub fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
