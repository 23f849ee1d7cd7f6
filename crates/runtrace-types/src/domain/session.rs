use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{Source, Status, ToolStatus};

/// A reconstructed run: what one agent stream did, vendor-independent.
///
/// Every optional field may be `null` (no model reported, stream never
/// opened a session, and so on). Renderers must tolerate that.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub source: Option<Source>,
    pub session_id: Option<String>,
    pub model: Option<String>,
    pub status: Status,
    pub turns: Vec<Turn>,
    /// Errors that arrived while no turn was running
    pub errors: Vec<ErrorEntry>,
    #[serde(default, with = "crate::util::timestamp_millis::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::util::timestamp_millis::option")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// One request/response cycle of the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub turn_index: i64,
    pub message_id: Option<String>,
    pub status: Status,
    pub thinking_text: String,
    pub message_text: String,
    pub tools: Vec<ToolCall>,
    pub stop_reason: Option<String>,
    pub usage: Option<Value>,
    pub errors: Vec<ErrorEntry>,
    #[serde(default, with = "crate::util::timestamp_millis::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::util::timestamp_millis::option")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Turn {
    pub fn new(turn_index: i64, message_id: Option<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            turn_index,
            message_id,
            status: Status::Running,
            thinking_text: String::new(),
            message_text: String::new(),
            tools: Vec::new(),
            stop_reason: None,
            usage: None,
            errors: Vec::new(),
            started_at: Some(started_at),
            ended_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }
}

/// One tool invocation inside a turn, correlated by `tool_use_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_use_id: String,
    pub tool: String,
    pub input: Value,
    pub status: ToolStatus,
    #[serde(default, with = "crate::util::timestamp_millis::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::util::timestamp_millis::option")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
    #[serde(with = "crate::util::timestamp_millis")]
    pub timestamp: DateTime<Utc>,
}
