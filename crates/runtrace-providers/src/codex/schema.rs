use serde::Deserialize;
use serde_json::Value;

use crate::lenient;

/// One line of `codex exec --json` output.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum CodexRecord {
    #[serde(rename = "thread.started")]
    ThreadStarted(ThreadStartedRecord),
    #[serde(rename = "turn.started")]
    TurnStarted(TurnStartedRecord),
    #[serde(rename = "turn.completed")]
    TurnCompleted(TurnCompletedRecord),
    #[serde(rename = "turn.failed")]
    TurnFailed(TurnFailedRecord),
    #[serde(rename = "item.started")]
    ItemStarted(ItemRecord),
    #[serde(rename = "item.completed")]
    ItemCompleted(ItemRecord),
    #[serde(rename = "agent_message.content.delta")]
    AgentMessageDelta(ContentDeltaRecord),
    #[serde(rename = "reasoning.content.delta")]
    ReasoningDelta(ContentDeltaRecord),
    #[serde(rename = "error")]
    Error(ErrorRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadStartedRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub thread_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TurnStartedRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TurnCompletedRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TurnFailedRecord {
    /// Either a bare string or `{"message": ...}`
    #[serde(default)]
    pub error: Option<Value>,
}

/// `item.started` / `item.completed`. The item body is kept untyped:
/// text and tool input are extracted from it by precedence rules.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub item: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentDeltaRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub delta: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorRecord {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}
