use serde::Deserialize;
use serde_json::Value;

use crate::lenient;

/// One line of Claude Code output.
///
/// Covers both representations the CLI emits: the incremental streaming
/// protocol (`message_start` .. `message_stop`) and the flat conversational
/// form where one `assistant` record carries every content block.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum ClaudeRecord {
    System(SystemRecord),
    /// `{"type":"stream_event","event":{...}}` envelope around a streaming event
    StreamEvent(StreamEventRecord),
    MessageStart(MessageStartRecord),
    ContentBlockStart(ContentBlockStartRecord),
    ContentBlockDelta(ContentBlockDeltaRecord),
    ContentBlockStop(ContentBlockStopRecord),
    MessageDelta(MessageDeltaRecord),
    MessageStop,
    Assistant(AssistantRecord),
    User,
    #[serde(rename = "result")]
    ResultSummary,
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SystemRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamEventRecord {
    #[serde(default)]
    pub event: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageStartRecord {
    #[serde(default, deserialize_with = "lenient::object")]
    pub message: Option<MessageInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlockStartRecord {
    #[serde(default, deserialize_with = "lenient::index")]
    pub index: u64,
    #[serde(default, deserialize_with = "lenient::object")]
    pub content_block: Option<ContentBlockInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContentBlockInfo {
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlockDeltaRecord {
    #[serde(default, deserialize_with = "lenient::index")]
    pub index: u64,
    #[serde(default, deserialize_with = "lenient::object")]
    pub delta: Option<BlockDelta>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum BlockDelta {
    TextDelta {
        #[serde(default, deserialize_with = "lenient::string")]
        text: Option<String>,
    },
    ThinkingDelta {
        #[serde(default, deserialize_with = "lenient::string")]
        thinking: Option<String>,
    },
    InputJsonDelta {
        #[serde(default, deserialize_with = "lenient::string")]
        partial_json: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlockStopRecord {
    #[serde(default, deserialize_with = "lenient::index")]
    pub index: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageDeltaRecord {
    #[serde(default, deserialize_with = "lenient::object")]
    pub delta: Option<MessageDeltaInfo>,
    #[serde(default)]
    pub usage: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageDeltaInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub message: Option<AssistantMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssistantMessage {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
    /// Kept untyped so one odd block does not sink the whole record
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub usage: Option<Value>,
}

/// Complete content block of a flat `assistant` record.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum AssistantBlock {
    Text {
        #[serde(default, deserialize_with = "lenient::string")]
        text: Option<String>,
    },
    Thinking {
        #[serde(default, deserialize_with = "lenient::string")]
        thinking: Option<String>,
        #[serde(default, deserialize_with = "lenient::string")]
        text: Option<String>,
    },
    ToolUse {
        #[serde(default, deserialize_with = "lenient::string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "lenient::string")]
        name: Option<String>,
        #[serde(default)]
        input: Option<Value>,
    },
    #[serde(other)]
    Unknown,
}

impl AssistantBlock {
    /// Lenient per-block decode: anything unreadable is `Unknown`.
    pub fn from_value(value: &Value) -> Self {
        AssistantBlock::deserialize(value).unwrap_or(AssistantBlock::Unknown)
    }
}
