use std::collections::HashMap;
use std::sync::Arc;

use runtrace_types::*;
use serde::Deserialize;
use serde_json::Value;

use super::schema::*;
use crate::builder::{Clock, EventBuilder};
use crate::tool_mapping::canonical_tool_name;
use crate::traits::{EventNormalizer, Outcome, SkipReason, Step};

/// Kind of an open streaming content block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Text,
    Thinking,
    ToolUse,
    Other,
}

impl BlockKind {
    fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some("text") => BlockKind::Text,
            Some("thinking") => BlockKind::Thinking,
            Some("tool_use") => BlockKind::ToolUse,
            _ => BlockKind::Other,
        }
    }
}

/// In-progress content block, keyed by its index within the current turn
#[derive(Debug)]
struct BlockAccumulator {
    kind: BlockKind,
    text: String,
    input_json: String,
    tool_use_id: String,
    tool: String,
}

/// Claude Code normalizer: a dual state machine over the streaming
/// protocol and the flat conversational records.
pub struct ClaudeNormalizer {
    builder: EventBuilder,

    /// -1 until the first turn opens
    turn_index: i64,

    /// Guards both session-start emission sites
    session_started: bool,
    session_id: Option<String>,
    model: Option<String>,

    /// Cleared on `message_start`, entries removed on `content_block_stop`
    blocks: HashMap<u64, BlockAccumulator>,

    stop_reason: Option<String>,
    usage: Option<Value>,
    message_id: Option<String>,
}

impl ClaudeNormalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            builder: EventBuilder::new(Source::Claude, clock),
            turn_index: -1,
            session_started: false,
            session_id: None,
            model: None,
            blocks: HashMap::new(),
            stop_reason: None,
            usage: None,
            message_id: None,
        }
    }

    fn handle(&mut self, raw: &Value) -> Step {
        if raw.get("type").and_then(Value::as_str).is_none() {
            return Err(SkipReason::Unrecognized);
        }

        let record =
            ClaudeRecord::deserialize(raw).map_err(|e| SkipReason::Malformed(e.to_string()))?;

        match record {
            ClaudeRecord::System(system) => self.handle_system(system),
            ClaudeRecord::StreamEvent(envelope) => match envelope.event {
                Some(inner) if inner.is_object() => self.handle(&inner),
                _ => Err(SkipReason::Malformed("stream_event without event".to_string())),
            },
            ClaudeRecord::MessageStart(start) => {
                self.handle_message_start(start);
                Ok(())
            }
            ClaudeRecord::ContentBlockStart(start) => {
                self.handle_content_block_start(start);
                Ok(())
            }
            ClaudeRecord::ContentBlockDelta(delta) => self.handle_content_block_delta(delta),
            ClaudeRecord::ContentBlockStop(stop) => self.handle_content_block_stop(stop),
            ClaudeRecord::MessageDelta(delta) => {
                self.stop_reason = delta.delta.and_then(|d| d.stop_reason);
                self.usage = delta.usage;
                Ok(())
            }
            ClaudeRecord::MessageStop => {
                self.builder.push(EventPayload::TurnEnd(TurnEndPayload {
                    turn_index: self.turn_index,
                    status: Status::Completed,
                    stop_reason: self.stop_reason.clone(),
                    usage: self.usage.clone(),
                }));
                Ok(())
            }
            ClaudeRecord::Assistant(assistant) => {
                self.handle_assistant(assistant);
                Ok(())
            }
            // Tool results are already represented by the assistant's tool
            // blocks; `result` only carries aggregate stats.
            ClaudeRecord::User | ClaudeRecord::ResultSummary | ClaudeRecord::Ping => {
                Err(SkipReason::Inert)
            }
            ClaudeRecord::Unknown => Err(SkipReason::Unrecognized),
        }
    }

    fn handle_system(&mut self, system: SystemRecord) -> Step {
        if self.session_started || system.subtype.as_deref() != Some("init") {
            return Err(SkipReason::Inert);
        }

        self.session_id = system.session_id;
        self.model = system.model;
        self.start_session();
        Ok(())
    }

    /// Emit `session.start` once, whichever site gets here first.
    fn start_session(&mut self) {
        if self.session_started {
            return;
        }
        self.session_started = true;
        self.builder
            .push(EventPayload::SessionStart(SessionStartPayload {
                session_id: self.session_id.clone(),
                model: self.model.clone(),
            }));
    }

    fn open_turn(&mut self, message_id: Option<String>) {
        self.turn_index += 1;
        self.builder.push(EventPayload::TurnStart(TurnStartPayload {
            turn_index: self.turn_index,
            message_id,
        }));
    }

    fn handle_message_start(&mut self, start: MessageStartRecord) {
        let message = start.message.unwrap_or_default();

        self.message_id = message.id;
        if self.model.is_none() {
            self.model = message.model;
        }
        self.blocks.clear();
        self.stop_reason = None;
        self.usage = None;

        self.start_session();
        self.open_turn(self.message_id.clone());
    }

    fn handle_content_block_start(&mut self, start: ContentBlockStartRecord) {
        let info = start.content_block.unwrap_or_default();
        let kind = BlockKind::from_type(info.kind.as_deref());

        let mut block = BlockAccumulator {
            kind,
            text: String::new(),
            input_json: String::new(),
            tool_use_id: String::new(),
            tool: String::new(),
        };

        if kind == BlockKind::ToolUse {
            block.tool_use_id = info.id.unwrap_or_default();
            block.tool = canonical_tool_name(info.name.as_deref().unwrap_or_default());
            self.builder.push(EventPayload::ToolStart(ToolCallPayload {
                turn_index: self.turn_index,
                tool_use_id: block.tool_use_id.clone(),
                tool: block.tool.clone(),
                input: empty_object(),
            }));
        }

        self.blocks.insert(start.index, block);
    }

    fn handle_content_block_delta(&mut self, delta: ContentBlockDeltaRecord) -> Step {
        let block = self
            .blocks
            .get_mut(&delta.index)
            .ok_or(SkipReason::UnknownBlock(delta.index))?;

        let payload = match delta.delta {
            Some(BlockDelta::TextDelta { text }) => {
                let text = text.unwrap_or_default();
                block.text.push_str(&text);
                EventPayload::MessageDelta(TextPayload {
                    turn_index: self.turn_index,
                    text,
                })
            }
            Some(BlockDelta::ThinkingDelta { thinking }) => {
                let text = thinking.unwrap_or_default();
                block.text.push_str(&text);
                EventPayload::ThinkingDelta(TextPayload {
                    turn_index: self.turn_index,
                    text,
                })
            }
            Some(BlockDelta::InputJsonDelta { partial_json }) => {
                let partial_json = partial_json.unwrap_or_default();
                block.input_json.push_str(&partial_json);
                EventPayload::ToolDelta(ToolDeltaPayload {
                    turn_index: self.turn_index,
                    tool_use_id: block.tool_use_id.clone(),
                    partial_json,
                })
            }
            // signature_delta and friends
            Some(BlockDelta::Unknown) | None => return Err(SkipReason::Inert),
        };

        self.builder.push(payload);
        Ok(())
    }

    fn handle_content_block_stop(&mut self, stop: ContentBlockStopRecord) -> Step {
        let block = self
            .blocks
            .remove(&stop.index)
            .ok_or(SkipReason::UnknownBlock(stop.index))?;

        let payload = match block.kind {
            BlockKind::Text => EventPayload::Message(TextPayload {
                turn_index: self.turn_index,
                text: block.text,
            }),
            BlockKind::Thinking => EventPayload::Thinking(TextPayload {
                turn_index: self.turn_index,
                text: block.text,
            }),
            BlockKind::ToolUse => EventPayload::ToolEnd(ToolCallPayload {
                turn_index: self.turn_index,
                tool_use_id: block.tool_use_id,
                tool: block.tool,
                input: parse_tool_input(&block.input_json),
            }),
            BlockKind::Other => return Err(SkipReason::Inert),
        };

        self.builder.push(payload);
        Ok(())
    }

    fn handle_assistant(&mut self, assistant: AssistantRecord) {
        let message = assistant.message.unwrap_or_default();

        if !self.session_started {
            self.session_id = assistant.session_id;
            self.model = assistant.model.or_else(|| message.model.clone());
            self.start_session();
        }
        if self.model.is_none() {
            self.model = message.model.clone();
        }

        self.open_turn(message.id);

        let blocks: Vec<AssistantBlock> = message
            .content
            .as_ref()
            .and_then(Value::as_array)
            .map(|items| items.iter().map(AssistantBlock::from_value).collect())
            .unwrap_or_default();

        let mut has_tool_use = false;
        for block in blocks {
            match block {
                AssistantBlock::Text { text } => {
                    self.builder.push(EventPayload::Message(TextPayload {
                        turn_index: self.turn_index,
                        text: text.unwrap_or_default(),
                    }));
                }
                AssistantBlock::Thinking { thinking, text } => {
                    self.builder.push(EventPayload::Thinking(TextPayload {
                        turn_index: self.turn_index,
                        text: thinking.or(text).unwrap_or_default(),
                    }));
                }
                AssistantBlock::ToolUse { id, name, input } => {
                    has_tool_use = true;
                    // The flat form carries the complete call, so start and end
                    // are emitted back to back with the same input.
                    let call = ToolCallPayload {
                        turn_index: self.turn_index,
                        tool_use_id: id.unwrap_or_default(),
                        tool: canonical_tool_name(name.as_deref().unwrap_or("unknown")),
                        input: input.unwrap_or_else(empty_object),
                    };
                    self.builder.push(EventPayload::ToolStart(call.clone()));
                    self.builder.push(EventPayload::ToolEnd(call));
                }
                // Skip unknown content types
                AssistantBlock::Unknown => {}
            }
        }

        let stop_reason = if has_tool_use { "tool_use" } else { "end_turn" };
        self.builder.push(EventPayload::TurnEnd(TurnEndPayload {
            turn_index: self.turn_index,
            status: Status::Completed,
            stop_reason: Some(stop_reason.to_string()),
            usage: message.usage,
        }));
    }
}

/// Parse accumulated `input_json_delta` fragments; `{}` when empty or invalid.
fn parse_tool_input(input_json: &str) -> Value {
    serde_json::from_str(input_json).unwrap_or_else(|_| empty_object())
}

impl EventNormalizer for ClaudeNormalizer {
    fn source(&self) -> Source {
        Source::Claude
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
