use runtrace_types::*;

/// Assemble a session from a canonical event sequence.
///
/// Always returns a session: an empty sequence yields an empty tree that
/// the interruption pass marks `interrupted`.
pub fn assemble_session(events: &[CanonicalEvent]) -> Session {
    let mut assembler = SessionAssembler::new();
    for event in events {
        assembler.apply(event);
    }
    assembler.finish()
}

/// What one fold step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldOutcome {
    Applied,
    /// Event addressed a turn index that does not exist
    NoTurn(i64),
    /// `tool.end` whose id matched no tool call of its turn
    UnmatchedTool { turn_index: i64, tool_use_id: String },
    /// Event type that does not change the tree (`tool.delta`)
    Inert,
}

/// Incremental fold from canonical events to a [`Session`].
///
/// Turns are addressed positionally by `turn_index`, which matches the
/// gap-free indexes every normalizer assigns.
#[derive(Debug, Default)]
pub struct SessionAssembler {
    session: Session,
}

impl SessionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session as folded so far, before the interruption pass.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn apply(&mut self, event: &CanonicalEvent) -> FoldOutcome {
        let outcome = self.fold(event);
        match &outcome {
            FoldOutcome::Applied | FoldOutcome::Inert => {}
            FoldOutcome::NoTurn(turn_index) => {
                tracing::debug!(
                    event_type = event.kind(),
                    turn_index,
                    "dropping event for unknown turn"
                );
            }
            FoldOutcome::UnmatchedTool {
                turn_index,
                tool_use_id,
            } => {
                tracing::debug!(
                    turn_index,
                    tool_use_id = tool_use_id.as_str(),
                    "dropping tool.end without matching tool.start"
                );
            }
        }
        outcome
    }

    fn fold(&mut self, event: &CanonicalEvent) -> FoldOutcome {
        let ts = event.timestamp;

        match &event.payload {
            EventPayload::SessionStart(start) => {
                self.session.source = Some(event.source);
                self.session.session_id = start.session_id.clone();
                self.session.model = start.model.clone();
                self.session.started_at = Some(ts);
            }

            EventPayload::TurnStart(start) => {
                let position = self.session.turns.len();
                if usize::try_from(start.turn_index).ok() != Some(position) {
                    tracing::warn!(
                        turn_index = start.turn_index,
                        position,
                        "turn.start index does not match its position"
                    );
                }
                self.session
                    .turns
                    .push(Turn::new(start.turn_index, start.message_id.clone(), ts));
            }

            EventPayload::MessageDelta(delta) => {
                let Some(turn) = self.turn_mut(delta.turn_index) else {
                    return FoldOutcome::NoTurn(delta.turn_index);
                };
                turn.message_text.push_str(&delta.text);
            }

            EventPayload::Message(message) => {
                let Some(turn) = self.turn_mut(message.turn_index) else {
                    return FoldOutcome::NoTurn(message.turn_index);
                };
                turn.message_text = message.text.clone();
            }

            EventPayload::ThinkingDelta(delta) => {
                let Some(turn) = self.turn_mut(delta.turn_index) else {
                    return FoldOutcome::NoTurn(delta.turn_index);
                };
                turn.thinking_text.push_str(&delta.text);
            }

            EventPayload::Thinking(thinking) => {
                let Some(turn) = self.turn_mut(thinking.turn_index) else {
                    return FoldOutcome::NoTurn(thinking.turn_index);
                };
                turn.thinking_text = thinking.text.clone();
            }

            EventPayload::ToolStart(call) => {
                let Some(turn) = self.turn_mut(call.turn_index) else {
                    return FoldOutcome::NoTurn(call.turn_index);
                };
                turn.tools.push(ToolCall {
                    tool_use_id: call.tool_use_id.clone(),
                    tool: call.tool.clone(),
                    input: call.input.clone(),
                    status: ToolStatus::Running,
                    started_at: Some(ts),
                    ended_at: None,
                });
            }

            EventPayload::ToolEnd(call) => {
                let Some(turn) = self.turn_mut(call.turn_index) else {
                    return FoldOutcome::NoTurn(call.turn_index);
                };
                let Some(tool) = turn
                    .tools
                    .iter_mut()
                    .find(|t| t.tool_use_id == call.tool_use_id)
                else {
                    return FoldOutcome::UnmatchedTool {
                        turn_index: call.turn_index,
                        tool_use_id: call.tool_use_id.clone(),
                    };
                };
                tool.input = call.input.clone();
                tool.status = ToolStatus::Completed;
                tool.ended_at = Some(ts);
            }

            EventPayload::ToolDelta(_) => return FoldOutcome::Inert,

            EventPayload::TurnEnd(end) => {
                let Some(turn) = self.turn_mut(end.turn_index) else {
                    return FoldOutcome::NoTurn(end.turn_index);
                };
                turn.status = end.status;
                turn.stop_reason = end.stop_reason.clone();
                turn.usage = end.usage.clone();
                turn.ended_at = Some(ts);
            }

            EventPayload::Error(error) => {
                let entry = ErrorEntry {
                    message: error.message.clone(),
                    timestamp: ts,
                };
                // Attributed to the latest turn only while it is still running
                match self.session.turns.last_mut() {
                    Some(turn) if turn.is_running() => turn.errors.push(entry),
                    _ => self.session.errors.push(entry),
                }
            }

            EventPayload::SessionEnd(end) => {
                self.session.status = end.status;
                self.session.ended_at = Some(ts);
            }
        }

        FoldOutcome::Applied
    }

    fn turn_mut(&mut self, turn_index: i64) -> Option<&mut Turn> {
        let position = usize::try_from(turn_index).ok()?;
        self.session.turns.get_mut(position)
    }

    /// Apply the interruption pass and hand out the finished tree.
    ///
    /// Running turns become `interrupted`. The session does too, but only
    /// while it is still running and never saw `session.end`.
    pub fn finish(mut self) -> Session {
        for turn in &mut self.session.turns {
            if turn.is_running() {
                turn.status = Status::Interrupted;
            }
        }

        if self.session.status == Status::Running && self.session.ended_at.is_none() {
            self.session.status = Status::Interrupted;
        }

        self.session
    }
}
