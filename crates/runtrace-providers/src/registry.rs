use std::sync::Arc;

use runtrace_types::Source;
use serde_json::Value;

use crate::builder::Clock;
use crate::normalizer::Normalizer;

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub source: Source,
    /// Name reported for the normalizer that handled a stream
    pub normalizer: &'static str,
    pub description: &'static str,
}

const PROVIDERS: &[ProviderMetadata] = &[
    ProviderMetadata {
        source: Source::Claude,
        normalizer: "ClaudeCodeNormalizer",
        description: "Claude Code stream-json and conversational output",
    },
    ProviderMetadata {
        source: Source::Codex,
        normalizer: "CodexNormalizer",
        description: "Codex exec --json output",
    },
];

pub fn get_all_providers() -> &'static [ProviderMetadata] {
    PROVIDERS
}

pub fn get_provider_metadata(source: Source) -> &'static ProviderMetadata {
    match source {
        Source::Claude => &PROVIDERS[0],
        Source::Codex => &PROVIDERS[1],
    }
}

/// Create the normalizer for a detected source
pub fn create_normalizer(source: Source, clock: Arc<dyn Clock>) -> Normalizer {
    Normalizer::for_source(source, clock)
}

/// Claude streaming-protocol markers matched exactly
const CLAUDE_STREAM_TYPES: &[&str] = &["ping", "system", "message_delta", "message_stop", "stream_event"];

/// Claude flat conversational markers
const CLAUDE_FLAT_TYPES: &[&str] = &["assistant", "user", "result"];

const CODEX_PREFIXES: &[&str] = &["thread.", "turn.", "item."];

/// Classify one raw event by vendor. First match wins; `None` when nothing does.
///
/// Claude is checked first, so a type such as `message_delta` (which also
/// contains the Codex delta marker) resolves to Claude.
pub fn detect_source(raw: &Value) -> Option<Source> {
    let kind = raw.get("type").and_then(Value::as_str).unwrap_or_default();

    if kind.contains("message_start")
        || kind.contains("content_block")
        || CLAUDE_STREAM_TYPES.contains(&kind)
    {
        return Some(Source::Claude);
    }
    if CLAUDE_FLAT_TYPES.contains(&kind) {
        return Some(Source::Claude);
    }
    if raw.get("stream_event").is_some() {
        return Some(Source::Claude);
    }

    if CODEX_PREFIXES.iter().any(|prefix| kind.starts_with(prefix))
        || kind.contains("delta")
        || kind == "error"
    {
        return Some(Source::Codex);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detect(raw: Value) -> Option<Source> {
        detect_source(&raw)
    }

    #[test]
    fn test_claude_streaming_markers() {
        for kind in [
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop",
            "ping",
            "system",
            "stream_event",
        ] {
            assert_eq!(detect(json!({"type": kind})), Some(Source::Claude), "{kind}");
        }
    }

    #[test]
    fn test_claude_flat_markers() {
        for kind in ["assistant", "user", "result"] {
            assert_eq!(detect(json!({"type": kind})), Some(Source::Claude), "{kind}");
        }
    }

    #[test]
    fn test_stream_event_key() {
        assert_eq!(
            detect(json!({"stream_event": {"type": "message_start"}})),
            Some(Source::Claude)
        );
    }

    #[test]
    fn test_codex_markers() {
        for kind in [
            "thread.started",
            "turn.started",
            "turn.failed",
            "item.completed",
            "agent_message.content.delta",
            "reasoning.content.delta",
            "error",
        ] {
            assert_eq!(detect(json!({"type": kind})), Some(Source::Codex), "{kind}");
        }
    }

    #[test]
    fn test_unknown() {
        assert_eq!(detect(json!({"type": "unknown_event"})), None);
        assert_eq!(detect(json!({"type": 42})), None);
        assert_eq!(detect(json!({"message": "hi"})), None);
        assert_eq!(detect(json!({"type": "errors"})), None);
    }

    #[test]
    fn test_metadata_matches_source() {
        for provider in get_all_providers() {
            assert_eq!(get_provider_metadata(provider.source).normalizer, provider.normalizer);
        }
        assert_eq!(get_provider_metadata(Source::Claude).normalizer, "ClaudeCodeNormalizer");
    }
}
