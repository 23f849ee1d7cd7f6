use std::sync::Arc;

use runtrace_types::{CanonicalEvent, Source};
use serde_json::Value;

use crate::builder::Clock;
use crate::claude::ClaudeNormalizer;
use crate::codex::CodexNormalizer;
use crate::traits::{EventNormalizer, Outcome};

/// The normalizer locked in for one stream.
///
/// The vendor set is closed, so this is an enum rather than a boxed trait
/// object; it still implements [`EventNormalizer`] by delegation.
pub enum Normalizer {
    Claude(ClaudeNormalizer),
    Codex(CodexNormalizer),
}

impl Normalizer {
    pub fn for_source(source: Source, clock: Arc<dyn Clock>) -> Self {
        match source {
            Source::Claude => Normalizer::Claude(ClaudeNormalizer::new(clock)),
            Source::Codex => Normalizer::Codex(CodexNormalizer::new(clock)),
        }
    }

    fn inner(&mut self) -> &mut dyn EventNormalizer {
        match self {
            Normalizer::Claude(n) => n,
            Normalizer::Codex(n) => n,
        }
    }
}

impl EventNormalizer for Normalizer {
    fn source(&self) -> Source {
        match self {
            Normalizer::Claude(_) => Source::Claude,
            Normalizer::Codex(_) => Source::Codex,
        }
    }

    fn process(&mut self, raw: &Value) -> Outcome {
        self.inner().process(raw)
    }

    fn finalize(&mut self) -> Outcome {
        self.inner().finalize()
    }

    fn drain(&mut self) -> Vec<CanonicalEvent> {
        self.inner().drain()
    }
}
