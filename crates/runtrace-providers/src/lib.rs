// Error types
pub mod error;

// Normalizer capability and skip outcomes
pub mod traits;

// Provider implementations
pub mod claude;
pub mod codex;

// Event builder and clocks
pub mod builder;

// Closed set of normalizers selected by detection
pub mod normalizer;

// Detection and provider metadata
pub mod registry;

// Detect-then-lock drivers (batch and line streaming)
pub mod driver;

// Tool name canonicalization
pub mod tool_mapping;
pub(crate) mod tool_spec;

// Tolerant field decoders for vendor schemas
pub(crate) mod lenient;

// Traits
pub use traits::{EventNormalizer, Outcome, SkipReason};

// Builder
pub use builder::{Clock, EventBuilder, FixedClock, SystemClock};

// Normalizers
pub use claude::ClaudeNormalizer;
pub use codex::CodexNormalizer;
pub use normalizer::Normalizer;

// Registry
pub use registry::{
    ProviderMetadata, create_normalizer, detect_source, get_all_providers, get_provider_metadata,
};

// Drivers
pub use driver::{
    NdjsonLines, NormalizationResult, StreamNormalizer, normalize, normalize_with_clock,
};

// Tool names
pub use tool_mapping::canonical_tool_name;

// Error types
pub use error::{Error, Result};
