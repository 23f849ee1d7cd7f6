mod normalize;
pub(crate) mod schema;

pub use normalize::{CODEX_TOOL_ITEM_TYPES, CodexNormalizer, extract_text, extract_tool_input};
