mod normalize;
pub(crate) mod schema;

pub use normalize::ClaudeNormalizer;
