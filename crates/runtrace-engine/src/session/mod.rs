mod assembler;
mod summary;

pub use assembler::{FoldOutcome, SessionAssembler, assemble_session};
pub use summary::{SessionSummary, summarize};
