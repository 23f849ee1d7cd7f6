// Engine module - folds canonical events into the session tree
// This layer sits between normalized events (providers) and CLI presentation

pub mod session;

pub use session::{FoldOutcome, SessionAssembler, SessionSummary, assemble_session, summarize};
