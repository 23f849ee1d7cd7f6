pub mod event;
pub mod payload;
pub mod source;
pub mod status;

pub use event::*;
pub use payload::*;
pub use source::*;
pub use status::*;
