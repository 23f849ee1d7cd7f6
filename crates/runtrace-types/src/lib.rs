pub mod domain;
pub mod event;
mod util;

pub use domain::*;
pub use event::*;
pub use util::*;
