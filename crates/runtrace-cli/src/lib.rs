// NOTE: runtrace layering
//
// types      canonical events and the session domain model
// providers  vendor detection and per-vendor normalizers
// engine     folds canonical events into sessions
// runtrace   this crate: argument parsing, config, logging, I/O
//
// Library crates only emit `tracing` events. The subscriber is installed
// here, once, and always writes to stderr so stdout stays pure NDJSON/JSON.

mod args;
mod commands;
pub mod config;
mod handlers;
mod logging;

pub use args::{Cli, Commands, LogLevel};
pub use commands::run;
