#![forbid(unsafe_code)]
#![warn(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Environment-backed settings for the MAX event bridge.
//!
//! Layout: `model.rs` (typed settings), `validate.rs` (value parsing),
//! `loader.rs` (`BridgeSettings::from_env` / `from_vars`), `defaults.rs`
//! (defaults and variable names).

pub mod defaults;
pub mod error;
mod loader;
pub mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{AdUnits, BridgeSettings, LogFormatSetting, WireFormatSetting};
