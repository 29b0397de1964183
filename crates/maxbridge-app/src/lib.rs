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

//! `maxbridge` command-line application.
//!
//! Layout: `cli.rs` (argument parsing and exit codes), `bootstrap.rs`
//! (settings, logging, demo session), `commands.rs` (codec and routing
//! commands).

/// Settings, logging and the scripted demo session.
pub mod bootstrap;
mod cli;
mod commands;
/// Application error types.
pub mod error;

pub use bootstrap::{DEMO_SDK_KEY, DemoOptions, DemoReport, run_demo};
pub use cli::{run, run_from};
pub use error::{AppError, AppResult};
