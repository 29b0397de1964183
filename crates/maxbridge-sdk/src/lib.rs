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

//! Engine-facing MAX SDK surface.
//!
//! [`MaxSdk`] is what game code calls. It converts arguments at the boundary
//! and forwards to a [`NativePlugin`], the seam where platform bindings
//! attach. Results flow back only as events through
//! [`maxbridge_events::NativeEventSender`].
//!
//! Layout: `api.rs` (facade), `native.rs` (plugin trait and headless plugin),
//! `global.rs` (process-wide handle), `simulated.rs` (in-process plugin),
//! `types.rs` (boundary conversions).

pub mod api;
pub mod error;
pub mod global;
pub mod native;
pub mod simulated;
pub mod types;

pub use api::{MaxSdk, PLUGIN_VERSION, validate_ad_unit_identifier};
pub use error::{SdkError, SdkResult};
pub use global::{install, install_plugin, is_installed};
pub use native::{HeadlessPlugin, NativePlugin};
pub use simulated::SimulatedPlugin;
pub use types::{AdViewPosition, Color, parse_geography};
