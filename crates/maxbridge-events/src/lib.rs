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

//! Event pipeline for MAX SDK callbacks.
//!
//! Native code reports every SDK event as a name plus an encoded payload. This
//! crate decodes the payload, routes the name to a typed [`Event`], carries it
//! across to the main thread and broadcasts it to subscribers. Nothing in the
//! pipeline returns an error to the native caller: bad records are skipped,
//! unknown names are logged and dropped, and unparsable numbers fall back to
//! defaults.
//!
//! Layout: `wire.rs` (payload codec), `topics.rs` (event names),
//! `payloads.rs` (typed records), `routing.rs` (name to event),
//! `broadcast.rs` + `bus.rs` (delivery), `dispatch.rs` (main-thread queue).

pub mod broadcast;
pub mod bus;
pub mod dispatch;
pub mod error;
pub mod payloads;
pub mod routing;
pub mod topics;
pub mod wire;

pub use broadcast::{
    AdEventListener, AdFailedHandler, AdHandler, Broadcaster, CmpCompletedHandler, Delegates,
    Delivery, ListenerRegistry, Multicast, RewardHandler, SdkInitializedHandler, SubscriptionId,
};
pub use bus::{DEFAULT_STREAM_CAPACITY, EventBus, EventStream};
pub use dispatch::{
    DEFAULT_QUEUE_CAPACITY, MainThreadDispatcher, NativeEventSender, main_thread_channel,
};
pub use error::{BroadcastError, BroadcastResult, DispatchError, DispatchResult, TopicError};
pub use payloads::{
    AdError, AdInfo, AdReward, AppTrackingStatus, CmpError, ConsentFlowUserGeography, Event,
    EventEnvelope, EventId, SdkConfiguration,
};
pub use routing::{build_event, route, route_raw};
pub use topics::{AdFormat, AdLifecycle, AdTopic, EventName};
pub use wire::{FIELD_SEPARATOR, Payload, RECORD_SEPARATOR, WireFormat};
