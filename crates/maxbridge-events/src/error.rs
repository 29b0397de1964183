//! Error primitives for the event pipeline.
//!
//! None of these ever reach the native caller; they surface to code that
//! subscribes or forwards events directly and are otherwise logged and
//! dropped.

use thiserror::Error;

use crate::topics::{AdFormat, AdLifecycle};

/// Failure to hand an event to the main-thread queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The bounded queue had no free slot.
    #[error("main-thread event queue is full")]
    QueueFull {
        /// Canonical name of the dropped event.
        event_kind: &'static str,
    },
    /// The dispatcher side of the queue is gone.
    #[error("main-thread event queue is closed")]
    QueueClosed {
        /// Canonical name of the dropped event.
        event_kind: &'static str,
    },
}

impl DispatchError {
    /// Canonical name of the event that could not be queued.
    #[must_use]
    pub const fn event_kind(&self) -> &'static str {
        match self {
            Self::QueueFull { event_kind } | Self::QueueClosed { event_kind } => *event_kind,
        }
    }
}

/// Result wrapper for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Rejected delegate subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// Handler signature does not fit the events raised for the topic.
    #[error("handler shape does not match event topic")]
    TopicShapeMismatch {
        /// Canonical name of the topic.
        topic: &'static str,
        /// Subscription method the topic requires.
        expected: &'static str,
    },
}

/// Result wrapper for delegate subscriptions.
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Invalid `(format, lifecycle)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TopicError {
    /// The SDK never raises this combination.
    #[error("unsupported ad topic")]
    Unsupported {
        /// Requested format.
        format: AdFormat,
        /// Requested lifecycle stage.
        lifecycle: AdLifecycle,
    },
}
