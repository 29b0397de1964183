//! Hand-off from native callback threads to the thread that owns the
//! [`Broadcaster`].
//!
//! Native code calls [`NativeEventSender::forward_event`] from whatever thread
//! the SDK fires on. Decoding and routing happen right there; the typed event
//! then crosses a bounded queue and is broadcast when the owning thread pumps
//! the [`MainThreadDispatcher`].

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tracing::{debug, warn};

use crate::broadcast::{Broadcaster, Delivery};
use crate::error::{DispatchError, DispatchResult};
use crate::payloads::Event;
use crate::routing;
use crate::wire::WireFormat;

/// Queue capacity used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Build a connected sender/dispatcher pair.
///
/// `format` pins the wire encoding; `None` sniffs it per payload. A capacity
/// of zero is raised to one.
#[must_use]
pub fn main_thread_channel(
    capacity: usize,
    format: Option<WireFormat>,
) -> (NativeEventSender, MainThreadDispatcher) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        NativeEventSender { tx, format },
        MainThreadDispatcher {
            rx,
            broadcaster: Broadcaster::new(),
        },
    )
}

/// Entry point for native callbacks. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct NativeEventSender {
    tx: Sender<Event>,
    format: Option<WireFormat>,
}

impl NativeEventSender {
    /// Decode, route and enqueue a native event.
    ///
    /// Never blocks and never fails: unknown names, a full queue and a closed
    /// queue are all logged and the event is dropped.
    pub fn forward_event(&self, name: &str, raw_payload: &str) {
        let Some(event) = routing::route_raw(name, raw_payload, self.format) else {
            return;
        };
        if let Err(err) = self.forward(event) {
            warn!(
                error = %err,
                event_kind = err.event_kind(),
                "dropping MAX event"
            );
        }
    }

    /// Enqueue an already typed event.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::QueueFull`] when the queue has no free slot and
    /// [`DispatchError::QueueClosed`] once the dispatcher is gone.
    pub fn forward(&self, event: Event) -> DispatchResult<()> {
        let event_kind = event.kind();
        match self.tx.try_send(event) {
            Ok(()) => {
                debug!(event_kind, "queued MAX event for main thread");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(DispatchError::QueueFull { event_kind }),
            Err(TrySendError::Closed(_)) => Err(DispatchError::QueueClosed { event_kind }),
        }
    }

    /// Wire encoding this sender expects, if pinned.
    #[must_use]
    pub const fn wire_format(&self) -> Option<WireFormat> {
        self.format
    }

    /// Whether the dispatcher has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half; owned by the engine's main thread.
#[derive(Debug)]
pub struct MainThreadDispatcher {
    rx: Receiver<Event>,
    broadcaster: Broadcaster,
}

impl MainThreadDispatcher {
    /// Replace the broadcaster, keeping the queue.
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Broadcaster) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// Broadcaster used for delivery.
    #[must_use]
    pub const fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Mutable broadcaster access for subscribing.
    pub fn broadcaster_mut(&mut self) -> &mut Broadcaster {
        &mut self.broadcaster
    }

    /// Broadcast everything queued right now, returning the number of events.
    ///
    /// Intended to be called once per engine tick.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.broadcaster.broadcast(event);
            delivered += 1;
        }
        delivered
    }

    /// Wait for the next event and broadcast it. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Delivery> {
        let event = self.rx.recv().await?;
        Some(self.broadcaster.broadcast(event))
    }

    /// Broadcast events until every sender has been dropped.
    pub async fn run(&mut self) -> usize {
        let mut delivered = 0;
        while self.next().await.is_some() {
            delivered += 1;
        }
        debug!(delivered, "main-thread dispatcher stopped");
        delivered
    }

    /// Number of events waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::AdTopic;
    use std::sync::{Arc, Mutex};

    fn loaded(unit: &str) -> String {
        format!("adUnitId\u{1C}{unit}\u{1D}")
    }

    #[test]
    fn events_wait_for_the_pump() {
        let (sender, mut dispatcher) = main_thread_channel(8, None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher
            .broadcaster_mut()
            .delegates_mut()
            .on_ad(AdTopic::BANNER_LOADED, move |info| {
                sink.lock()
                    .expect("lock")
                    .push(info.ad_unit_identifier.clone());
            })
            .expect("subscribe");

        sender.forward_event("OnBannerAdLoadedEvent", &loaded("one"));
        sender.forward_event("OnBannerAdLoadedEvent", &loaded("two"));
        assert!(seen.lock().expect("lock").is_empty());
        assert_eq!(dispatcher.pending(), 2);

        assert_eq!(dispatcher.pump(), 2);
        assert_eq!(*seen.lock().expect("lock"), vec!["one", "two"]);
        assert_eq!(dispatcher.pump(), 0);
    }

    #[test]
    fn unknown_events_never_reach_the_queue() {
        let (sender, mut dispatcher) = main_thread_channel(4, Some(WireFormat::Delimited));
        sender.forward_event("OnBogusEvent", &loaded("x"));
        assert_eq!(dispatcher.pump(), 0);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (sender, mut dispatcher) = main_thread_channel(1, None);
        sender
            .forward(Event::CmpCompleted { error: None })
            .expect("first fits");
        let err = sender
            .forward(Event::CmpCompleted { error: None })
            .expect_err("second overflows");
        assert_eq!(
            err,
            DispatchError::QueueFull {
                event_kind: "OnCmpCompletedEvent"
            }
        );

        sender.forward_event("OnBannerAdClickedEvent", &loaded("dropped"));
        assert_eq!(dispatcher.pump(), 1);
    }

    #[test]
    fn closed_queue_reports_closed() {
        let (sender, dispatcher) = main_thread_channel(0, None);
        drop(dispatcher);
        assert!(sender.is_closed());
        let err = sender
            .forward(Event::CmpCompleted { error: None })
            .expect_err("closed");
        assert!(matches!(err, DispatchError::QueueClosed { .. }));
        sender.forward_event("OnSdkInitializedEvent", "");
    }

    #[tokio::test]
    async fn run_drains_until_senders_drop() {
        let (sender, mut dispatcher) = main_thread_channel(DEFAULT_QUEUE_CAPACITY, None);
        let worker = sender.clone();
        let handle = std::thread::spawn(move || {
            worker.forward_event("OnInterstitialAdLoadedEvent", r#"{"adUnitId":"int"}"#);
            worker.forward_event(
                "OnInterstitialAdLoadFailedEvent",
                r#"{"adUnitId":"int","errorCode":"204"}"#,
            );
        });
        handle.join().expect("native thread");
        drop(sender);

        assert_eq!(dispatcher.run().await, 2);
        assert_eq!(dispatcher.broadcaster().bus().last_event_id(), Some(2));
    }
}
