//! Async stream of broadcast events.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::wrappers::BroadcastStream;

use crate::payloads::{Event, EventEnvelope, EventId};

/// Default number of envelopes buffered per lagging subscriber.
pub const DEFAULT_STREAM_CAPACITY: usize = 128;

/// Stream wrapper used by subscribers.
pub type EventStream = BroadcastStream<EventEnvelope>;

/// Fan-out of routed events to async consumers built on `tokio::broadcast`.
///
/// Publishing never blocks. Subscribers that fall behind by more than the
/// capacity observe a lag error on their stream and continue with newer
/// envelopes.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    last_id: Arc<Mutex<Option<EventId>>>,
}

impl EventBus {
    /// Construct a bus buffering at most `capacity` envelopes per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            last_id: Arc::new(Mutex::new(None)),
        }
    }

    /// Construct a bus with [`DEFAULT_STREAM_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STREAM_CAPACITY)
    }

    /// Subscribe to envelopes published from now on.
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Number of live stream subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Wrap `event` in an envelope and publish it, returning the assigned id.
    ///
    /// Ids start at 1 and increase by one per published event, whether or not
    /// anyone is subscribed.
    pub fn publish(&self, event: Event) -> EventId {
        let mut last = self.lock_last_id();
        let id = last.map_or(1, |previous| previous.saturating_add(1));
        *last = Some(id);
        drop(last);

        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };
        let _ = self.sender.send(envelope);
        id
    }

    /// Id of the most recently published event.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        *self.lock_last_id()
    }

    fn lock_last_id(&self) -> MutexGuard<'_, Option<EventId>> {
        self.last_id.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventBus")
            .field("last_event_id", &self.last_event_id())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn ids_increase_without_subscribers() {
        let bus = EventBus::with_capacity(4);
        assert_eq!(bus.last_event_id(), None);
        let first = bus.publish(Event::CmpCompleted { error: None });
        let second = bus.publish(Event::CmpCompleted { error: None });
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(bus.last_event_id(), Some(2));
    }

    #[tokio::test]
    async fn subscribers_receive_envelopes_in_order() {
        let bus = EventBus::new();
        let mut stream = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(Event::CmpCompleted { error: None });
        bus.publish(Event::SdkInitialized {
            configuration: crate::payloads::SdkConfiguration::default(),
        });

        let first = stream.next().await.expect("first item").expect("envelope");
        let second = stream.next().await.expect("second item").expect("envelope");
        assert_eq!(first.id, 1);
        assert_eq!(first.event.kind(), "OnCmpCompletedEvent");
        assert_eq!(second.id, 2);
        assert_eq!(second.event.kind(), "OnSdkInitializedEvent");
    }

    #[tokio::test]
    async fn lagging_subscriber_reports_lag() {
        let bus = EventBus::with_capacity(1);
        let mut stream = bus.subscribe();
        bus.publish(Event::CmpCompleted { error: None });
        bus.publish(Event::CmpCompleted { error: None });

        let lagged = stream.next().await.expect("item");
        assert!(lagged.is_err());
        let latest = stream.next().await.expect("item").expect("envelope");
        assert_eq!(latest.id, 2);
    }
}
