//! Delivery of routed events to subscribers.
//!
//! Three paths exist side by side:
//!
//! * [`Delegates`]: closures registered per topic, the direct subscription
//!   path for code consumers.
//! * [`ListenerRegistry`]: weakly held listener objects that can go away or
//!   become inactive between events.
//! * [`EventBus`]: an async stream of enveloped events.
//!
//! Everything here runs on the thread that owns the [`Broadcaster`]; handlers
//! only need to be `Send` so the owner can be moved onto that thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use crate::bus::{EventBus, EventStream};
use crate::error::{BroadcastError, BroadcastResult};
use crate::payloads::{AdError, AdInfo, AdReward, CmpError, Event, EventId, SdkConfiguration};
use crate::topics::{AdLifecycle, AdTopic};

/// Handler for SDK initialization.
pub type SdkInitializedHandler = dyn Fn(&SdkConfiguration) + Send;
/// Handler for CMP completion; receives the error when the flow failed.
pub type CmpCompletedHandler = dyn Fn(Option<&CmpError>) + Send;
/// Handler for plain ad lifecycle events.
pub type AdHandler = dyn Fn(&AdInfo) + Send;
/// Handler for load and display failures.
pub type AdFailedHandler = dyn Fn(&AdInfo, &AdError) + Send;
/// Handler for granted rewards.
pub type RewardHandler = dyn Fn(&AdInfo, &AdReward) + Send;

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by every subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "sub-{}", self.0)
    }
}

/// Ordered list of handlers invoked together.
pub struct Multicast<H: ?Sized> {
    handlers: Vec<(SubscriptionId, Box<H>)>,
}

impl<H: ?Sized> Multicast<H> {
    /// Empty handler list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler; it runs after every handler added before it.
    pub fn add(&mut self, handler: Box<H>) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.handlers.push((id, handler));
        id
    }

    /// Remove a handler, returning whether it was present.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke `call` with every handler in insertion order, returning how many ran.
    pub fn broadcast_with(&self, mut call: impl FnMut(&H)) -> usize {
        for (_, handler) in &self.handlers {
            call(handler);
        }
        self.handlers.len()
    }
}

impl<H: ?Sized> Default for Multicast<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for Multicast<H> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Multicast")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Closure subscriptions keyed by event topic.
#[derive(Debug, Default)]
pub struct Delegates {
    sdk_initialized: Multicast<SdkInitializedHandler>,
    cmp_completed: Multicast<CmpCompletedHandler>,
    ad: HashMap<AdTopic, Multicast<AdHandler>>,
    ad_failed: HashMap<AdTopic, Multicast<AdFailedHandler>>,
    reward: Multicast<RewardHandler>,
}

impl Delegates {
    /// Empty delegate set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to SDK initialization.
    pub fn on_sdk_initialized<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&SdkConfiguration) + Send + 'static,
    {
        self.sdk_initialized.add(Box::new(handler))
    }

    /// Subscribe to CMP flow completion.
    pub fn on_cmp_completed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(Option<&CmpError>) + Send + 'static,
    {
        self.cmp_completed.add(Box::new(handler))
    }

    /// Subscribe to a topic that carries only an [`AdInfo`].
    ///
    /// # Errors
    ///
    /// Failure and reward topics carry more data and must use
    /// [`Delegates::on_ad_failed`] or [`Delegates::on_reward`].
    pub fn on_ad<F>(&mut self, topic: AdTopic, handler: F) -> BroadcastResult<SubscriptionId>
    where
        F: Fn(&AdInfo) + Send + 'static,
    {
        match topic.lifecycle() {
            lifecycle if lifecycle.is_failure() => Err(mismatch(topic, "on_ad_failed")),
            AdLifecycle::ReceivedReward => Err(mismatch(topic, "on_reward")),
            _ => Ok(self.ad.entry(topic).or_default().add(Box::new(handler))),
        }
    }

    /// Subscribe to a load or display failure topic.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::TopicShapeMismatch`] for non-failure topics.
    pub fn on_ad_failed<F>(
        &mut self,
        topic: AdTopic,
        handler: F,
    ) -> BroadcastResult<SubscriptionId>
    where
        F: Fn(&AdInfo, &AdError) + Send + 'static,
    {
        if !topic.lifecycle().is_failure() {
            let expected = if topic.lifecycle() == AdLifecycle::ReceivedReward {
                "on_reward"
            } else {
                "on_ad"
            };
            return Err(mismatch(topic, expected));
        }
        Ok(self
            .ad_failed
            .entry(topic)
            .or_default()
            .add(Box::new(handler)))
    }

    /// Subscribe to rewarded-ad rewards.
    pub fn on_reward<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&AdInfo, &AdReward) + Send + 'static,
    {
        self.reward.add(Box::new(handler))
    }

    /// Remove a subscription from whichever list holds it.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.sdk_initialized.remove(id)
            || self.cmp_completed.remove(id)
            || self.reward.remove(id)
            || self.ad.values_mut().any(|list| list.remove(id))
            || self.ad_failed.values_mut().any(|list| list.remove(id))
    }

    /// Total number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sdk_initialized.len()
            + self.cmp_completed.len()
            + self.reward.len()
            + self.ad.values().map(Multicast::len).sum::<usize>()
            + self.ad_failed.values().map(Multicast::len).sum::<usize>()
    }

    /// Whether there are no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke the handler list matching `event`, returning how many handlers ran.
    pub fn deliver(&self, event: &Event) -> usize {
        match event {
            Event::SdkInitialized { configuration } => self
                .sdk_initialized
                .broadcast_with(|handler| handler(configuration)),
            Event::CmpCompleted { error } => self
                .cmp_completed
                .broadcast_with(|handler| handler(error.as_ref())),
            Event::Ad { topic, info } => self
                .ad
                .get(topic)
                .map_or(0, |list| list.broadcast_with(|handler| handler(info))),
            Event::AdFailed { topic, info, error } => self
                .ad_failed
                .get(topic)
                .map_or(0, |list| list.broadcast_with(|handler| handler(info, error))),
            Event::RewardReceived { info, reward } => {
                self.reward.broadcast_with(|handler| handler(info, reward))
            }
        }
    }
}

fn mismatch(topic: AdTopic, expected: &'static str) -> BroadcastError {
    BroadcastError::TopicShapeMismatch {
        topic: topic.event_name(),
        expected,
    }
}

/// Object-style subscriber. Every callback defaults to a no-op.
pub trait AdEventListener: Send + Sync {
    /// Inactive listeners are skipped but stay registered.
    fn is_active(&self) -> bool {
        true
    }

    /// SDK initialization finished.
    fn on_sdk_initialized(&self, _configuration: &SdkConfiguration) {}

    /// CMP flow finished.
    fn on_cmp_completed(&self, _error: Option<&CmpError>) {}

    /// Plain ad lifecycle event.
    fn on_ad_event(&self, _topic: AdTopic, _info: &AdInfo) {}

    /// Load or display failure.
    fn on_ad_failed(&self, _topic: AdTopic, _info: &AdInfo, _error: &AdError) {}

    /// Reward granted.
    fn on_reward(&self, _info: &AdInfo, _reward: &AdReward) {}
}

/// Listeners held by weak reference.
///
/// The registry never keeps a listener alive; dropped listeners are pruned on
/// the next delivery.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Weak<dyn AdEventListener>>,
}

impl ListenerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Registering the same instance twice delivers twice.
    pub fn register<L>(&mut self, listener: &Arc<L>)
    where
        L: AdEventListener + 'static,
    {
        let weak: Weak<L> = Arc::downgrade(listener);
        self.listeners.push(weak);
    }

    /// Remove every registration of `listener`.
    pub fn unregister<L>(&mut self, listener: &Arc<L>) -> bool
    where
        L: AdEventListener + 'static,
    {
        let target = Arc::as_ptr(listener);
        let before = self.listeners.len();
        self.listeners
            .retain(|weak| !std::ptr::addr_eq(weak.as_ptr(), target));
        self.listeners.len() != before
    }

    /// Number of registrations, including ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver to every live, active listener in registration order.
    pub fn deliver(&mut self, event: &Event) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|weak| weak.strong_count() > 0);
        let pruned = before - self.listeners.len();
        if pruned > 0 {
            debug!(pruned, "pruned dropped ad event listeners");
        }

        let mut delivered = 0;
        for listener in self.listeners.iter().filter_map(Weak::upgrade) {
            if !listener.is_active() {
                trace!(kind = event.kind(), "skipping inactive listener");
                continue;
            }
            notify(listener.as_ref(), event);
            delivered += 1;
        }
        delivered
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn notify(listener: &dyn AdEventListener, event: &Event) {
    match event {
        Event::SdkInitialized { configuration } => listener.on_sdk_initialized(configuration),
        Event::CmpCompleted { error } => listener.on_cmp_completed(error.as_ref()),
        Event::Ad { topic, info } => listener.on_ad_event(*topic, info),
        Event::AdFailed { topic, info, error } => listener.on_ad_failed(*topic, info, error),
        Event::RewardReceived { info, reward } => listener.on_reward(info, reward),
    }
}

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Id assigned on the stream bus.
    pub event_id: EventId,
    /// Delegate handlers invoked.
    pub delegate_calls: usize,
    /// Listener objects notified.
    pub listener_calls: usize,
}

/// Owner of every delivery path.
#[derive(Debug, Default)]
pub struct Broadcaster {
    delegates: Delegates,
    listeners: ListenerRegistry,
    bus: EventBus,
}

impl Broadcaster {
    /// Broadcaster with a default-sized stream bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcaster publishing onto an existing bus.
    #[must_use]
    pub fn with_bus(bus: EventBus) -> Self {
        Self {
            delegates: Delegates::new(),
            listeners: ListenerRegistry::new(),
            bus,
        }
    }

    /// Closure subscriptions.
    pub fn delegates_mut(&mut self) -> &mut Delegates {
        &mut self.delegates
    }

    /// Listener registrations.
    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    /// Stream bus; clone it to hand out to async consumers.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Shorthand for `bus().subscribe()`.
    #[must_use]
    pub fn subscribe_stream(&self) -> EventStream {
        self.bus.subscribe()
    }

    /// Deliver to delegates, then listeners, then the stream bus.
    pub fn broadcast(&mut self, event: Event) -> Delivery {
        let delegate_calls = self.delegates.deliver(&event);
        let listener_calls = self.listeners.deliver(&event);
        let kind = event.kind();
        let event_id = self.bus.publish(event);
        debug!(
            kind,
            event_id, delegate_calls, listener_calls, "broadcast MAX event"
        );
        Delivery {
            event_id,
            delegate_calls,
            listener_calls,
        }
    }
}
