//! Listener that records everything it receives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use maxbridge_events::{
    AdError, AdEventListener, AdInfo, AdReward, AdTopic, CmpError, SdkConfiguration,
};

/// One observed callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    /// `on_sdk_initialized`.
    SdkInitialized(SdkConfiguration),
    /// `on_cmp_completed`.
    CmpCompleted(Option<CmpError>),
    /// `on_ad_event`.
    Ad(AdTopic, AdInfo),
    /// `on_ad_failed`.
    AdFailed(AdTopic, AdInfo, AdError),
    /// `on_reward`.
    Reward(AdInfo, AdReward),
}

impl Recorded {
    /// Canonical event name of the callback.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SdkInitialized(_) => "OnSdkInitializedEvent",
            Self::CmpCompleted(_) => "OnCmpCompletedEvent",
            Self::Ad(topic, _) | Self::AdFailed(topic, _, _) => topic.event_name(),
            Self::Reward(_, _) => AdTopic::REWARDED_RECEIVED_REWARD.event_name(),
        }
    }
}

/// [`AdEventListener`] that stores every callback in order.
#[derive(Debug)]
pub struct RecordingListener {
    active: AtomicBool,
    seen: Mutex<Vec<Recorded>>,
}

impl RecordingListener {
    /// New active listener, already wrapped for registration.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active: AtomicBool::new(true),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Toggle whether the listener reports itself as active.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Snapshot of recorded callbacks.
    #[must_use]
    pub fn recorded(&self) -> Vec<Recorded> {
        self.lock().clone()
    }

    /// Event names of recorded callbacks, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.lock().iter().map(Recorded::event_name).collect()
    }

    fn push(&self, entry: Recorded) {
        self.lock().push(entry);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Recorded>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AdEventListener for RecordingListener {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn on_sdk_initialized(&self, configuration: &SdkConfiguration) {
        self.push(Recorded::SdkInitialized(configuration.clone()));
    }

    fn on_cmp_completed(&self, error: Option<&CmpError>) {
        self.push(Recorded::CmpCompleted(error.cloned()));
    }

    fn on_ad_event(&self, topic: AdTopic, info: &AdInfo) {
        self.push(Recorded::Ad(topic, info.clone()));
    }

    fn on_ad_failed(&self, topic: AdTopic, info: &AdInfo, error: &AdError) {
        self.push(Recorded::AdFailed(topic, info.clone(), error.clone()));
    }

    fn on_reward(&self, info: &AdInfo, reward: &AdReward) {
        self.push(Recorded::Reward(info.clone(), reward.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_callbacks_in_order() {
        let listener = RecordingListener::new();
        let info = AdInfo {
            ad_unit_identifier: "abc".into(),
            network_name: String::new(),
            creative_identifier: String::new(),
            placement: String::new(),
            revenue: AdInfo::UNKNOWN_REVENUE,
        };
        listener.on_ad_event(AdTopic::BANNER_LOADED, &info);
        listener.on_cmp_completed(None);

        assert_eq!(
            listener.event_names(),
            vec!["OnBannerAdLoadedEvent", "OnCmpCompletedEvent"]
        );
        assert!(listener.is_active());
        listener.set_active(false);
        assert!(!listener.is_active());
    }
}
