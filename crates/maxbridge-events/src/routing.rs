//! Turns `(event name, payload)` pairs into typed [`Event`] values.

use tracing::{trace, warn};

use crate::payloads::{AdError, AdInfo, AdReward, CmpError, Event, SdkConfiguration};
use crate::topics::{AdLifecycle, AdTopic, EventName};
use crate::wire::{self, Payload, WireFormat};

/// Route a decoded payload. Unknown names are logged and yield `None`.
#[must_use]
pub fn route(name: &str, payload: &Payload) -> Option<Event> {
    let Some(parsed) = EventName::parse(name) else {
        warn!(event_name = name, "unknown MAX event fired");
        return None;
    };
    let event = build_event(parsed, payload);
    trace!(event_name = name, kind = event.kind(), "routed MAX event");
    Some(event)
}

/// Decode `raw` and route it. `None` as the format sniffs the encoding.
#[must_use]
pub fn route_raw(name: &str, raw: &str, format: Option<WireFormat>) -> Option<Event> {
    let payload = match format {
        Some(format) => wire::decode(raw, format),
        None => wire::decode_auto(raw),
    };
    route(name, &payload)
}

/// Build the event for an already parsed name.
#[must_use]
pub fn build_event(name: EventName, payload: &Payload) -> Event {
    match name {
        EventName::SdkInitialized => Event::SdkInitialized {
            configuration: SdkConfiguration::from_payload(payload),
        },
        EventName::CmpCompleted => Event::CmpCompleted {
            error: CmpError::from_payload(payload),
        },
        EventName::Ad(topic) => build_ad_event(topic, payload),
    }
}

fn build_ad_event(topic: AdTopic, payload: &Payload) -> Event {
    let info = AdInfo::from_payload(payload);
    match topic.lifecycle() {
        AdLifecycle::LoadFailed | AdLifecycle::DisplayFailed => Event::AdFailed {
            topic,
            info,
            error: AdError::from_payload(payload),
        },
        AdLifecycle::ReceivedReward => Event::RewardReceived {
            info,
            reward: AdReward::from_payload(payload),
        },
        _ => Event::Ad { topic, info },
    }
}
