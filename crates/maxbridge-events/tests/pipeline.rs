use std::sync::{Arc, Mutex};

use maxbridge_events::{
    AdTopic, ConsentFlowUserGeography, WireFormat, main_thread_channel, route,
};
use maxbridge_test_support::fixtures::{
    BANNER_AD_UNIT, REWARDED_AD_UNIT, banner_loaded_payload, reward_payload,
    rewarded_load_failed_payload, sdk_initialized_payload,
};
use maxbridge_test_support::recorder::{Recorded, RecordingListener};
use tokio_stream::StreamExt;

#[test]
fn native_events_reach_listeners_in_order() {
    let (sender, mut dispatcher) = main_thread_channel(16, None);
    let listener = RecordingListener::new();
    dispatcher.broadcaster_mut().listeners_mut().register(&listener);

    sender.forward_event(
        "OnSdkInitializedEvent",
        &sdk_initialized_payload().encode(WireFormat::Json),
    );
    sender.forward_event(
        "OnBannerAdLoadedEvent",
        &banner_loaded_payload().encode(WireFormat::Delimited),
    );
    sender.forward_event("OnBogusEvent", "");
    sender.forward_event(
        "OnRewardedAdLoadFailedEvent",
        &rewarded_load_failed_payload().encode(WireFormat::Json),
    );
    sender.forward_event(
        "OnRewardedAdReceivedRewardEvent",
        &reward_payload("coins", 5).encode(WireFormat::Delimited),
    );

    assert_eq!(dispatcher.pump(), 4);
    assert_eq!(
        listener.event_names(),
        vec![
            "OnSdkInitializedEvent",
            "OnBannerAdLoadedEvent",
            "OnRewardedAdLoadFailedEvent",
            "OnRewardedAdReceivedRewardEvent",
        ]
    );

    let recorded = listener.recorded();
    match &recorded[0] {
        Recorded::SdkInitialized(configuration) => {
            assert_eq!(
                configuration.consent_flow_user_geography,
                ConsentFlowUserGeography::Gdpr
            );
            assert!(configuration.is_tablet);
        }
        other => panic!("unexpected record: {other:?}"),
    }
    match &recorded[1] {
        Recorded::Ad(topic, info) => {
            assert_eq!(*topic, AdTopic::BANNER_LOADED);
            assert_eq!(info.ad_unit_identifier, BANNER_AD_UNIT);
            assert!((info.revenue - 0.05).abs() < f64::EPSILON);
        }
        other => panic!("unexpected record: {other:?}"),
    }
    match &recorded[2] {
        Recorded::AdFailed(topic, info, error) => {
            assert_eq!(*topic, AdTopic::REWARDED_LOAD_FAILED);
            assert_eq!(info.ad_unit_identifier, REWARDED_AD_UNIT);
            assert_eq!(error.code, 204);
            assert_eq!(error.message, "no fill");
        }
        other => panic!("unexpected record: {other:?}"),
    }
    match &recorded[3] {
        Recorded::Reward(_, reward) => assert!(reward.is_valid()),
        other => panic!("unexpected record: {other:?}"),
    }
}

#[test]
fn failure_does_not_trigger_loaded_delegates() {
    let (sender, mut dispatcher) = main_thread_channel(4, Some(WireFormat::Delimited));
    let hits = Arc::new(Mutex::new(Vec::new()));

    let delegates = dispatcher.broadcaster_mut().delegates_mut();
    let loaded = Arc::clone(&hits);
    delegates
        .on_ad(AdTopic::REWARDED_LOADED, move |_| {
            loaded.lock().expect("lock").push("loaded");
        })
        .expect("subscribe loaded");
    let failed = Arc::clone(&hits);
    delegates
        .on_ad_failed(AdTopic::REWARDED_LOAD_FAILED, move |_, error| {
            assert_eq!(error.code, 204);
            failed.lock().expect("lock").push("failed");
        })
        .expect("subscribe failed");

    sender.forward_event(
        "OnRewardedAdLoadFailedEvent",
        &rewarded_load_failed_payload().encode(WireFormat::Delimited),
    );
    dispatcher.pump();

    assert_eq!(*hits.lock().expect("lock"), vec!["failed"]);
}

#[test]
fn dropped_listener_is_not_called() {
    let (sender, mut dispatcher) = main_thread_channel(4, None);
    let kept = RecordingListener::new();
    let dropped = RecordingListener::new();
    dispatcher.broadcaster_mut().listeners_mut().register(&kept);
    dispatcher.broadcaster_mut().listeners_mut().register(&dropped);
    drop(dropped);

    sender.forward_event("OnCmpCompletedEvent", "");
    dispatcher.pump();

    assert_eq!(kept.recorded(), vec![Recorded::CmpCompleted(None)]);
    assert_eq!(dispatcher.broadcaster_mut().listeners_mut().len(), 1);
}

#[test]
fn unknown_name_routes_to_nothing() {
    assert!(route("OnBogusEvent", &banner_loaded_payload()).is_none());
}

#[tokio::test]
async fn stream_subscribers_see_native_events() {
    let (sender, mut dispatcher) = main_thread_channel(4, None);
    let mut stream = dispatcher.broadcaster().subscribe_stream();

    let native = sender.clone();
    tokio::task::spawn_blocking(move || {
        native.forward_event(
            "OnBannerAdRevenuePaidEvent",
            &banner_loaded_payload().encode(WireFormat::Json),
        );
    })
    .await
    .expect("native callback");
    drop(sender);

    assert_eq!(dispatcher.run().await, 1);
    let envelope = stream.next().await.expect("item").expect("envelope");
    assert_eq!(envelope.id, 1);
    assert_eq!(envelope.event.kind(), "OnBannerAdRevenuePaidEvent");
}
