use std::sync::Arc;

use maxbridge_events::{WireFormat, main_thread_channel};
use maxbridge_sdk::{MaxSdk, SdkError, SimulatedPlugin, install_plugin, is_installed};
use maxbridge_test_support::recorder::RecordingListener;

// One test per binary: the handle is process-wide.
#[test]
fn first_install_wins_and_drives_global_handle() {
    assert!(!is_installed());

    let (sender, mut dispatcher) = main_thread_channel(16, None);
    let listener = RecordingListener::new();
    dispatcher.broadcaster_mut().listeners_mut().register(&listener);

    let plugin = Arc::new(SimulatedPlugin::new(sender.clone(), WireFormat::Json));
    install_plugin(plugin.clone()).expect("first install");
    assert!(is_installed());

    let second = Arc::new(SimulatedPlugin::new(sender, WireFormat::Json));
    assert_eq!(install_plugin(second), Err(SdkError::PluginAlreadyInstalled));

    let sdk = MaxSdk::global();
    sdk.initialize("sdk-key");
    sdk.load_interstitial("int");
    assert!(sdk.is_interstitial_ready("int"));
    assert!(sdk.is_initialized());

    dispatcher.pump();
    assert_eq!(
        listener.event_names(),
        vec!["OnSdkInitializedEvent", "OnInterstitialAdLoadedEvent"]
    );
    assert_eq!(plugin.calls().len(), 2);
}
