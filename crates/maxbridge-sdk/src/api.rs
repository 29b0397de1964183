//! Engine-facing facade over a [`NativePlugin`].
//!
//! Each method converts its arguments to the native form and forwards to the
//! plugin. Ad-unit calls with an empty identifier are logged as user errors
//! and forwarded anyway; the native SDK rejects them on its own.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use maxbridge_events::{AdFormat, ConsentFlowUserGeography, Payload, WireFormat};
use tracing::{debug, error};

use crate::native::NativePlugin;
use crate::types::{AdViewPosition, Color};

/// Version reported to the native SDK on initialization.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handle to the native SDK.
#[derive(Clone)]
pub struct MaxSdk {
    plugin: Arc<dyn NativePlugin>,
    wire_format: WireFormat,
}

impl fmt::Debug for MaxSdk {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MaxSdk")
            .field("wire_format", &self.wire_format)
            .finish_non_exhaustive()
    }
}

/// Log a user error when `ad_unit_identifier` is empty. The call still proceeds.
pub fn validate_ad_unit_identifier(ad_unit_identifier: &str, purpose: &str) -> bool {
    if ad_unit_identifier.is_empty() {
        error!("No MAX Ads Ad Unit ID specified for: {purpose}");
        return false;
    }
    true
}

impl MaxSdk {
    /// Facade over `plugin`, encoding event parameters as JSON.
    #[must_use]
    pub fn new(plugin: Arc<dyn NativePlugin>) -> Self {
        Self {
            plugin,
            wire_format: WireFormat::Json,
        }
    }

    /// Use `wire_format` for [`MaxSdk::track_event`] parameters.
    #[must_use]
    pub const fn with_wire_format(mut self, wire_format: WireFormat) -> Self {
        self.wire_format = wire_format;
        self
    }

    /// Wire format used for event parameters.
    #[must_use]
    pub const fn wire_format(&self) -> WireFormat {
        self.wire_format
    }

    // Initialization

    /// Initialize the SDK with `sdk_key`.
    pub fn initialize(&self, sdk_key: &str) {
        if sdk_key.is_empty() {
            error!("No MAX SDK key specified");
        }
        debug!(plugin_version = PLUGIN_VERSION, "initializing MAX SDK");
        self.plugin.initialize(PLUGIN_VERSION, sdk_key);
    }

    /// Whether the SDK finished initializing.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.plugin.is_initialized()
    }

    // Privacy

    /// Record user consent.
    pub fn set_has_user_consent(&self, has_user_consent: bool) {
        self.plugin.set_has_user_consent(has_user_consent);
    }

    /// Recorded user consent.
    #[must_use]
    pub fn has_user_consent(&self) -> bool {
        self.plugin.has_user_consent()
    }

    /// Mark the user as age restricted.
    pub fn set_is_age_restricted_user(&self, is_age_restricted_user: bool) {
        self.plugin.set_is_age_restricted_user(is_age_restricted_user);
    }

    /// Whether the user is age restricted.
    #[must_use]
    pub fn is_age_restricted_user(&self) -> bool {
        self.plugin.is_age_restricted_user()
    }

    /// Record the do-not-sell choice.
    pub fn set_do_not_sell(&self, do_not_sell: bool) {
        self.plugin.set_do_not_sell(do_not_sell);
    }

    /// Recorded do-not-sell choice.
    #[must_use]
    pub fn is_do_not_sell(&self) -> bool {
        self.plugin.is_do_not_sell()
    }

    // Terms and privacy policy flow

    /// Enable the terms and privacy policy flow.
    pub fn set_terms_and_privacy_policy_flow_enabled(&self, enabled: bool) {
        self.plugin.set_terms_and_privacy_policy_flow_enabled(enabled);
    }

    /// Privacy policy URL for the flow.
    pub fn set_privacy_policy_url(&self, url: &str) {
        self.plugin.set_privacy_policy_url(url);
    }

    /// Terms of service URL for the flow.
    pub fn set_terms_of_service_url(&self, url: &str) {
        self.plugin.set_terms_of_service_url(url);
    }

    /// Force the consent flow geography, for testing.
    pub fn set_consent_flow_debug_user_geography(&self, geography: ConsentFlowUserGeography) {
        self.plugin
            .set_consent_flow_debug_user_geography(geography.native_name());
    }

    /// Show the CMP flow to an existing user.
    pub fn show_cmp_for_existing_user(&self) {
        self.plugin.show_cmp_for_existing_user();
    }

    /// Whether a supported CMP is integrated.
    #[must_use]
    pub fn has_supported_cmp(&self) -> bool {
        self.plugin.has_supported_cmp()
    }

    // General

    /// Whether the device is a tablet.
    #[must_use]
    pub fn is_tablet(&self) -> bool {
        self.plugin.is_tablet()
    }

    /// Open the mediation debugger.
    pub fn show_mediation_debugger(&self) {
        self.plugin.show_mediation_debugger();
    }

    /// Set the internal user id.
    pub fn set_user_id(&self, user_id: &str) {
        self.plugin.set_user_id(user_id);
    }

    /// Mute ad audio.
    pub fn set_muted(&self, muted: bool) {
        self.plugin.set_muted(muted);
    }

    /// Whether ad audio is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.plugin.is_muted()
    }

    /// Toggle verbose SDK logging.
    pub fn set_verbose_logging_enabled(&self, enabled: bool) {
        self.plugin.set_verbose_logging_enabled(enabled);
    }

    /// Whether verbose SDK logging is on.
    #[must_use]
    pub fn is_verbose_logging_enabled(&self) -> bool {
        self.plugin.is_verbose_logging_enabled()
    }

    /// Toggle the creative debugger.
    pub fn set_creative_debugger_enabled(&self, enabled: bool) {
        self.plugin.set_creative_debugger_enabled(enabled);
    }

    /// Devices that receive test ads.
    pub fn set_test_device_advertising_identifiers(&self, identifiers: &[String]) {
        self.plugin
            .set_test_device_advertising_identifiers(identifiers);
    }

    // Event tracking

    /// Track an analytics event without parameters.
    pub fn track_event(&self, name: &str) {
        self.track_event_with_parameters(name, &BTreeMap::new());
    }

    /// Track an analytics event; parameters are encoded with the configured wire format.
    pub fn track_event_with_parameters(&self, name: &str, parameters: &BTreeMap<String, String>) {
        let encoded = parameters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect::<Payload>()
            .encode(self.wire_format);
        self.plugin.track_event(name, &encoded);
    }

    // Banners

    /// Create a banner at `position`.
    pub fn create_banner(&self, ad_unit_identifier: &str, position: AdViewPosition) {
        validate_ad_unit_identifier(ad_unit_identifier, "create banner");
        self.plugin
            .create_ad_view(AdFormat::Banner, ad_unit_identifier, position.as_str());
    }

    /// Banner background color.
    pub fn set_banner_background_color(&self, ad_unit_identifier: &str, color: Color) {
        validate_ad_unit_identifier(ad_unit_identifier, "set banner background color");
        self.plugin
            .set_banner_background_color(ad_unit_identifier, &color.to_hex());
    }

    /// Banner placement label.
    pub fn set_banner_placement(&self, ad_unit_identifier: &str, placement: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "set banner placement");
        self.plugin
            .set_ad_view_placement(AdFormat::Banner, ad_unit_identifier, placement);
    }

    /// Banner extra parameter.
    pub fn set_banner_extra_parameter(&self, ad_unit_identifier: &str, key: &str, value: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "set banner extra parameter");
        self.plugin
            .set_extra_parameter(AdFormat::Banner, ad_unit_identifier, key, value);
    }

    /// Move a banner.
    pub fn update_banner_position(&self, ad_unit_identifier: &str, position: AdViewPosition) {
        validate_ad_unit_identifier(ad_unit_identifier, "update banner position");
        self.plugin
            .update_ad_view_position(AdFormat::Banner, ad_unit_identifier, position.as_str());
    }

    /// Show a banner.
    pub fn show_banner(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "show banner");
        self.plugin.show_ad_view(AdFormat::Banner, ad_unit_identifier);
    }

    /// Hide a banner.
    pub fn hide_banner(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "hide banner");
        self.plugin.hide_ad_view(AdFormat::Banner, ad_unit_identifier);
    }

    /// Destroy a banner.
    pub fn destroy_banner(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "destroy banner");
        self.plugin
            .destroy_ad_view(AdFormat::Banner, ad_unit_identifier);
    }

    // MRECs

    /// Create an MREC at `position`.
    pub fn create_mrec(&self, ad_unit_identifier: &str, position: AdViewPosition) {
        validate_ad_unit_identifier(ad_unit_identifier, "create MREC");
        self.plugin
            .create_ad_view(AdFormat::MRec, ad_unit_identifier, position.as_str());
    }

    /// MREC placement label.
    pub fn set_mrec_placement(&self, ad_unit_identifier: &str, placement: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "set MREC placement");
        self.plugin
            .set_ad_view_placement(AdFormat::MRec, ad_unit_identifier, placement);
    }

    /// MREC extra parameter.
    pub fn set_mrec_extra_parameter(&self, ad_unit_identifier: &str, key: &str, value: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "set MREC extra parameter");
        self.plugin
            .set_extra_parameter(AdFormat::MRec, ad_unit_identifier, key, value);
    }

    /// Move an MREC.
    pub fn update_mrec_position(&self, ad_unit_identifier: &str, position: AdViewPosition) {
        validate_ad_unit_identifier(ad_unit_identifier, "update MREC position");
        self.plugin
            .update_ad_view_position(AdFormat::MRec, ad_unit_identifier, position.as_str());
    }

    /// Show an MREC.
    pub fn show_mrec(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "show MREC");
        self.plugin.show_ad_view(AdFormat::MRec, ad_unit_identifier);
    }

    /// Hide an MREC.
    pub fn hide_mrec(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "hide MREC");
        self.plugin.hide_ad_view(AdFormat::MRec, ad_unit_identifier);
    }

    /// Destroy an MREC.
    pub fn destroy_mrec(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "destroy MREC");
        self.plugin.destroy_ad_view(AdFormat::MRec, ad_unit_identifier);
    }

    // Interstitials

    /// Load an interstitial.
    pub fn load_interstitial(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "load interstitial");
        self.plugin
            .load_fullscreen_ad(AdFormat::Interstitial, ad_unit_identifier);
    }

    /// Whether an interstitial is ready to show.
    #[must_use]
    pub fn is_interstitial_ready(&self, ad_unit_identifier: &str) -> bool {
        validate_ad_unit_identifier(ad_unit_identifier, "check interstitial loaded");
        self.plugin
            .is_fullscreen_ad_ready(AdFormat::Interstitial, ad_unit_identifier)
    }

    /// Show an interstitial without a placement.
    pub fn show_interstitial(&self, ad_unit_identifier: &str) {
        self.show_interstitial_with_placement(ad_unit_identifier, "");
    }

    /// Show an interstitial under `placement`.
    pub fn show_interstitial_with_placement(&self, ad_unit_identifier: &str, placement: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "show interstitial");
        self.plugin
            .show_fullscreen_ad(AdFormat::Interstitial, ad_unit_identifier, placement);
    }

    /// Interstitial extra parameter.
    pub fn set_interstitial_extra_parameter(&self, ad_unit_identifier: &str, key: &str, value: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "set interstitial extra parameter");
        self.plugin
            .set_extra_parameter(AdFormat::Interstitial, ad_unit_identifier, key, value);
    }

    // Rewarded

    /// Load a rewarded ad.
    pub fn load_rewarded_ad(&self, ad_unit_identifier: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "load rewarded ad");
        self.plugin
            .load_fullscreen_ad(AdFormat::Rewarded, ad_unit_identifier);
    }

    /// Whether a rewarded ad is ready to show.
    #[must_use]
    pub fn is_rewarded_ad_ready(&self, ad_unit_identifier: &str) -> bool {
        validate_ad_unit_identifier(ad_unit_identifier, "check rewarded ad loaded");
        self.plugin
            .is_fullscreen_ad_ready(AdFormat::Rewarded, ad_unit_identifier)
    }

    /// Show a rewarded ad without a placement.
    pub fn show_rewarded_ad(&self, ad_unit_identifier: &str) {
        self.show_rewarded_ad_with_placement(ad_unit_identifier, "");
    }

    /// Show a rewarded ad under `placement`.
    pub fn show_rewarded_ad_with_placement(&self, ad_unit_identifier: &str, placement: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "show rewarded ad");
        self.plugin
            .show_fullscreen_ad(AdFormat::Rewarded, ad_unit_identifier, placement);
    }

    /// Rewarded ad extra parameter.
    pub fn set_rewarded_ad_extra_parameter(&self, ad_unit_identifier: &str, key: &str, value: &str) {
        validate_ad_unit_identifier(ad_unit_identifier, "set rewarded ad extra parameter");
        self.plugin
            .set_extra_parameter(AdFormat::Rewarded, ad_unit_identifier, key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxbridge_test_support::logs::capture_logs;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CallLog {
        calls: Mutex<Vec<String>>,
    }

    impl CallLog {
        fn push(&self, call: String) {
            self.calls.lock().expect("lock").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl NativePlugin for CallLog {
        fn initialize(&self, plugin_version: &str, sdk_key: &str) {
            self.push(format!("initialize {plugin_version} {sdk_key}"));
        }

        fn set_consent_flow_debug_user_geography(&self, geography: &str) {
            self.push(format!("geography {geography}"));
        }

        fn track_event(&self, name: &str, parameters: &str) {
            self.push(format!("track {name} {parameters}"));
        }

        fn create_ad_view(&self, format: AdFormat, ad_unit_identifier: &str, position: &str) {
            self.push(format!("create {} {ad_unit_identifier} {position}", format.label()));
        }

        fn set_banner_background_color(&self, ad_unit_identifier: &str, hex_color_code: &str) {
            self.push(format!("color {ad_unit_identifier} {hex_color_code}"));
        }

        fn show_fullscreen_ad(&self, format: AdFormat, ad_unit_identifier: &str, placement: &str) {
            self.push(format!("show {} {ad_unit_identifier} [{placement}]", format.label()));
        }
    }

    fn sdk() -> (Arc<CallLog>, MaxSdk) {
        let log = Arc::new(CallLog::default());
        let sdk = MaxSdk::new(log.clone());
        (log, sdk)
    }

    #[test]
    fn initialize_passes_crate_version() {
        let (log, sdk) = sdk();
        sdk.initialize("key");
        assert_eq!(log.calls(), vec![format!("initialize {PLUGIN_VERSION} key")]);
    }

    #[test]
    fn arguments_are_converted_to_native_form() {
        let (log, sdk) = sdk();
        sdk.create_mrec("m", AdViewPosition::CenterLeft);
        sdk.set_banner_background_color("b", Color::rgb(0x10, 0x20, 0x30));
        sdk.set_consent_flow_debug_user_geography(ConsentFlowUserGeography::Gdpr);
        sdk.show_rewarded_ad("r");
        assert_eq!(
            log.calls(),
            vec![
                "create mrec m center_left",
                "color b #FF102030",
                "geography GDPR",
                "show rewarded r []",
            ]
        );
    }

    #[test]
    fn empty_ad_unit_is_reported_but_forwarded() {
        assert!(!validate_ad_unit_identifier("", "show banner"));
        assert!(validate_ad_unit_identifier("abc", "show banner"));

        let (log, sdk) = sdk();
        sdk.create_banner("", AdViewPosition::TopCenter);
        sdk.show_interstitial_with_placement("", "level_end");
        assert_eq!(
            log.calls(),
            vec!["create banner  top_center", "show interstitial  [level_end]"]
        );
    }

    #[test]
    fn empty_ad_unit_logs_an_error_naming_the_call() {
        let (log, sdk) = sdk();
        let ((), logs) = capture_logs(|| sdk.show_interstitial_with_placement("", "level_end"));
        assert!(logs.contains("ERROR"), "{logs}");
        assert!(
            logs.contains("No MAX Ads Ad Unit ID specified for: show interstitial"),
            "{logs}"
        );
        assert_eq!(log.calls(), vec!["show interstitial  [level_end]"]);

        let (valid, logs) = capture_logs(|| validate_ad_unit_identifier("abc", "show banner"));
        assert!(valid);
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn track_event_encodes_parameters_with_wire_format() {
        let (log, sdk) = sdk();
        let delimited = sdk.clone().with_wire_format(WireFormat::Delimited);
        let parameters = BTreeMap::from([("level".to_string(), "3".to_string())]);

        sdk.track_event_with_parameters("level_up", &parameters);
        delimited.track_event_with_parameters("level_up", &parameters);
        sdk.track_event("opened");

        assert_eq!(
            log.calls(),
            vec![
                r#"track level_up {"level":"3"}"#.to_string(),
                "track level_up level\u{1C}3\u{1D}".to_string(),
                "track opened {}".to_string(),
            ]
        );
    }
}
