//! Seam between the facade and a platform SDK binding.
//!
//! Arguments arrive already converted to their native string form. Bindings
//! report results back only through events sent to a
//! [`NativeEventSender`](maxbridge_events::NativeEventSender).

use maxbridge_events::AdFormat;

/// Calls the facade makes into a native SDK plugin.
///
/// Every method has a no-op default so bindings only implement what their
/// platform supports; getters default to `false`.
#[allow(unused_variables)]
pub trait NativePlugin: Send + Sync {
    /// Start SDK initialization; completion arrives as `OnSdkInitializedEvent`.
    fn initialize(&self, plugin_version: &str, sdk_key: &str) {}

    /// Whether initialization finished.
    fn is_initialized(&self) -> bool {
        false
    }

    /// Record the user's consent choice.
    fn set_has_user_consent(&self, has_user_consent: bool) {}

    /// Recorded consent choice.
    fn has_user_consent(&self) -> bool {
        false
    }

    /// Mark the user as age restricted.
    fn set_is_age_restricted_user(&self, is_age_restricted_user: bool) {}

    /// Whether the user is age restricted.
    fn is_age_restricted_user(&self) -> bool {
        false
    }

    /// Record the do-not-sell choice.
    fn set_do_not_sell(&self, do_not_sell: bool) {}

    /// Recorded do-not-sell choice.
    fn is_do_not_sell(&self) -> bool {
        false
    }

    /// Enable the built-in terms and privacy policy flow.
    fn set_terms_and_privacy_policy_flow_enabled(&self, enabled: bool) {}

    /// Privacy policy shown by the flow.
    fn set_privacy_policy_url(&self, url: &str) {}

    /// Terms of service shown by the flow.
    fn set_terms_of_service_url(&self, url: &str) {}

    /// Force a geography for testing the consent flow (`UNKNOWN`, `GDPR`, `OTHER`).
    fn set_consent_flow_debug_user_geography(&self, geography: &str) {}

    /// Show the CMP flow; completion arrives as `OnCmpCompletedEvent`.
    fn show_cmp_for_existing_user(&self) {}

    /// Whether a supported CMP is integrated.
    fn has_supported_cmp(&self) -> bool {
        false
    }

    /// Whether the device is a tablet.
    fn is_tablet(&self) -> bool {
        false
    }

    /// Open the mediation debugger.
    fn show_mediation_debugger(&self) {}

    /// Internal user id used for server-side callbacks.
    fn set_user_id(&self, user_id: &str) {}

    /// Mute ad audio.
    fn set_muted(&self, muted: bool) {}

    /// Whether ad audio is muted.
    fn is_muted(&self) -> bool {
        false
    }

    /// Toggle verbose SDK logging.
    fn set_verbose_logging_enabled(&self, enabled: bool) {}

    /// Whether verbose SDK logging is on.
    fn is_verbose_logging_enabled(&self) -> bool {
        false
    }

    /// Toggle the creative debugger.
    fn set_creative_debugger_enabled(&self, enabled: bool) {}

    /// Devices that should receive test ads.
    fn set_test_device_advertising_identifiers(&self, identifiers: &[String]) {}

    /// Track an analytics event; `parameters` is an encoded payload.
    fn track_event(&self, name: &str, parameters: &str) {}

    /// Create a banner or MREC at `position`.
    fn create_ad_view(&self, format: AdFormat, ad_unit_identifier: &str, position: &str) {}

    /// Banner background color as `#AARRGGBB`.
    fn set_banner_background_color(&self, ad_unit_identifier: &str, hex_color_code: &str) {}

    /// Placement label for an ad view.
    fn set_ad_view_placement(&self, format: AdFormat, ad_unit_identifier: &str, placement: &str) {}

    /// Move an ad view.
    fn update_ad_view_position(&self, format: AdFormat, ad_unit_identifier: &str, position: &str) {}

    /// Show an ad view.
    fn show_ad_view(&self, format: AdFormat, ad_unit_identifier: &str) {}

    /// Hide an ad view.
    fn hide_ad_view(&self, format: AdFormat, ad_unit_identifier: &str) {}

    /// Destroy an ad view.
    fn destroy_ad_view(&self, format: AdFormat, ad_unit_identifier: &str) {}

    /// Load an interstitial or rewarded ad.
    fn load_fullscreen_ad(&self, format: AdFormat, ad_unit_identifier: &str) {}

    /// Whether an interstitial or rewarded ad is ready to show.
    fn is_fullscreen_ad_ready(&self, format: AdFormat, ad_unit_identifier: &str) -> bool {
        false
    }

    /// Show a loaded interstitial or rewarded ad.
    fn show_fullscreen_ad(&self, format: AdFormat, ad_unit_identifier: &str, placement: &str) {}

    /// Per-ad-unit extra parameter for any format.
    fn set_extra_parameter(
        &self,
        format: AdFormat,
        ad_unit_identifier: &str,
        key: &str,
        value: &str,
    ) {
    }
}

/// Plugin for platforms without a native SDK: getters report `false` and
/// actions do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPlugin;

impl NativePlugin for HeadlessPlugin {}
