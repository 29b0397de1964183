//! In-process stand-in for a native SDK plugin.
//!
//! Every call is recorded, and the SDK callbacks a real plugin would fire are
//! encoded and pushed through a [`NativeEventSender`], so the full event path
//! runs without a device.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use maxbridge_events::{
    AdFormat, AdLifecycle, AdTopic, ConsentFlowUserGeography, NativeEventSender, Payload,
    WireFormat,
};
use tracing::{debug, info};

use crate::native::NativePlugin;
use crate::types::parse_geography;

/// Error code reported for simulated load failures.
pub const NO_FILL_ERROR_CODE: i32 = 204;
/// Error code reported when showing an ad that is not ready.
pub const DISPLAY_FAILED_ERROR_CODE: i32 = -4205;
/// Calls kept by [`SimulatedPlugin::calls`]; older ones are dropped.
pub const MAX_RECORDED_CALLS: usize = 256;

const NETWORK_NAME: &str = "AppLovin";

#[derive(Debug, Default)]
struct State {
    initialized: bool,
    has_user_consent: bool,
    is_age_restricted_user: bool,
    is_do_not_sell: bool,
    muted: bool,
    verbose_logging: bool,
    debug_geography: Option<ConsentFlowUserGeography>,
    ready: HashSet<(AdFormat, String)>,
    placements: HashMap<(AdFormat, String), String>,
    calls: VecDeque<String>,
}

/// Simulated native plugin emitting SDK callbacks as wire-encoded events.
#[derive(Debug)]
pub struct SimulatedPlugin {
    sender: NativeEventSender,
    format: WireFormat,
    failing_units: BTreeSet<String>,
    reward_label: String,
    reward_amount: i32,
    revenue: f64,
    state: Mutex<State>,
}

impl SimulatedPlugin {
    /// Plugin sending events through `sender`, encoded with `format`.
    #[must_use]
    pub fn new(sender: NativeEventSender, format: WireFormat) -> Self {
        Self {
            sender,
            format,
            failing_units: BTreeSet::new(),
            reward_label: "coins".to_string(),
            reward_amount: 10,
            revenue: 0.01,
            state: Mutex::new(State::default()),
        }
    }

    /// Make loads for `ad_unit_identifier` fail with no fill.
    #[must_use]
    pub fn with_failing_ad_unit(mut self, ad_unit_identifier: impl Into<String>) -> Self {
        self.failing_units.insert(ad_unit_identifier.into());
        self
    }

    /// Reward granted by rewarded ads.
    #[must_use]
    pub fn with_reward(mut self, label: impl Into<String>, amount: i32) -> Self {
        self.reward_label = label.into();
        self.reward_amount = amount;
        self
    }

    /// Revenue reported per impression.
    #[must_use]
    pub const fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }

    /// Most recent calls received, oldest first, at most
    /// [`MAX_RECORDED_CALLS`] of them.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) -> MutexGuard<'_, State> {
        let mut state = self.lock();
        if state.calls.len() == MAX_RECORDED_CALLS {
            state.calls.pop_front();
        }
        state.calls.push_back(call);
        state
    }

    fn emit(&self, name: &str, payload: &Payload) {
        debug!(event_name = name, "simulated plugin firing event");
        self.sender.forward_event(name, &payload.encode(self.format));
    }

    fn emit_ad(&self, format: AdFormat, lifecycle: AdLifecycle, payload: &Payload) {
        if let Some(topic) = AdTopic::new(format, lifecycle) {
            self.emit(topic.event_name(), payload);
        }
    }

    fn ad_payload(ad_unit_identifier: &str, placement: &str, revenue: Option<f64>) -> Payload {
        let mut payload = Payload::from_iter([
            ("adUnitId", ad_unit_identifier),
            ("networkName", NETWORK_NAME),
            ("placement", placement),
        ]);
        payload.insert_if_absent("creativeId", format!("sim-{ad_unit_identifier}"));
        if let Some(revenue) = revenue {
            payload.insert_if_absent("revenue", revenue.to_string());
        }
        payload
    }

    fn error_payload(ad_unit_identifier: &str, code: i32, message: &str) -> Payload {
        let mut payload = Self::ad_payload(ad_unit_identifier, "", None);
        payload.insert_if_absent("errorCode", code.to_string());
        payload.insert_if_absent("errorMessage", message);
        payload.insert_if_absent("errorAdLoadFailureInfo", format!("{NETWORK_NAME}: {message}"));
        payload
    }

    fn placement_for(state: &State, format: AdFormat, ad_unit_identifier: &str) -> String {
        state
            .placements
            .get(&(format, ad_unit_identifier.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn load(&self, format: AdFormat, ad_unit_identifier: &str) {
        if self.failing_units.contains(ad_unit_identifier) {
            let payload = Self::error_payload(ad_unit_identifier, NO_FILL_ERROR_CODE, "No Fill");
            self.emit_ad(format, AdLifecycle::LoadFailed, &payload);
            return;
        }
        if !format.is_ad_view() {
            self.lock()
                .ready
                .insert((format, ad_unit_identifier.to_string()));
        }
        let payload = Self::ad_payload(ad_unit_identifier, "", None);
        self.emit_ad(format, AdLifecycle::Loaded, &payload);
    }
}

const fn geography_ordinal(geography: ConsentFlowUserGeography) -> u8 {
    match geography {
        ConsentFlowUserGeography::Unknown => 0,
        ConsentFlowUserGeography::Gdpr => 1,
        ConsentFlowUserGeography::Other => 2,
    }
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

impl NativePlugin for SimulatedPlugin {
    fn initialize(&self, plugin_version: &str, sdk_key: &str) {
        let payload = {
            let mut state = self.record(format!("initialize {plugin_version}"));
            state.initialized = true;
            let geography = state
                .debug_geography
                .unwrap_or(ConsentFlowUserGeography::Other);
            Payload::from_iter([
                (
                    "consentFlowUserGeography",
                    geography_ordinal(geography).to_string(),
                ),
                ("countryCode", "US".to_string()),
                ("hasUserConsent", flag(state.has_user_consent).to_string()),
                (
                    "isAgeRestrictedUser",
                    flag(state.is_age_restricted_user).to_string(),
                ),
                ("isDoNotSell", flag(state.is_do_not_sell).to_string()),
                ("isTablet", "false".to_string()),
            ])
        };
        info!(
            plugin_version,
            sdk_key_set = !sdk_key.is_empty(),
            "simulated SDK initialized"
        );
        self.emit("OnSdkInitializedEvent", &payload);
    }

    fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    fn set_has_user_consent(&self, has_user_consent: bool) {
        self.record(format!("set_has_user_consent {has_user_consent}"))
            .has_user_consent = has_user_consent;
    }

    fn has_user_consent(&self) -> bool {
        self.lock().has_user_consent
    }

    fn set_is_age_restricted_user(&self, is_age_restricted_user: bool) {
        self.record(format!("set_is_age_restricted_user {is_age_restricted_user}"))
            .is_age_restricted_user = is_age_restricted_user;
    }

    fn is_age_restricted_user(&self) -> bool {
        self.lock().is_age_restricted_user
    }

    fn set_do_not_sell(&self, do_not_sell: bool) {
        self.record(format!("set_do_not_sell {do_not_sell}")).is_do_not_sell = do_not_sell;
    }

    fn is_do_not_sell(&self) -> bool {
        self.lock().is_do_not_sell
    }

    fn set_consent_flow_debug_user_geography(&self, geography: &str) {
        let parsed = parse_geography(geography).ok();
        self.record(format!("set_consent_flow_debug_user_geography {geography}"))
            .debug_geography = parsed;
    }

    fn show_cmp_for_existing_user(&self) {
        drop(self.record("show_cmp_for_existing_user".to_string()));
        self.emit("OnCmpCompletedEvent", &Payload::new());
    }

    fn has_supported_cmp(&self) -> bool {
        true
    }

    fn set_muted(&self, muted: bool) {
        self.record(format!("set_muted {muted}")).muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.lock().muted
    }

    fn set_verbose_logging_enabled(&self, enabled: bool) {
        self.record(format!("set_verbose_logging_enabled {enabled}"))
            .verbose_logging = enabled;
    }

    fn is_verbose_logging_enabled(&self) -> bool {
        self.lock().verbose_logging
    }

    fn track_event(&self, name: &str, parameters: &str) {
        drop(self.record(format!("track_event {name} {parameters}")));
    }

    fn create_ad_view(&self, format: AdFormat, ad_unit_identifier: &str, position: &str) {
        drop(self.record(format!(
            "create_ad_view {} {ad_unit_identifier} {position}",
            format.label()
        )));
        self.load(format, ad_unit_identifier);
    }

    fn set_ad_view_placement(&self, format: AdFormat, ad_unit_identifier: &str, placement: &str) {
        let mut state = self.record(format!(
            "set_ad_view_placement {} {ad_unit_identifier} {placement}",
            format.label()
        ));
        state.placements.insert(
            (format, ad_unit_identifier.to_string()),
            placement.to_string(),
        );
    }

    fn show_ad_view(&self, format: AdFormat, ad_unit_identifier: &str) {
        let placement = {
            let state = self.record(format!(
                "show_ad_view {} {ad_unit_identifier}",
                format.label()
            ));
            Self::placement_for(&state, format, ad_unit_identifier)
        };
        let payload = Self::ad_payload(ad_unit_identifier, &placement, Some(self.revenue));
        self.emit_ad(format, AdLifecycle::RevenuePaid, &payload);
    }

    fn hide_ad_view(&self, format: AdFormat, ad_unit_identifier: &str) {
        drop(self.record(format!(
            "hide_ad_view {} {ad_unit_identifier}",
            format.label()
        )));
    }

    fn destroy_ad_view(&self, format: AdFormat, ad_unit_identifier: &str) {
        let mut state = self.record(format!(
            "destroy_ad_view {} {ad_unit_identifier}",
            format.label()
        ));
        state
            .placements
            .remove(&(format, ad_unit_identifier.to_string()));
    }

    fn load_fullscreen_ad(&self, format: AdFormat, ad_unit_identifier: &str) {
        drop(self.record(format!(
            "load_fullscreen_ad {} {ad_unit_identifier}",
            format.label()
        )));
        self.load(format, ad_unit_identifier);
    }

    fn is_fullscreen_ad_ready(&self, format: AdFormat, ad_unit_identifier: &str) -> bool {
        self.lock()
            .ready
            .contains(&(format, ad_unit_identifier.to_string()))
    }

    fn show_fullscreen_ad(&self, format: AdFormat, ad_unit_identifier: &str, placement: &str) {
        let was_ready = self
            .record(format!(
                "show_fullscreen_ad {} {ad_unit_identifier} {placement}",
                format.label()
            ))
            .ready
            .remove(&(format, ad_unit_identifier.to_string()));

        if !was_ready {
            let payload = Self::error_payload(
                ad_unit_identifier,
                DISPLAY_FAILED_ERROR_CODE,
                "Ad not ready",
            );
            self.emit_ad(format, AdLifecycle::DisplayFailed, &payload);
            return;
        }

        let shown = Self::ad_payload(ad_unit_identifier, placement, None);
        self.emit_ad(format, AdLifecycle::Displayed, &shown);
        if format == AdFormat::Rewarded {
            let mut rewarded = shown.clone();
            rewarded.insert_if_absent("rewardLabel", self.reward_label.as_str());
            rewarded.insert_if_absent("rewardAmount", self.reward_amount.to_string());
            self.emit_ad(format, AdLifecycle::ReceivedReward, &rewarded);
        }
        let paid = Self::ad_payload(ad_unit_identifier, placement, Some(self.revenue));
        self.emit_ad(format, AdLifecycle::RevenuePaid, &paid);
        self.emit_ad(format, AdLifecycle::Hidden, &shown);
    }

    fn set_extra_parameter(
        &self,
        format: AdFormat,
        ad_unit_identifier: &str,
        key: &str,
        value: &str,
    ) {
        drop(self.record(format!(
            "set_extra_parameter {} {ad_unit_identifier} {key}={value}",
            format.label()
        )));
    }
}
