//! Typed records rebuilt from decoded native event bodies.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::topics::{AdTopic, EventName};
use crate::wire::Payload;

/// Identifier assigned to each broadcast event.
pub type EventId = u64;

/// Payload keys understood by the record constructors.
///
/// Where two spellings exist, the legacy key is listed first and wins when
/// both are present.
pub mod keys {
    /// Ad unit identifier.
    pub const AD_UNIT_ID: &[&str] = &["adUnitId", "adUnitIdentifier"];
    /// Mediated network name.
    pub const NETWORK_NAME: &[&str] = &["networkName"];
    /// Creative identifier.
    pub const CREATIVE_ID: &[&str] = &["creativeId", "creativeIdentifier"];
    /// Placement label.
    pub const PLACEMENT: &[&str] = &["placement"];
    /// Impression revenue.
    pub const REVENUE: &[&str] = &["revenue"];
    /// Numeric error code.
    pub const ERROR_CODE: &[&str] = &["errorCode", "code"];
    /// Error description.
    pub const ERROR_MESSAGE: &[&str] = &["errorMessage", "message"];
    /// Per-network failure description.
    pub const ERROR_WATERFALL: &[&str] = &["errorAdLoadFailureInfo", "waterfall"];
    /// Reward label.
    pub const REWARD_LABEL: &[&str] = &["rewardLabel", "label"];
    /// Reward amount.
    pub const REWARD_AMOUNT: &[&str] = &["rewardAmount", "amount"];
    /// Consent geography ordinal.
    pub const USER_GEOGRAPHY: &str = "consentFlowUserGeography";
    /// Legacy consent dialog state.
    pub const CONSENT_DIALOG_STATE: &str = "consentDialogState";
    /// ISO country code.
    pub const COUNTRY_CODE: &str = "countryCode";
    /// Consent flag.
    pub const HAS_USER_CONSENT: &str = "hasUserConsent";
    /// Age restriction flag.
    pub const IS_AGE_RESTRICTED_USER: &str = "isAgeRestrictedUser";
    /// Do-not-sell flag.
    pub const IS_DO_NOT_SELL: &str = "isDoNotSell";
    /// Tablet flag.
    pub const IS_TABLET: &str = "isTablet";
    /// iOS tracking authorization status.
    pub const APP_TRACKING_STATUS: &str = "appTrackingStatus";
    /// CMP error code.
    pub const CMP_CODE: &str = "code";
    /// CMP error message.
    pub const CMP_MESSAGE: &str = "message";
    /// Code reported by the consent platform itself.
    pub const CMP_PLATFORM_CODE: &str = "cmpCode";
    /// Message reported by the consent platform itself.
    pub const CMP_PLATFORM_MESSAGE: &str = "cmpMessage";
}

/// Snapshot of the ad an event refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdInfo {
    /// Ad unit the event belongs to.
    pub ad_unit_identifier: String,
    /// Network that served the ad.
    pub network_name: String,
    /// Creative identifier, when the network reports one.
    pub creative_identifier: String,
    /// Placement label set by the publisher.
    pub placement: String,
    /// Impression revenue in USD, or [`AdInfo::UNKNOWN_REVENUE`].
    pub revenue: f64,
}

impl AdInfo {
    /// Sentinel revenue for events that did not report one.
    pub const UNKNOWN_REVENUE: f64 = -1.0;

    /// Build from a decoded payload.
    ///
    /// Missing revenue maps to [`AdInfo::UNKNOWN_REVENUE`]. Present revenue
    /// reads its leading number, so `"0.05USD"` is 0.05 and `"n/a"` is zero.
    #[must_use]
    pub fn from_payload(payload: &Payload) -> Self {
        let revenue = payload
            .first_of(keys::REVENUE)
            .map_or(Self::UNKNOWN_REVENUE, leading_float);

        Self {
            ad_unit_identifier: text(payload, keys::AD_UNIT_ID),
            network_name: text(payload, keys::NETWORK_NAME),
            creative_identifier: text(payload, keys::CREATIVE_ID),
            placement: text(payload, keys::PLACEMENT),
            revenue,
        }
    }

    /// Whether a revenue figure was reported.
    #[must_use]
    pub fn has_revenue(&self) -> bool {
        self.revenue >= 0.0
    }
}

impl Display for AdInfo {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "[AdInfo adUnitIdentifier: {} networkName: {} creativeIdentifier: {} placement: {} revenue: {}]",
            self.ad_unit_identifier,
            self.network_name,
            self.creative_identifier,
            self.placement,
            self.revenue
        )
    }
}

/// Load or display failure reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdError {
    /// SDK error code; the leading integer of the raw value, else zero.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
    /// Per-network failure reasons.
    pub waterfall: String,
}

impl AdError {
    /// Build from a decoded payload.
    #[must_use]
    pub fn from_payload(payload: &Payload) -> Self {
        Self {
            code: int_or_zero(payload.first_of(keys::ERROR_CODE)),
            message: text(payload, keys::ERROR_MESSAGE),
            waterfall: text(payload, keys::ERROR_WATERFALL),
        }
    }
}

/// Reward granted by a rewarded ad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdReward {
    /// Currency or item label.
    pub label: String,
    /// Amount granted.
    pub amount: i32,
}

impl AdReward {
    /// Build from a decoded payload.
    #[must_use]
    pub fn from_payload(payload: &Payload) -> Self {
        Self {
            label: text(payload, keys::REWARD_LABEL),
            amount: int_or_zero(payload.first_of(keys::REWARD_AMOUNT)),
        }
    }

    /// A reward counts only with a label and a positive amount.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.label.is_empty() && self.amount > 0
    }
}

impl Display for AdReward {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "Reward: {} {}", self.amount, self.label)
    }
}

/// Geography used to pick the consent flow shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentFlowUserGeography {
    /// No determination could be made.
    #[default]
    Unknown,
    /// User is in a GDPR region.
    Gdpr,
    /// Any other region.
    Other,
}

impl ConsentFlowUserGeography {
    /// Native enum constant name, as expected by the plugin setters.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Gdpr => "GDPR",
            Self::Other => "OTHER",
        }
    }

    fn from_ordinal(raw: &str) -> Self {
        match raw.trim() {
            "1" => Self::Gdpr,
            "2" => Self::Other,
            _ => Self::Unknown,
        }
    }

    fn from_dialog_state(raw: &str) -> Self {
        match raw.trim() {
            "1" => Self::Gdpr,
            "2" => Self::Other,
            _ => Self::Unknown,
        }
    }
}

/// iOS App Tracking Transparency status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppTrackingStatus {
    /// The framework is unavailable on this device.
    Unavailable,
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// Tracking is restricted by device policy.
    Restricted,
    /// The user denied tracking.
    Denied,
    /// The user authorized tracking.
    Authorized,
}

impl AppTrackingStatus {
    fn from_code(raw: &str) -> Self {
        match raw.trim() {
            "-1" => Self::Unavailable,
            "1" => Self::Restricted,
            "2" => Self::Denied,
            "3" => Self::Authorized,
            _ => Self::NotDetermined,
        }
    }
}

/// SDK state reported once initialization completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfiguration {
    /// Consent flow geography.
    pub consent_flow_user_geography: ConsentFlowUserGeography,
    /// ISO country code for the user.
    pub country_code: String,
    /// User consented to information sharing.
    pub has_user_consent: bool,
    /// User is age restricted.
    pub is_age_restricted_user: bool,
    /// User opted out of the sale of personal information.
    pub is_do_not_sell: bool,
    /// Device is a tablet.
    pub is_tablet: bool,
    /// iOS only; `NotDetermined` elsewhere.
    pub app_tracking_status: AppTrackingStatus,
}

impl SdkConfiguration {
    /// Build from a decoded payload.
    #[must_use]
    pub fn from_payload(payload: &Payload) -> Self {
        let consent_flow_user_geography = payload
            .get(keys::USER_GEOGRAPHY)
            .map(ConsentFlowUserGeography::from_ordinal)
            .or_else(|| {
                payload
                    .get(keys::CONSENT_DIALOG_STATE)
                    .map(ConsentFlowUserGeography::from_dialog_state)
            })
            .unwrap_or_default();

        Self {
            consent_flow_user_geography,
            country_code: payload.get(keys::COUNTRY_CODE).unwrap_or_default().to_string(),
            has_user_consent: flag(payload.get(keys::HAS_USER_CONSENT)),
            is_age_restricted_user: flag(payload.get(keys::IS_AGE_RESTRICTED_USER)),
            is_do_not_sell: flag(payload.get(keys::IS_DO_NOT_SELL)),
            is_tablet: flag(payload.get(keys::IS_TABLET)),
            app_tracking_status: payload
                .get(keys::APP_TRACKING_STATUS)
                .map(AppTrackingStatus::from_code)
                .unwrap_or_default(),
        }
    }
}

/// Error reported when the consent management flow completes unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmpError {
    /// SDK-level error code.
    pub code: i32,
    /// SDK-level message.
    pub message: String,
    /// Code returned by the consent platform; `-1` when absent.
    pub cmp_code: i32,
    /// Message returned by the consent platform.
    pub cmp_message: String,
}

impl CmpError {
    /// Build from a decoded payload. An empty body means the flow succeeded.
    #[must_use]
    pub fn from_payload(payload: &Payload) -> Option<Self> {
        if !payload.contains_key(keys::CMP_CODE) {
            return None;
        }

        Some(Self {
            code: int_or_zero(payload.get(keys::CMP_CODE)),
            message: payload.get(keys::CMP_MESSAGE).unwrap_or_default().to_string(),
            cmp_code: payload
                .get(keys::CMP_PLATFORM_CODE)
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(-1),
            cmp_message: payload
                .get(keys::CMP_PLATFORM_MESSAGE)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Typed event produced by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// SDK initialization finished.
    SdkInitialized {
        /// Reported configuration.
        configuration: SdkConfiguration,
    },
    /// Consent flow finished; `None` on success.
    CmpCompleted {
        /// Failure details, if any.
        error: Option<CmpError>,
    },
    /// Ad lifecycle event without extra data.
    Ad {
        /// Format and lifecycle stage.
        topic: AdTopic,
        /// Ad snapshot.
        info: AdInfo,
    },
    /// Load or display failure.
    AdFailed {
        /// Format and failing stage.
        topic: AdTopic,
        /// Ad snapshot.
        info: AdInfo,
        /// Failure details.
        error: AdError,
    },
    /// Rewarded ad granted a reward.
    RewardReceived {
        /// Ad snapshot.
        info: AdInfo,
        /// Granted reward.
        reward: AdReward,
    },
}

impl Event {
    /// Parsed name of the event.
    #[must_use]
    pub const fn name(&self) -> EventName {
        match self {
            Self::SdkInitialized { .. } => EventName::SdkInitialized,
            Self::CmpCompleted { .. } => EventName::CmpCompleted,
            Self::Ad { topic, .. } | Self::AdFailed { topic, .. } => EventName::Ad(*topic),
            Self::RewardReceived { .. } => EventName::Ad(AdTopic::REWARDED_RECEIVED_REWARD),
        }
    }

    /// Canonical event name, for logs and filtering.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.name().as_str()
    }

    /// Ad snapshot carried by ad events.
    #[must_use]
    pub const fn ad_info(&self) -> Option<&AdInfo> {
        match self {
            Self::Ad { info, .. } | Self::AdFailed { info, .. } | Self::RewardReceived { info, .. } => {
                Some(info)
            }
            Self::SdkInitialized { .. } | Self::CmpCompleted { .. } => None,
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}

fn text(payload: &Payload, aliases: &[&str]) -> String {
    payload.first_of(aliases).unwrap_or_default().to_string()
}

fn int_or_zero(raw: Option<&str>) -> i32 {
    raw.map_or(0, leading_int)
}

/// Leading decimal integer of `raw` after whitespace and an optional sign,
/// saturating at the `i32` bounds: `"12abc"` is 12, `"5.0"` is 5, `"x"` is 0.
fn leading_int(raw: &str) -> i32 {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let limit = i64::from(i32::MAX) + 1;
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| (acc * 10 + i64::from(digit - b'0')).min(limit));
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Longest decimal float prefix of `raw` after whitespace: optional sign,
/// digits with an optional fraction, then an optional exponent. No digits is 0.
fn leading_float(raw: &str) -> f64 {
    let raw = raw.trim_start();
    let bytes = raw.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integral = digits_from(end);
    end += integral;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if integral + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integral + fraction == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    raw[..end].parse().unwrap_or(0.0)
}

fn flag(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_info_reads_legacy_keys() {
        let payload = Payload::from_iter([
            ("adUnitId", "abc"),
            ("networkName", "AdMob"),
            ("creativeId", "c1"),
            ("placement", "main_menu"),
            ("revenue", "0.05"),
        ]);
        let info = AdInfo::from_payload(&payload);
        assert_eq!(info.ad_unit_identifier, "abc");
        assert_eq!(info.network_name, "AdMob");
        assert_eq!(info.creative_identifier, "c1");
        assert_eq!(info.placement, "main_menu");
        assert!((info.revenue - 0.05).abs() < f64::EPSILON);
        assert!(info.has_revenue());
    }

    #[test]
    fn ad_info_reads_current_keys() {
        let payload = Payload::from_iter([
            ("adUnitIdentifier", "abc"),
            ("creativeIdentifier", "c2"),
        ]);
        let info = AdInfo::from_payload(&payload);
        assert_eq!(info.ad_unit_identifier, "abc");
        assert_eq!(info.creative_identifier, "c2");
    }

    #[test]
    fn missing_revenue_uses_sentinel_and_garbage_uses_zero() {
        let missing = AdInfo::from_payload(&Payload::new());
        assert!((missing.revenue - AdInfo::UNKNOWN_REVENUE).abs() < f64::EPSILON);
        assert!(!missing.has_revenue());

        let garbage = AdInfo::from_payload(&Payload::from_iter([("revenue", "n/a")]));
        assert!(garbage.revenue.abs() < f64::EPSILON);

        let suffixed = AdInfo::from_payload(&Payload::from_iter([("revenue", " 0.05USD")]));
        assert!((suffixed.revenue - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn integers_read_their_leading_digits() {
        assert_eq!(leading_int("12abc"), 12);
        assert_eq!(leading_int("5.0"), 5);
        assert_eq!(leading_int("  -7 "), -7);
        assert_eq!(leading_int("+3"), 3);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int("-"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("99999999999"), i32::MAX);
        assert_eq!(leading_int("-99999999999"), i32::MIN);

        let reward = AdReward::from_payload(&Payload::from_iter([
            ("label", "coins"),
            ("amount", "5.0"),
        ]));
        assert_eq!(reward.amount, 5);
        assert!(reward.is_valid());
    }

    #[test]
    fn floats_read_their_longest_numeric_prefix() {
        let close = |raw: &str, expected: f64| (leading_float(raw) - expected).abs() < 1e-12;
        assert!(close("1.5", 1.5));
        assert!(close("1.5e2x", 150.0));
        assert!(close("2e", 2.0));
        assert!(close("3e+", 3.0));
        assert!(close(".25", 0.25));
        assert!(close("7.", 7.0));
        assert!(close("-0.5kg", -0.5));
        assert!(close(".", 0.0));
        assert!(close("-", 0.0));
        assert!(close("", 0.0));
    }

    #[test]
    fn ad_info_display_lists_fields() {
        let info = AdInfo::from_payload(&Payload::from_iter([
            ("adUnitId", "abc"),
            ("networkName", "AdMob"),
            ("revenue", "1.5"),
        ]));
        assert_eq!(
            info.to_string(),
            "[AdInfo adUnitIdentifier: abc networkName: AdMob creativeIdentifier:  placement:  revenue: 1.5]"
        );
    }

    #[test]
    fn ad_error_defaults_unparsable_code_to_zero() {
        let error = AdError::from_payload(&Payload::from_iter([
            ("errorCode", "oops"),
            ("errorMessage", "no fill"),
        ]));
        assert_eq!(error.code, 0);
        assert_eq!(error.message, "no fill");
        assert_eq!(error.waterfall, "");

        let current = AdError::from_payload(&Payload::from_iter([
            ("code", "-5001"),
            ("message", "failed"),
            ("waterfall", "MAWaterfallInfo"),
        ]));
        assert_eq!(current.code, -5001);
        assert_eq!(current.waterfall, "MAWaterfallInfo");
    }

    #[test]
    fn reward_validity_requires_label_and_positive_amount() {
        let reward = |label: &str, amount| AdReward {
            label: label.into(),
            amount,
        };
        assert!(!reward("", 5).is_valid());
        assert!(!reward("coins", 0).is_valid());
        assert!(!reward("coins", -3).is_valid());
        assert!(reward("coins", 5).is_valid());
        assert_eq!(reward("coins", 5).to_string(), "Reward: 5 coins");
    }

    #[test]
    fn reward_reads_both_key_spellings() {
        let legacy = AdReward::from_payload(&Payload::from_iter([
            ("rewardLabel", "gems"),
            ("rewardAmount", "10"),
        ]));
        let current = AdReward::from_payload(&Payload::from_iter([("label", "gems"), ("amount", "10")]));
        assert_eq!(legacy, current);
        assert!(legacy.is_valid());
    }

    #[test]
    fn sdk_configuration_parses_current_payload() {
        let config = SdkConfiguration::from_payload(&Payload::from_iter([
            ("consentFlowUserGeography", "1"),
            ("countryCode", "DE"),
            ("hasUserConsent", "true"),
            ("isAgeRestrictedUser", "false"),
            ("isDoNotSell", "1"),
            ("isTablet", "TRUE"),
            ("appTrackingStatus", "3"),
        ]));
        assert_eq!(config.consent_flow_user_geography, ConsentFlowUserGeography::Gdpr);
        assert_eq!(config.country_code, "DE");
        assert!(config.has_user_consent);
        assert!(!config.is_age_restricted_user);
        assert!(config.is_do_not_sell);
        assert!(config.is_tablet);
        assert_eq!(config.app_tracking_status, AppTrackingStatus::Authorized);
    }

    #[test]
    fn sdk_configuration_falls_back_to_dialog_state_and_defaults() {
        let legacy = SdkConfiguration::from_payload(&Payload::from_iter([(
            "consentDialogState",
            "2",
        )]));
        assert_eq!(legacy.consent_flow_user_geography, ConsentFlowUserGeography::Other);
        assert_eq!(legacy.app_tracking_status, AppTrackingStatus::NotDetermined);

        let empty = SdkConfiguration::from_payload(&Payload::new());
        assert_eq!(empty, SdkConfiguration::default());
    }

    #[test]
    fn cmp_error_absent_on_success() {
        assert!(CmpError::from_payload(&Payload::new()).is_none());

        let error = CmpError::from_payload(&Payload::from_iter([
            ("code", "2"),
            ("message", "flow failed"),
        ]))
        .expect("cmp error");
        assert_eq!(error.code, 2);
        assert_eq!(error.cmp_code, -1);
        assert_eq!(error.cmp_message, "");
    }

    #[test]
    fn event_kind_uses_canonical_names() {
        let info = AdInfo::from_payload(&Payload::new());
        assert_eq!(
            Event::Ad {
                topic: AdTopic::INTERSTITIAL_HIDDEN,
                info: info.clone(),
            }
            .kind(),
            "OnInterstitialAdHiddenEvent"
        );
        assert_eq!(
            Event::RewardReceived {
                info,
                reward: AdReward::default(),
            }
            .kind(),
            "OnRewardedAdReceivedRewardEvent"
        );
        assert_eq!(
            Event::CmpCompleted { error: None }.kind(),
            "OnCmpCompletedEvent"
        );
    }
}
