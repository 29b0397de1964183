//! Sample native payloads shaped like the ones the SDK plugins send.

use maxbridge_events::{Payload, WireFormat};

/// Ad unit used by the banner fixtures.
pub const BANNER_AD_UNIT: &str = "abc";
/// Ad unit used by the rewarded fixtures.
pub const REWARDED_AD_UNIT: &str = "rewarded-unit";

/// Banner-loaded body using the legacy key spellings.
#[must_use]
pub fn banner_loaded_payload() -> Payload {
    Payload::from_iter([
        ("adUnitId", BANNER_AD_UNIT),
        ("networkName", "AdMob"),
        ("creativeId", "c1"),
        ("placement", "main_menu"),
        ("revenue", "0.05"),
    ])
}

/// Rewarded load failure with a no-fill error.
#[must_use]
pub fn rewarded_load_failed_payload() -> Payload {
    Payload::from_iter([
        ("adUnitId", REWARDED_AD_UNIT),
        ("errorCode", "204"),
        ("errorMessage", "no fill"),
    ])
}

/// Reward grant for the rewarded fixture unit.
#[must_use]
pub fn reward_payload(label: &str, amount: i32) -> Payload {
    Payload::from_iter([
        ("adUnitId", REWARDED_AD_UNIT.to_string()),
        ("networkName", "AppLovin".to_string()),
        ("rewardLabel", label.to_string()),
        ("rewardAmount", amount.to_string()),
    ])
}

/// SDK-initialized body for a GDPR-region tablet.
#[must_use]
pub fn sdk_initialized_payload() -> Payload {
    Payload::from_iter([
        ("consentFlowUserGeography", "1"),
        ("countryCode", "DE"),
        ("hasUserConsent", "true"),
        ("isTablet", "1"),
        ("appTrackingStatus", "3"),
    ])
}

/// Encode `pairs` the way a native plugin would.
#[must_use]
pub fn encode_pairs(pairs: &[(&str, &str)], format: WireFormat) -> String {
    Payload::from_iter(pairs.iter().copied()).encode(format)
}
