//! Typed bridge settings.

use maxbridge_events::WireFormat;
use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BANNER_AD_UNIT, DEFAULT_INTERSTITIAL_AD_UNIT, DEFAULT_LOG_LEVEL, DEFAULT_MREC_AD_UNIT,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_REWARDED_AD_UNIT,
};

/// How the main-thread dispatcher decodes native payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormatSetting {
    /// Detect per record.
    #[default]
    Auto,
    /// Always JSON objects.
    Json,
    /// Always records split by U+001C (field) and U+001D (record).
    Delimited,
}

impl WireFormatSetting {
    /// Fixed format for the dispatcher, `None` for auto-detection.
    #[must_use]
    pub const fn to_wire_format(self) -> Option<WireFormat> {
        match self {
            Self::Auto => None,
            Self::Json => Some(WireFormat::Json),
            Self::Delimited => Some(WireFormat::Delimited),
        }
    }
}

/// Requested log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormatSetting {
    /// Pick based on the build profile.
    #[default]
    Auto,
    /// Human-readable lines.
    Pretty,
    /// Structured JSON objects.
    Json,
}

/// Ad unit identifiers per format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdUnits {
    /// Banner ad unit.
    pub banner: String,
    /// MREC ad unit.
    pub mrec: String,
    /// Interstitial ad unit.
    pub interstitial: String,
    /// Rewarded ad unit.
    pub rewarded: String,
}

impl Default for AdUnits {
    fn default() -> Self {
        Self {
            banner: DEFAULT_BANNER_AD_UNIT.to_string(),
            mrec: DEFAULT_MREC_AD_UNIT.to_string(),
            interstitial: DEFAULT_INTERSTITIAL_AD_UNIT.to_string(),
            rewarded: DEFAULT_REWARDED_AD_UNIT.to_string(),
        }
    }
}

/// Settings for wiring a native plugin to the event pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// SDK key, if one was configured.
    pub sdk_key: Option<String>,
    /// Payload format expected from the native side.
    pub wire_format: WireFormatSetting,
    /// Capacity of the main-thread queue; always positive.
    pub queue_capacity: usize,
    /// Log level or filter directive.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormatSetting,
    /// Forward verbose logging to the native SDK.
    pub verbose_sdk_logging: bool,
    /// Ad unit identifiers.
    pub ad_units: AdUnits,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            sdk_key: None,
            wire_format: WireFormatSetting::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormatSetting::default(),
            verbose_sdk_logging: false,
            ad_units: AdUnits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_setting_maps_to_dispatcher_format() {
        assert_eq!(WireFormatSetting::Auto.to_wire_format(), None);
        assert_eq!(
            WireFormatSetting::Json.to_wire_format(),
            Some(WireFormat::Json)
        );
        assert_eq!(
            WireFormatSetting::Delimited.to_wire_format(),
            Some(WireFormat::Delimited)
        );
    }

    #[test]
    fn delimited_setting_uses_control_separators() -> Result<(), &'static str> {
        use maxbridge_events::{FIELD_SEPARATOR, Payload, RECORD_SEPARATOR};

        let format = WireFormatSetting::Delimited
            .to_wire_format()
            .ok_or("delimited setting has no fixed format")?;
        let encoded = Payload::from_iter([("adUnitId", "abc")]).encode(format);
        assert_eq!(encoded, format!("adUnitId{FIELD_SEPARATOR}abc{RECORD_SEPARATOR}"));
        assert!(!encoded.contains('='));
        Ok(())
    }

    #[test]
    fn settings_serialize_with_snake_case_enums() -> Result<(), serde_json::Error> {
        let settings = BridgeSettings {
            wire_format: WireFormatSetting::Delimited,
            log_format: LogFormatSetting::Json,
            ..BridgeSettings::default()
        };
        let value = serde_json::to_value(&settings)?;
        assert_eq!(value["wire_format"], "delimited");
        assert_eq!(value["log_format"], "json");
        assert_eq!(value["queue_capacity"], DEFAULT_QUEUE_CAPACITY);
        Ok(())
    }
}
