//! Parsing helpers for raw environment values.

use crate::error::{ConfigError, ConfigResult};
use crate::model::{LogFormatSetting, WireFormatSetting};

pub(crate) fn parse_wire_format(field: &'static str, raw: &str) -> ConfigResult<WireFormatSetting> {
    match normalized(raw).as_str() {
        "auto" => Ok(WireFormatSetting::Auto),
        "json" => Ok(WireFormatSetting::Json),
        "delimited" | "kv" => Ok(WireFormatSetting::Delimited),
        _ => Err(ConfigError::invalid(
            field,
            raw,
            "must be one of auto, json, delimited",
        )),
    }
}

pub(crate) fn parse_log_format(field: &'static str, raw: &str) -> ConfigResult<LogFormatSetting> {
    match normalized(raw).as_str() {
        "auto" => Ok(LogFormatSetting::Auto),
        "pretty" | "text" => Ok(LogFormatSetting::Pretty),
        "json" => Ok(LogFormatSetting::Json),
        _ => Err(ConfigError::invalid(
            field,
            raw,
            "must be one of auto, pretty, json",
        )),
    }
}

pub(crate) fn parse_capacity(field: &'static str, raw: &str) -> ConfigResult<usize> {
    let capacity = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(field, raw, "must be an integer"))?;
    if capacity == 0 {
        return Err(ConfigError::invalid(field, raw, "must be positive"));
    }
    Ok(capacity)
}

/// Truthy values are `1`, `true`, `yes` and `on`, case-insensitive.
pub(crate) fn env_flag_value(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(normalized(v).as_str(), "1" | "true" | "yes" | "on"))
}

fn normalized(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
