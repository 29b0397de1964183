//! Environment-backed settings loader.
//!
//! Blank values count as unset. Unknown `MAXBRIDGE_*` variables are ignored.

use std::collections::HashMap;
use std::ffi::OsString;

use tracing::debug;

use crate::defaults::{
    ENV_BANNER_AD_UNIT, ENV_INTERSTITIAL_AD_UNIT, ENV_LOG_FORMAT, ENV_LOG_LEVEL,
    ENV_MREC_AD_UNIT, ENV_PREFIX, ENV_QUEUE_CAPACITY, ENV_REWARDED_AD_UNIT, ENV_SDK_KEY,
    ENV_VARS, ENV_VERBOSE_SDK_LOGGING, ENV_WIRE_FORMAT,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::BridgeSettings;
use crate::validate::{env_flag_value, parse_capacity, parse_log_format, parse_wire_format};

impl BridgeSettings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`](crate::ConfigError::InvalidField)
    /// when a variable is present but malformed, including values that are
    /// not valid UTF-8. Other variables are never inspected.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Load settings from raw OS strings, as returned by [`std::env::vars_os`].
    ///
    /// # Errors
    ///
    /// See [`BridgeSettings::from_env`].
    pub fn from_os_vars<I>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut known = Vec::new();
        for (key, value) in vars {
            let Some(field) = key
                .to_str()
                .and_then(|key| ENV_VARS.into_iter().find(|name| *name == key))
            else {
                continue;
            };
            let value = value.into_string().map_err(|raw| ConfigError::InvalidField {
                field,
                value: Some(raw.to_string_lossy().into_owned()),
                reason: "must be valid UTF-8",
            })?;
            known.push((field, value));
        }
        Self::from_vars(known)
    }

    /// Load settings from explicit `(name, value)` pairs; later pairs win.
    ///
    /// # Errors
    ///
    /// See [`BridgeSettings::from_env`].
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, value)| key.starts_with(ENV_PREFIX) && !value.trim().is_empty())
            .collect();
        let lookup = |name: &str| vars.get(name).map(String::as_str);

        let mut settings = Self::default();
        if let Some(key) = lookup(ENV_SDK_KEY) {
            settings.sdk_key = Some(key.trim().to_string());
        }
        if let Some(raw) = lookup(ENV_WIRE_FORMAT) {
            settings.wire_format = parse_wire_format(ENV_WIRE_FORMAT, raw)?;
        }
        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            settings.queue_capacity = parse_capacity(ENV_QUEUE_CAPACITY, raw)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            settings.log_level = level.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            settings.log_format = parse_log_format(ENV_LOG_FORMAT, raw)?;
        }
        settings.verbose_sdk_logging = env_flag_value(lookup(ENV_VERBOSE_SDK_LOGGING));

        let units = &mut settings.ad_units;
        for (name, slot) in [
            (ENV_BANNER_AD_UNIT, &mut units.banner),
            (ENV_MREC_AD_UNIT, &mut units.mrec),
            (ENV_INTERSTITIAL_AD_UNIT, &mut units.interstitial),
            (ENV_REWARDED_AD_UNIT, &mut units.rewarded),
        ] {
            if let Some(unit) = lookup(name) {
                *slot = unit.trim().to_string();
            }
        }

        debug!(
            wire_format = ?settings.wire_format,
            queue_capacity = settings.queue_capacity,
            sdk_key_set = settings.sdk_key.is_some(),
            "loaded bridge settings"
        );
        Ok(settings)
    }
}
