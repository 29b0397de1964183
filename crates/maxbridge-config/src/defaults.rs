//! Default values and environment variable names for bridge settings.
//!
//! # Design
//! - Variable names live in one place so the CLI help and loader agree.
//! - Ad unit defaults are placeholders that only make sense for the simulated plugin.

pub use maxbridge_events::DEFAULT_QUEUE_CAPACITY;

/// Default log level when neither `MAXBRIDGE_LOG_LEVEL` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Placeholder banner ad unit.
pub const DEFAULT_BANNER_AD_UNIT: &str = "banner-demo";
/// Placeholder MREC ad unit.
pub const DEFAULT_MREC_AD_UNIT: &str = "mrec-demo";
/// Placeholder interstitial ad unit.
pub const DEFAULT_INTERSTITIAL_AD_UNIT: &str = "interstitial-demo";
/// Placeholder rewarded ad unit.
pub const DEFAULT_REWARDED_AD_UNIT: &str = "rewarded-demo";

/// Prefix shared by every variable the loader reads.
pub const ENV_PREFIX: &str = "MAXBRIDGE_";
/// SDK key passed to `initialize`.
pub const ENV_SDK_KEY: &str = "MAXBRIDGE_SDK_KEY";
/// `auto`, `json` or `delimited`.
pub const ENV_WIRE_FORMAT: &str = "MAXBRIDGE_WIRE_FORMAT";
/// Main-thread queue capacity.
pub const ENV_QUEUE_CAPACITY: &str = "MAXBRIDGE_QUEUE_CAPACITY";
/// Log level or filter directive.
pub const ENV_LOG_LEVEL: &str = "MAXBRIDGE_LOG_LEVEL";
/// `auto`, `pretty` or `json`.
pub const ENV_LOG_FORMAT: &str = "MAXBRIDGE_LOG_FORMAT";
/// Truthy flag enabling verbose native SDK logging.
pub const ENV_VERBOSE_SDK_LOGGING: &str = "MAXBRIDGE_VERBOSE_SDK_LOGGING";
/// Banner ad unit override.
pub const ENV_BANNER_AD_UNIT: &str = "MAXBRIDGE_BANNER_AD_UNIT";
/// MREC ad unit override.
pub const ENV_MREC_AD_UNIT: &str = "MAXBRIDGE_MREC_AD_UNIT";
/// Interstitial ad unit override.
pub const ENV_INTERSTITIAL_AD_UNIT: &str = "MAXBRIDGE_INTERSTITIAL_AD_UNIT";
/// Rewarded ad unit override.
pub const ENV_REWARDED_AD_UNIT: &str = "MAXBRIDGE_REWARDED_AD_UNIT";

/// Every variable the loader reads.
pub const ENV_VARS: [&str; 10] = [
    ENV_SDK_KEY,
    ENV_WIRE_FORMAT,
    ENV_QUEUE_CAPACITY,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
    ENV_VERBOSE_SDK_LOGGING,
    ENV_BANNER_AD_UNIT,
    ENV_MREC_AD_UNIT,
    ENV_INTERSTITIAL_AD_UNIT,
    ENV_REWARDED_AD_UNIT,
];
