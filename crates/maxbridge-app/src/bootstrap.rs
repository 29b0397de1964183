//! Settings, logging and the scripted demo session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use maxbridge_config::{BridgeSettings, LogFormatSetting};
use maxbridge_events::{
    AdError, AdReward, AdTopic, Delegates, EventEnvelope, MainThreadDispatcher, WireFormat,
    main_thread_channel,
};
use maxbridge_sdk::{AdViewPosition, MaxSdk, SimulatedPlugin};
use maxbridge_telemetry::{LogFormat, LoggingConfig};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::cli::DemoArgs;
use crate::error::{AppError, AppResult};

/// SDK key used when none is configured.
pub const DEMO_SDK_KEY: &str = "demo-sdk-key";

const BUILD_SHA: &str = match option_env!("MAXBRIDGE_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Dependencies resolved from the environment before a command runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct BootstrapDependencies {
    pub(crate) settings: BridgeSettings,
}

impl BootstrapDependencies {
    pub(crate) fn from_env() -> AppResult<Self> {
        let settings = BridgeSettings::from_env()
            .map_err(|err| AppError::config("settings.from_env", err))?;
        Ok(Self { settings })
    }

    /// Install the global subscriber; a subscriber installed earlier (tests) is kept.
    pub(crate) fn init_logging(&self) -> AppResult<()> {
        let config = LoggingConfig {
            level: &self.settings.log_level,
            format: log_format(self.settings.log_format),
            build_sha: BUILD_SHA,
        };
        match maxbridge_telemetry::init_logging(&config) {
            Ok(()) => Ok(()),
            Err(err @ maxbridge_telemetry::TelemetryError::SubscriberInstall { .. }) => {
                debug!(error = %err, "tracing subscriber already installed");
                Ok(())
            }
            Err(err) => Err(AppError::telemetry("telemetry.init", err)),
        }
    }
}

const fn log_format(setting: LogFormatSetting) -> LogFormat {
    match setting {
        LogFormatSetting::Auto => LogFormat::infer(),
        LogFormatSetting::Pretty => LogFormat::Pretty,
        LogFormatSetting::Json => LogFormat::Json,
    }
}

/// Inputs for [`run_demo`].
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Effective settings after CLI overrides.
    pub settings: BridgeSettings,
    /// Ad units whose loads fail.
    pub failing_ad_units: Vec<String>,
    /// Banner anchor.
    pub banner_position: AdViewPosition,
}

impl DemoOptions {
    /// Defaults for `settings` with no failing units.
    #[must_use]
    pub const fn new(settings: BridgeSettings) -> Self {
        Self {
            settings,
            failing_ad_units: Vec::new(),
            banner_position: AdViewPosition::BottomCenter,
        }
    }

    pub(crate) fn from_args(mut settings: BridgeSettings, args: DemoArgs) -> AppResult<Self> {
        if let Some(key) = args.sdk_key {
            settings.sdk_key = Some(key);
        }
        if let Some(format) = args.wire_format {
            settings.wire_format = format.setting();
        }
        if let Some(capacity) = args.queue_capacity {
            if capacity == 0 {
                return Err(AppError::InvalidArgument {
                    field: "queue_capacity",
                    reason: "must be positive",
                    value: Some(capacity.to_string()),
                });
            }
            settings.queue_capacity = capacity;
        }
        let banner_position = args
            .banner_position
            .parse::<AdViewPosition>()
            .map_err(|err| AppError::sdk("banner_position.parse", err))?;
        Ok(Self {
            settings,
            failing_ad_units: args.failing_ad_units,
            banner_position,
        })
    }
}

/// Outcome of a demo session.
#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    /// Events broadcast on the main thread.
    pub delivered: usize,
    /// Envelopes observed on the async stream, in order.
    pub envelopes: Vec<EventEnvelope>,
    /// Rewards seen by the reward delegate.
    pub rewards: Vec<AdReward>,
    /// Revenue summed from revenue-paid delegates.
    pub revenue: f64,
    /// Failures seen by the failure delegates.
    pub failures: Vec<(AdTopic, AdError)>,
}

#[derive(Debug, Default)]
struct Tally {
    rewards: Vec<AdReward>,
    revenue: f64,
    failures: Vec<(AdTopic, AdError)>,
}

type SharedTally = Arc<Mutex<Tally>>;

fn lock(tally: &SharedTally) -> MutexGuard<'_, Tally> {
    tally.lock().unwrap_or_else(PoisonError::into_inner)
}

const REVENUE_TOPICS: [AdTopic; 4] = [
    AdTopic::BANNER_REVENUE_PAID,
    AdTopic::MREC_REVENUE_PAID,
    AdTopic::INTERSTITIAL_REVENUE_PAID,
    AdTopic::REWARDED_REVENUE_PAID,
];

const FAILURE_TOPICS: [AdTopic; 6] = [
    AdTopic::BANNER_LOAD_FAILED,
    AdTopic::MREC_LOAD_FAILED,
    AdTopic::INTERSTITIAL_LOAD_FAILED,
    AdTopic::INTERSTITIAL_DISPLAY_FAILED,
    AdTopic::REWARDED_LOAD_FAILED,
    AdTopic::REWARDED_DISPLAY_FAILED,
];

fn subscribe_tally(delegates: &mut Delegates, tally: &SharedTally) -> AppResult<()> {
    delegates.on_sdk_initialized(|configuration| {
        info!(
            country_code = %configuration.country_code,
            "SDK initialized"
        );
    });
    delegates.on_cmp_completed(|error| match error {
        Some(error) => warn!(code = error.code, message = %error.message, "CMP flow failed"),
        None => info!("CMP flow completed"),
    });

    let rewards = Arc::clone(tally);
    delegates.on_reward(move |info, reward| {
        info!(ad_unit = %info.ad_unit_identifier, %reward, "reward granted");
        lock(&rewards).rewards.push(reward.clone());
    });

    for topic in REVENUE_TOPICS {
        let revenue = Arc::clone(tally);
        delegates
            .on_ad(topic, move |info| {
                if info.has_revenue() {
                    lock(&revenue).revenue += info.revenue;
                }
            })
            .map_err(|err| AppError::broadcast("delegates.on_ad", err))?;
    }

    for topic in FAILURE_TOPICS {
        let failures = Arc::clone(tally);
        delegates
            .on_ad_failed(topic, move |info, error| {
                warn!(
                    event_name = topic.event_name(),
                    ad_unit = %info.ad_unit_identifier,
                    code = error.code,
                    "ad failed"
                );
                lock(&failures).failures.push((topic, error.clone()));
            })
            .map_err(|err| AppError::broadcast("delegates.on_ad_failed", err))?;
    }
    Ok(())
}

/// Run a scripted session: initialize, consent, banner, interstitial, rewarded.
///
/// The dispatcher is pumped after every facade call, as an engine would once
/// per frame, then drained once the plugin is gone.
///
/// # Errors
///
/// Returns an error if the demo delegates cannot be registered.
pub async fn run_demo(options: DemoOptions) -> AppResult<DemoReport> {
    let DemoOptions {
        settings,
        failing_ad_units,
        banner_position,
    } = options;
    let dispatcher_format = settings.wire_format.to_wire_format();
    let plugin_format = dispatcher_format.unwrap_or(WireFormat::Json);

    let (sender, mut dispatcher) = main_thread_channel(settings.queue_capacity, dispatcher_format);
    let stream = dispatcher.broadcaster().subscribe_stream();
    let tally = SharedTally::default();
    subscribe_tally(dispatcher.broadcaster_mut().delegates_mut(), &tally)?;

    let plugin = failing_ad_units
        .into_iter()
        .fold(SimulatedPlugin::new(sender, plugin_format), |plugin, unit| {
            plugin.with_failing_ad_unit(unit)
        });
    let sdk = MaxSdk::new(Arc::new(plugin)).with_wire_format(plugin_format);
    let sdk_key = settings.sdk_key.as_deref().unwrap_or(DEMO_SDK_KEY);

    info!(
        wire_format = plugin_format.as_str(),
        queue_capacity = settings.queue_capacity,
        "starting demo session"
    );
    let mut delivered = play_script(&sdk, &mut dispatcher, &settings, sdk_key, banner_position);

    drop(sdk);
    delivered += dispatcher.run().await;
    drop(dispatcher);

    let envelopes: Vec<EventEnvelope> = stream
        .filter_map(|item| match item {
            Ok(envelope) => Some(envelope),
            Err(err) => {
                warn!(error = %err, "demo stream lagged");
                None
            }
        })
        .collect()
        .await;

    let mut tally = lock(&tally);
    Ok(DemoReport {
        delivered,
        envelopes,
        rewards: std::mem::take(&mut tally.rewards),
        revenue: tally.revenue,
        failures: std::mem::take(&mut tally.failures),
    })
}

fn play_script(
    sdk: &MaxSdk,
    dispatcher: &mut MainThreadDispatcher,
    settings: &BridgeSettings,
    sdk_key: &str,
    banner_position: AdViewPosition,
) -> usize {
    let units = &settings.ad_units;
    let mut delivered = 0;
    let mut step = |label: &'static str, action: &dyn Fn(&MaxSdk)| {
        action(sdk);
        let pumped = dispatcher.pump();
        debug!(step = label, delivered = pumped, "demo step");
        delivered += pumped;
    };

    step("verbose_logging", &|sdk| {
        sdk.set_verbose_logging_enabled(settings.verbose_sdk_logging);
    });
    step("initialize", &|sdk| sdk.initialize(sdk_key));
    step("consent", &|sdk| {
        if sdk.has_supported_cmp() {
            sdk.show_cmp_for_existing_user();
        }
    });
    step("banner", &|sdk| {
        sdk.create_banner(&units.banner, banner_position);
        sdk.set_banner_placement(&units.banner, "demo_banner");
        sdk.show_banner(&units.banner);
    });
    step("interstitial", &|sdk| {
        sdk.load_interstitial(&units.interstitial);
        sdk.show_interstitial_with_placement(&units.interstitial, "level_complete");
    });
    step("rewarded", &|sdk| {
        sdk.load_rewarded_ad(&units.rewarded);
        sdk.show_rewarded_ad_with_placement(&units.rewarded, "bonus");
    });
    step("teardown", &|sdk| sdk.destroy_banner(&units.banner));
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::FormatArg;

    fn demo_args() -> DemoArgs {
        DemoArgs {
            sdk_key: Some("cli-key".to_string()),
            wire_format: Some(FormatArg::Delimited),
            queue_capacity: Some(16),
            failing_ad_units: vec!["x".to_string()],
            banner_position: "top_center".to_string(),
        }
    }

    #[test]
    fn cli_overrides_settings() -> AppResult<()> {
        let options = DemoOptions::from_args(BridgeSettings::default(), demo_args())?;
        assert_eq!(options.settings.sdk_key.as_deref(), Some("cli-key"));
        assert_eq!(
            options.settings.wire_format.to_wire_format(),
            Some(WireFormat::Delimited)
        );
        assert_eq!(options.settings.queue_capacity, 16);
        assert_eq!(options.banner_position, AdViewPosition::TopCenter);
        assert_eq!(options.failing_ad_units, ["x"]);
        Ok(())
    }

    #[test]
    fn bad_overrides_are_rejected() {
        let mut args = demo_args();
        args.queue_capacity = Some(0);
        assert!(matches!(
            DemoOptions::from_args(BridgeSettings::default(), args),
            Err(AppError::InvalidArgument {
                field: "queue_capacity",
                ..
            })
        ));

        let mut args = demo_args();
        args.banner_position = "middle".to_string();
        assert!(matches!(
            DemoOptions::from_args(BridgeSettings::default(), args),
            Err(AppError::Sdk { .. })
        ));
    }

    #[test]
    fn log_format_setting_maps_to_telemetry() {
        assert_eq!(log_format(LogFormatSetting::Json), LogFormat::Json);
        assert_eq!(log_format(LogFormatSetting::Pretty), LogFormat::Pretty);
        assert_eq!(log_format(LogFormatSetting::Auto), LogFormat::infer());
    }

    #[tokio::test]
    async fn demo_session_delivers_every_event_in_order() -> AppResult<()> {
        let report = run_demo(DemoOptions::new(BridgeSettings::default())).await?;
        assert_eq!(report.delivered, report.envelopes.len());
        let ids: Vec<u64> = report.envelopes.iter().map(|envelope| envelope.id).collect();
        let expected: Vec<u64> = (1..=ids.len() as u64).collect();
        assert_eq!(ids, expected);

        let kinds: Vec<&str> = report
            .envelopes
            .iter()
            .map(|envelope| envelope.event.kind())
            .collect();
        assert_eq!(kinds.first(), Some(&"OnSdkInitializedEvent"));
        assert!(kinds.contains(&"OnCmpCompletedEvent"));
        assert!(kinds.contains(&"OnRewardedAdReceivedRewardEvent"));
        assert_eq!(report.rewards.len(), 1);
        assert!(report.revenue > 0.0);
        assert!(report.failures.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failing_units_report_no_fill() -> AppResult<()> {
        let settings = BridgeSettings::default();
        let mut options = DemoOptions::new(settings.clone());
        options.failing_ad_units = vec![settings.ad_units.interstitial.clone()];
        let report = run_demo(options).await?;
        let topics: Vec<AdTopic> = report.failures.iter().map(|(topic, _)| *topic).collect();
        assert!(topics.contains(&AdTopic::INTERSTITIAL_LOAD_FAILED));
        assert!(topics.contains(&AdTopic::INTERSTITIAL_DISPLAY_FAILED));
        assert!(
            report
                .failures
                .iter()
                .any(|(_, error)| error.code == maxbridge_sdk::simulated::NO_FILL_ERROR_CODE)
        );
        Ok(())
    }
}
