//! Closed vocabulary of event names raised by the native SDK plugins.
//!
//! Names are matched exactly and case-sensitively. Older plugin builds used a
//! few different spellings for interstitial and rewarded events; those resolve
//! to the same [`EventName`] as their current counterparts.

use serde::{Deserialize, Serialize};

use crate::error::TopicError;

/// Ad formats surfaced by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdFormat {
    /// Adaptive banner (or leader on tablets).
    Banner,
    /// 300x250 medium rectangle.
    MRec,
    /// Fullscreen interstitial.
    Interstitial,
    /// Fullscreen rewarded ad.
    Rewarded,
}

impl AdFormat {
    /// Every format, in declaration order.
    pub const ALL: [Self; 4] = [Self::Banner, Self::MRec, Self::Interstitial, Self::Rewarded];

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::MRec => "mrec",
            Self::Interstitial => "interstitial",
            Self::Rewarded => "rewarded",
        }
    }

    /// Whether the format is an embedded ad view rather than a fullscreen ad.
    #[must_use]
    pub const fn is_ad_view(self) -> bool {
        matches!(self, Self::Banner | Self::MRec)
    }
}

/// Lifecycle stage reported for an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdLifecycle {
    /// An ad finished loading.
    Loaded,
    /// Loading failed; carries an error.
    LoadFailed,
    /// The user clicked the ad.
    Clicked,
    /// An ad view expanded to fullscreen.
    Expanded,
    /// An expanded ad view collapsed.
    Collapsed,
    /// Impression-level revenue was reported.
    RevenuePaid,
    /// A fullscreen ad was displayed.
    Displayed,
    /// A fullscreen ad failed to display; carries an error.
    DisplayFailed,
    /// A fullscreen ad was dismissed.
    Hidden,
    /// The user earned a reward.
    ReceivedReward,
}

impl AdLifecycle {
    /// Whether events at this stage carry an [`AdError`](crate::AdError).
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::LoadFailed | Self::DisplayFailed)
    }
}

/// A supported `(format, lifecycle)` pair.
///
/// Only combinations the SDK actually emits can be constructed: expand and
/// collapse apply to ad views, display and hide to fullscreen formats, and
/// rewards to rewarded ads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "AdTopicParts", into = "AdTopicParts")]
pub struct AdTopic {
    format: AdFormat,
    lifecycle: AdLifecycle,
}

#[derive(Serialize, Deserialize)]
struct AdTopicParts {
    format: AdFormat,
    lifecycle: AdLifecycle,
}

impl From<AdTopic> for AdTopicParts {
    fn from(topic: AdTopic) -> Self {
        Self {
            format: topic.format,
            lifecycle: topic.lifecycle,
        }
    }
}

impl TryFrom<AdTopicParts> for AdTopic {
    type Error = TopicError;

    fn try_from(parts: AdTopicParts) -> Result<Self, Self::Error> {
        Self::new(parts.format, parts.lifecycle).ok_or(TopicError::Unsupported {
            format: parts.format,
            lifecycle: parts.lifecycle,
        })
    }
}

impl AdTopic {
    /// `OnBannerAdLoadedEvent`.
    pub const BANNER_LOADED: Self = Self::raw(AdFormat::Banner, AdLifecycle::Loaded);
    /// `OnBannerAdLoadFailedEvent`.
    pub const BANNER_LOAD_FAILED: Self = Self::raw(AdFormat::Banner, AdLifecycle::LoadFailed);
    /// `OnBannerAdClickedEvent`.
    pub const BANNER_CLICKED: Self = Self::raw(AdFormat::Banner, AdLifecycle::Clicked);
    /// `OnBannerAdExpandedEvent`.
    pub const BANNER_EXPANDED: Self = Self::raw(AdFormat::Banner, AdLifecycle::Expanded);
    /// `OnBannerAdCollapsedEvent`.
    pub const BANNER_COLLAPSED: Self = Self::raw(AdFormat::Banner, AdLifecycle::Collapsed);
    /// `OnBannerAdRevenuePaidEvent`.
    pub const BANNER_REVENUE_PAID: Self = Self::raw(AdFormat::Banner, AdLifecycle::RevenuePaid);

    /// `OnMRecAdLoadedEvent`.
    pub const MREC_LOADED: Self = Self::raw(AdFormat::MRec, AdLifecycle::Loaded);
    /// `OnMRecAdLoadFailedEvent`.
    pub const MREC_LOAD_FAILED: Self = Self::raw(AdFormat::MRec, AdLifecycle::LoadFailed);
    /// `OnMRecAdClickedEvent`.
    pub const MREC_CLICKED: Self = Self::raw(AdFormat::MRec, AdLifecycle::Clicked);
    /// `OnMRecAdExpandedEvent`.
    pub const MREC_EXPANDED: Self = Self::raw(AdFormat::MRec, AdLifecycle::Expanded);
    /// `OnMRecAdCollapsedEvent`.
    pub const MREC_COLLAPSED: Self = Self::raw(AdFormat::MRec, AdLifecycle::Collapsed);
    /// `OnMRecAdRevenuePaidEvent`.
    pub const MREC_REVENUE_PAID: Self = Self::raw(AdFormat::MRec, AdLifecycle::RevenuePaid);

    /// `OnInterstitialAdLoadedEvent`.
    pub const INTERSTITIAL_LOADED: Self = Self::raw(AdFormat::Interstitial, AdLifecycle::Loaded);
    /// `OnInterstitialAdLoadFailedEvent`.
    pub const INTERSTITIAL_LOAD_FAILED: Self =
        Self::raw(AdFormat::Interstitial, AdLifecycle::LoadFailed);
    /// `OnInterstitialAdDisplayedEvent`.
    pub const INTERSTITIAL_DISPLAYED: Self =
        Self::raw(AdFormat::Interstitial, AdLifecycle::Displayed);
    /// `OnInterstitialAdDisplayFailedEvent`.
    pub const INTERSTITIAL_DISPLAY_FAILED: Self =
        Self::raw(AdFormat::Interstitial, AdLifecycle::DisplayFailed);
    /// `OnInterstitialAdHiddenEvent`.
    pub const INTERSTITIAL_HIDDEN: Self = Self::raw(AdFormat::Interstitial, AdLifecycle::Hidden);
    /// `OnInterstitialAdClickedEvent`.
    pub const INTERSTITIAL_CLICKED: Self = Self::raw(AdFormat::Interstitial, AdLifecycle::Clicked);
    /// `OnInterstitialAdRevenuePaidEvent`.
    pub const INTERSTITIAL_REVENUE_PAID: Self =
        Self::raw(AdFormat::Interstitial, AdLifecycle::RevenuePaid);

    /// `OnRewardedAdLoadedEvent`.
    pub const REWARDED_LOADED: Self = Self::raw(AdFormat::Rewarded, AdLifecycle::Loaded);
    /// `OnRewardedAdLoadFailedEvent`.
    pub const REWARDED_LOAD_FAILED: Self = Self::raw(AdFormat::Rewarded, AdLifecycle::LoadFailed);
    /// `OnRewardedAdDisplayedEvent`.
    pub const REWARDED_DISPLAYED: Self = Self::raw(AdFormat::Rewarded, AdLifecycle::Displayed);
    /// `OnRewardedAdDisplayFailedEvent`.
    pub const REWARDED_DISPLAY_FAILED: Self =
        Self::raw(AdFormat::Rewarded, AdLifecycle::DisplayFailed);
    /// `OnRewardedAdHiddenEvent`.
    pub const REWARDED_HIDDEN: Self = Self::raw(AdFormat::Rewarded, AdLifecycle::Hidden);
    /// `OnRewardedAdClickedEvent`.
    pub const REWARDED_CLICKED: Self = Self::raw(AdFormat::Rewarded, AdLifecycle::Clicked);
    /// `OnRewardedAdRevenuePaidEvent`.
    pub const REWARDED_REVENUE_PAID: Self = Self::raw(AdFormat::Rewarded, AdLifecycle::RevenuePaid);
    /// `OnRewardedAdReceivedRewardEvent`.
    pub const REWARDED_RECEIVED_REWARD: Self =
        Self::raw(AdFormat::Rewarded, AdLifecycle::ReceivedReward);

    const fn raw(format: AdFormat, lifecycle: AdLifecycle) -> Self {
        Self { format, lifecycle }
    }

    /// Build a topic, returning `None` for combinations the SDK never emits.
    #[must_use]
    pub const fn new(format: AdFormat, lifecycle: AdLifecycle) -> Option<Self> {
        let supported = match lifecycle {
            AdLifecycle::Loaded
            | AdLifecycle::LoadFailed
            | AdLifecycle::Clicked
            | AdLifecycle::RevenuePaid => true,
            AdLifecycle::Expanded | AdLifecycle::Collapsed => format.is_ad_view(),
            AdLifecycle::Displayed | AdLifecycle::DisplayFailed | AdLifecycle::Hidden => {
                !format.is_ad_view()
            }
            AdLifecycle::ReceivedReward => matches!(format, AdFormat::Rewarded),
        };
        if supported {
            Some(Self::raw(format, lifecycle))
        } else {
            None
        }
    }

    /// Ad format of the topic.
    #[must_use]
    pub const fn format(self) -> AdFormat {
        self.format
    }

    /// Lifecycle stage of the topic.
    #[must_use]
    pub const fn lifecycle(self) -> AdLifecycle {
        self.lifecycle
    }

    /// Canonical event name for the topic.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        EventName::Ad(self).as_str()
    }

    /// Every supported topic in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        EVENT_NAMES.iter().filter_map(|(_, name)| match name {
            EventName::Ad(topic) => Some(*topic),
            EventName::SdkInitialized | EventName::CmpCompleted => None,
        })
    }
}

/// Parsed native event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// SDK finished initializing.
    SdkInitialized,
    /// Consent management flow completed.
    CmpCompleted,
    /// Ad lifecycle event.
    Ad(AdTopic),
}

const fn ad(topic: AdTopic) -> EventName {
    EventName::Ad(topic)
}

/// Current event names, one per [`EventName`].
const EVENT_NAMES: &[(&str, EventName)] = &[
    ("OnSdkInitializedEvent", EventName::SdkInitialized),
    ("OnCmpCompletedEvent", EventName::CmpCompleted),
    ("OnBannerAdLoadedEvent", ad(AdTopic::BANNER_LOADED)),
    ("OnBannerAdLoadFailedEvent", ad(AdTopic::BANNER_LOAD_FAILED)),
    ("OnBannerAdClickedEvent", ad(AdTopic::BANNER_CLICKED)),
    ("OnBannerAdExpandedEvent", ad(AdTopic::BANNER_EXPANDED)),
    ("OnBannerAdCollapsedEvent", ad(AdTopic::BANNER_COLLAPSED)),
    ("OnBannerAdRevenuePaidEvent", ad(AdTopic::BANNER_REVENUE_PAID)),
    ("OnMRecAdLoadedEvent", ad(AdTopic::MREC_LOADED)),
    ("OnMRecAdLoadFailedEvent", ad(AdTopic::MREC_LOAD_FAILED)),
    ("OnMRecAdClickedEvent", ad(AdTopic::MREC_CLICKED)),
    ("OnMRecAdExpandedEvent", ad(AdTopic::MREC_EXPANDED)),
    ("OnMRecAdCollapsedEvent", ad(AdTopic::MREC_COLLAPSED)),
    ("OnMRecAdRevenuePaidEvent", ad(AdTopic::MREC_REVENUE_PAID)),
    ("OnInterstitialAdLoadedEvent", ad(AdTopic::INTERSTITIAL_LOADED)),
    ("OnInterstitialAdLoadFailedEvent", ad(AdTopic::INTERSTITIAL_LOAD_FAILED)),
    ("OnInterstitialAdDisplayedEvent", ad(AdTopic::INTERSTITIAL_DISPLAYED)),
    ("OnInterstitialAdDisplayFailedEvent", ad(AdTopic::INTERSTITIAL_DISPLAY_FAILED)),
    ("OnInterstitialAdHiddenEvent", ad(AdTopic::INTERSTITIAL_HIDDEN)),
    ("OnInterstitialAdClickedEvent", ad(AdTopic::INTERSTITIAL_CLICKED)),
    ("OnInterstitialAdRevenuePaidEvent", ad(AdTopic::INTERSTITIAL_REVENUE_PAID)),
    ("OnRewardedAdLoadedEvent", ad(AdTopic::REWARDED_LOADED)),
    ("OnRewardedAdLoadFailedEvent", ad(AdTopic::REWARDED_LOAD_FAILED)),
    ("OnRewardedAdDisplayedEvent", ad(AdTopic::REWARDED_DISPLAYED)),
    ("OnRewardedAdDisplayFailedEvent", ad(AdTopic::REWARDED_DISPLAY_FAILED)),
    ("OnRewardedAdHiddenEvent", ad(AdTopic::REWARDED_HIDDEN)),
    ("OnRewardedAdClickedEvent", ad(AdTopic::REWARDED_CLICKED)),
    ("OnRewardedAdRevenuePaidEvent", ad(AdTopic::REWARDED_REVENUE_PAID)),
    ("OnRewardedAdReceivedRewardEvent", ad(AdTopic::REWARDED_RECEIVED_REWARD)),
];

/// Spellings emitted by older plugin builds.
const LEGACY_EVENT_NAMES: &[(&str, EventName)] = &[
    ("OnInterstitialLoadedEvent", ad(AdTopic::INTERSTITIAL_LOADED)),
    ("OnInterstitialLoadFailedEvent", ad(AdTopic::INTERSTITIAL_LOAD_FAILED)),
    ("OnInterstitialDisplayedEvent", ad(AdTopic::INTERSTITIAL_DISPLAYED)),
    ("OnInterstitialAdFailedToDisplayEvent", ad(AdTopic::INTERSTITIAL_DISPLAY_FAILED)),
    ("OnInterstitialHiddenEvent", ad(AdTopic::INTERSTITIAL_HIDDEN)),
    ("OnInterstitialClickedEvent", ad(AdTopic::INTERSTITIAL_CLICKED)),
    ("OnRewardedAdFailedToDisplayEvent", ad(AdTopic::REWARDED_DISPLAY_FAILED)),
];

impl EventName {
    /// Resolve a native event name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        EVENT_NAMES
            .iter()
            .chain(LEGACY_EVENT_NAMES)
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, parsed)| *parsed)
    }

    /// Current canonical spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        EVENT_NAMES
            .iter()
            .find(|(_, candidate)| *candidate == self)
            .map_or("OnUnknownEvent", |(name, _)| *name)
    }

    /// Every canonical name.
    pub fn canonical_names() -> impl Iterator<Item = &'static str> {
        EVENT_NAMES.iter().map(|(name, _)| *name)
    }
}
