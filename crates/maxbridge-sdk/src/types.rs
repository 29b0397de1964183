//! Values converted to their native string form at the plugin boundary.

use std::fmt;
use std::str::FromStr;

use maxbridge_events::ConsentFlowUserGeography;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Anchor for banner and MREC views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdViewPosition {
    /// Top left corner.
    TopLeft,
    /// Top edge, horizontally centered.
    TopCenter,
    /// Top right corner.
    TopRight,
    /// Center of the screen.
    Centered,
    /// Left edge, vertically centered.
    CenterLeft,
    /// Right edge, vertically centered.
    CenterRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom edge, horizontally centered.
    BottomCenter,
    /// Bottom right corner.
    BottomRight,
}

impl AdViewPosition {
    /// Every position.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::Centered,
        Self::CenterLeft,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Native spelling, e.g. `top_center`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopCenter => "top_center",
            Self::TopRight => "top_right",
            Self::Centered => "centered",
            Self::CenterLeft => "center_left",
            Self::CenterRight => "center_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomCenter => "bottom_center",
            Self::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for AdViewPosition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for AdViewPosition {
    type Err = SdkError;

    fn from_str(value: &str) -> SdkResult<Self> {
        Self::ALL
            .into_iter()
            .find(|position| position.as_str() == value)
            .ok_or_else(|| SdkError::UnknownPosition {
                value: value.to_string(),
            })
    }
}

/// RGBA color for banner backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// `#AARRGGBB`, uppercase, as the native plugins expect.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

/// Parse the native geography constant (`UNKNOWN`, `GDPR`, `OTHER`).
///
/// # Errors
///
/// Returns [`SdkError::UnknownGeography`] for anything else.
pub fn parse_geography(value: &str) -> SdkResult<ConsentFlowUserGeography> {
    [
        ConsentFlowUserGeography::Unknown,
        ConsentFlowUserGeography::Gdpr,
        ConsentFlowUserGeography::Other,
    ]
    .into_iter()
    .find(|geography| geography.native_name().eq_ignore_ascii_case(value))
    .ok_or_else(|| SdkError::UnknownGeography {
        value: value.to_string(),
    })
}
