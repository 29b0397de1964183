//! Error types for the SDK facade.

use thiserror::Error;

/// Failures surfaced by the facade. Ad calls themselves never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// A native plugin was already installed for this process.
    #[error("native plugin already installed")]
    PluginAlreadyInstalled,
    /// Position text did not match any known position.
    #[error("unknown ad view position")]
    UnknownPosition {
        /// Rejected input.
        value: String,
    },
    /// Geography text did not match any known geography.
    #[error("unknown consent flow user geography")]
    UnknownGeography {
        /// Rejected input.
        value: String,
    },
}

/// Convenience alias for facade results.
pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_constant() {
        assert_eq!(
            SdkError::PluginAlreadyInstalled.to_string(),
            "native plugin already installed"
        );
        assert_eq!(
            SdkError::UnknownPosition {
                value: "middle".into()
            }
            .to_string(),
            "unknown ad view position"
        );
    }
}
