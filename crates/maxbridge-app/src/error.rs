//! # Design
//!
//! - Centralize application-level errors for the CLI commands.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading settings failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: maxbridge_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: maxbridge_telemetry::TelemetryError,
    },
    /// SDK facade operations failed.
    #[error("sdk operation failed")]
    Sdk {
        /// Operation identifier.
        operation: &'static str,
        /// Source SDK error.
        source: maxbridge_sdk::SdkError,
    },
    /// Subscribing to the broadcaster failed.
    #[error("event subscription failed")]
    Broadcast {
        /// Operation identifier.
        operation: &'static str,
        /// Source broadcast error.
        source: maxbridge_events::BroadcastError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// Serializing command output failed.
    #[error("failed to render output")]
    Render {
        /// Source serde error.
        source: serde_json::Error,
    },
    /// A command argument was invalid.
    #[error("invalid argument")]
    InvalidArgument {
        /// Argument name.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// The event name is not part of the MAX vocabulary.
    #[error("unknown event name")]
    UnknownEvent {
        /// Rejected name.
        name: String,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: maxbridge_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: maxbridge_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn sdk(operation: &'static str, source: maxbridge_sdk::SdkError) -> Self {
        Self::Sdk { operation, source }
    }

    pub(crate) const fn broadcast(
        operation: &'static str,
        source: maxbridge_events::BroadcastError,
    ) -> Self {
        Self::Broadcast { operation, source }
    }

    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }

    /// Process exit code: 2 for bad input, 3 for everything else.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. }
            | Self::Sdk { .. }
            | Self::InvalidArgument { .. }
            | Self::UnknownEvent { .. } => 2,
            Self::Telemetry { .. }
            | Self::Broadcast { .. }
            | Self::Io { .. }
            | Self::Render { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "settings.from_env",
            maxbridge_config::ConfigError::InvalidField {
                field: "MAXBRIDGE_QUEUE_CAPACITY",
                value: Some("0".to_string()),
                reason: "must be positive",
            },
        );
        assert!(matches!(config, AppError::Config { .. }));
        assert_eq!(config.exit_code(), 2);
        assert!(config.source().is_some());

        let sdk = AppError::sdk(
            "banner_position",
            maxbridge_sdk::SdkError::UnknownPosition {
                value: "middle".to_string(),
            },
        );
        assert!(matches!(sdk, AppError::Sdk { .. }));

        let io = AppError::io("stdin.read", io::Error::other("closed"));
        assert_eq!(io.to_string(), "io operation failed");
        assert_eq!(io.exit_code(), 3);
    }

    #[test]
    fn telemetry_errors_are_failures() {
        let telemetry = AppError::telemetry(
            "telemetry.init",
            maxbridge_telemetry::TelemetryError::UnknownLogFormat {
                value: "xml".to_string(),
            },
        );
        assert_eq!(telemetry.exit_code(), 3);
    }
}
