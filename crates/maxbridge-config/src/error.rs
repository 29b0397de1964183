//! Error types for configuration operations.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Environment variable or field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.to_string()),
            reason,
        }
    }
}

/// Convenience result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_keeps_context_out_of_message() {
        let err = ConfigError::invalid("MAXBRIDGE_QUEUE_CAPACITY", "0", "must be positive");
        assert_eq!(err.to_string(), "invalid configuration field");
        let ConfigError::InvalidField {
            field,
            value,
            reason,
        } = err;
        assert_eq!(field, "MAXBRIDGE_QUEUE_CAPACITY");
        assert_eq!(value.as_deref(), Some("0"));
        assert_eq!(reason, "must be positive");
    }
}
