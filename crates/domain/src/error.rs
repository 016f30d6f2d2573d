//! Error types for the domain layer.

use thiserror::Error;

/// Errors produced by domain-level parsing and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The caller named a platform outside the supported set.
    #[error("Unsupported platform: {0}")]
    UnknownPlatform(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_platform_message_carries_input() {
        let err = DomainError::UnknownPlatform("minecraft".to_string());
        assert_eq!(err.to_string(), "Unsupported platform: minecraft");
    }
}
