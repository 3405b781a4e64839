//! Error types for the Inkly game server
//!
//! Domain failures surface as `InklyError`; configuration problems are kept in
//! their own enum so the loader can report the offending field.

/// Root error type for all Inkly operations
#[derive(Debug, thiserror::Error)]
pub enum InklyError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// A session can only be completed once
    #[error("Session already completed: {0}")]
    SessionAlreadyCompleted(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl InklyError {
    /// True for unknown player/session/room ids
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InklyError::PlayerNotFound(_) | InklyError::SessionNotFound(_) | InklyError::RoomNotFound(_)
        )
    }
}

/// Configuration and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue { field: String, value: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

// Convenience type alias for Results
pub type InklyResult<T> = Result<T, InklyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = InklyError::SessionNotFound("abc".to_string());
        assert!(err.to_string().contains("Session not found"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_invalid_value_details() {
        let err = ConfigurationError::InvalidValue {
            field: "server.port".to_string(),
            value: "0".to_string(),
            reason: "Port cannot be zero".to_string(),
        };

        assert!(err.to_string().contains("server.port"));
        assert!(err.to_string().contains("Port cannot be zero"));
    }

    #[test]
    fn test_error_conversion() {
        let config_error = ConfigurationError::LoadFailed("test".to_string());
        let err: InklyError = config_error.into();

        match err {
            InklyError::Configuration(_) => {}
            _ => panic!("Expected configuration error"),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(InklyError::PlayerNotFound("p".into()).is_not_found());
        assert!(InklyError::RoomNotFound("r".into()).is_not_found());
        assert!(!InklyError::SessionAlreadyCompleted("s".into()).is_not_found());
        assert!(!InklyError::InvalidInput("bad".into()).is_not_found());
    }
}
