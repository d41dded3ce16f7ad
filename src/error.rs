//! Error types for signcap.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigncapError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Wire input errors
    #[error("Malformed message: {message}")]
    MalformedMessage { message: String },

    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String },

    #[error("Unknown phrase token: {token}")]
    UnknownToken { token: String },

    // Server errors
    #[error("Server error: {message}")]
    Server { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SigncapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = SigncapError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = SigncapError::ConfigInvalidValue {
            key: "gate.conf_med".to_string(),
            message: "must not exceed gate.conf_high".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for gate.conf_med: must not exceed gate.conf_high"
        );
    }

    #[test]
    fn test_malformed_frame_display() {
        let error = SigncapError::MalformedFrame {
            message: "3 hands in one frame".to_string(),
        };
        assert_eq!(error.to_string(), "Malformed frame: 3 hands in one frame");
    }

    #[test]
    fn test_unknown_token_display() {
        let error = SigncapError::UnknownToken {
            token: "GOODBYE".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown phrase token: GOODBYE");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::AddrInUse, "address in use");
        let error: SigncapError = io_error.into();
        assert!(error.to_string().contains("address in use"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: SigncapError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SigncapError>();
        assert_sync::<SigncapError>();
    }
}
