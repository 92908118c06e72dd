//! Error types for Deskmate.
//!
//! These types implement the necessary traits to be returned from Tauri commands.

use deskmate_core::config::ConfigError;
use deskmate_core::{BridgeError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during application execution.
///
/// Serializes as `{ "kind": ..., "message": ... }` so the web view can
/// branch on the kind.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum DeskmateError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Data file could not be read or written.
    #[error("Store error: {0}")]
    StoreError(String),
    /// A native API call failed.
    #[error("Platform error: {0}")]
    PlatformError(String),
    /// Accessibility access is missing.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// No widget is registered under the window label.
    #[error("Widget not found: {0}")]
    WidgetNotFound(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for DeskmateError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for DeskmateError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<String> for DeskmateError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for DeskmateError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

impl From<StoreError> for DeskmateError {
    fn from(err: StoreError) -> Self { Self::StoreError(err.to_string()) }
}

impl From<ConfigError> for DeskmateError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<BridgeError> for DeskmateError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            BridgeError::WindowNotFound(label) => Self::WidgetNotFound(label),
            BridgeError::Store(err) => err.into(),
            BridgeError::Io(err) => err.into(),
            other => Self::PlatformError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_display() {
        let err = DeskmateError::InvalidArguments("Unknown anchor 'north'".to_string());
        assert_eq!(err.to_string(), "Unknown anchor 'north'");
    }

    #[test]
    fn test_store_error_display() {
        let err = DeskmateError::StoreError("disk full".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Store error"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: DeskmateError = io_err.into();
        assert!(matches!(err, DeskmateError::IoError(_)));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_string_conversions() {
        let from_string: DeskmateError = String::from("boom").into();
        let from_str: DeskmateError = "boom".into();
        assert!(matches!(from_string, DeskmateError::CommandError(ref m) if m == "boom"));
        assert!(matches!(from_str, DeskmateError::CommandError(ref m) if m == "boom"));
    }

    #[test]
    fn test_permission_denied_maps_from_bridge() {
        let err: DeskmateError = BridgeError::PermissionDenied("no access".to_string()).into();
        assert!(matches!(err, DeskmateError::PermissionDenied(ref m) if m == "no access"));
    }

    #[test]
    fn test_unavailable_maps_to_platform_error() {
        let err: DeskmateError = BridgeError::Unavailable("no connection".to_string()).into();
        assert!(matches!(err, DeskmateError::PlatformError(_)));
        assert!(err.to_string().contains("no connection"));
    }

    #[test]
    fn test_store_error_unwraps_from_bridge() {
        let err: DeskmateError = BridgeError::Store(StoreError::NoDataDir).into();
        assert!(matches!(err, DeskmateError::StoreError(_)));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: DeskmateError = ConfigError::NotFound.into();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_serializes_with_kind_and_message() {
        let err = DeskmateError::WidgetNotFound("monitor-2".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "WidgetNotFound");
        assert_eq!(json["message"], "monitor-2");
    }
}
