//! Error types for the core engine.

use thiserror::Error;

/// Errors reported by platform capability calls.
///
/// The engine treats every one of these as transient: it logs and carries
/// on with its last known state.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The OS query returned nothing usable (e.g. no window server connection).
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// A permission-gated capability was called without the permission.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The widget window no longer exists.
    #[error("window not found: {0}")]
    WindowNotFound(String),
    /// The requested workspace is not known to the OS.
    #[error("unknown workspace: {0}")]
    UnknownWorkspace(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for capability calls.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors from reading or writing the data file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode data file: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no data directory available")]
    NoDataDir,
    /// A context index that is not in the workspace's history.
    #[error("no saved context {index} for workspace {workspace}")]
    ContextNotFound { workspace: i64, index: usize },
}
