use latchkey_storage::StorageError;
use thiserror::Error;

/// Errors returned by controller operations and commands.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Key store, config or media operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Credential id or label failed validation
    #[error(transparent)]
    Validation(#[from] latchkey_core::Error),

    /// Add mode requested while an enrollment window is already open
    #[error("Add mode already active")]
    AddModeActive,

    /// No chime with this name
    #[error("Unknown chime: {0}")]
    UnknownChime(String),

    /// HTTP path or MQTT payload that maps to no command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The controller stopped before answering
    #[error("Controller is not running")]
    ChannelClosed,
}

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;
