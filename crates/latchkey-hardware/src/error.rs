//! Error types for hardware operations.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while talking to peripherals.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The scan queue is full and the credential was dropped.
    #[error("Scan queue full, dropped credential {number}")]
    QueueFull { number: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("Wiegand reader");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: Wiegand reader");
    }

    #[test]
    fn test_queue_full_error() {
        let error = HardwareError::QueueFull {
            number: "12345".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Scan queue full, dropped credential 12345"
        );
    }
}
