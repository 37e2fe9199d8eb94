//! Controller-wide constants.
//!
//! Default timings match the behaviour of the deployed DL32 boards: the
//! values below are what a controller uses when `dl32.cfg` does not
//! override them.
//!
//! # Usage
//!
//! ```
//! use latchkey_core::constants::*;
//! use std::time::Duration;
//!
//! assert!(MIN_CREDENTIAL_LENGTH <= MAX_CREDENTIAL_LENGTH);
//!
//! let sample = Duration::from_millis(DEBOUNCE_SAMPLE_MS);
//! assert_eq!(sample.as_millis(), 10);
//! ```

// ============================================================================
// Key store validation
// ============================================================================

/// Shortest credential id accepted by the key store.
pub const MIN_CREDENTIAL_LENGTH: usize = 2;

/// Longest credential id accepted by the key store.
pub const MAX_CREDENTIAL_LENGTH: usize = 6;

/// Shortest key label (labels are never empty).
pub const MIN_LABEL_LENGTH: usize = 1;

/// Longest key label, in characters.
///
/// An enrollment timestamp (`YYYYMMDD_HHMMSS`) is exactly this long.
pub const MAX_LABEL_LENGTH: usize = 15;

/// `chrono` format of the label given to freshly enrolled keys.
pub const ENROLLMENT_LABEL_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `chrono` format of the suffix appended to a file before it is replaced.
pub const BACKUP_SUFFIX_FORMAT: &str = "%Y%m%d_%H%M%S";

// ============================================================================
// Persisted files
// ============================================================================

/// Canonical file name of the credential store.
pub const KEYS_FILE_NAME: &str = "keys.cfg";

/// Canonical file name of the controller configuration.
pub const CONFIG_FILE_NAME: &str = "dl32.cfg";

// ============================================================================
// Unlock durations (milliseconds)
// ============================================================================

/// Unlock duration after an exit-button press.
pub const DEFAULT_EXIT_BUTTON_UNLOCK_MS: u64 = 5_000;

/// Unlock duration for an HTTP request.
pub const DEFAULT_HTTP_UNLOCK_MS: u64 = 10_000;

/// Unlock duration for an authorized credential scan.
pub const DEFAULT_CREDENTIAL_UNLOCK_MS: u64 = 5_000;

/// Unlock duration for an MQTT command.
pub const DEFAULT_MQTT_UNLOCK_MS: u64 = 10_000;

/// Unlock duration applied to every trigger source in garage mode.
pub const DEFAULT_GARAGE_UNLOCK_MS: u64 = 500;

// ============================================================================
// Event loop and inputs
// ============================================================================

/// Cadence of one event loop tick.
pub const DEFAULT_TICK_MS: u64 = 50;

/// Sub-interval at which a pressed button is re-sampled.
pub const DEBOUNCE_SAMPLE_MS: u64 = 10;

/// Hold time separating a short press from a long press.
pub const DEFAULT_LONG_PRESS_MS: u64 = 2_000;

/// Total length of the add-mode enrollment window.
pub const DEFAULT_ADD_MODE_WINDOW_MS: u64 = 15_000;

/// Number of add-mode ticks the enrollment window is split into.
pub const DEFAULT_ADD_MODE_INTERVALS: u32 = 10;

/// Keep-alive status period. Zero disables the heartbeat.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 0;

// ============================================================================
// Network defaults
// ============================================================================

/// Default MQTT broker port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default port of the local web UI.
pub const DEFAULT_WEB_PORT: u16 = 80;
