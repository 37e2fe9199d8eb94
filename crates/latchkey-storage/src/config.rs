//! Controller configuration file (`dl32.cfg`).
//!
//! Network credentials are kept for the HTTP and MQTT collaborators; every
//! behaviour field has a default so a minimal file, or none at all, yields a
//! working controller.

use crate::error::{StorageError, StorageResult};
use crate::files::{read_json, write_json_atomic};
use latchkey_core::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Persisted controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// WiFi network name
    pub wifi_ssid: String,

    /// WiFi password
    pub wifi_pass: String,

    /// MQTT client id
    pub mqtt_clid: String,

    /// MQTT broker host
    pub mqtt_brok: String,

    /// MQTT broker port
    pub mqtt_port: u16,

    /// MQTT user name
    pub mqtt_user: String,

    /// MQTT password
    pub mqtt_pass: String,

    /// Topic commands are received on
    pub mqtt_cmd_top: String,

    /// Topic status messages are published to
    pub mqtt_sta_top: String,

    /// Port of the local web UI
    pub web_port: u16,

    /// Whether the physical bell button rings the chime
    pub doorbell: bool,

    /// Suppress all buzzer output
    pub silent_mode: bool,

    /// Use `garage_ms` for every unlock trigger (gate/garage openers)
    pub garage_mode: bool,

    /// Name used in sensor status messages ("Door sensor opened")
    pub opening_name: String,

    /// Chime played by the bell
    pub chime: String,

    pub exit_button_ms: u64,
    pub http_ms: u64,
    pub credential_ms: u64,
    pub mqtt_ms: u64,
    pub garage_ms: u64,

    /// Length of the add-mode enrollment window
    pub add_mode_window_ms: u64,

    /// Number of wait ticks the window is divided into
    pub add_mode_intervals: u32,

    /// Hold time that turns a press into a long press
    pub long_press_ms: u64,

    /// Event loop cadence
    pub tick_ms: u64,

    /// Keep-alive status interval, 0 disables it
    pub heartbeat_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_pass: String::new(),
            mqtt_clid: "latchkey".to_string(),
            mqtt_brok: String::new(),
            mqtt_port: DEFAULT_MQTT_PORT,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
            mqtt_cmd_top: "latchkey/cmd".to_string(),
            mqtt_sta_top: "latchkey/status".to_string(),
            web_port: DEFAULT_WEB_PORT,
            doorbell: true,
            silent_mode: false,
            garage_mode: false,
            opening_name: "Door".to_string(),
            chime: "classic".to_string(),
            exit_button_ms: DEFAULT_EXIT_BUTTON_UNLOCK_MS,
            http_ms: DEFAULT_HTTP_UNLOCK_MS,
            credential_ms: DEFAULT_CREDENTIAL_UNLOCK_MS,
            mqtt_ms: DEFAULT_MQTT_UNLOCK_MS,
            garage_ms: DEFAULT_GARAGE_UNLOCK_MS,
            add_mode_window_ms: DEFAULT_ADD_MODE_WINDOW_MS,
            add_mode_intervals: DEFAULT_ADD_MODE_INTERVALS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            tick_ms: DEFAULT_TICK_MS,
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
        }
    }
}

impl ControllerConfig {
    /// Read the configuration from `path`.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let config: Self = read_json(path)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Read the configuration, falling back to defaults.
    ///
    /// A missing file is not an error. Any other failure is returned next to
    /// the defaults so the caller can report it.
    pub fn load_or_default(path: &Path) -> (Self, Option<StorageError>) {
        if !path.exists() {
            info!(path = %path.display(), "no configuration file, using defaults");
            return (Self::default(), None);
        }

        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => {
                warn!(error = %e, "failed to load configuration, using defaults");
                (Self::default(), Some(e))
            }
        }
    }

    /// Write the configuration to `path`.
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        write_json_atomic(path, self)
    }

    /// Set whether the bell button rings
    pub fn doorbell(mut self, enabled: bool) -> Self {
        self.doorbell = enabled;
        self
    }

    /// Set silent mode
    pub fn silent_mode(mut self, silent: bool) -> Self {
        self.silent_mode = silent;
        self
    }

    /// Set garage mode
    pub fn garage_mode(mut self, enabled: bool) -> Self {
        self.garage_mode = enabled;
        self
    }

    /// Set the opening name used in sensor reports
    pub fn opening_name(mut self, name: impl Into<String>) -> Self {
        self.opening_name = name.into();
        self
    }

    /// Set the chime played by the bell
    pub fn chime(mut self, chime: impl Into<String>) -> Self {
        self.chime = chime.into();
        self
    }

    /// Set the add-mode window and how many wait ticks it is split into
    pub fn add_mode(mut self, window_ms: u64, intervals: u32) -> Self {
        self.add_mode_window_ms = window_ms;
        self.add_mode_intervals = intervals;
        self
    }

    /// Set the keep-alive interval
    pub fn heartbeat_secs(mut self, secs: u64) -> Self {
        self.heartbeat_secs = secs;
        self
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn add_mode_window(&self) -> Duration {
        Duration::from_millis(self.add_mode_window_ms)
    }

    /// Keep-alive interval, `None` when disabled.
    pub fn heartbeat(&self) -> Option<Duration> {
        (self.heartbeat_secs > 0).then(|| Duration::from_secs(self.heartbeat_secs))
    }
}
