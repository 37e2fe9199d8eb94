//! Runtime settings shared by the controller components.
//!
//! Built once at boot from [`ControllerConfig`]. The only field that changes
//! at runtime is the selected chime.

use crate::chime::Chime;
use crate::error::{ControllerError, Result};
use latchkey_core::UnlockDurations;
use latchkey_storage::ControllerConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Longest add-mode window honoured; longer configured windows are clamped.
pub const MAX_ADD_MODE_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct Context {
    durations: UnlockDurations,
    garage_mode: bool,
    silent: bool,
    doorbell: bool,
    opening: String,
    chime: Chime,
    tick: Duration,
    long_press: Duration,
    add_mode_window: Duration,
    add_mode_intervals: u32,
    heartbeat: Option<Duration>,
}

impl Context {
    /// Derive the runtime context from the persisted configuration.
    ///
    /// Garage mode replaces every unlock duration with `garage_ms`. An
    /// unknown chime name falls back to the classic bell.
    pub fn from_config(config: &ControllerConfig) -> Self {
        let durations = if config.garage_mode {
            info!(ms = config.garage_ms, "garage mode, using one unlock duration for all triggers");
            UnlockDurations::uniform(Duration::from_millis(config.garage_ms))
        } else {
            UnlockDurations {
                exit_button: Duration::from_millis(config.exit_button_ms),
                http: Duration::from_millis(config.http_ms),
                mqtt: Duration::from_millis(config.mqtt_ms),
                credential: Duration::from_millis(config.credential_ms),
            }
        };

        let chime = Chime::by_name(&config.chime).unwrap_or_else(|| {
            warn!(chime = %config.chime, "unknown chime in configuration, using classic");
            Chime::CLASSIC
        });

        Self {
            durations,
            garage_mode: config.garage_mode,
            silent: config.silent_mode,
            doorbell: config.doorbell,
            opening: config.opening_name.clone(),
            chime,
            tick: config.tick(),
            long_press: config.long_press(),
            add_mode_window: clamp_add_mode_window(config.add_mode_window()),
            add_mode_intervals: config.add_mode_intervals.max(1),
            heartbeat: config.heartbeat(),
        }
    }

    pub fn durations(&self) -> &UnlockDurations {
        &self.durations
    }

    pub fn is_garage_mode(&self) -> bool {
        self.garage_mode
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Whether the physical bell button rings the chime.
    pub fn doorbell_enabled(&self) -> bool {
        self.doorbell
    }

    /// Name of the opening used in sensor reports.
    pub fn opening(&self) -> &str {
        &self.opening
    }

    pub fn chime(&self) -> Chime {
        self.chime
    }

    /// Select the chime by name.
    pub fn set_chime(&mut self, name: &str) -> Result<()> {
        let chime =
            Chime::by_name(name).ok_or_else(|| ControllerError::UnknownChime(name.to_string()))?;
        self.chime = chime;
        info!(chime = chime.name, "chime selected");
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn long_press(&self) -> Duration {
        self.long_press
    }

    /// Number of wait ticks in an add-mode window.
    pub fn add_mode_intervals(&self) -> u32 {
        self.add_mode_intervals
    }

    /// Time between add-mode wait ticks.
    pub fn add_mode_interval(&self) -> Duration {
        self.add_mode_window / self.add_mode_intervals
    }

    pub fn heartbeat(&self) -> Option<Duration> {
        self.heartbeat
    }
}

fn clamp_add_mode_window(window: Duration) -> Duration {
    if window > MAX_ADD_MODE_WINDOW {
        warn!(ms = window.as_millis() as u64, "add-mode window too long, clamping");
        return MAX_ADD_MODE_WINDOW;
    }
    window
}

impl Default for Context {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::TriggerSource;

    #[test]
    fn test_default_durations() {
        let context = Context::default();
        let durations = context.durations();
        assert_eq!(durations.for_source(TriggerSource::ExitButton), Duration::from_secs(5));
        assert_eq!(durations.for_source(TriggerSource::Http), Duration::from_secs(10));
        assert_eq!(durations.for_source(TriggerSource::Mqtt), Duration::from_secs(10));
        assert_eq!(durations.for_source(TriggerSource::Credential), Duration::from_secs(5));
        assert_eq!(context.add_mode_interval(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_garage_mode_overrides_all_durations() {
        let context = Context::from_config(&ControllerConfig::default().garage_mode(true));
        assert!(context.is_garage_mode());
        assert_eq!(
            *context.durations(),
            UnlockDurations::uniform(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_set_chime() {
        let mut context = Context::default();
        assert_eq!(context.chime(), Chime::CLASSIC);

        context.set_chime("westminster").unwrap();
        assert_eq!(context.chime(), Chime::WESTMINSTER);

        let result = context.set_chime("foghorn");
        assert!(matches!(result, Err(ControllerError::UnknownChime(_))));
        assert_eq!(context.chime(), Chime::WESTMINSTER);
    }

    #[test]
    fn test_unknown_configured_chime_falls_back() {
        let context = Context::from_config(&ControllerConfig::default().chime("foghorn"));
        assert_eq!(context.chime(), Chime::CLASSIC);
    }

    #[test]
    fn test_oversized_add_mode_window_clamped() {
        let context = Context::from_config(&ControllerConfig::default().add_mode(u64::MAX, 4));
        assert_eq!(context.add_mode_interval(), MAX_ADD_MODE_WINDOW / 4);
    }

    #[test]
    fn test_zero_intervals_clamped() {
        let context = Context::from_config(&ControllerConfig::default().add_mode(1_000, 0));
        assert_eq!(context.add_mode_intervals(), 1);
        assert_eq!(context.add_mode_interval(), Duration::from_secs(1));
    }
}
