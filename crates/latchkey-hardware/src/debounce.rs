//! Debounced push-button monitor.
//!
//! A button is sampled once per controller tick. When it is found asserted,
//! the monitor keeps sampling every [`SAMPLE_INTERVAL`] until the button is
//! released or the hold time exceeds the long-press threshold. The sub-loop
//! blocks the caller for at most the threshold plus one sample.

use crate::traits::InputPin;
use latchkey_core::constants::DEBOUNCE_SAMPLE_MS;
use std::time::Duration;
use tracing::{debug, trace};

/// Interval between samples while a press is being timed.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(DEBOUNCE_SAMPLE_MS);

/// Classification of one poll of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// Button not asserted, or still held after a long press was reported.
    None,

    /// Released before the long-press threshold.
    ShortPress,

    /// Held for longer than the long-press threshold.
    LongPress,
}

/// Active-low input classified into short and long presses.
pub struct DebouncedInput<P> {
    name: &'static str,
    pin: P,
    long_press: Duration,
    // Set after a LongPress so one continuous hold reports only once.
    latched: bool,
}

impl<P: InputPin> DebouncedInput<P> {
    /// Wrap `pin`, reporting [`Press::LongPress`] for holds longer than `long_press`.
    pub fn new(name: &'static str, pin: P, long_press: Duration) -> Self {
        Self {
            name,
            pin,
            long_press,
            latched: false,
        }
    }

    /// Name used in log output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Long-press threshold.
    pub fn long_press(&self) -> Duration {
        self.long_press
    }

    /// Sample the input and, if asserted, time the press.
    pub async fn poll(&mut self) -> Press {
        if !self.pin.is_low() {
            self.latched = false;
            return Press::None;
        }

        if self.latched {
            trace!(button = self.name, "still held after long press");
            return Press::None;
        }

        let mut held = Duration::ZERO;
        while self.pin.is_low() && held <= self.long_press {
            tokio::time::sleep(SAMPLE_INTERVAL).await;
            held += SAMPLE_INTERVAL;
        }

        if held > self.long_press {
            debug!(button = self.name, held_ms = held.as_millis() as u64, "long press");
            self.latched = true;
            Press::LongPress
        } else {
            debug!(button = self.name, held_ms = held.as_millis() as u64, "short press");
            Press::ShortPress
        }
    }

    /// Raw level, without debouncing.
    pub fn is_asserted(&self) -> bool {
        self.pin.is_low()
    }
}
