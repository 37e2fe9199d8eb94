//! Peripheral trait definitions.
//!
//! These traits are the contract between the controller core and the board.
//! Real boards implement them over GPIO/PWM drivers; the [`mock`](crate::mock)
//! module implements them for tests.

use crate::types::LedColor;

/// A digital input sampled by the event loop.
///
/// Buttons and the door reed switch are wired with pull-ups, so the
/// asserted (pressed / closed) level is low.
pub trait InputPin: Send {
    /// Returns `true` while the input is pulled low.
    fn is_low(&self) -> bool;

    /// Returns `true` while the input is high.
    fn is_high(&self) -> bool {
        !self.is_low()
    }
}

/// A digital output, such as the lock relay.
pub trait OutputPin: Send {
    /// Drive the output high (relay energized).
    fn set_high(&mut self);

    /// Drive the output low (relay released).
    fn set_low(&mut self);

    /// Returns `true` if the output is currently driven high.
    fn is_set_high(&self) -> bool;
}

/// Piezo buzzer driven by a PWM channel.
///
/// Shared between the blocking feedback patterns and the chime task, so
/// methods take `&self`; implementations use interior mutability.
pub trait Buzzer: Send + Sync {
    /// Start sounding at `frequency_hz`.
    fn tone(&self, frequency_hz: u32);

    /// Stop sounding.
    fn silence(&self);
}

/// Status indicator LED.
pub trait Indicator: Send {
    /// Show `color`.
    fn set_color(&mut self, color: LedColor);
}

/// Hardware watchdog that resets the board unless fed periodically.
pub trait Watchdog: Send {
    /// Restart the watchdog countdown.
    fn feed(&mut self);
}

impl<T: InputPin + ?Sized> InputPin for Box<T> {
    fn is_low(&self) -> bool {
        (**self).is_low()
    }
}

impl<T: OutputPin + ?Sized> OutputPin for Box<T> {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }

    fn is_set_high(&self) -> bool {
        (**self).is_set_high()
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set_color(&mut self, color: LedColor) {
        (**self).set_color(color);
    }
}

impl<T: Watchdog + ?Sized> Watchdog for Box<T> {
    fn feed(&mut self) {
        (**self).feed();
    }
}
