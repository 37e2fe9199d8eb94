//! Hardware abstraction layer for the Latchkey access controller.
//!
//! This crate provides trait-based abstractions for the peripherals wired to
//! a door controller board: push buttons and the door-position reed switch
//! (digital inputs), the lock relay (digital output), the piezo buzzer, the
//! status indicator LED and the hardware watchdog. Credential readers are
//! represented by a scan channel that the reader driver feeds.
//!
//! # Design Philosophy
//!
//! - **Pin-level**: Every trait models one signal, in the style of
//!   `embedded-hal`. Sampling or toggling a pin is synchronous and infallible.
//! - **Object-safe**: Traits contain no `async fn`, so the controller holds
//!   peripherals as `Box<dyn InputPin>` and friends.
//! - **Thread-safe**: All traits require `Send` so the controller can run as
//!   a Tokio task. [`Buzzer`] is additionally `Sync` because the chime task
//!   and the feedback patterns share it.
//!
//! # Debouncing
//!
//! [`DebouncedInput`] turns a raw active-low button into short and long
//! presses:
//!
//! ```
//! use latchkey_hardware::debounce::{DebouncedInput, Press};
//! use latchkey_hardware::mock::MockInput;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (pin, _handle) = MockInput::new();
//! let mut button = DebouncedInput::new("exit", pin, Duration::from_millis(2_000));
//!
//! // Nothing pressed
//! assert_eq!(button.poll().await, Press::None);
//! # }
//! ```
//!
//! # Credential Readers
//!
//! The Wiegand decoder is an interrupt-driven driver outside this crate. It
//! delivers decoded credentials through a [`ScanSender`]; the controller owns
//! the matching [`ScanReceiver`].
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides simulated peripherals that record every write
//! and can be driven programmatically, for tests and the host simulator.

pub mod debounce;
pub mod error;
pub mod mock;
pub mod reader;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use debounce::{DebouncedInput, Press};
pub use error::{HardwareError, Result};
pub use reader::{ScanReceiver, ScanSender, scan_channel};
pub use traits::{Buzzer, Indicator, InputPin, OutputPin, Watchdog};
pub use types::LedColor;
