//! Common types shared across peripheral implementations.

use serde::{Deserialize, Serialize};

/// Colors shown by the status indicator.
///
/// The controller uses red while locked, green while unlocked and blue while
/// an add-mode enrollment window is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LedColor {
    /// LED off.
    Off,

    /// Red LED.
    Red,

    /// Green LED.
    Green,

    /// Blue LED.
    Blue,
}
