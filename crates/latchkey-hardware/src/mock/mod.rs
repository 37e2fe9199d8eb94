//! Mock peripheral implementations for testing and development.
//!
//! Each mock comes with a cloneable handle. Inputs are driven through their
//! handle; outputs record what the controller wrote so tests can assert on it.

pub mod buzzer;
pub mod pins;
pub mod reader;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Re-export commonly used types
pub use buzzer::{BuzzerEvent, MockBuzzer};
pub use pins::{
    MockIndicator, MockIndicatorHandle, MockInput, MockInputHandle, MockOutput, MockOutputHandle,
    MockWatchdog, MockWatchdogHandle,
};
pub use reader::MockReader;

// A panicking test thread must not cascade into every other assertion.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
