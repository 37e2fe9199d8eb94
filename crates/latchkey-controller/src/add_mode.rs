//! Add-mode enrollment window.
//!
//! While active, the next scanned credential is enrolled (or, if already
//! known, simply ends the window) instead of being authorized. The window is
//! a fixed number of wait ticks; the event loop calls [`AddMode::tick`] once
//! per tick interval.

use crate::error::{ControllerError, Result};

/// Outcome of one add-mode tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddModeTick {
    /// No window open.
    Inactive,
    /// Still waiting for a credential.
    Waiting { remaining: u32 },
    /// The window ran out without a credential.
    Expired,
}

/// Add-mode state: `None` while idle, ticks remaining while active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMode {
    remaining: Option<u32>,
    window_ticks: u32,
}

impl AddMode {
    /// Idle add mode whose windows last `window_ticks` ticks (at least one).
    pub fn new(window_ticks: u32) -> Self {
        Self {
            remaining: None,
            window_ticks: window_ticks.max(1),
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    /// Ticks left in the open window.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn window_ticks(&self) -> u32 {
        self.window_ticks
    }

    /// Open a window.
    ///
    /// # Errors
    /// `ControllerError::AddModeActive` if a window is already open; the
    /// running window is left untouched.
    pub fn enter(&mut self) -> Result<()> {
        if self.is_active() {
            return Err(ControllerError::AddModeActive);
        }
        self.remaining = Some(self.window_ticks);
        Ok(())
    }

    /// Consume one tick of the open window.
    pub fn tick(&mut self) -> AddModeTick {
        match self.remaining {
            None => AddModeTick::Inactive,
            Some(remaining) if remaining <= 1 => {
                self.remaining = None;
                AddModeTick::Expired
            }
            Some(remaining) => {
                self.remaining = Some(remaining - 1);
                AddModeTick::Waiting {
                    remaining: remaining - 1,
                }
            }
        }
    }

    /// Close the window early. Returns `true` if one was open.
    pub fn abort(&mut self) -> bool {
        self.remaining.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_starts_inactive() {
        let mut add_mode = AddMode::new(10);
        assert!(!add_mode.is_active());
        assert_eq!(add_mode.tick(), AddModeTick::Inactive);
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(10)]
    fn test_expires_after_exactly_n_ticks(#[case] n: u32) {
        let mut add_mode = AddMode::new(n);
        add_mode.enter().unwrap();

        for i in 1..n {
            assert_eq!(add_mode.tick(), AddModeTick::Waiting { remaining: n - i });
            assert!(add_mode.is_active());
        }
        assert_eq!(add_mode.tick(), AddModeTick::Expired);
        assert!(!add_mode.is_active());
        assert_eq!(add_mode.tick(), AddModeTick::Inactive);
    }

    #[test]
    fn test_reentry_rejected() {
        let mut add_mode = AddMode::new(5);
        add_mode.enter().unwrap();
        add_mode.tick();

        assert!(matches!(add_mode.enter(), Err(ControllerError::AddModeActive)));
        assert_eq!(add_mode.remaining(), Some(4));
    }

    #[test]
    fn test_abort() {
        let mut add_mode = AddMode::new(5);
        assert!(!add_mode.abort());

        add_mode.enter().unwrap();
        assert!(add_mode.abort());
        assert!(!add_mode.is_active());

        add_mode.enter().unwrap();
        assert_eq!(add_mode.remaining(), Some(5));
    }

    #[test]
    fn test_zero_window_clamped() {
        let mut add_mode = AddMode::new(0);
        assert_eq!(add_mode.window_ticks(), 1);
        add_mode.enter().unwrap();
        assert_eq!(add_mode.tick(), AddModeTick::Expired);
    }
}
