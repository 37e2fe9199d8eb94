//! Mock digital pins, indicator and watchdog.

use super::lock;
use crate::{
    traits::{Indicator, InputPin, OutputPin, Watchdog},
    types::LedColor,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

/// Mock active-low input (button or reed switch).
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::MockInput;
/// use latchkey_hardware::traits::InputPin;
///
/// let (pin, handle) = MockInput::new();
/// assert!(pin.is_high());
///
/// handle.press();
/// assert!(pin.is_low());
/// ```
#[derive(Debug)]
pub struct MockInput {
    low: Arc<AtomicBool>,
}

impl MockInput {
    /// Create an input that starts released (high).
    pub fn new() -> (Self, MockInputHandle) {
        Self::with_level(false)
    }

    /// Create an input that starts pulled low, e.g. a closed door sensor.
    pub fn asserted() -> (Self, MockInputHandle) {
        Self::with_level(true)
    }

    fn with_level(low: bool) -> (Self, MockInputHandle) {
        let low = Arc::new(AtomicBool::new(low));
        (Self { low: low.clone() }, MockInputHandle { low })
    }
}

impl InputPin for MockInput {
    fn is_low(&self) -> bool {
        self.low.load(Ordering::SeqCst)
    }
}

/// Handle for driving a [`MockInput`].
#[derive(Debug, Clone)]
pub struct MockInputHandle {
    low: Arc<AtomicBool>,
}

impl MockInputHandle {
    /// Pull the input low.
    pub fn press(&self) {
        self.low.store(true, Ordering::SeqCst);
    }

    /// Let the input float high.
    pub fn release(&self) {
        self.low.store(false, Ordering::SeqCst);
    }

    /// Pull the input low now and release it after `duration`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn press_for(&self, duration: Duration) {
        self.press();
        let handle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            handle.release();
        });
    }

    /// Alias of [`press`](Self::press) for door sensors.
    pub fn close(&self) {
        self.press();
    }

    /// Alias of [`release`](Self::release) for door sensors.
    pub fn open(&self) {
        self.release();
    }

    /// Current level.
    pub fn is_low(&self) -> bool {
        self.low.load(Ordering::SeqCst)
    }
}

/// Mock digital output (lock relay) recording every level written.
#[derive(Debug)]
pub struct MockOutput {
    state: Arc<Mutex<OutputState>>,
}

#[derive(Debug, Default)]
struct OutputState {
    high: bool,
    history: Vec<bool>,
}

impl MockOutput {
    /// Create an output that starts low.
    pub fn new() -> (Self, MockOutputHandle) {
        let state = Arc::new(Mutex::new(OutputState::default()));
        (
            Self {
                state: state.clone(),
            },
            MockOutputHandle { state },
        )
    }

    fn write(&mut self, high: bool) {
        let mut state = lock(&self.state);
        state.high = high;
        state.history.push(high);
    }
}

impl OutputPin for MockOutput {
    fn set_high(&mut self) {
        self.write(true);
    }

    fn set_low(&mut self) {
        self.write(false);
    }

    fn is_set_high(&self) -> bool {
        lock(&self.state).high
    }
}

/// Handle for inspecting a [`MockOutput`].
#[derive(Debug, Clone)]
pub struct MockOutputHandle {
    state: Arc<Mutex<OutputState>>,
}

impl MockOutputHandle {
    /// Current level.
    pub fn is_high(&self) -> bool {
        lock(&self.state).high
    }

    /// Every level written, oldest first.
    pub fn history(&self) -> Vec<bool> {
        lock(&self.state).history.clone()
    }

    /// Number of low-to-high writes.
    pub fn activations(&self) -> usize {
        lock(&self.state).history.iter().filter(|high| **high).count()
    }
}

/// Mock status indicator recording every color shown.
#[derive(Debug)]
pub struct MockIndicator {
    colors: Arc<Mutex<Vec<LedColor>>>,
}

impl MockIndicator {
    pub fn new() -> (Self, MockIndicatorHandle) {
        let colors = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                colors: colors.clone(),
            },
            MockIndicatorHandle { colors },
        )
    }
}

impl Indicator for MockIndicator {
    fn set_color(&mut self, color: LedColor) {
        lock(&self.colors).push(color);
    }
}

/// Handle for inspecting a [`MockIndicator`].
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    colors: Arc<Mutex<Vec<LedColor>>>,
}

impl MockIndicatorHandle {
    /// Last color shown, `LedColor::Off` if none yet.
    pub fn current(&self) -> LedColor {
        lock(&self.colors).last().copied().unwrap_or(LedColor::Off)
    }

    /// Every color shown, oldest first.
    pub fn history(&self) -> Vec<LedColor> {
        lock(&self.colors).clone()
    }
}

/// Mock watchdog counting feeds.
#[derive(Debug)]
pub struct MockWatchdog {
    feeds: Arc<AtomicU64>,
}

impl MockWatchdog {
    pub fn new() -> (Self, MockWatchdogHandle) {
        let feeds = Arc::new(AtomicU64::new(0));
        (
            Self {
                feeds: feeds.clone(),
            },
            MockWatchdogHandle { feeds },
        )
    }
}

impl Watchdog for MockWatchdog {
    fn feed(&mut self) {
        self.feeds.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handle for inspecting a [`MockWatchdog`].
#[derive(Debug, Clone)]
pub struct MockWatchdogHandle {
    feeds: Arc<AtomicU64>,
}

impl MockWatchdogHandle {
    /// Number of times the watchdog was fed.
    pub fn feeds(&self) -> u64 {
        self.feeds.load(Ordering::SeqCst)
    }
}
