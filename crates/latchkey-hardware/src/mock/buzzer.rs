//! Mock piezo buzzer.
//!
//! Every call is recorded with the Tokio clock time it happened at, so tests
//! running with a paused clock can check pattern timing exactly.

use super::lock;
use crate::traits::Buzzer;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One recorded buzzer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerEvent {
    /// Tone started at the given frequency.
    Tone(u32),
    /// Output silenced.
    Silence,
}

/// Mock buzzer. Clones share the same event log.
#[derive(Debug, Clone, Default)]
pub struct MockBuzzer {
    events: Arc<Mutex<Vec<(Instant, BuzzerEvent)>>>,
}

impl MockBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<BuzzerEvent> {
        lock(&self.events).iter().map(|(_, event)| *event).collect()
    }

    /// Recorded events with their timestamps.
    pub fn timeline(&self) -> Vec<(Instant, BuzzerEvent)> {
        lock(&self.events).clone()
    }

    /// Number of tones started.
    pub fn tone_count(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|(_, event)| matches!(event, BuzzerEvent::Tone(_)))
            .count()
    }

    /// `true` if the last call started a tone.
    pub fn is_sounding(&self) -> bool {
        matches!(
            lock(&self.events).last(),
            Some((_, BuzzerEvent::Tone(_)))
        )
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    fn record(&self, event: BuzzerEvent) {
        lock(&self.events).push((Instant::now(), event));
    }
}

impl Buzzer for MockBuzzer {
    fn tone(&self, frequency_hz: u32) {
        self.record(BuzzerEvent::Tone(frequency_hz));
    }

    fn silence(&self) {
        self.record(BuzzerEvent::Silence);
    }
}
