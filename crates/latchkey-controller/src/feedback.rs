//! Audible feedback patterns.
//!
//! Patterns block the caller for their full length. In silent mode the
//! buzzer is never driven but the timing is kept, so the controller behaves
//! the same with or without sound.

use latchkey_hardware::Buzzer;
use std::sync::Arc;
use std::time::Duration;

/// Piezo resonance, loudest tone for the feedback beeps.
pub const BEEP_HZ: u32 = 2_700;

/// One beep: tone on for `on`, then quiet for `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beep {
    pub on: Duration,
    pub off: Duration,
}

const fn beep(on_ms: u64, off_ms: u64) -> Beep {
    Beep {
        on: Duration::from_millis(on_ms),
        off: Duration::from_millis(off_ms),
    }
}

/// Short double beep.
pub const GRANTED: &[Beep] = &[beep(75, 100), beep(75, 0)];

/// Two one-second tones.
pub const DENIED: &[Beep] = &[beep(1_000, 100), beep(1_000, 0)];

/// Single tick while waiting for a key to enroll.
pub const ADD_MODE_TICK: &[Beep] = &[beep(10, 0)];

/// Triple short beep after a bulk import.
pub const IMPORT_DONE: &[Beep] = &[beep(100, 100), beep(100, 100), beep(100, 0)];

/// Plays feedback patterns on the shared buzzer.
#[derive(Clone)]
pub struct Feedback {
    buzzer: Arc<dyn Buzzer>,
    silent: bool,
}

impl Feedback {
    pub fn new(buzzer: Arc<dyn Buzzer>, silent: bool) -> Self {
        Self { buzzer, silent }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub async fn granted(&self) {
        self.play(GRANTED).await;
    }

    pub async fn denied(&self) {
        self.play(DENIED).await;
    }

    pub async fn add_mode_tick(&self) {
        self.play(ADD_MODE_TICK).await;
    }

    pub async fn import_done(&self) {
        self.play(IMPORT_DONE).await;
    }

    /// Play an arbitrary pattern.
    pub async fn play(&self, pattern: &[Beep]) {
        for beep in pattern {
            if !self.silent {
                self.buzzer.tone(BEEP_HZ);
            }
            tokio::time::sleep(beep.on).await;
            if !self.silent {
                self.buzzer.silence();
            }
            if !beep.off.is_zero() {
                tokio::time::sleep(beep.off).await;
            }
        }
    }
}

/// Total length of a pattern.
pub fn pattern_duration(pattern: &[Beep]) -> Duration {
    pattern.iter().map(|beep| beep.on + beep.off).sum()
}
