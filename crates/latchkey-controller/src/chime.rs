//! Doorbell chimes.
//!
//! Ringing is the only activity that runs in the background: the event loop
//! keeps servicing inputs while the chime plays, and a door-open edge or a
//! stop command cancels it between notes.

use latchkey_hardware::Buzzer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A named tone sequence.
///
/// `tones` are played in order for `note` each (0 Hz is a rest), the whole
/// sequence `repeats` times with `pause` after every repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chime {
    pub name: &'static str,
    pub tones: &'static [u32],
    pub note: Duration,
    pub repeats: u32,
    pub pause: Duration,
}

impl Chime {
    /// Four long buzzes two seconds apart, like a mechanical bell.
    pub const CLASSIC: Chime = Chime {
        name: "classic",
        tones: &[2_700],
        note: Duration::from_millis(620),
        repeats: 4,
        pause: Duration::from_millis(2_000),
    };

    pub const DING_DONG: Chime = Chime {
        name: "ding_dong",
        tones: &[660, 550],
        note: Duration::from_millis(400),
        repeats: 2,
        pause: Duration::from_millis(1_000),
    };

    pub const WESTMINSTER: Chime = Chime {
        name: "westminster",
        tones: &[330, 415, 370, 247, 0, 247, 370, 415, 330],
        note: Duration::from_millis(350),
        repeats: 1,
        pause: Duration::ZERO,
    };

    /// Every selectable chime.
    pub const ALL: [Chime; 3] = [Self::CLASSIC, Self::DING_DONG, Self::WESTMINSTER];

    /// Look up a chime by name.
    pub fn by_name(name: &str) -> Option<Chime> {
        Self::ALL.into_iter().find(|chime| chime.name == name)
    }

    /// Total playing time when not interrupted.
    pub fn duration(&self) -> Duration {
        let notes = self.note * self.tones.len() as u32;
        (notes + self.pause) * self.repeats
    }
}

/// Plays chimes on the shared buzzer as a cancelable task.
pub struct ChimePlayer {
    buzzer: Arc<dyn Buzzer>,
    silent: bool,
    playing: Option<(JoinHandle<()>, CancellationToken)>,
}

impl ChimePlayer {
    pub fn new(buzzer: Arc<dyn Buzzer>, silent: bool) -> Self {
        Self {
            buzzer,
            silent,
            playing: None,
        }
    }

    /// `true` while a chime task is running.
    pub fn is_playing(&self) -> bool {
        self.playing
            .as_ref()
            .is_some_and(|(handle, _)| !handle.is_finished())
    }

    /// Start playing `chime`. Returns `false` (and does nothing) if a chime
    /// is already playing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn ring(&mut self, chime: Chime) -> bool {
        if self.is_playing() {
            debug!("chime already playing, ignoring ring request");
            return false;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(play(
            self.buzzer.clone(),
            chime,
            self.silent,
            token.clone(),
        ));
        self.playing = Some((handle, token));
        info!(chime = chime.name, "ringing bell");
        true
    }

    /// Cancel the current chime and silence the buzzer. Returns `true` if a
    /// chime was playing.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.is_playing();
        if let Some((_, token)) = self.playing.take() {
            token.cancel();
        }
        if was_playing {
            self.buzzer.silence();
            info!("chime stopped");
        }
        was_playing
    }
}

impl Drop for ChimePlayer {
    fn drop(&mut self) {
        if let Some((_, token)) = self.playing.take() {
            token.cancel();
        }
    }
}

async fn play(buzzer: Arc<dyn Buzzer>, chime: Chime, silent: bool, token: CancellationToken) {
    for _ in 0..chime.repeats {
        for &tone in chime.tones {
            if tone > 0 && !silent {
                buzzer.tone(tone);
            }
            let interrupted = pause(chime.note, &token).await;
            if tone > 0 && !silent {
                buzzer.silence();
            }
            if interrupted {
                return;
            }
        }
        if pause(chime.pause, &token).await {
            return;
        }
    }
    debug!(chime = chime.name, "chime finished");
}

// Returns `true` if cancelled before `duration` elapsed.
async fn pause(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
