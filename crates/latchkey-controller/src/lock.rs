//! Lock relay actuation.

use crate::feedback::Feedback;
use crate::status::{Reporter, StatusMessage};
use latchkey_core::TriggerSource;
use latchkey_hardware::{Indicator, LedColor, OutputPin};
use std::time::Duration;
use tracing::info;

/// Drives the lock relay and the status indicator.
///
/// Unlock calls are not serialized here. The event loop blocks on each
/// unlock, so two never overlap.
pub struct LockActuator {
    relay: Box<dyn OutputPin>,
    indicator: Box<dyn Indicator>,
}

impl LockActuator {
    /// Take ownership of the relay and indicator, starting locked.
    pub fn new(mut relay: Box<dyn OutputPin>, mut indicator: Box<dyn Indicator>) -> Self {
        relay.set_low();
        indicator.set_color(LedColor::Red);
        Self { relay, indicator }
    }

    /// Release the lock for `duration`, then lock again.
    ///
    /// Reports "Unlocked" once the relay is energized and "Locked" after it
    /// drops out.
    pub async fn unlock(
        &mut self,
        duration: Duration,
        source: TriggerSource,
        feedback: &Feedback,
        reporter: &mut Reporter,
    ) {
        info!(%source, ms = duration.as_millis() as u64, "unlocking");

        self.relay.set_high();
        self.indicator.set_color(LedColor::Green);
        feedback.granted().await;
        reporter.report(StatusMessage::Unlocked { source });

        tokio::time::sleep(duration).await;

        self.secure();
        reporter.report(StatusMessage::Locked);
    }

    /// Drop the relay immediately.
    pub fn secure(&mut self) {
        self.relay.set_low();
        self.indicator.set_color(LedColor::Red);
    }

    pub fn is_unlocked(&self) -> bool {
        self.relay.is_set_high()
    }

    /// Show `color` on the indicator without touching the relay.
    pub fn indicate(&mut self, color: LedColor) {
        self.indicator.set_color(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RecordingSink;
    use latchkey_hardware::mock::{MockBuzzer, MockIndicator, MockOutput};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_unlock_cycle() {
        let (relay, relay_handle) = MockOutput::new();
        let (indicator, led) = MockIndicator::new();
        let buzzer = MockBuzzer::new();
        let feedback = Feedback::new(Arc::new(buzzer.clone()), false);
        let sink = RecordingSink::new();
        let mut reporter = Reporter::new(Box::new(sink.clone()));
        let mut lock = LockActuator::new(Box::new(relay), Box::new(indicator));

        let start = Instant::now();
        lock.unlock(
            Duration::from_secs(5),
            TriggerSource::Credential,
            &feedback,
            &mut reporter,
        )
        .await;

        // Granted pattern plus hold
        assert_eq!(start.elapsed(), Duration::from_millis(5_250));
        assert_eq!(relay_handle.history(), vec![false, true, false]);
        assert!(!lock.is_unlocked());
        assert_eq!(
            led.history(),
            vec![LedColor::Red, LedColor::Green, LedColor::Red]
        );
        assert_eq!(sink.messages(), vec!["Unlocked", "Locked"]);
        assert_eq!(buzzer.tone_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_high_during_hold() {
        let (relay, relay_handle) = MockOutput::new();
        let (indicator, _led) = MockIndicator::new();
        let feedback = Feedback::new(Arc::new(MockBuzzer::new()), true);
        let mut reporter = Reporter::offline();
        let mut lock = LockActuator::new(Box::new(relay), Box::new(indicator));

        let probe = relay_handle.clone();
        let check = async move {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            probe.is_high()
        };
        let unlock = lock.unlock(
            Duration::from_secs(2),
            TriggerSource::Http,
            &feedback,
            &mut reporter,
        );

        let ((), high_mid_hold) = tokio::join!(unlock, check);
        assert!(high_mid_hold);
        assert!(!relay_handle.is_high());
    }
}
