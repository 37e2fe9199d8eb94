//! Credential scan delivery.
//!
//! The Wiegand decoder runs in interrupt context on a real board. It hands
//! each decoded frame to a [`ScanSender`], which never blocks; the controller
//! drains the matching [`ScanReceiver`] as soon as a scan arrives.

use crate::error::{HardwareError, Result};
use latchkey_core::Credential;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default number of scans buffered between the reader and the controller.
pub const DEFAULT_SCAN_QUEUE: usize = 8;

/// Receiving half of a scan channel, owned by the controller.
pub type ScanReceiver = mpsc::Receiver<Credential>;

/// Sending half of a scan channel, owned by the reader driver.
#[derive(Debug, Clone)]
pub struct ScanSender {
    tx: mpsc::Sender<Credential>,
}

impl ScanSender {
    /// Hand a decoded credential to the controller without blocking.
    ///
    /// # Errors
    /// - `HardwareError::QueueFull` if the controller is not keeping up
    /// - `HardwareError::Disconnected` if the controller has stopped
    pub fn deliver(&self, credential: Credential) -> Result<()> {
        debug!(
            number = credential.number(),
            facility = %credential.facility_code(),
            "credential decoded"
        );

        self.tx.try_send(credential).map_err(|e| match e {
            mpsc::error::TrySendError::Full(credential) => {
                warn!(number = credential.number(), "scan queue full, dropping credential");
                HardwareError::QueueFull {
                    number: credential.number().to_string(),
                }
            }
            mpsc::error::TrySendError::Closed(_) => HardwareError::disconnected("scan receiver"),
        })
    }
}

/// Create a scan channel buffering up to `capacity` credentials.
pub fn scan_channel(capacity: usize) -> (ScanSender, ScanReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ScanSender { tx }, rx)
}
