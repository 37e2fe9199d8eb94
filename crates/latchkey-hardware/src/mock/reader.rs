//! Mock credential reader.

use crate::{
    Result,
    reader::{DEFAULT_SCAN_QUEUE, ScanReceiver, ScanSender, scan_channel},
};
use latchkey_core::{Credential, FacilityCode};

/// Simulated Wiegand reader that presents credentials on demand.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::MockReader;
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (reader, mut scans) = MockReader::new();
///
///     reader.present("12345")?;
///
///     let credential = scans.recv().await.unwrap();
///     assert_eq!(credential.number(), "12345");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockReader {
    sender: ScanSender,
    facility_code: FacilityCode,
}

impl MockReader {
    /// Create a reader and the receiver the controller consumes.
    pub fn new() -> (Self, ScanReceiver) {
        let (sender, receiver) = scan_channel(DEFAULT_SCAN_QUEUE);
        (Self::from_sender(sender), receiver)
    }

    /// Wrap an existing sender.
    pub fn from_sender(sender: ScanSender) -> Self {
        Self {
            sender,
            facility_code: FacilityCode::default(),
        }
    }

    /// Facility code reported with [`present`](Self::present).
    pub fn with_facility_code(mut self, facility_code: FacilityCode) -> Self {
        self.facility_code = facility_code;
        self
    }

    /// Present a card with the reader's facility code.
    pub fn present(&self, number: &str) -> Result<()> {
        self.sender
            .deliver(Credential::new(number, self.facility_code))
    }

    /// Present a card with an explicit facility code.
    pub fn present_with_facility(&self, number: &str, facility_code: FacilityCode) -> Result<()> {
        self.sender.deliver(Credential::new(number, facility_code))
    }
}
