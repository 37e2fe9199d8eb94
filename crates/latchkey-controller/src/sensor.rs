//! Door-position sensor edge detection.

use latchkey_hardware::InputPin;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEdge {
    Opened,
    Closed,
}

/// Reed switch wired active-low: low means the opening is closed.
pub struct DoorSensor<P> {
    pin: P,
    closed: Option<bool>,
}

impl<P: InputPin> DoorSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, closed: None }
    }

    /// Sample the sensor and report a change since the previous sample.
    ///
    /// The first sample only records the level.
    pub fn poll(&mut self) -> Option<SensorEdge> {
        let closed = self.pin.is_low();
        let previous = self.closed.replace(closed);

        match previous {
            Some(was_closed) if was_closed != closed => {
                let edge = if closed {
                    SensorEdge::Closed
                } else {
                    SensorEdge::Opened
                };
                debug!(?edge, "door sensor edge");
                Some(edge)
            }
            _ => None,
        }
    }

    /// Last sampled state, `None` before the first poll.
    pub fn is_closed(&self) -> Option<bool> {
        self.closed
    }
}
