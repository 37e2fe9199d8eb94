//! Event arbitration and actuation core of the Latchkey access controller.
//!
//! The [`Controller`] reconciles the credential reader, three push buttons,
//! the door sensor and the HTTP/MQTT command channel into one serialized
//! stream of actions on the lock relay, buzzer, indicator, chime and status
//! topic.
//!
//! # Example
//!
//! ```no_run
//! use latchkey_controller::{
//!     Context, Controller, Peripherals, Persistence, Reporter, TracingSink, command_channel,
//! };
//! use latchkey_hardware::mock::*;
//! use latchkey_storage::{AlternateMedia, ControllerConfig, KeyStore};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = ControllerConfig::default();
//! let (store, _) = KeyStore::open("keys.cfg");
//! let (_reader, scans) = MockReader::new();
//! let (_commands, command_rx) = command_channel(16);
//!
//! let peripherals = Peripherals {
//!     relay: Box::new(MockOutput::new().0),
//!     indicator: Box::new(MockIndicator::new().0),
//!     buzzer: Arc::new(MockBuzzer::new()),
//!     exit_button: Box::new(MockInput::new().0),
//!     program_button: Box::new(MockInput::new().0),
//!     bell_button: Box::new(MockInput::new().0),
//!     door_sensor: Box::new(MockInput::asserted().0),
//!     watchdog: Box::new(MockWatchdog::new().0),
//! };
//! let persistence = Persistence {
//!     store,
//!     media: AlternateMedia::absent(),
//!     config_path: "dl32.cfg".into(),
//! };
//!
//! let mut controller = Controller::new(
//!     Context::from_config(&config),
//!     persistence,
//!     peripherals,
//!     Reporter::new(Box::new(TracingSink)),
//!     scans,
//!     command_rx,
//! );
//! controller.run(CancellationToken::new()).await;
//! # }
//! ```

pub mod add_mode;
pub mod authorizer;
pub mod chime;
pub mod commands;
pub mod context;
pub mod error;
pub mod event_loop;
pub mod feedback;
pub mod lock;
pub mod sensor;
pub mod status;

pub use add_mode::{AddMode, AddModeTick};
pub use authorizer::Decision;
pub use chime::{Chime, ChimePlayer};
pub use commands::{
    Command, CommandOutcome, CommandReceiver, CommandReply, CommandRequest, CommandSender,
    DEFAULT_COMMAND_QUEUE, command_channel,
};
pub use context::Context;
pub use error::{ControllerError, Result};
pub use event_loop::{Controller, LoopExit, Peripherals, Persistence};
pub use feedback::Feedback;
pub use lock::LockActuator;
pub use sensor::{DoorSensor, SensorEdge};
pub use status::{Reporter, SinkError, StatusMessage, StatusSink, TracingSink};
