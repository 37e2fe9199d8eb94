//! Simulated board: mock peripherals wired to a controller.

use crate::console::{Button, Input, USAGE};
use anyhow::Result;
use latchkey_controller::{
    CommandSender, Context, Controller, DEFAULT_COMMAND_QUEUE, Peripherals, Persistence, Reporter,
    TracingSink, command_channel,
};
use latchkey_core::constants::{CONFIG_FILE_NAME, KEYS_FILE_NAME};
use latchkey_hardware::mock::{MockInput, MockInputHandle, MockOutput, MockReader, MockWatchdog};
use latchkey_hardware::{Buzzer, Indicator, LedColor};
use latchkey_storage::{AlternateMedia, ControllerConfig, KeyStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

const TAP: Duration = Duration::from_millis(100);
const HOLD_MARGIN: Duration = Duration::from_millis(250);

/// Buzzer that traces instead of sounding.
struct TracedBuzzer;

impl Buzzer for TracedBuzzer {
    fn tone(&self, frequency_hz: u32) {
        trace!(frequency_hz, "buzzer on");
    }

    fn silence(&self) {
        trace!("buzzer off");
    }
}

/// Status LED that logs colour changes.
struct TracedIndicator;

impl Indicator for TracedIndicator {
    fn set_color(&mut self, color: LedColor) {
        debug!(?color, "indicator");
    }
}

/// Handles for poking the simulated peripherals.
pub struct Board {
    reader: MockReader,
    commands: CommandSender,
    exit: MockInputHandle,
    program: MockInputHandle,
    bell: MockInputHandle,
    door: MockInputHandle,
    long_press: Duration,
}

/// Where the simulator keeps its files.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub media_dir: Option<PathBuf>,
}

impl Paths {
    fn config(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    fn keys(&self) -> PathBuf {
        self.data_dir.join(KEYS_FILE_NAME)
    }
}

impl Board {
    /// Load configuration and keys from disk and build a fresh controller.
    pub fn boot(paths: &Paths) -> Result<(Controller, Board)> {
        std::fs::create_dir_all(&paths.data_dir)?;

        let (config, config_err) = ControllerConfig::load_or_default(&paths.config());
        if let Some(e) = config_err {
            error!(error = %e, "configuration unreadable, using defaults");
        }
        let (store, keys_err) = KeyStore::open(paths.keys());
        if let Some(e) = keys_err {
            error!(error = %e, "key store unreadable, starting empty");
        }

        banner(&config, &store, &paths.data_dir);

        let media = match &paths.media_dir {
            Some(dir) => AlternateMedia::mounted(dir.clone()),
            None => AlternateMedia::absent(),
        };

        let (reader, scans) = MockReader::new();
        let (commands, command_rx) = command_channel(DEFAULT_COMMAND_QUEUE);
        let (relay, _) = MockOutput::new();
        let (exit_pin, exit) = MockInput::new();
        let (program_pin, program) = MockInput::new();
        let (bell_pin, bell) = MockInput::new();
        let (door_pin, door) = MockInput::asserted();
        let (watchdog, _) = MockWatchdog::new();

        let peripherals = Peripherals {
            relay: Box::new(relay),
            indicator: Box::new(TracedIndicator),
            buzzer: Arc::new(TracedBuzzer),
            exit_button: Box::new(exit_pin),
            program_button: Box::new(program_pin),
            bell_button: Box::new(bell_pin),
            door_sensor: Box::new(door_pin),
            watchdog: Box::new(watchdog),
        };
        let persistence = Persistence {
            store,
            media,
            config_path: paths.config(),
        };

        let controller = Controller::new(
            Context::from_config(&config),
            persistence,
            peripherals,
            Reporter::new(Box::new(TracingSink)),
            scans,
            command_rx,
        );
        let board = Board {
            reader,
            commands,
            exit,
            program,
            bell,
            door,
            long_press: config.long_press(),
        };
        Ok((controller, board))
    }

    /// Act on one parsed console line.
    pub fn apply(&self, input: Input) {
        match input {
            Input::Scan { number, facility } => {
                let delivered = match facility {
                    Some(code) => self.reader.present_with_facility(&number, code),
                    None => self.reader.present(&number),
                };
                if let Err(e) = delivered {
                    warn!(error = %e, "scan dropped");
                }
            }
            Input::Tap(button) => self.button(button).press_for(TAP),
            Input::Hold(button) => self.button(button).press_for(self.long_press + HOLD_MARGIN),
            Input::OpenDoor => self.door.open(),
            Input::CloseDoor => self.door.close(),
            Input::Remote(command) => {
                let commands = self.commands.clone();
                tokio::spawn(async move {
                    let name = command.name();
                    match commands.send(command).await {
                        Ok(reply) => match serde_json::to_string(&reply) {
                            Ok(json) => info!(command = name, reply = %json, "command done"),
                            Err(e) => warn!(command = name, error = %e, "unprintable reply"),
                        },
                        Err(e) => warn!(command = name, error = %e, "command rejected"),
                    }
                });
            }
            Input::Help => {
                for line in USAGE.lines() {
                    info!("{line}");
                }
            }
        }
    }

    fn button(&self, button: Button) -> &MockInputHandle {
        match button {
            Button::Exit => &self.exit,
            Button::Program => &self.program,
            Button::Bell => &self.bell,
        }
    }
}

fn banner(config: &ControllerConfig, store: &KeyStore, data_dir: &Path) {
    info!(
        version = latchkey_core::VERSION,
        data_dir = %data_dir.display(),
        keys = store.len(),
        "Latchkey access controller"
    );
    if config.silent_mode {
        warn!("silent mode enabled, buzzer muted");
    }
    if config.garage_mode {
        info!(unlock_ms = config.garage_ms, "garage mode enabled");
    }
}
