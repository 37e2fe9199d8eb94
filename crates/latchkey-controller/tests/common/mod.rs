//! Shared test harness: a controller wired to mock peripherals.

#![allow(dead_code)]

use latchkey_controller::{
    CommandSender, Context, Controller, DEFAULT_COMMAND_QUEUE, Peripherals, Persistence, Reporter,
    SinkError, StatusSink, command_channel,
};
use latchkey_hardware::mock::*;
use latchkey_storage::{AlternateMedia, ControllerConfig, KeyStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::TempDir;

/// Status sink that keeps published messages in memory. Clones share the log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<Option<SinkError>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages().iter().any(|m| m == message)
    }

    /// Fail every following publish with `error`, or succeed again with `None`.
    pub fn fail_with(&self, error: Option<SinkError>) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }
}

impl StatusSink for RecordingSink {
    fn publish(&mut self, message: &str) -> Result<(), SinkError> {
        if let Some(error) = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub controller: Controller,
    pub reader: MockReader,
    pub commands: CommandSender,
    pub sink: RecordingSink,
    pub relay: MockOutputHandle,
    pub led: MockIndicatorHandle,
    pub buzzer: MockBuzzer,
    pub exit: MockInputHandle,
    pub program: MockInputHandle,
    pub bell: MockInputHandle,
    pub door: MockInputHandle,
    pub watchdog: MockWatchdogHandle,
    pub data: TempDir,
    pub sd: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(ControllerConfig::default(), &[])
    }

    pub fn with_keys(keys: &[(&str, &str)]) -> Self {
        Self::with(ControllerConfig::default(), keys)
    }

    /// Build a controller from `config` with `keys` already enrolled.
    pub fn with(config: ControllerConfig, keys: &[(&str, &str)]) -> Self {
        let data = TempDir::new().unwrap();
        let sd = TempDir::new().unwrap();

        let mut store = KeyStore::new(data.path().join("keys.cfg"));
        for (id, label) in keys {
            store.add(id, label).unwrap();
        }
        config.save(&data.path().join("dl32.cfg")).unwrap();

        let (reader, scans) = MockReader::new();
        let (commands, command_rx) = command_channel(DEFAULT_COMMAND_QUEUE);
        let sink = RecordingSink::default();

        let (relay, relay_handle) = MockOutput::new();
        let (indicator, led) = MockIndicator::new();
        let buzzer = MockBuzzer::new();
        let (exit_pin, exit) = MockInput::new();
        let (program_pin, program) = MockInput::new();
        let (bell_pin, bell) = MockInput::new();
        let (door_pin, door) = MockInput::asserted();
        let (watchdog_dev, watchdog) = MockWatchdog::new();

        let peripherals = Peripherals {
            relay: Box::new(relay),
            indicator: Box::new(indicator),
            buzzer: Arc::new(buzzer.clone()),
            exit_button: Box::new(exit_pin),
            program_button: Box::new(program_pin),
            bell_button: Box::new(bell_pin),
            door_sensor: Box::new(door_pin),
            watchdog: Box::new(watchdog_dev),
        };
        let persistence = Persistence {
            store,
            media: AlternateMedia::mounted(sd.path()),
            config_path: data.path().join("dl32.cfg"),
        };

        let controller = Controller::new(
            Context::from_config(&config),
            persistence,
            peripherals,
            Reporter::new(Box::new(sink.clone())),
            scans,
            command_rx,
        );

        Self {
            controller,
            reader,
            commands,
            sink,
            relay: relay_handle,
            led,
            buzzer,
            exit,
            program,
            bell,
            door,
            watchdog,
            data,
            sd,
        }
    }

    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data.path().join(name)
    }

    pub fn data_files(&self) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(self.data.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn count(&self, message: &str) -> usize {
        self.sink.messages().iter().filter(|m| *m == message).count()
    }
}
