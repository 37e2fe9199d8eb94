//! The controller event loop.
//!
//! One tick, every `tick` interval, services in this order:
//!
//! 1. watchdog feed
//! 2. pending credential scans
//! 3. exit button (short: unlock, long: add mode)
//! 4. programming button (long: import from media, then restart)
//! 5. bell button
//! 6. add-mode countdown
//! 7. queued HTTP/MQTT commands
//! 8. door sensor (edges are reported; opening stops the chime)
//! 9. keep-alive status
//!
//! Between ticks the loop waits on the scan channel as well, so a presented
//! card is handled as soon as it is decoded rather than at the next tick.
//! Button timing and unlock holds block the loop; nothing else runs while
//! the door is unlocked except the chime task.

use crate::add_mode::{AddMode, AddModeTick};
use crate::authorizer::{self, Decision};
use crate::chime::ChimePlayer;
use crate::commands::{Command, CommandReceiver, CommandReply, CommandRequest};
use crate::context::Context;
use crate::error::{ControllerError, Result};
use crate::feedback::Feedback;
use crate::lock::LockActuator;
use crate::sensor::{DoorSensor, SensorEdge};
use crate::status::{Reporter, StatusMessage};
use chrono::Local;
use latchkey_core::{Credential, Label, TriggerSource};
use latchkey_hardware::{
    Buzzer, DebouncedInput, Indicator, InputPin, LedColor, OutputPin, Press, ScanReceiver,
    Watchdog,
};
use latchkey_storage::{AlternateMedia, KeyStore, StorageError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Board peripherals handed to the controller.
pub struct Peripherals {
    pub relay: Box<dyn OutputPin>,
    pub indicator: Box<dyn Indicator>,
    pub buzzer: Arc<dyn Buzzer>,
    pub exit_button: Box<dyn InputPin>,
    pub program_button: Box<dyn InputPin>,
    pub bell_button: Box<dyn InputPin>,
    pub door_sensor: Box<dyn InputPin>,
    pub watchdog: Box<dyn Watchdog>,
}

/// Persisted state handed to the controller.
pub struct Persistence {
    pub store: KeyStore,
    pub media: AlternateMedia,
    /// Canonical location of the configuration file, replaced on import.
    pub config_path: PathBuf,
}

/// Why [`Controller::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Reload configuration and keys, then start a fresh controller.
    Restart,
    /// Stop for good.
    Shutdown,
}

pub struct Controller {
    context: Context,
    store: KeyStore,
    media: AlternateMedia,
    config_path: PathBuf,

    add_mode: AddMode,
    add_mode_deadline: Option<Instant>,
    lock: LockActuator,
    feedback: Feedback,
    chime: ChimePlayer,

    exit_button: DebouncedInput<Box<dyn InputPin>>,
    program_button: DebouncedInput<Box<dyn InputPin>>,
    bell_button: DebouncedInput<Box<dyn InputPin>>,
    sensor: DoorSensor<Box<dyn InputPin>>,
    watchdog: Box<dyn Watchdog>,

    reporter: Reporter,
    scans: ScanReceiver,
    commands: CommandReceiver,

    next_heartbeat: Option<Instant>,
    exit: Option<LoopExit>,
}

impl Controller {
    pub fn new(
        context: Context,
        persistence: Persistence,
        peripherals: Peripherals,
        reporter: Reporter,
        scans: ScanReceiver,
        commands: CommandReceiver,
    ) -> Self {
        let long_press = context.long_press();
        let feedback = Feedback::new(peripherals.buzzer.clone(), context.is_silent());
        let chime = ChimePlayer::new(peripherals.buzzer, context.is_silent());
        let next_heartbeat = context.heartbeat().and_then(|every| {
            let due = Instant::now().checked_add(every);
            if due.is_none() {
                warn!(secs = every.as_secs(), "keep-alive interval out of range, disabled");
            }
            due
        });

        Self {
            add_mode: AddMode::new(context.add_mode_intervals()),
            add_mode_deadline: None,
            lock: LockActuator::new(peripherals.relay, peripherals.indicator),
            feedback,
            chime,
            exit_button: DebouncedInput::new("exit", peripherals.exit_button, long_press),
            program_button: DebouncedInput::new("program", peripherals.program_button, long_press),
            bell_button: DebouncedInput::new("bell", peripherals.bell_button, long_press),
            sensor: DoorSensor::new(peripherals.door_sensor),
            watchdog: peripherals.watchdog,
            store: persistence.store,
            media: persistence.media,
            config_path: persistence.config_path,
            context,
            reporter,
            scans,
            commands,
            next_heartbeat,
            exit: None,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn add_mode(&self) -> &AddMode {
        &self.add_mode
    }

    pub fn is_chime_playing(&self) -> bool {
        self.chime.is_playing()
    }

    /// Called by the status transport when it connects or drops.
    pub fn set_status_online(&mut self, online: bool) {
        self.reporter.set_online(online);
    }

    /// Run until `shutdown` is cancelled or a restart is requested.
    pub async fn run(&mut self, shutdown: CancellationToken) -> LoopExit {
        info!(
            tick_ms = self.context.tick().as_millis() as u64,
            keys = self.store.len(),
            "controller running"
        );
        self.reporter.report(StatusMessage::Started {
            version: latchkey_core::VERSION.to_string(),
        });

        loop {
            self.tick().await;
            if let Some(exit) = self.exit.take() {
                self.stop();
                return exit;
            }

            let wait = tokio::time::sleep(self.context.tick());
            tokio::pin!(wait);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        info!("shutdown requested");
                        self.stop();
                        return LoopExit::Shutdown;
                    }
                    Some(credential) = self.scans.recv() => {
                        self.handle_scan(credential).await;
                    }
                    _ = &mut wait => break,
                }
            }
        }
    }

    /// Run one tick.
    pub async fn tick(&mut self) {
        self.watchdog.feed();

        while let Ok(credential) = self.scans.try_recv() {
            self.handle_scan(credential).await;
        }

        // Exit button is ignored while an enrollment window is open
        if !self.add_mode.is_active() {
            match self.exit_button.poll().await {
                Press::ShortPress => self.unlock(TriggerSource::ExitButton).await,
                Press::LongPress => {
                    if let Err(e) = self.enter_add_mode().await {
                        warn!(error = %e, "could not enter add mode");
                    }
                }
                Press::None => {}
            }
        }

        match self.program_button.poll().await {
            Press::LongPress => {
                if let Err(e) = self.import_from_media().await {
                    warn!(error = %e, "import from media failed");
                }
            }
            Press::ShortPress => debug!("program button short press ignored"),
            Press::None => {}
        }

        if self.bell_button.poll().await != Press::None {
            if self.context.doorbell_enabled() {
                self.ring_bell();
            } else {
                debug!("doorbell disabled, ignoring bell button");
            }
        }

        if self
            .add_mode_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.service_add_mode().await;
        }

        // Requests queued behind a restart stay unanswered
        while self.exit.is_none()
            && let Ok(request) = self.commands.try_recv()
        {
            self.handle_request(request).await;
        }

        match self.sensor.poll() {
            Some(SensorEdge::Opened) => {
                if self.chime.stop() {
                    self.reporter.report(StatusMessage::BellStopped);
                }
                self.reporter.report(StatusMessage::SensorOpened {
                    opening: self.context.opening().to_string(),
                });
            }
            Some(SensorEdge::Closed) => {
                self.reporter.report(StatusMessage::SensorClosed {
                    opening: self.context.opening().to_string(),
                });
            }
            None => {}
        }

        if let (Some(due), Some(every)) = (self.next_heartbeat, self.context.heartbeat())
            && Instant::now() >= due
        {
            self.reporter.report(StatusMessage::Heartbeat);
            self.next_heartbeat = due.checked_add(every);
        }
    }

    /// Authorize, deny or enroll a scanned credential.
    pub async fn handle_scan(&mut self, credential: Credential) {
        let number = credential.number().to_string();
        let decision = authorizer::decide(&self.store, self.add_mode.is_active(), &number);
        info!(
            number = %number,
            facility = %credential.facility_code(),
            ?decision,
            "credential scanned"
        );

        match decision {
            Decision::Grant { label } => {
                self.reporter.report(StatusMessage::Authorized {
                    id: number,
                    label,
                });
                self.unlock(TriggerSource::Credential).await;
            }
            Decision::Deny => {
                self.reporter
                    .report(StatusMessage::Unauthorized { id: number });
                self.feedback.denied().await;
            }
            Decision::AlreadyEnrolled => {
                self.finish_add_mode();
                self.reporter
                    .report(StatusMessage::AlreadyAuthorized { id: number });
            }
            Decision::Enroll => {
                self.finish_add_mode();
                let label = Label::enrollment(&Local::now());
                match self.store.add(&number, label.as_str()) {
                    Ok(()) => {
                        self.reporter.report(StatusMessage::KeyAdded { id: number });
                        self.feedback.granted().await;
                    }
                    Err(e) => {
                        self.reporter.report(StatusMessage::KeyNotAdded {
                            id: number,
                            reason: e.to_string(),
                        });
                        self.feedback.denied().await;
                    }
                }
            }
        }
    }

    /// Execute one command outside the queue.
    pub async fn execute(&mut self, command: Command) -> Result<CommandReply> {
        let name = command.name();
        debug!(command = name, "executing command");

        let outcome = self.dispatch(command).await;
        if let Err(e) = &outcome {
            warn!(command = name, error = %e, "command failed");
            self.reporter.report(StatusMessage::CommandFailed {
                command: name,
                reason: e.to_string(),
            });
        }
        outcome
    }

    async fn handle_request(&mut self, request: CommandRequest) {
        let outcome = self.execute(request.command.clone()).await;
        request.respond(outcome);
    }

    async fn dispatch(&mut self, command: Command) -> Result<CommandReply> {
        match command {
            Command::Unlock(source) => {
                self.unlock(source).await;
            }
            Command::RingBell => {
                self.ring_bell();
            }
            Command::StopBell => {
                if self.chime.stop() {
                    self.reporter.report(StatusMessage::BellStopped);
                } else {
                    self.reporter.report(StatusMessage::BellIdle);
                }
            }
            Command::AddKey(id) => {
                let label = Label::enrollment(&Local::now());
                self.store.add(&id, label.as_str())?;
                self.reporter.report(StatusMessage::KeyAdded {
                    id: id.trim().to_string(),
                });
            }
            Command::RemoveKey(id) => {
                self.store.remove(&id)?;
                self.reporter.report(StatusMessage::KeyRemoved {
                    id: id.trim().to_string(),
                });
            }
            Command::RenameKey { id, label } => {
                self.store.rename(&id, &label)?;
                self.reporter.report(StatusMessage::KeyRenamed {
                    id: id.trim().to_string(),
                    label,
                });
            }
            Command::PurgeKeys => {
                self.store.purge()?;
                self.reporter.report(StatusMessage::KeysPurged);
            }
            Command::ListKeys => {
                let keys: Vec<(String, String)> = self
                    .store
                    .iter()
                    .map(|(id, label)| (id.to_string(), label.to_string()))
                    .collect();
                for (id, label) in &keys {
                    info!(id = %id, label = %label, "authorized key");
                }
                self.reporter
                    .report(StatusMessage::KeyList { count: keys.len() });
                return Ok(CommandReply::Keys(keys));
            }
            Command::EnterAddMode => {
                self.enter_add_mode().await?;
            }
            Command::SetChime(name) => {
                self.context.set_chime(&name)?;
                self.reporter
                    .report(StatusMessage::ChimeSelected { name });
            }
            Command::ImportFromMedia => {
                self.import_from_media().await?;
                return Ok(CommandReply::Restarting);
            }
            Command::ExportToMedia => {
                self.media.export_keys(&self.store, &Local::now())?;
                self.reporter.report(StatusMessage::KeysExported {
                    count: self.store.len(),
                });
            }
            Command::Reset => {
                self.reporter.report(StatusMessage::Restarting);
                self.exit = Some(LoopExit::Restart);
                return Ok(CommandReply::Restarting);
            }
        }
        Ok(CommandReply::Done)
    }

    async fn unlock(&mut self, source: TriggerSource) {
        let duration = self.context.durations().for_source(source);
        self.lock
            .unlock(duration, source, &self.feedback, &mut self.reporter)
            .await;
        if self.add_mode.is_active() {
            self.lock.indicate(LedColor::Blue);
        }
    }

    fn ring_bell(&mut self) {
        if self.chime.ring(self.context.chime()) {
            self.reporter.report(StatusMessage::RingingBell);
        } else {
            self.reporter.report(StatusMessage::BellAlreadyRinging);
        }
    }

    async fn enter_add_mode(&mut self) -> Result<()> {
        self.add_mode.enter()?;
        self.add_mode_deadline = Instant::now().checked_add(self.context.add_mode_interval());
        self.lock.indicate(LedColor::Blue);
        self.reporter.report(StatusMessage::AddModeStarted);
        self.feedback.add_mode_tick().await;
        Ok(())
    }

    async fn service_add_mode(&mut self) {
        match self.add_mode.tick() {
            AddModeTick::Waiting { remaining } => {
                debug!(remaining, "waiting for new key");
                let interval = self.context.add_mode_interval();
                self.add_mode_deadline = self
                    .add_mode_deadline
                    .and_then(|deadline| deadline.checked_add(interval));
                self.feedback.add_mode_tick().await;
            }
            AddModeTick::Expired => {
                self.finish_add_mode();
                self.reporter.report(StatusMessage::NoKeyDetected);
            }
            AddModeTick::Inactive => {
                self.add_mode_deadline = None;
            }
        }
    }

    fn finish_add_mode(&mut self) {
        self.add_mode.abort();
        self.add_mode_deadline = None;
        self.lock.indicate(LedColor::Red);
    }

    /// Replace keys and configuration from removable media.
    ///
    /// Keys and configuration are imported independently. If either one was
    /// imported the triple beep plays and the loop exits with
    /// [`LoopExit::Restart`] so the new configuration takes effect.
    async fn import_from_media(&mut self) -> Result<()> {
        info!("importing keys and configuration from media");
        let now = Local::now();

        let keys = self.media.import_keys(&mut self.store, &now);
        let config = self.media.import_config(&self.config_path, &now);

        let mut imported = false;
        let mut first_error: Option<StorageError> = None;

        match keys {
            Ok(count) => {
                imported = true;
                self.reporter.report(StatusMessage::KeysImported { count });
            }
            Err(e) => {
                self.reporter.report(StatusMessage::ImportFailed {
                    reason: e.to_string(),
                });
                first_error.get_or_insert(e);
            }
        }
        match config {
            Ok(_) => {
                imported = true;
                self.reporter.report(StatusMessage::ConfigImported);
            }
            Err(StorageError::MediaAbsent) => {}
            Err(e) => {
                self.reporter.report(StatusMessage::ImportFailed {
                    reason: e.to_string(),
                });
                first_error.get_or_insert(e);
            }
        }

        if imported {
            self.feedback.import_done().await;
            self.reporter.report(StatusMessage::Restarting);
            self.exit = Some(LoopExit::Restart);
            return Ok(());
        }

        Err(first_error
            .map(ControllerError::from)
            .unwrap_or(ControllerError::Storage(StorageError::MediaAbsent)))
    }

    fn stop(&mut self) {
        self.chime.stop();
        self.lock.secure();
    }
}
