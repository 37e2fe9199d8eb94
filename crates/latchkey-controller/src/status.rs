//! Best-effort status reporting.
//!
//! Every notable event is turned into a human readable [`StatusMessage`],
//! logged, and published through a [`StatusSink`] (the MQTT status topic on a
//! real board). A failed publish never reaches the caller: the reporter logs
//! it and stops publishing until the transport says it is back online.

use latchkey_core::TriggerSource;
use std::fmt;
#[cfg(test)]
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

/// Why a status message could not be published.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("Status transport offline")]
    Offline,

    #[error("Status transport error: {0}")]
    Transport(String),
}

/// Destination for status messages.
pub trait StatusSink: Send {
    /// Publish one message.
    fn publish(&mut self, message: &str) -> Result<(), SinkError>;
}

impl<T: StatusSink + ?Sized> StatusSink for Box<T> {
    fn publish(&mut self, message: &str) -> Result<(), SinkError> {
        (**self).publish(message)
    }
}

/// Everything the controller reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Started { version: String },
    Unlocked { source: TriggerSource },
    Locked,
    Authorized { id: String, label: String },
    Unauthorized { id: String },
    AlreadyAuthorized { id: String },
    AddModeStarted,
    NoKeyDetected,
    KeyAdded { id: String },
    KeyNotAdded { id: String, reason: String },
    KeyRemoved { id: String },
    KeyRenamed { id: String, label: String },
    KeysPurged,
    KeyList { count: usize },
    SensorOpened { opening: String },
    SensorClosed { opening: String },
    RingingBell,
    BellAlreadyRinging,
    BellStopped,
    BellIdle,
    ChimeSelected { name: String },
    KeysImported { count: usize },
    ConfigImported,
    KeysExported { count: usize },
    ImportFailed { reason: String },
    CommandFailed { command: &'static str, reason: String },
    Restarting,
    Heartbeat,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { version } => write!(f, "Latchkey {version} started"),
            Self::Unlocked { .. } => write!(f, "Unlocked"),
            Self::Locked => write!(f, "Locked"),
            Self::Authorized { id, label } => write!(f, "Authorized key {id} ({label}) scanned"),
            Self::Unauthorized { id } => write!(f, "Unauthorized key {id} scanned"),
            Self::AlreadyAuthorized { id } => write!(f, "Key {id} is already authorized"),
            Self::AddModeStarted => write!(f, "Waiting for new key"),
            Self::NoKeyDetected => write!(f, "No key detected"),
            Self::KeyAdded { id } => write!(f, "Key {id} added"),
            Self::KeyNotAdded { id, reason } => write!(f, "Unable to add key {id}: {reason}"),
            Self::KeyRemoved { id } => write!(f, "Key {id} removed"),
            Self::KeyRenamed { id, label } => write!(f, "Key {id} renamed to {label}"),
            Self::KeysPurged => write!(f, "All keys purged"),
            Self::KeyList { count } => write!(f, "{count} authorized keys"),
            Self::SensorOpened { opening } => write!(f, "{opening} sensor opened"),
            Self::SensorClosed { opening } => write!(f, "{opening} sensor closed"),
            Self::RingingBell => write!(f, "Ringing bell"),
            Self::BellAlreadyRinging => write!(f, "Bell already ringing"),
            Self::BellStopped => write!(f, "Bell stopped"),
            Self::BellIdle => write!(f, "Bell not ringing"),
            Self::ChimeSelected { name } => write!(f, "Chime set to {name}"),
            Self::KeysImported { count } => write!(f, "Imported {count} keys from SD"),
            Self::ConfigImported => write!(f, "Imported configuration from SD"),
            Self::KeysExported { count } => write!(f, "Exported {count} keys to SD"),
            Self::ImportFailed { reason } => write!(f, "Import failed: {reason}"),
            Self::CommandFailed { command, reason } => write!(f, "{command} failed: {reason}"),
            Self::Restarting => write!(f, "Restarting"),
            Self::Heartbeat => write!(f, "Stayin' alive!"),
        }
    }
}

/// Logs every status message and forwards it to a sink while online.
pub struct Reporter {
    sink: Box<dyn StatusSink>,
    online: bool,
}

impl Reporter {
    pub fn new(sink: Box<dyn StatusSink>) -> Self {
        Self { sink, online: true }
    }

    /// Reporter that only logs.
    pub fn offline() -> Self {
        Self {
            sink: Box::new(TracingSink),
            online: false,
        }
    }

    /// Log `message` and publish it if the sink is online.
    pub fn report(&mut self, message: StatusMessage) {
        let text = message.to_string();
        info!(status = %text, "status");

        if !self.online {
            return;
        }
        if let Err(e) = self.sink.publish(&text) {
            warn!(error = %e, "status publish failed, reporting disabled until reconnect");
            self.online = false;
        }
    }

    /// Called by the transport when its connection state changes.
    pub fn set_online(&mut self, online: bool) {
        if online && !self.online {
            info!("status reporting resumed");
        }
        self.online = online;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }
}

/// Sink that writes status messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn publish(&mut self, message: &str) -> Result<(), SinkError> {
        info!(target: "latchkey::status", "{message}");
        Ok(())
    }
}

/// Sink that keeps published messages in memory. Clones share the log.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<Option<SinkError>>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Messages published so far, oldest first.
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make every following publish fail with `error`, or succeed again with `None`.
    pub(crate) fn fail_with(&self, error: Option<SinkError>) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }
}

#[cfg(test)]
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusMessage::Unlocked { source: TriggerSource::Http }, "Unlocked")]
    #[case(StatusMessage::Locked, "Locked")]
    #[case(
        StatusMessage::Authorized { id: "12345".into(), label: "Alice".into() },
        "Authorized key 12345 (Alice) scanned"
    )]
    #[case(StatusMessage::Unauthorized { id: "999".into() }, "Unauthorized key 999 scanned")]
    #[case(StatusMessage::SensorOpened { opening: "Door".into() }, "Door sensor opened")]
    #[case(StatusMessage::SensorClosed { opening: "Gate".into() }, "Gate sensor closed")]
    #[case(StatusMessage::BellAlreadyRinging, "Bell already ringing")]
    #[case(StatusMessage::BellIdle, "Bell not ringing")]
    #[case(StatusMessage::Heartbeat, "Stayin' alive!")]
    fn test_message_text(#[case] message: StatusMessage, #[case] expected: &str) {
        assert_eq!(message.to_string(), expected);
    }

    #[test]
    fn test_reporter_publishes() {
        let sink = RecordingSink::new();
        let mut reporter = Reporter::new(Box::new(sink.clone()));

        reporter.report(StatusMessage::Unlocked {
            source: TriggerSource::ExitButton,
        });
        reporter.report(StatusMessage::Locked);

        assert_eq!(sink.messages(), vec!["Unlocked", "Locked"]);
    }

    #[test]
    fn test_failed_publish_disables_until_online() {
        let sink = RecordingSink::new();
        let mut reporter = Reporter::new(Box::new(sink.clone()));

        sink.fail_with(Some(SinkError::Offline));
        reporter.report(StatusMessage::Locked);
        assert!(!reporter.is_online());

        sink.fail_with(None);
        reporter.report(StatusMessage::RingingBell);
        assert!(sink.messages().is_empty());

        reporter.set_online(true);
        reporter.report(StatusMessage::RingingBell);
        assert_eq!(sink.messages(), vec!["Ringing bell"]);
    }

    #[test]
    fn test_offline_reporter_never_publishes() {
        let mut reporter = Reporter::offline();
        reporter.report(StatusMessage::Heartbeat);
        assert!(!reporter.is_online());
    }
}
