//! Inbound command surface.
//!
//! The HTTP server and MQTT client run outside the controller. They turn
//! requests into [`Command`]s, push them onto the command channel and
//! optionally wait for the outcome. The event loop drains the channel once
//! per tick, in arrival order.

use crate::error::{ControllerError, Result};
use latchkey_core::TriggerSource;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Default number of commands buffered for the event loop.
pub const DEFAULT_COMMAND_QUEUE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Unlock for the duration configured for `source`.
    Unlock(TriggerSource),
    RingBell,
    StopBell,
    /// Authorize a key, labelled with the current time.
    AddKey(String),
    RemoveKey(String),
    RenameKey { id: String, label: String },
    PurgeKeys,
    ListKeys,
    EnterAddMode,
    SetChime(String),
    ImportFromMedia,
    ExportToMedia,
    Reset,
}

impl Command {
    /// Short name used in logs and failure reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unlock(_) => "unlock",
            Self::RingBell => "bell",
            Self::StopBell => "stop_bell",
            Self::AddKey(_) => "add_key",
            Self::RemoveKey(_) => "remove_key",
            Self::RenameKey { .. } => "rename_key",
            Self::PurgeKeys => "purge_keys",
            Self::ListKeys => "print_keys",
            Self::EnterAddMode => "add_mode",
            Self::SetChime(_) => "chime",
            Self::ImportFromMedia => "import",
            Self::ExportToMedia => "export",
            Self::Reset => "reset",
        }
    }

    /// Parse a web UI request path such as `/add_key/12345`.
    ///
    /// A query string is ignored.
    pub fn from_http_path(path: &str) -> Result<Self> {
        let unknown = || ControllerError::UnknownCommand(path.to_string());

        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let command = match segments.as_slice() {
            ["unlock"] => Self::Unlock(TriggerSource::Http),
            ["bell"] => Self::RingBell,
            ["stop_bell"] => Self::StopBell,
            ["reset"] => Self::Reset,
            ["print_keys"] => Self::ListKeys,
            ["purge_keys"] => Self::PurgeKeys,
            ["add_key", id] => Self::AddKey(id.to_string()),
            ["remove_key", id] => Self::RemoveKey(id.to_string()),
            ["rename_key", id, label] => Self::RenameKey {
                id: id.to_string(),
                label: label.to_string(),
            },
            ["add_mode"] => Self::EnterAddMode,
            ["chime", name] => Self::SetChime(name.to_string()),
            ["import"] => Self::ImportFromMedia,
            ["export"] => Self::ExportToMedia,
            _ => return Err(unknown()),
        };

        debug!(path, command = command.name(), "parsed HTTP command");
        Ok(command)
    }

    /// Parse a payload received on the MQTT command topic.
    pub fn from_mqtt_payload(payload: &str) -> Result<Self> {
        match payload.trim() {
            "unlock" => Ok(Self::Unlock(TriggerSource::Mqtt)),
            "bell" => Ok(Self::RingBell),
            "stop_bell" => Ok(Self::StopBell),
            "add_mode" => Ok(Self::EnterAddMode),
            other => Err(ControllerError::UnknownCommand(other.to_string())),
        }
    }
}

/// Successful command result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "data")]
pub enum CommandReply {
    Done,
    /// Authorized keys as `(id, label)` pairs, in id order.
    Keys(Vec<(String, String)>),
    /// The controller is about to restart.
    Restarting,
}

pub type CommandOutcome = Result<CommandReply>;

/// A queued command with an optional reply slot.
#[derive(Debug)]
pub struct CommandRequest {
    pub command: Command,
    pub reply: Option<oneshot::Sender<CommandOutcome>>,
}

impl CommandRequest {
    /// Deliver the outcome to whoever is waiting, if anyone.
    pub fn respond(self, outcome: CommandOutcome) {
        if let Some(reply) = self.reply {
            // The requester may have given up waiting
            let _ = reply.send(outcome);
        }
    }
}

/// Receiving half of the command channel, owned by the event loop.
pub type CommandReceiver = mpsc::Receiver<CommandRequest>;

/// Sending half of the command channel, cloned into each transport.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<CommandRequest>,
}

impl CommandSender {
    /// Queue `command` and wait for the event loop to execute it.
    pub async fn send(&self, command: Command) -> CommandOutcome {
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(CommandRequest {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| ControllerError::ChannelClosed)?;
        outcome.await.map_err(|_| ControllerError::ChannelClosed)?
    }

    /// Queue `command` without waiting for it to run.
    pub fn try_submit(&self, command: Command) -> Result<()> {
        self.tx
            .try_send(CommandRequest {
                command,
                reply: None,
            })
            .map_err(|_| ControllerError::ChannelClosed)
    }
}

/// Create a command channel buffering up to `capacity` requests.
pub fn command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandSender { tx }, rx)
}
