//! Stdin commands that drive the simulated board.

use latchkey_controller::{Command, ControllerError};
use latchkey_core::FacilityCode;

/// Which push button a console line acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Exit,
    Program,
    Bell,
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Present a credential to the reader.
    Scan {
        number: String,
        facility: Option<FacilityCode>,
    },
    /// Tap a button.
    Tap(Button),
    /// Hold a button past the long-press threshold.
    Hold(Button),
    OpenDoor,
    CloseDoor,
    /// HTTP route or MQTT payload, already parsed.
    Remote(Command),
    Help,
}

/// Usage text printed by `help`.
pub const USAGE: &str = "\
scan <id> [facility]   present a credential
exit | exit long       tap or hold the exit button
prog long              hold the programming button
bell                   press the doorbell button
open | close           move the door
/<route>               web UI request, e.g. /add_key/12345
mqtt <payload>         MQTT command, e.g. mqtt unlock
help                   show this text";

impl Input {
    /// Parse a console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ControllerError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.starts_with('/') {
            return Command::from_http_path(line).map(|c| Some(Self::Remote(c)));
        }
        if let Some(payload) = line.strip_prefix("mqtt ") {
            return Command::from_mqtt_payload(payload).map(|c| Some(Self::Remote(c)));
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let input = match words.as_slice() {
            ["scan", number] => Self::Scan {
                number: number.to_string(),
                facility: None,
            },
            ["scan", number, facility] => {
                let code = facility
                    .parse()
                    .map_err(|_| ControllerError::UnknownCommand(line.to_string()))?;
                Self::Scan {
                    number: number.to_string(),
                    facility: Some(FacilityCode(code)),
                }
            }
            ["exit"] => Self::Tap(Button::Exit),
            ["exit", "long"] => Self::Hold(Button::Exit),
            ["prog"] => Self::Tap(Button::Program),
            ["prog", "long"] => Self::Hold(Button::Program),
            ["bell"] => Self::Tap(Button::Bell),
            ["open"] => Self::OpenDoor,
            ["close"] => Self::CloseDoor,
            ["help"] | ["?"] => Self::Help,
            _ => return Err(ControllerError::UnknownCommand(line.to_string())),
        };
        Ok(Some(input))
    }
}
