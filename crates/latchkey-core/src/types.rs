use crate::{
    Result,
    constants::{
        ENROLLMENT_LABEL_FORMAT, MAX_CREDENTIAL_LENGTH, MAX_LABEL_LENGTH, MIN_CREDENTIAL_LENGTH,
        MIN_LABEL_LENGTH,
    },
    error::Error,
};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Credential identifier as stored in the key store (2-6 ASCII digits).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialId(String);

impl CredentialId {
    /// Create a credential id with validation.
    ///
    /// The id is normalized (surrounding whitespace trimmed) before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` if:
    /// - The id length is not between 2-6 characters
    /// - The id contains anything other than ASCII digits
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();

        let len = id.len();
        if !(MIN_CREDENTIAL_LENGTH..=MAX_CREDENTIAL_LENGTH).contains(&len) {
            return Err(Error::credential(
                id,
                format!(
                    "must be {MIN_CREDENTIAL_LENGTH}-{MAX_CREDENTIAL_LENGTH} chars, got {len}"
                ),
            ));
        }

        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::credential(id, "must be numeric"));
        }

        Ok(CredentialId(id.to_string()))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CredentialId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CredentialId::new(s)
    }
}

impl TryFrom<String> for CredentialId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        CredentialId::new(&value)
    }
}

impl From<CredentialId> for String {
    fn from(id: CredentialId) -> Self {
        id.0
    }
}

/// Human readable name attached to a credential (1-15 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Create a label with validation.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidLabel` if the label is empty or longer than 15 characters.
    pub fn new(label: &str) -> Result<Self> {
        let len = label.chars().count();
        if !(MIN_LABEL_LENGTH..=MAX_LABEL_LENGTH).contains(&len) {
            return Err(Error::label(
                label,
                format!("must be {MIN_LABEL_LENGTH}-{MAX_LABEL_LENGTH} chars, got {len}"),
            ));
        }
        Ok(Label(label.to_string()))
    }

    /// Label given to a key enrolled at `at` (`YYYYMMDD_HHMMSS`).
    #[must_use]
    pub fn enrollment<Tz: TimeZone>(at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Label(at.format(ENROLLMENT_LABEL_FORMAT).to_string())
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Label::new(&value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

/// Facility code reported by the reader. Logged only, never part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacilityCode(pub u32);

impl fmt::Display for FacilityCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded credential as delivered by the reader driver.
///
/// The number is kept as the reader produced it; it only becomes a
/// [`CredentialId`] when it is looked up or enrolled, so an out-of-range
/// number is simply an unknown key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    number: String,
    facility_code: FacilityCode,
}

impl Credential {
    /// Create a credential from a raw number and facility code.
    pub fn new(number: impl Into<String>, facility_code: FacilityCode) -> Self {
        Self {
            number: number.into().trim().to_string(),
            facility_code,
        }
    }

    /// Credential from a Wiegand frame already split into card number and facility code.
    #[must_use]
    pub fn from_wiegand(card_number: u32, facility_code: u32) -> Self {
        Self::new(card_number.to_string(), FacilityCode(facility_code))
    }

    /// The card number as scanned.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// The facility code reported alongside the number.
    #[must_use]
    pub fn facility_code(&self) -> FacilityCode {
        self.facility_code
    }
}

/// What asked for the door to be unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    ExitButton,
    Http,
    Mqtt,
    Credential,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TriggerSource::ExitButton => write!(f, "exit button"),
            TriggerSource::Http => write!(f, "HTTP"),
            TriggerSource::Mqtt => write!(f, "MQTT"),
            TriggerSource::Credential => write!(f, "credential"),
        }
    }
}

/// Unlock duration per trigger source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockDurations {
    pub exit_button: Duration,
    pub http: Duration,
    pub mqtt: Duration,
    pub credential: Duration,
}

impl UnlockDurations {
    /// The same duration for every trigger source (garage/gate use).
    #[must_use]
    pub fn uniform(duration: Duration) -> Self {
        Self {
            exit_button: duration,
            http: duration,
            mqtt: duration,
            credential: duration,
        }
    }

    /// Duration configured for `source`.
    #[must_use]
    pub fn for_source(&self, source: TriggerSource) -> Duration {
        match source {
            TriggerSource::ExitButton => self.exit_button,
            TriggerSource::Http => self.http,
            TriggerSource::Mqtt => self.mqtt,
            TriggerSource::Credential => self.credential,
        }
    }
}
