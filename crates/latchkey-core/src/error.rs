use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("Invalid credential id '{id}': {reason}")]
    InvalidCredential { id: String, reason: String },

    #[error("Invalid label '{label}': {reason}")]
    InvalidLabel { label: String, reason: String },
}

impl Error {
    pub(crate) fn credential(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn label(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
