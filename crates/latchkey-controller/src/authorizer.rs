//! Credential authorization decision.
//!
//! | Add mode | Known key | Decision          |
//! |----------|-----------|-------------------|
//! | no       | yes       | `Grant`           |
//! | no       | no        | `Deny`            |
//! | yes      | yes       | `AlreadyEnrolled` |
//! | yes      | no        | `Enroll`          |
//!
//! Deciding is pure; the event loop carries out the decision.

use latchkey_storage::KeyStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Unlock for the credential duration.
    Grant { label: String },
    /// Reject with the invalid-key feedback.
    Deny,
    /// Known key presented during add mode; ends the window.
    AlreadyEnrolled,
    /// Unknown key presented during add mode; add it to the store.
    Enroll,
}

/// Decide what to do with a scanned card number.
pub fn decide(store: &KeyStore, add_mode_active: bool, number: &str) -> Decision {
    let label = store.label(number);
    match (add_mode_active, label) {
        (false, Some(label)) => Decision::Grant {
            label: label.to_string(),
        },
        (false, None) => Decision::Deny,
        (true, Some(_)) => Decision::AlreadyEnrolled,
        (true, None) => Decision::Enroll,
    }
}
