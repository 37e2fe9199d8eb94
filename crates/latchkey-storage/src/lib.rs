//! Persistence for the Latchkey access controller.
//!
//! - [`KeyStore`]: the credential allow-list, written through on every change
//! - [`ControllerConfig`]: the `dl32.cfg` configuration file
//! - [`AlternateMedia`]: bulk import/export via removable media, keeping a
//!   timestamped backup of every file it replaces
//!
//! All files are plain JSON objects so they can be edited by hand or
//! prepared on a PC before being copied to the card.

pub mod config;
pub mod error;
pub mod files;
pub mod keystore;
pub mod media;

pub use config::ControllerConfig;
pub use error::{StorageError, StorageResult};
pub use keystore::KeyStore;
pub use media::AlternateMedia;
