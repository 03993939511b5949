//! # vigil-settings
//!
//! Configuration with layered sources for the Vigil backend.
//!
//! Compiled defaults, then `~/.vigil/settings.json`, then `VIGIL_*`
//! environment variables; see [`loader`] for the merge rules. The binary
//! applies command-line flags on top of the loaded value.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, resolve_db_path,
    settings_path, validate, vigil_home,
};
pub use types::*;
