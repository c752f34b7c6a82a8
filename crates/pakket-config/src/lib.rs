#![forbid(unsafe_code)]
//! Ambient restore settings loaded from `pakket.toml`.

pub mod settings;

pub use settings::{Settings, SettingsError};
