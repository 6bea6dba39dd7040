//! Configuration and settings management.
//!
//! This module provides application settings types and loading.
//! Settings are stored in the user's config directory as JSON.

mod settings;

pub use settings::{
    data_dir, default_settings_path, AiSettings, DatabaseSettings, InboxSettings, Settings,
    SettingsError,
};
