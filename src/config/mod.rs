//! Client configuration

pub mod settings;

pub use settings::{settings_path, FeedMode, MonitorSettings, SETTINGS_ENV};
