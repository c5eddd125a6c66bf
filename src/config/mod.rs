//! Configuration for monitoring-dev

pub mod settings;

pub use settings::Settings;
