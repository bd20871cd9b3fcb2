//! Polling configuration and status classification

pub mod config;
pub mod status;

pub use config::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollingConfig, PollingConfigBuilder};
pub use status::StatusVocabulary;
