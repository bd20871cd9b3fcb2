//! Polling configuration with builder pattern
//!
//! Interval, timeout budgets and terminal-status vocabularies for the two
//! polling loops (task resolution and subscription activation).

use std::time::Duration;

use super::status::StatusVocabulary;

/// Default wait between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default budget for each polling loop
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(900);

/// Configuration for both polling loops
#[derive(Debug, Clone, PartialEq)]
pub struct PollingConfig {
    /// Wait between consecutive checks
    pub interval: Duration,
    /// Budget for `GET /tasks/{id}` to reach a terminal status
    pub task_timeout: Duration,
    /// Budget for a subscription to become active
    pub activation_timeout: Duration,
    pub task_statuses: StatusVocabulary,
    pub subscription_statuses: StatusVocabulary,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            task_timeout: DEFAULT_POLL_TIMEOUT,
            activation_timeout: DEFAULT_POLL_TIMEOUT,
            task_statuses: StatusVocabulary::tasks(),
            subscription_statuses: StatusVocabulary::subscriptions(),
        }
    }
}

impl PollingConfig {
    /// Create a new builder for PollingConfig
    pub fn builder() -> PollingConfigBuilder {
        PollingConfigBuilder::new()
    }

    /// Slower checks and an hour of budget, for large subscriptions
    pub fn patient() -> Self {
        Self {
            interval: Duration::from_secs(15),
            task_timeout: Duration::from_secs(3600),
            activation_timeout: Duration::from_secs(3600),
            ..Self::default()
        }
    }

    /// Near-zero waits (for testing)
    pub fn immediate() -> Self {
        Self {
            interval: Duration::from_millis(10),
            task_timeout: Duration::from_secs(5),
            activation_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Look a preset up by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "patient" => Some(Self::patient()),
            "immediate" => Some(Self::immediate()),
            _ => None,
        }
    }
}

/// Builder for PollingConfig
#[derive(Debug)]
pub struct PollingConfigBuilder {
    config: PollingConfig,
}

impl Default for PollingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PollingConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PollingConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: PollingConfig) -> Self {
        Self { config }
    }

    /// Set the wait between status checks
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Set the task resolution budget
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.config.task_timeout = timeout;
        self
    }

    /// Set the subscription activation budget
    pub fn activation_timeout(mut self, timeout: Duration) -> Self {
        self.config.activation_timeout = timeout;
        self
    }

    /// Set both budgets at once
    pub fn timeout(self, timeout: Duration) -> Self {
        self.task_timeout(timeout).activation_timeout(timeout)
    }

    pub fn task_statuses(mut self, statuses: StatusVocabulary) -> Self {
        self.config.task_statuses = statuses;
        self
    }

    pub fn subscription_statuses(mut self, statuses: StatusVocabulary) -> Self {
        self.config.subscription_statuses = statuses;
        self
    }

    pub fn build(self) -> PollingConfig {
        self.config
    }
}
