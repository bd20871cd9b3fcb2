//! Layered settings: TOML file, then environment (including `.env`)
//!
//! Nothing here talks to the network. `Settings` is the loose, partially
//! filled view; [`Settings::provision_config`] and [`Settings::api_config`]
//! validate it into the explicit structs the client is built from.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::api::polling::{PollingConfig, PollingConfigBuilder};
use crate::api::{ProvisionError, ProvisionResult, SubscriptionShape};

pub const DEFAULT_BASE_URL: &str = "https://api.redislabs.com/v1";
pub const DEFAULT_DEPLOYMENT_CIDR: &str = "10.0.0.0/24";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names
pub mod env {
    pub const BASE_URL: &str = "REDIS_CLOUD_BASE_URL";
    pub const ACCOUNT_KEY: &str = "REDIS_CLOUD_ACCOUNT_KEY";
    pub const API_KEY: &str = "REDIS_CLOUD_API_KEY";
    pub const PROVIDER: &str = "REDIS_CLOUD_PROVIDER";
    pub const REGION: &str = "REDIS_CLOUD_REGION";
    pub const PAYMENT_METHOD_ID: &str = "REDIS_CLOUD_PAYMENT_METHOD_ID";
    pub const DEPLOYMENT_CIDR: &str = "REDIS_CLOUD_DEPLOYMENT_CIDR";
    pub const SUBSCRIPTION_NAME: &str = "REDIS_CLOUD_SUBSCRIPTION_NAME";
    pub const SUBSCRIPTION_SHAPE: &str = "REDIS_CLOUD_SUBSCRIPTION_SHAPE";
    pub const POLL_INTERVAL_SECS: &str = "REDIS_CLOUD_POLL_INTERVAL_SECS";
    pub const TASK_TIMEOUT_SECS: &str = "REDIS_CLOUD_TASK_TIMEOUT_SECS";
    pub const ACTIVATION_TIMEOUT_SECS: &str = "REDIS_CLOUD_ACTIVATION_TIMEOUT_SECS";
    pub const REQUEST_TIMEOUT_SECS: &str = "REDIS_CLOUD_REQUEST_TIMEOUT_SECS";
}

/// Account-level and user-level API keys
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Sent as `x-api-key`
    pub account_key: String,
    /// Sent as `x-api-secret-key`
    pub user_key: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("account_key", &"***")
            .field("user_key", &"***")
            .finish()
    }
}

/// Where and how to reach the service
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub credentials: ApiCredentials,
    /// Per-request timeout (not the polling budget)
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, account_key: impl Into<String>, user_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: ApiCredentials {
                account_key: account_key.into(),
                user_key: user_key.into(),
            },
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Cloud placement and billing for a new subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub provider: String,
    pub region: String,
    pub payment_method_id: String,
    pub deployment_cidr: String,
    pub subscription_name: String,
}

impl DeploymentTarget {
    pub fn new(provider: impl Into<String>, region: impl Into<String>, payment_method_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            region: region.into(),
            payment_method_id: payment_method_id.into(),
            deployment_cidr: DEFAULT_DEPLOYMENT_CIDR.to_string(),
            subscription_name: default_subscription_name(),
        }
    }
}

/// `sizing-<local timestamp>`
pub fn default_subscription_name() -> String {
    format!("sizing-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}

/// Everything the provisioning workflow needs, validated
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    pub api: ApiConfig,
    pub target: DeploymentTarget,
    pub shape: SubscriptionShape,
    pub polling: PollingConfig,
}

/// Polling section of the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// `default`, `patient` or `immediate`
    pub preset: Option<String>,
    pub interval_secs: Option<f64>,
    pub task_timeout_secs: Option<u64>,
    pub activation_timeout_secs: Option<u64>,
}

/// Raw settings as read from file and environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: Option<String>,
    pub account_key: Option<String>,
    /// User-level key
    pub api_key: Option<String>,
    pub provider: Option<String>,
    pub region: Option<String>,
    pub payment_method_id: Option<String>,
    pub deployment_cidr: Option<String>,
    pub subscription_name: Option<String>,
    pub subscription_shape: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub polling: PollingSettings,
}

/// `<config dir>/rediscloud-cli/config.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rediscloud-cli").join("config.toml"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Settings {
    /// Parse a TOML settings document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse settings TOML")
    }

    /// Read a settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Load settings: the explicit file (must exist) or the default file (if present),
    /// then environment variables on top
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Settings file not found: {}", path.display());
                }
                Self::from_file(path)?
            }
            None => match default_settings_path().filter(|p| p.exists()) {
                Some(path) => {
                    log::debug!("Using settings file {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        settings.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Overlay values from `lookup` (normally the process environment); blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_blank(lookup(name));

        let strings: [(&str, &mut Option<String>); 9] = [
            (env::BASE_URL, &mut self.base_url),
            (env::ACCOUNT_KEY, &mut self.account_key),
            (env::API_KEY, &mut self.api_key),
            (env::PROVIDER, &mut self.provider),
            (env::REGION, &mut self.region),
            (env::PAYMENT_METHOD_ID, &mut self.payment_method_id),
            (env::DEPLOYMENT_CIDR, &mut self.deployment_cidr),
            (env::SUBSCRIPTION_NAME, &mut self.subscription_name),
            (env::SUBSCRIPTION_SHAPE, &mut self.subscription_shape),
        ];
        for (name, slot) in strings {
            if let Some(value) = get(name) {
                *slot = Some(value);
            }
        }

        if let Some(raw) = get(env::POLL_INTERVAL_SECS) {
            let secs: f64 = raw
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", env::POLL_INTERVAL_SECS, raw))?;
            self.polling.interval_secs = Some(secs);
        }
        if let Some(raw) = get(env::TASK_TIMEOUT_SECS) {
            self.polling.task_timeout_secs = Some(parse_secs(env::TASK_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = get(env::ACTIVATION_TIMEOUT_SECS) {
            self.polling.activation_timeout_secs = Some(parse_secs(env::ACTIVATION_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = get(env::REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = Some(parse_secs(env::REQUEST_TIMEOUT_SECS, &raw)?);
        }

        Ok(())
    }

    /// Credentials and endpoint only (enough for read-only calls)
    pub fn api_config(&self) -> ProvisionResult<ApiConfig> {
        let mut missing = Vec::new();
        let account_key = require(&self.account_key, env::ACCOUNT_KEY, &mut missing);
        let user_key = require(&self.api_key, env::API_KEY, &mut missing);

        match (account_key, user_key) {
            (Some(account_key), Some(user_key)) => Ok(self.build_api_config(account_key, user_key)),
            _ => Err(missing_error(missing)),
        }
    }

    /// Full provisioning configuration; every missing required value is reported at once
    pub fn provision_config(&self) -> ProvisionResult<ProvisionConfig> {
        let mut missing = Vec::new();
        let account_key = require(&self.account_key, env::ACCOUNT_KEY, &mut missing);
        let user_key = require(&self.api_key, env::API_KEY, &mut missing);
        let provider = require(&self.provider, env::PROVIDER, &mut missing);
        let region = require(&self.region, env::REGION, &mut missing);
        let payment = require(&self.payment_method_id, env::PAYMENT_METHOD_ID, &mut missing);

        let (Some(account_key), Some(user_key), Some(provider), Some(region), Some(payment)) =
            (account_key, user_key, provider, region, payment)
        else {
            return Err(missing_error(missing));
        };

        let shape = match non_blank(self.subscription_shape.clone()) {
            Some(raw) => raw.parse::<SubscriptionShape>().map_err(|message| {
                ProvisionError::configuration(message, vec![env::SUBSCRIPTION_SHAPE.to_string()])
            })?,
            None => SubscriptionShape::default(),
        };

        let mut target = DeploymentTarget::new(provider, region, payment);
        if let Some(cidr) = non_blank(self.deployment_cidr.clone()) {
            target.deployment_cidr = cidr;
        }
        if let Some(name) = non_blank(self.subscription_name.clone()) {
            target.subscription_name = name;
        }

        Ok(ProvisionConfig {
            api: self.build_api_config(account_key, user_key),
            target,
            shape,
            polling: self.polling_config()?,
        })
    }

    /// Polling configuration: preset first, explicit values on top
    pub fn polling_config(&self) -> ProvisionResult<PollingConfig> {
        let base = match non_blank(self.polling.preset.clone()) {
            Some(name) => PollingConfig::preset(&name).ok_or_else(|| {
                ProvisionError::configuration(
                    format!("unknown polling preset '{}' (expected default, patient or immediate)", name),
                    vec!["polling.preset".to_string()],
                )
            })?,
            None => PollingConfig::default(),
        };

        let mut builder = PollingConfigBuilder::from_config(base);

        if let Some(secs) = self.polling.interval_secs {
            let interval = Duration::try_from_secs_f64(secs).map_err(|_| {
                ProvisionError::configuration(
                    format!("poll interval must be a non-negative number of seconds, got {}", secs),
                    vec![env::POLL_INTERVAL_SECS.to_string()],
                )
            })?;
            builder = builder.interval(interval);
        }
        if let Some(secs) = self.polling.task_timeout_secs {
            builder = builder.task_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.polling.activation_timeout_secs {
            builder = builder.activation_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build())
    }

    fn build_api_config(&self, account_key: String, user_key: String) -> ApiConfig {
        let base_url = non_blank(self.base_url.clone()).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut api = ApiConfig::new(base_url, account_key, user_key);
        if let Some(secs) = self.request_timeout_secs {
            api.request_timeout = Duration::from_secs(secs);
        }
        api
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", name, raw))
}

fn require(value: &Option<String>, name: &str, missing: &mut Vec<String>) -> Option<String> {
    let value = non_blank(value.clone());
    if value.is_none() {
        missing.push(name.to_string());
    }
    value
}

fn missing_error(missing: Vec<String>) -> ProvisionError {
    ProvisionError::configuration(
        format!("missing required settings: {}", missing.join(", ")),
        missing,
    )
}
