//! Configuration: settings file + environment, validated into explicit structs

pub mod settings;

pub use settings::{
    ApiConfig, ApiCredentials, DEFAULT_BASE_URL, DEFAULT_DEPLOYMENT_CIDR, DEFAULT_REQUEST_TIMEOUT,
    DeploymentTarget, PollingSettings, ProvisionConfig, Settings, default_settings_path,
    default_subscription_name, env,
};
