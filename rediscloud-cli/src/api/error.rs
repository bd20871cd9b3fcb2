//! Provisioning error taxonomy
//!
//! Every variant is fatal to the workflow: nothing is retried and nothing is
//! rolled back. Variants carry enough context (status codes, bodies, last
//! observed states) to diagnose the failure from the message alone.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Result alias for provisioning operations
pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;

/// Error raised by the provisioning client and workflow
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Required credential or parameter is missing or malformed.
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        /// Names (env vars / settings keys) that are missing
        missing: Vec<String>,
    },

    /// The service answered with a non-2xx status.
    #[error("{method} {path} failed with HTTP {status}: {body}")]
    Transport {
        method: String,
        path: String,
        status: u16,
        /// Parsed JSON body, or the raw text as a JSON string
        body: Value,
    },

    /// The request never got an HTTP answer (DNS, TLS, connect, read timeout).
    #[error("{method} {path} failed: {source}")]
    Connection {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// A task or subscription reached a failure status.
    #[error("{resource} failed with status '{status}'{}", detail_suffix(.detail))]
    AsyncOperationFailed {
        resource: String,
        status: String,
        detail: Option<String>,
    },

    /// Polling budget exhausted before a terminal status was observed.
    #[error(
        "timed out after {}s waiting for {resource} (last status: {})",
        whole_secs(.waited),
        status_or_none(.last_status)
    )]
    Timeout {
        resource: String,
        waited: Duration,
        last_status: Option<String>,
    },

    /// A successful response did not carry the identifier we need.
    #[error("could not find {expected} in response: {body}")]
    SchemaResolution { expected: String, body: Value },

    /// The workflow input is unusable.
    #[error("invalid provisioning request: {message}")]
    InvalidRequest { message: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

fn whole_secs(waited: &Duration) -> u64 {
    waited.as_secs()
}

fn status_or_none(status: &Option<String>) -> &str {
    status.as_deref().unwrap_or("none")
}

impl ProvisionError {
    pub fn configuration(message: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            missing,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn schema_resolution(expected: impl Into<String>, body: &Value) -> Self {
        Self::SchemaResolution {
            expected: expected.into(),
            body: body.clone(),
        }
    }

    /// HTTP status for transport failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short category name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Transport { .. } | Self::Connection { .. } => "transport",
            Self::AsyncOperationFailed { .. } => "async-operation",
            Self::Timeout { .. } => "timeout",
            Self::SchemaResolution { .. } => "schema-resolution",
            Self::InvalidRequest { .. } => "invalid-request",
        }
    }
}
