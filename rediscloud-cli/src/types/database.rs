//! Canonical database specification
//!
//! A `DatabaseSpec` is what one sizing-sheet row (or one entry of a
//! provisioning request) turns into once names, sizes and flags have been
//! normalized. The serialized form is the snake_case request schema; the
//! deserializer is deliberately forgiving because request files are often
//! edited by hand.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Throughput measurement used when the input does not name one
pub const DEFAULT_THROUGHPUT_MEASUREMENT: &str = "operations-per-second";

/// Tokens accepted as `true` for boolean sizing columns (compared lowercase)
const TRUTHY_TOKENS: &[&str] = &["1", "true", "yes", "y", "t"];

/// Most decimal places a dataset size is kept to
pub const MAX_SIZE_PRECISION: u32 = 9;

/// Slack applied before rounding sizes up, so `2.0000000001` stays at 2 GB
const CEIL_EPSILON: f64 = 1e-9;

/// One database to provision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDatabaseEntry")]
pub struct DatabaseSpec {
    /// Unique name within a provisioning batch
    pub name: String,
    /// Dataset size in GB, rounded to the sheet's decimal precision
    #[serde(rename = "dataset_size_in_gb")]
    pub dataset_size_gb: f64,
    pub replication: bool,
    /// Usually "operations-per-second"
    pub throughput_measurement_by: String,
    /// Requested throughput; 0 means "not specified"
    #[serde(rename = "throughput_measurement_value")]
    pub throughput_ops_per_sec: u64,
    pub modules: Vec<String>,
    pub support_oss_cluster_api: bool,
}

impl DatabaseSpec {
    /// Create a spec with default throughput measurement, no modules and no cluster API
    pub fn new(name: impl Into<String>, dataset_size_gb: f64) -> Self {
        Self {
            name: name.into(),
            dataset_size_gb,
            replication: false,
            throughput_measurement_by: DEFAULT_THROUGHPUT_MEASUREMENT.to_string(),
            throughput_ops_per_sec: 0,
            modules: Vec::new(),
            support_oss_cluster_api: false,
        }
    }

    pub fn with_replication(mut self, replication: bool) -> Self {
        self.replication = replication;
        self
    }

    pub fn with_throughput(mut self, ops_per_sec: u64) -> Self {
        self.throughput_ops_per_sec = ops_per_sec;
        self
    }

    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_oss_cluster_api(mut self, enabled: bool) -> Self {
        self.support_oss_cluster_api = enabled;
        self
    }

    /// Copy of this spec under a different name (used for quantity expansion)
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Size the provisioning service is asked for: whole GB, rounded up, never below 1
    pub fn provisioned_size_gb(&self) -> u64 {
        ceil_whole_gb(self.dataset_size_gb)
    }

    /// Size written to the Terraform variables file: nearest whole GB, never below 1
    pub fn variables_size_gb(&self) -> u64 {
        nearest_whole_gb(self.dataset_size_gb)
    }
}

/// Scale factor for `precision` decimal places, capped at [`MAX_SIZE_PRECISION`]
pub fn precision_factor(precision: u32) -> f64 {
    10f64.powi(precision.min(MAX_SIZE_PRECISION) as i32)
}

/// Round `value` to `precision` decimal places
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = precision_factor(precision);
    (value * factor).round() / factor
}

/// Round a size up to whole GB with a floor of 1
pub fn ceil_whole_gb(size: f64) -> u64 {
    let rounded = (size - CEIL_EPSILON).ceil();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as u64
    } else {
        1
    }
}

/// Round a size to the nearest whole GB with a floor of 1
pub fn nearest_whole_gb(size: f64) -> u64 {
    let rounded = size.round();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as u64
    } else {
        1
    }
}

/// Whether a free-text cell value means `true`
pub fn is_truthy_token(token: &str) -> bool {
    let lowered = token.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&lowered.as_str())
}

/// Loosely-typed request entry as found in hand-edited JSON
#[derive(Debug, Deserialize)]
struct RawDatabaseEntry {
    #[serde(default, alias = "database_name", alias = "database")]
    name: Option<Value>,
    #[serde(default, alias = "datasetSizeInGb", alias = "dataset_size_gb")]
    dataset_size_in_gb: Option<Value>,
    #[serde(default)]
    replication: Option<Value>,
    #[serde(default, alias = "throughputMeasurementBy")]
    throughput_measurement_by: Option<String>,
    #[serde(
        default,
        alias = "throughputMeasurementValue",
        alias = "throughput_ops_per_second"
    )]
    throughput_measurement_value: Option<Value>,
    #[serde(default)]
    modules: Option<Value>,
    /// Legacy misspelling still found in older payload files
    #[serde(default)]
    modulexs: Option<Value>,
    #[serde(default, alias = "supportOSSClusterApi")]
    support_oss_cluster_api: Option<Value>,
}

impl TryFrom<RawDatabaseEntry> for DatabaseSpec {
    type Error = String;

    fn try_from(raw: RawDatabaseEntry) -> Result<Self, Self::Error> {
        let name = raw
            .name
            .as_ref()
            .and_then(value_as_text)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "database entry is missing a name".to_string())?;

        let size = raw
            .dataset_size_in_gb
            .as_ref()
            .and_then(value_as_number)
            .ok_or_else(|| format!("database '{}' has no numeric dataset_size_in_gb", name))?;
        if !size.is_finite() || size <= 0.0 {
            return Err(format!(
                "database '{}' has non-positive dataset_size_in_gb {}",
                name, size
            ));
        }

        let throughput = raw
            .throughput_measurement_value
            .as_ref()
            .and_then(value_as_number)
            .filter(|v| *v > 0.0)
            .map(|v| v as u64)
            .unwrap_or(0);

        let modules = raw
            .modules
            .or(raw.modulexs)
            .map(|v| value_as_modules(&v))
            .unwrap_or_default();

        Ok(DatabaseSpec {
            name,
            dataset_size_gb: size,
            replication: raw.replication.as_ref().map(value_as_flag).unwrap_or(false),
            throughput_measurement_by: raw
                .throughput_measurement_by
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_THROUGHPUT_MEASUREMENT.to_string()),
            throughput_ops_per_sec: throughput,
            modules,
            support_oss_cluster_api: raw
                .support_oss_cluster_api
                .as_ref()
                .map(value_as_flag)
                .unwrap_or(false),
        })
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub(crate) fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => is_truthy_token(s),
        _ => false,
    }
}

fn value_as_modules(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(obj) => obj
                    .get("name")
                    .and_then(|n| n.as_str())
                    .map(|n| n.trim().to_string()),
                _ => None,
            })
            .filter(|m| !m.is_empty())
            .collect(),
        Value::String(s) => split_modules(s),
        _ => Vec::new(),
    }
}

/// Split a comma separated module list, dropping blanks
pub fn split_modules(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
        .collect()
}
