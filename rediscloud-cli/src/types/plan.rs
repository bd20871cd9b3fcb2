//! Creation plan reservation buckets

use serde::{Deserialize, Serialize};

use super::database::DEFAULT_THROUGHPUT_MEASUREMENT;

/// Aggregated reservation bucket for identically-shaped databases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationPlanEntry {
    #[serde(rename = "dataset_size_in_gb")]
    pub dataset_size_gb: f64,
    pub quantity: u32,
    #[serde(default)]
    pub replication: bool,
    #[serde(default = "default_measurement")]
    pub throughput_measurement_by: String,
    #[serde(rename = "throughput_measurement_value", default)]
    pub throughput_ops_per_sec: u64,
}

fn default_measurement() -> String {
    DEFAULT_THROUGHPUT_MEASUREMENT.to_string()
}

impl CreationPlanEntry {
    pub fn new(dataset_size_gb: f64, replication: bool, throughput_ops_per_sec: u64, quantity: u32) -> Self {
        Self {
            dataset_size_gb,
            quantity,
            replication,
            throughput_measurement_by: default_measurement(),
            throughput_ops_per_sec,
        }
    }
}
