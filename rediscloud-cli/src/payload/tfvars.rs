//! Terraform variables file (`databases` map + `creation_plans` list)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::plan::aggregate_plan;
use crate::types::{DEFAULT_THROUGHPUT_MEASUREMENT, DatabaseSpec};

/// Contents of `terraform.auto.tfvars.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfVars {
    pub databases: BTreeMap<String, TfDatabase>,
    pub creation_plans: Vec<TfCreationPlan>,
}

/// One entry of `var.databases`, keyed by database name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfDatabase {
    pub dataset_size_in_gb: u64,
    pub replication: bool,
    pub throughput_measurement_value: u64,
    pub modules: Vec<String>,
    pub support_oss_cluster_api: bool,
}

/// One entry of `var.creation_plans`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfCreationPlan {
    pub dataset_size_in_gb: u64,
    pub quantity: u32,
    pub replication: bool,
    pub throughput_measurement_by: String,
    pub throughput_measurement_value: u64,
}

impl From<&DatabaseSpec> for TfDatabase {
    fn from(spec: &DatabaseSpec) -> Self {
        Self {
            dataset_size_in_gb: spec.variables_size_gb(),
            replication: spec.replication,
            throughput_measurement_value: spec.throughput_ops_per_sec,
            modules: spec.modules.clone(),
            support_oss_cluster_api: spec.support_oss_cluster_api,
        }
    }
}

impl TfVars {
    /// Build the variables file; sizes become whole GB (nearest, at least 1)
    /// and the plan is grouped on those whole sizes. Names are expected to be
    /// unique, as `normalize_table` guarantees.
    pub fn from_databases(databases: &[DatabaseSpec]) -> Self {
        let whole: Vec<DatabaseSpec> = databases
            .iter()
            .map(|db| DatabaseSpec {
                dataset_size_gb: db.variables_size_gb() as f64,
                ..db.clone()
            })
            .collect();

        let creation_plans = aggregate_plan(&whole, 0)
            .into_iter()
            .map(|entry| TfCreationPlan {
                dataset_size_in_gb: entry.dataset_size_gb as u64,
                quantity: entry.quantity,
                replication: entry.replication,
                throughput_measurement_by: entry.throughput_measurement_by,
                throughput_measurement_value: entry.throughput_ops_per_sec,
            })
            .collect();

        Self {
            databases: databases
                .iter()
                .map(|db| (db.name.clone(), TfDatabase::from(db)))
                .collect(),
            creation_plans,
        }
    }
}

/// HCL snippet wiring `rediscloud_subscription_database` resources to
/// `var.databases`, with the subscription's `creation_plan` block commented out
pub fn render_hcl_snippet() -> String {
    let lines = [
        "// Generated by rediscloud-cli -- do not edit by hand".to_string(),
        r#"resource "rediscloud_subscription_database" "db" {"#.to_string(),
        "  for_each = var.databases".to_string(),
        "  subscription_id              = rediscloud_subscription.sub.id".to_string(),
        "  name                         = each.key".to_string(),
        "  dataset_size_in_gb           = each.value.dataset_size_in_gb".to_string(),
        "  replication                  = each.value.replication".to_string(),
        format!(
            "  throughput_measurement_by    = \"{}\"",
            DEFAULT_THROUGHPUT_MEASUREMENT
        ),
        "  throughput_measurement_value = each.value.throughput_measurement_value".to_string(),
        "  modules                      = try(each.value.modules, [])".to_string(),
        "  support_oss_cluster_api      = try(each.value.support_oss_cluster_api, false)"
            .to_string(),
        "}".to_string(),
        String::new(),
        "// In your subscription resource add:".to_string(),
        r#"// dynamic "creation_plan" {"#.to_string(),
        "//   for_each = var.creation_plans".to_string(),
        "//   content {".to_string(),
        "//     dataset_size_in_gb              = creation_plan.value.dataset_size_in_gb"
            .to_string(),
        "//     quantity                        = creation_plan.value.quantity".to_string(),
        "//     replication                     = creation_plan.value.replication".to_string(),
        format!(
            "//     throughput_measurement_by       = \"{}\"",
            DEFAULT_THROUGHPUT_MEASUREMENT
        ),
        "//     throughput_measurement_value    = creation_plan.value.throughput_measurement_value"
            .to_string(),
        "//   }".to_string(),
        "// }".to_string(),
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tfvars_uses_whole_sizes() {
        let dbs = vec![
            DatabaseSpec::new("cache-1", 2.4).with_replication(true).with_throughput(5000),
            DatabaseSpec::new("cache-2", 2.4).with_replication(true).with_throughput(5000),
            DatabaseSpec::new("tiny", 0.2).with_modules(vec!["RedisJSON".into()]),
        ];

        let tfvars = TfVars::from_databases(&dbs);
        let value = serde_json::to_value(&tfvars).unwrap();

        assert_eq!(value["databases"]["cache-1"]["dataset_size_in_gb"], json!(2));
        assert_eq!(value["databases"]["tiny"]["dataset_size_in_gb"], json!(1));
        assert_eq!(value["databases"]["tiny"]["modules"], json!(["RedisJSON"]));
        assert_eq!(
            value["creation_plans"],
            json!([
                {
                    "dataset_size_in_gb": 1,
                    "quantity": 1,
                    "replication": false,
                    "throughput_measurement_by": "operations-per-second",
                    "throughput_measurement_value": 0
                },
                {
                    "dataset_size_in_gb": 2,
                    "quantity": 2,
                    "replication": true,
                    "throughput_measurement_by": "operations-per-second",
                    "throughput_measurement_value": 5000
                }
            ])
        );
    }

    #[test]
    fn test_hcl_snippet_references_variables() {
        let hcl = render_hcl_snippet();
        assert!(hcl.contains(r#"resource "rediscloud_subscription_database" "db""#));
        assert!(hcl.contains("for_each = var.databases"));
        assert!(hcl.contains("//   for_each = var.creation_plans"));
        assert!(hcl.ends_with("// }\n"));
    }
}
