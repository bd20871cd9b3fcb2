//! Payload builders: normalized databases → Terraform variables and
//! provisioning requests

pub mod plan;
pub mod tfvars;
pub mod writer;

pub use plan::{aggregate_plan, planned_quantity};
pub use tfvars::{TfCreationPlan, TfDatabase, TfVars, render_hcl_snippet};
pub use writer::{write_json, write_text};

use crate::types::{DatabaseSpec, ProvisionRequest};

/// Build the combined provisioning request: the databases in input order plus
/// a creation plan grouped at `precision` decimal places
pub fn build_provision_request(databases: Vec<DatabaseSpec>, precision: u32) -> ProvisionRequest {
    let plan = aggregate_plan(&databases, precision);
    ProvisionRequest::new(databases, plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_provision_request_shape() {
        let dbs = vec![
            DatabaseSpec::new("a", 1.5).with_throughput(1000),
            DatabaseSpec::new("b", 1.5).with_throughput(1000),
        ];
        let request = build_provision_request(dbs, 3);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["databases"][1]["name"], json!("b"));
        assert_eq!(
            value["subscription"]["creation_plan"],
            json!([{
                "dataset_size_in_gb": 1.5,
                "quantity": 2,
                "replication": false,
                "throughput_measurement_by": "operations-per-second",
                "throughput_measurement_value": 1000
            }])
        );

        // the written request reads back into the same workflow input
        let reparsed = ProvisionRequest::from_json(&value.to_string()).unwrap();
        assert_eq!(reparsed, request);
    }
}
