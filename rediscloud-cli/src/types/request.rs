//! Provisioning request (the combined payload file)

use std::collections::HashSet;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use super::{CreationPlanEntry, DatabaseSpec};

/// Everything the provisioning workflow needs: the subscription's creation
/// plan and the databases to create inside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub databases: Vec<DatabaseSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionBlock>,
}

/// Subscription section of a provisioning request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionBlock {
    #[serde(default)]
    pub creation_plan: Vec<CreationPlanEntry>,
}

impl SubscriptionBlock {
    pub fn is_empty(&self) -> bool {
        self.creation_plan.is_empty()
    }
}

impl ProvisionRequest {
    pub fn new(databases: Vec<DatabaseSpec>, creation_plan: Vec<CreationPlanEntry>) -> Self {
        Self {
            databases,
            subscription: Some(SubscriptionBlock { creation_plan }),
        }
    }

    /// The subscription block, if present and non-empty
    pub fn subscription_block(&self) -> Option<&SubscriptionBlock> {
        self.subscription.as_ref().filter(|s| !s.is_empty())
    }

    /// First database name that appears more than once, if any
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.databases
            .iter()
            .map(|db| db.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// Parse a request from JSON text; database names must be unique
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let request: Self = serde_json::from_str(text)?;
        if let Some(name) = request.duplicate_name() {
            return Err(serde_json::Error::custom(format!(
                "duplicate database name '{}'",
                name
            )));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_combined_payload() {
        let request = ProvisionRequest::from_json(
            &json!({
                "databases": [
                    {"name": "a", "dataset_size_in_gb": 1.0},
                    {"name": "b", "dataset_size_in_gb": 2.5, "replication": true}
                ],
                "subscription": {
                    "creation_plan": [
                        {"dataset_size_in_gb": 1.0, "quantity": 1, "replication": false,
                         "throughput_measurement_by": "operations-per-second",
                         "throughput_measurement_value": 0}
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(request.databases.len(), 2);
        assert!(request.databases[1].replication);
        assert_eq!(request.subscription_block().unwrap().creation_plan.len(), 1);
    }

    #[test]
    fn test_empty_subscription_block_is_absent() {
        let request = ProvisionRequest::from_json(r#"{"databases": [], "subscription": {}}"#).unwrap();
        assert!(request.subscription.is_some());
        assert!(request.subscription_block().is_none());

        let request = ProvisionRequest::from_json(r#"{"databases": []}"#).unwrap();
        assert!(request.subscription_block().is_none());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let text = json!({
            "databases": [
                {"name": "a", "dataset_size_in_gb": 1},
                {"name": "b", "dataset_size_in_gb": 1},
                {"name": "a", "dataset_size_in_gb": 2}
            ]
        })
        .to_string();

        let err = ProvisionRequest::from_json(&text).unwrap_err();
        assert!(err.to_string().contains("duplicate database name 'a'"));

        let unique = ProvisionRequest::new(
            vec![DatabaseSpec::new("a", 1.0), DatabaseSpec::new("b", 1.0)],
            Vec::new(),
        );
        assert_eq!(unique.duplicate_name(), None);
    }
}
