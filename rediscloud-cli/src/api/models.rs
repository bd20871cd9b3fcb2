//! Wire models for the provisioning service
//!
//! Outgoing payloads are camelCase. Incoming bodies are kept as raw
//! `serde_json::Value` and read through [`super::extract`], because the
//! service answers the same call with different shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{CreationPlanEntry, DatabaseSpec};

/// Protocol sent for every database
pub const DATABASE_PROTOCOL: &str = "redis";

/// Throughput requested when a database does not specify one
pub const DEFAULT_THROUGHPUT_OPS: u64 = 100;

/// What a create call gave back: the identifier itself, or a task to poll for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionHandle {
    Direct(String),
    Task(String),
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionHandle::Direct(id) => write!(f, "subscription {}", id),
            SubscriptionHandle::Task(id) => write!(f, "task {}", id),
        }
    }
}

/// Kind of resource an asynchronous task creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Subscription,
    Database,
}

impl ResourceKind {
    /// Body fields holding the identifier when a create call answers directly
    pub fn direct_id_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Subscription => &["subscriptionId", "subscription_id", "id"],
            ResourceKind::Database => &["databaseId", "database_id", "id"],
        }
    }

    /// Dotted paths probed on a completed task, highest priority first
    pub fn task_result_paths(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Subscription => &[
                "result.subscriptionId",
                "response.subscriptionId",
                "subscriptionId",
                "resourceId",
                "result.id",
                "response.id",
            ],
            ResourceKind::Database => &[
                "result.databaseId",
                "response.databaseId",
                "databaseId",
                "response.resourceId",
                "resourceId",
                "result.id",
                "response.id",
            ],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Subscription => "subscription",
            ResourceKind::Database => "database",
        }
    }
}

/// Body fields carrying an asynchronous task handle
pub const TASK_ID_FIELDS: &[&str] = &["taskId", "task_id"];

/// Classified status of an asynchronous task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// Snapshot of `GET /tasks/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    /// Status string as reported, lowercased
    pub raw_status: String,
    pub body: Value,
}

/// Classified status of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Provisioning,
    Active,
    Failed,
}

/// Snapshot of `GET /subscriptions/{id}`
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub raw_status: String,
    pub body: Value,
}

/// How the subscription create call is shaped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionShape {
    /// `creationPlan` reservations; databases are created one by one afterwards
    #[default]
    CreationPlan,
    /// Full database payloads inside the subscription request
    DatabasesInline,
}

impl FromStr for SubscriptionShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "creation-plan" | "plan" => Ok(SubscriptionShape::CreationPlan),
            "databases-inline" | "inline" | "databases" => Ok(SubscriptionShape::DatabasesInline),
            other => Err(format!(
                "unknown subscription shape '{}' (expected creation-plan or databases-inline)",
                other
            )),
        }
    }
}

impl fmt::Display for SubscriptionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionShape::CreationPlan => write!(f, "creation-plan"),
            SubscriptionShape::DatabasesInline => write!(f, "databases-inline"),
        }
    }
}

/// Database create payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasePayload {
    pub name: String,
    pub protocol: String,
    pub dataset_size_in_gb: u64,
    pub replication: bool,
    pub throughput_measurement_by: String,
    pub throughput_measurement_value: u64,
    pub modules: Vec<String>,
    #[serde(rename = "supportOSSClusterApi")]
    pub support_oss_cluster_api: bool,
}

impl From<&DatabaseSpec> for DatabasePayload {
    fn from(spec: &DatabaseSpec) -> Self {
        Self {
            name: spec.name.clone(),
            protocol: DATABASE_PROTOCOL.to_string(),
            dataset_size_in_gb: spec.provisioned_size_gb(),
            replication: spec.replication,
            throughput_measurement_by: spec.throughput_measurement_by.clone(),
            throughput_measurement_value: throughput_or_default(spec.throughput_ops_per_sec),
            modules: spec.modules.clone(),
            support_oss_cluster_api: spec.support_oss_cluster_api,
        }
    }
}

/// One `creationPlan` reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntryPayload {
    pub dataset_size_in_gb: u64,
    pub quantity: u32,
    pub replication: bool,
    pub throughput_measurement_by: String,
    pub throughput_measurement_value: u64,
}

impl From<&CreationPlanEntry> for PlanEntryPayload {
    fn from(entry: &CreationPlanEntry) -> Self {
        Self {
            dataset_size_in_gb: crate::types::ceil_whole_gb(entry.dataset_size_gb),
            quantity: entry.quantity.max(1),
            replication: entry.replication,
            throughput_measurement_by: entry.throughput_measurement_by.clone(),
            throughput_measurement_value: throughput_or_default(entry.throughput_ops_per_sec),
        }
    }
}

fn throughput_or_default(ops: u64) -> u64 {
    if ops == 0 { DEFAULT_THROUGHPUT_OPS } else { ops }
}

/// Networking block of a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionNetworking {
    #[serde(rename = "deploymentCIDR")]
    pub deployment_cidr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPayload {
    pub region: String,
    pub networking: RegionNetworking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudProviderPayload {
    pub provider: String,
    pub regions: Vec<RegionPayload>,
}

/// Subscription create payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    pub name: String,
    /// Numeric when the configured id parses as an integer
    pub payment_method_id: Value,
    pub cloud_providers: Vec<CloudProviderPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_plan: Option<Vec<PlanEntryPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub databases: Option<Vec<DatabasePayload>>,
}

impl SubscriptionPayload {
    /// Payload skeleton for one provider/region without plan or databases
    pub fn new(
        name: impl Into<String>,
        payment_method_id: &str,
        provider: impl Into<String>,
        region: impl Into<String>,
        deployment_cidr: impl Into<String>,
    ) -> Self {
        let payment_method_id = payment_method_id
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(payment_method_id.trim().to_string()));

        Self {
            name: name.into(),
            payment_method_id,
            cloud_providers: vec![CloudProviderPayload {
                provider: provider.into(),
                regions: vec![RegionPayload {
                    region: region.into(),
                    networking: RegionNetworking {
                        deployment_cidr: deployment_cidr.into(),
                    },
                }],
            }],
            creation_plan: None,
            databases: None,
        }
    }

    pub fn with_creation_plan(mut self, plan: &[CreationPlanEntry]) -> Self {
        self.creation_plan = Some(plan.iter().map(PlanEntryPayload::from).collect());
        self.databases = None;
        self
    }

    pub fn with_databases(mut self, databases: &[DatabaseSpec]) -> Self {
        self.databases = Some(databases.iter().map(DatabasePayload::from).collect());
        self.creation_plan = None;
        self
    }
}

/// Entry of `GET /payment-methods`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Value,
    #[serde(default, rename = "type")]
    pub method_type: Option<String>,
    #[serde(default)]
    pub credit_card_ends_with: Option<Value>,
    #[serde(default)]
    pub name_on_card: Option<String>,
    #[serde(default)]
    pub expiration_month: Option<u32>,
    #[serde(default)]
    pub expiration_year: Option<u32>,
}

impl PaymentMethod {
    /// Identifier as text, whether the service sent it as a number or string
    pub fn id_text(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
