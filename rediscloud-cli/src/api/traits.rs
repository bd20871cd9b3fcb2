//! The provisioning service as seen by the workflow

use async_trait::async_trait;

use super::error::ProvisionResult;
use super::models::{ResourceKind, Subscription, SubscriptionHandle, SubscriptionShape};
use crate::types::{DatabaseSpec, ProvisionRequest};

/// Operations the workflow sequences. [`super::ProvisioningClient`] talks
/// HTTP; tests substitute scripted fakes.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// Which subscription request shape this API instance sends
    fn subscription_shape(&self) -> SubscriptionShape;

    /// Submit the subscription; the answer may be the id or a task to poll
    async fn create_subscription(&self, request: &ProvisionRequest) -> ProvisionResult<SubscriptionHandle>;

    /// Poll a task until terminal and return the id of the resource it created
    async fn resolve_task(&self, task_id: &str, kind: ResourceKind) -> ProvisionResult<String>;

    /// Poll a subscription until it is active
    async fn wait_until_active(&self, subscription_id: &str) -> ProvisionResult<Subscription>;

    /// Create one database inside an active subscription and return its id
    async fn create_database(&self, subscription_id: &str, spec: &DatabaseSpec) -> ProvisionResult<String>;

    /// Turn a create handle into a subscription id
    async fn resolve_subscription(&self, handle: SubscriptionHandle) -> ProvisionResult<String> {
        match handle {
            SubscriptionHandle::Direct(id) => Ok(id),
            SubscriptionHandle::Task(task_id) => {
                log::info!("Subscription creation queued as task {}", task_id);
                self.resolve_task(&task_id, ResourceKind::Subscription).await
            }
        }
    }
}
