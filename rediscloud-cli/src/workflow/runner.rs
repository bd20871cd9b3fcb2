//! Sequential provisioning run: subscription → activation → databases
//!
//! Every step awaits the previous one. The first error stops the run; nothing
//! already created is removed, so the leftovers are logged for manual cleanup.

use crate::api::{ProvisionError, ProvisionResult, ProvisioningApi, Subscription, SubscriptionShape};
use crate::types::ProvisionRequest;

use super::state::WorkflowState;

/// A database the run created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDatabase {
    pub name: String,
    pub id: String,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionReport {
    pub subscription_id: String,
    pub subscription: Subscription,
    pub shape: SubscriptionShape,
    /// Databases created one by one (empty in databases-inline mode)
    pub databases: Vec<CreatedDatabase>,
    /// Databases sent inside the subscription request (databases-inline mode)
    pub inline_databases: Vec<String>,
}

/// Drives one provisioning run against a [`ProvisioningApi`]
pub struct ProvisioningWorkflow<'a, A: ProvisioningApi + ?Sized> {
    api: &'a A,
    state: WorkflowState,
    subscription_id: Option<String>,
    created: Vec<CreatedDatabase>,
    failed_during: Option<WorkflowState>,
}

impl<'a, A: ProvisioningApi + ?Sized> ProvisioningWorkflow<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            state: WorkflowState::Idle,
            subscription_id: None,
            created: Vec::new(),
            failed_during: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    /// Databases created so far, in creation order
    pub fn created_databases(&self) -> &[CreatedDatabase] {
        &self.created
    }

    /// State the run was in when it failed
    pub fn failed_during(&self) -> Option<WorkflowState> {
        self.failed_during
    }

    fn transition(&mut self, next: WorkflowState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid workflow transition {} -> {}",
            self.state,
            next
        );
        if self.state != next {
            log::debug!("Workflow {} -> {}", self.state, next);
        }
        self.state = next;
    }

    /// Run the whole workflow once
    pub async fn run(&mut self, request: &ProvisionRequest) -> ProvisionResult<ProvisionReport> {
        if self.state != WorkflowState::Idle {
            return Err(ProvisionError::invalid_request(format!(
                "workflow already ran (state: {})",
                self.state
            )));
        }

        match self.drive(request).await {
            Ok(report) => Ok(report),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn drive(&mut self, request: &ProvisionRequest) -> ProvisionResult<ProvisionReport> {
        if request.subscription_block().is_none() {
            return Err(ProvisionError::invalid_request(
                "missing subscription block with a non-empty creation_plan",
            ));
        }
        if let Some(name) = request.duplicate_name() {
            return Err(ProvisionError::invalid_request(format!(
                "database name '{}' appears more than once",
                name
            )));
        }

        self.transition(WorkflowState::SubscriptionRequested);
        let handle = self.api.create_subscription(request).await?;
        let subscription_id = self.api.resolve_subscription(handle).await?;
        log::info!("Subscription requested: {}. Waiting for activation", subscription_id);
        self.subscription_id = Some(subscription_id.clone());

        self.transition(WorkflowState::SubscriptionActivating);
        let subscription = self.api.wait_until_active(&subscription_id).await?;
        log::info!("Subscription {} is {}", subscription_id, subscription.raw_status);

        self.transition(WorkflowState::DatabasesPending);
        let shape = self.api.subscription_shape();
        let mut inline_databases = Vec::new();

        match shape {
            SubscriptionShape::CreationPlan => {
                for spec in &request.databases {
                    log::info!("Creating database '{}'", spec.name);
                    let id = self.api.create_database(&subscription_id, spec).await?;
                    log::info!("Created database '{}' (id {})", spec.name, id);
                    self.created.push(CreatedDatabase {
                        name: spec.name.clone(),
                        id,
                    });
                    self.transition(WorkflowState::DatabasesPending);
                }
            }
            SubscriptionShape::DatabasesInline => {
                inline_databases = request.databases.iter().map(|d| d.name.clone()).collect();
                log::info!(
                    "{} database(s) were created with the subscription",
                    inline_databases.len()
                );
            }
        }

        self.transition(WorkflowState::Completed);
        Ok(ProvisionReport {
            subscription_id,
            subscription,
            shape,
            databases: self.created.clone(),
            inline_databases,
        })
    }

    fn fail(&mut self, err: &ProvisionError) {
        let stage = self.state;
        self.failed_during = Some(stage);
        self.transition(WorkflowState::Failed);

        log::error!("Provisioning failed during {} ({}): {}", stage, err.kind(), err);
        if let Some(id) = &self.subscription_id {
            log::warn!("Left in place: subscription {}", id);
        }
        for db in &self.created {
            log::warn!("Left in place: database '{}' (id {})", db.name, db.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ResourceKind, SubscriptionHandle, SubscriptionStatus};
    use crate::types::{CreationPlanEntry, DatabaseSpec};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Scripted stand-in for the HTTP client
    struct ScriptedApi {
        shape: SubscriptionShape,
        handle: SubscriptionHandle,
        activation_fails: bool,
        failing_database: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn new(handle: SubscriptionHandle) -> Self {
            Self {
                shape: SubscriptionShape::CreationPlan,
                handle,
                activation_fails: false,
                failing_database: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProvisioningApi for ScriptedApi {
        fn subscription_shape(&self) -> SubscriptionShape {
            self.shape
        }

        async fn create_subscription(&self, _request: &ProvisionRequest) -> ProvisionResult<SubscriptionHandle> {
            self.record("create_subscription".into());
            Ok(self.handle.clone())
        }

        async fn resolve_task(&self, task_id: &str, kind: ResourceKind) -> ProvisionResult<String> {
            self.record(format!("resolve_task {} {}", task_id, kind.label()));
            Ok("sub-from-task".into())
        }

        async fn wait_until_active(&self, subscription_id: &str) -> ProvisionResult<Subscription> {
            self.record(format!("wait_until_active {}", subscription_id));
            if self.activation_fails {
                return Err(ProvisionError::AsyncOperationFailed {
                    resource: format!("subscription {}", subscription_id),
                    status: "error".into(),
                    detail: None,
                });
            }
            Ok(Subscription {
                id: subscription_id.to_string(),
                status: SubscriptionStatus::Active,
                raw_status: "active".into(),
                body: json!({"status": "active"}),
            })
        }

        async fn create_database(&self, subscription_id: &str, spec: &DatabaseSpec) -> ProvisionResult<String> {
            self.record(format!("create_database {} {}", subscription_id, spec.name));
            if self.failing_database == Some(spec.name.as_str()) {
                return Err(ProvisionError::Transport {
                    method: "POST".into(),
                    path: format!("/subscriptions/{}/databases", subscription_id),
                    status: 400,
                    body: Value::String("bad request".into()),
                });
            }
            Ok(format!("db-{}", spec.name))
        }
    }

    fn request(names: &[&str]) -> ProvisionRequest {
        ProvisionRequest::new(
            names.iter().map(|n| DatabaseSpec::new(*n, 1.0)).collect(),
            vec![CreationPlanEntry::new(1.0, false, 0, names.len().max(1) as u32)],
        )
    }

    #[tokio::test]
    async fn test_happy_path_creates_databases_in_order() {
        let api = ScriptedApi::new(SubscriptionHandle::Direct("sub-1".into()));
        let mut workflow = ProvisioningWorkflow::new(&api);

        let report = workflow.run(&request(&["a", "b"])).await.unwrap();

        assert_eq!(workflow.state(), WorkflowState::Completed);
        assert_eq!(report.subscription_id, "sub-1");
        assert_eq!(
            report.databases,
            vec![
                CreatedDatabase { name: "a".into(), id: "db-a".into() },
                CreatedDatabase { name: "b".into(), id: "db-b".into() },
            ]
        );
        assert_eq!(
            api.calls(),
            vec![
                "create_subscription",
                "wait_until_active sub-1",
                "create_database sub-1 a",
                "create_database sub-1 b",
            ]
        );
    }

    #[tokio::test]
    async fn test_task_handle_is_resolved_before_activation() {
        let api = ScriptedApi::new(SubscriptionHandle::Task("t1".into()));
        let mut workflow = ProvisioningWorkflow::new(&api);

        let report = workflow.run(&request(&["a"])).await.unwrap();
        assert_eq!(report.subscription_id, "sub-from-task");
        assert_eq!(api.calls()[1], "resolve_task t1 subscription");
        assert_eq!(api.calls()[2], "wait_until_active sub-from-task");
    }

    #[tokio::test]
    async fn test_missing_subscription_block_fails_before_any_call() {
        let api = ScriptedApi::new(SubscriptionHandle::Direct("sub-1".into()));
        let mut workflow = ProvisioningWorkflow::new(&api);
        let request = ProvisionRequest::from_json(r#"{"databases": [{"name": "a", "dataset_size_in_gb": 1}]}"#).unwrap();

        let err = workflow.run(&request).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidRequest { .. }));
        assert_eq!(workflow.state(), WorkflowState::Failed);
        assert_eq!(workflow.failed_during(), Some(WorkflowState::Idle));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_fail_before_any_call() {
        let api = ScriptedApi::new(SubscriptionHandle::Direct("sub-1".into()));
        let mut workflow = ProvisioningWorkflow::new(&api);

        let err = workflow.run(&request(&["a", "b", "a"])).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidRequest { .. }));
        assert!(err.to_string().contains("'a'"));
        assert_eq!(workflow.failed_during(), Some(WorkflowState::Idle));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_activation_failure_stops_before_databases() {
        let mut api = ScriptedApi::new(SubscriptionHandle::Direct("sub-9".into()));
        api.activation_fails = true;
        let mut workflow = ProvisioningWorkflow::new(&api);

        let err = workflow.run(&request(&["a"])).await.unwrap_err();
        assert!(matches!(err, ProvisionError::AsyncOperationFailed { .. }));
        assert_eq!(workflow.failed_during(), Some(WorkflowState::SubscriptionActivating));
        assert_eq!(workflow.subscription_id(), Some("sub-9"));
        assert!(!api.calls().iter().any(|c| c.starts_with("create_database")));
    }

    #[tokio::test]
    async fn test_database_failure_halts_remaining_creations() {
        let mut api = ScriptedApi::new(SubscriptionHandle::Direct("sub-1".into()));
        api.failing_database = Some("b");
        let mut workflow = ProvisioningWorkflow::new(&api);

        let err = workflow.run(&request(&["a", "b", "c"])).await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(workflow.failed_during(), Some(WorkflowState::DatabasesPending));
        assert_eq!(
            workflow.created_databases(),
            &[CreatedDatabase { name: "a".into(), id: "db-a".into() }]
        );
        assert!(!api.calls().contains(&"create_database sub-1 c".to_string()));
    }

    #[tokio::test]
    async fn test_inline_shape_skips_per_database_calls() {
        let mut api = ScriptedApi::new(SubscriptionHandle::Direct("sub-1".into()));
        api.shape = SubscriptionShape::DatabasesInline;
        let mut workflow = ProvisioningWorkflow::new(&api);

        let report = workflow.run(&request(&["a", "b"])).await.unwrap();
        assert!(report.databases.is_empty());
        assert_eq!(report.inline_databases, vec!["a", "b"]);
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_workflow_runs_once() {
        let api = ScriptedApi::new(SubscriptionHandle::Direct("sub-1".into()));
        let mut workflow = ProvisioningWorkflow::new(&api);
        workflow.run(&request(&["a"])).await.unwrap();

        let err = workflow.run(&request(&["a"])).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidRequest { .. }));
        assert_eq!(workflow.state(), WorkflowState::Completed);
    }
}
