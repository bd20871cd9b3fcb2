//! HTTP client for the cloud database provisioning service
//!
//! Plain request/response calls fail on the first non-2xx answer; the only
//! repeated requests are the two polling loops (task resolution and
//! subscription activation), which keep asking while the status is not
//! terminal and give up once their budget is spent.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;

use super::error::{ProvisionError, ProvisionResult};
use super::extract::{creation_handle, failure_detail, probe_task_result, status_of};
use super::models::{
    PaymentMethod, ResourceKind, Subscription, SubscriptionHandle, SubscriptionPayload,
    SubscriptionShape, SubscriptionStatus, Task, TaskStatus, DatabasePayload,
};
use super::polling::PollingConfig;
use super::traits::ProvisioningApi;
use crate::config::{ApiConfig, DeploymentTarget, ProvisionConfig};
use crate::types::{DatabaseSpec, ProvisionRequest};

const ACCOUNT_KEY_HEADER: &str = "x-api-key";
const USER_KEY_HEADER: &str = "x-api-secret-key";

/// Provisioning service client
#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    http: Client,
    base_url: String,
    target: Option<DeploymentTarget>,
    shape: SubscriptionShape,
    polling: PollingConfig,
}

impl ProvisioningClient {
    /// Client for read-only calls; add a target before creating subscriptions
    pub fn new(api: &ApiConfig) -> ProvisionResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCOUNT_KEY_HEADER,
            secret_header(&api.credentials.account_key, "account key")?,
        );
        headers.insert(
            USER_KEY_HEADER,
            secret_header(&api.credentials.user_key, "user key")?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(api.request_timeout)
            .build()
            .map_err(|e| {
                ProvisionError::configuration(format!("failed to build HTTP client: {}", e), Vec::new())
            })?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            target: None,
            shape: SubscriptionShape::default(),
            polling: PollingConfig::default(),
        })
    }

    /// Client configured for the full provisioning workflow
    pub fn from_config(config: &ProvisionConfig) -> ProvisionResult<Self> {
        Ok(Self::new(&config.api)?
            .with_target(config.target.clone())
            .with_shape(config.shape)
            .with_polling(config.polling.clone()))
    }

    pub fn with_target(mut self, target: DeploymentTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_shape(mut self, shape: SubscriptionShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str) -> ProvisionResult<Value> {
        let request = self.http.request(Method::GET, self.url(path));
        self.execute(request, Method::GET, path).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> ProvisionResult<Value> {
        let request = self.http.request(Method::POST, self.url(path)).json(payload);
        self.execute(request, Method::POST, path).await
    }

    async fn execute(&self, request: RequestBuilder, method: Method, path: &str) -> ProvisionResult<Value> {
        log::debug!("{} {}", method, path);

        let connection_error = |source: reqwest::Error| ProvisionError::Connection {
            method: method.to_string(),
            path: path.to_string(),
            source,
        };

        let response = request.send().await.map_err(connection_error)?;
        let status = response.status();
        let text = response.text().await.map_err(connection_error)?;
        let body = parse_body(&text);

        if !status.is_success() {
            log::error!("{} {} returned HTTP {}", method, path, status.as_u16());
            return Err(ProvisionError::Transport {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// `GET /tasks/{id}`, classified
    pub async fn get_task(&self, task_id: &str) -> ProvisionResult<Task> {
        let body = self.get(&format!("/tasks/{}", urlencoding::encode(task_id))).await?;
        let raw_status = status_of(&body).unwrap_or_default();
        Ok(Task {
            id: task_id.to_string(),
            status: self.polling.task_statuses.classify(&raw_status),
            raw_status,
            body,
        })
    }

    /// `GET /subscriptions/{id}`, classified
    pub async fn get_subscription(&self, subscription_id: &str) -> ProvisionResult<Subscription> {
        let body = self
            .get(&format!("/subscriptions/{}", urlencoding::encode(subscription_id)))
            .await?;
        let raw_status = status_of(&body).unwrap_or_default();
        Ok(Subscription {
            id: subscription_id.to_string(),
            status: self.polling.subscription_statuses.classify_subscription(&raw_status),
            raw_status,
            body,
        })
    }

    /// `GET /payment-methods`; accepts `{"paymentMethods": [...]}` or a bare array
    pub async fn list_payment_methods(&self) -> ProvisionResult<Vec<PaymentMethod>> {
        let body = self.get("/payment-methods").await?;
        let entries = match &body {
            Value::Array(_) => body.clone(),
            Value::Object(obj) => obj
                .get("paymentMethods")
                .cloned()
                .ok_or_else(|| ProvisionError::schema_resolution("paymentMethods", &body))?,
            _ => return Err(ProvisionError::schema_resolution("paymentMethods", &body)),
        };

        serde_json::from_value(entries)
            .map_err(|_| ProvisionError::schema_resolution("payment method entries", &body))
    }

    fn subscription_payload(&self, request: &ProvisionRequest) -> ProvisionResult<SubscriptionPayload> {
        let target = self.target.as_ref().ok_or_else(|| {
            ProvisionError::configuration(
                "no deployment target (provider, region, payment method) configured",
                Vec::new(),
            )
        })?;

        let block = request.subscription_block().ok_or_else(|| {
            ProvisionError::invalid_request("missing subscription block with a non-empty creation_plan")
        })?;

        let payload = SubscriptionPayload::new(
            &target.subscription_name,
            &target.payment_method_id,
            &target.provider,
            &target.region,
            &target.deployment_cidr,
        );

        Ok(match self.shape {
            SubscriptionShape::CreationPlan => payload.with_creation_plan(&block.creation_plan),
            SubscriptionShape::DatabasesInline => payload.with_databases(&request.databases),
        })
    }
}

fn secret_header(value: &str, what: &str) -> ProvisionResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value.trim()).map_err(|_| {
        ProvisionError::configuration(
            format!("{} contains characters not allowed in an HTTP header", what),
            Vec::new(),
        )
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// JSON when it parses, otherwise the raw text as a JSON string
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl ProvisioningApi for ProvisioningClient {
    fn subscription_shape(&self) -> SubscriptionShape {
        self.shape
    }

    async fn create_subscription(&self, request: &ProvisionRequest) -> ProvisionResult<SubscriptionHandle> {
        let payload = self.subscription_payload(request)?;
        log::info!(
            "Creating subscription '{}' ({} shape)",
            payload.name,
            self.shape
        );

        let body = self.post("/subscriptions", &payload).await?;
        creation_handle(&body, ResourceKind::Subscription)
    }

    async fn resolve_task(&self, task_id: &str, kind: ResourceKind) -> ProvisionResult<String> {
        let started = Instant::now();

        loop {
            let task = self.get_task(task_id).await?;
            log::debug!("Task {} status: '{}'", task_id, task.raw_status);

            match task.status {
                TaskStatus::Succeeded => {
                    return probe_task_result(&task.body, kind).ok_or_else(|| {
                        ProvisionError::schema_resolution(
                            format!("{} id in completed task {}", kind.label(), task_id),
                            &task.body,
                        )
                    });
                }
                TaskStatus::Failed => {
                    return Err(ProvisionError::AsyncOperationFailed {
                        resource: format!("task {}", task_id),
                        status: task.raw_status,
                        detail: failure_detail(&task.body),
                    });
                }
                TaskStatus::Pending => {}
                TaskStatus::Unknown => {
                    log::debug!("Unrecognised task status '{}', still waiting", task.raw_status);
                }
            }

            let waited = started.elapsed();
            if waited >= self.polling.task_timeout {
                return Err(ProvisionError::Timeout {
                    resource: format!("task {}", task_id),
                    waited,
                    last_status: Some(task.raw_status).filter(|s| !s.is_empty()),
                });
            }
            sleep(self.polling.interval).await;
        }
    }

    async fn wait_until_active(&self, subscription_id: &str) -> ProvisionResult<Subscription> {
        let started = Instant::now();

        loop {
            let subscription = self.get_subscription(subscription_id).await?;
            log::debug!(
                "Subscription {} status: '{}'",
                subscription_id,
                subscription.raw_status
            );

            match subscription.status {
                SubscriptionStatus::Active => return Ok(subscription),
                SubscriptionStatus::Failed => {
                    return Err(ProvisionError::AsyncOperationFailed {
                        resource: format!("subscription {}", subscription_id),
                        status: subscription.raw_status,
                        detail: failure_detail(&subscription.body),
                    });
                }
                SubscriptionStatus::Provisioning => {}
            }

            let waited = started.elapsed();
            if waited >= self.polling.activation_timeout {
                return Err(ProvisionError::Timeout {
                    resource: format!("subscription {}", subscription_id),
                    waited,
                    last_status: Some(subscription.raw_status).filter(|s| !s.is_empty()),
                });
            }
            sleep(self.polling.interval).await;
        }
    }

    async fn create_database(&self, subscription_id: &str, spec: &DatabaseSpec) -> ProvisionResult<String> {
        let payload = DatabasePayload::from(spec);
        let path = format!("/subscriptions/{}/databases", urlencoding::encode(subscription_id));

        let body = self.post(&path, &payload).await?;
        match creation_handle(&body, ResourceKind::Database)? {
            SubscriptionHandle::Direct(id) => Ok(id),
            SubscriptionHandle::Task(task_id) => {
                log::debug!("Database '{}' creation queued as task {}", spec.name, task_id);
                self.resolve_task(&task_id, ResourceKind::Database).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ProvisioningClient {
        let api = ApiConfig::new(format!("{}/v1/", server.uri()), "acct-key", "user-key");
        ProvisioningClient::new(&api)
            .unwrap()
            .with_target(DeploymentTarget::new("AWS", "us-east-1", "77"))
            .with_polling(PollingConfig::immediate())
    }

    #[tokio::test]
    async fn test_sends_credentials_as_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment-methods"))
            .and(header("x-api-key", "acct-key"))
            .and(header("x-api-secret-key", "user-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paymentMethods": [{"id": 77, "type": "Visa", "creditCardEndsWith": 4242}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let methods = client_for(&server).list_payment_methods().await.unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].id_text(), "77");
    }

    #[tokio::test]
    async fn test_payment_methods_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment-methods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "pm-1"}])))
            .mount(&server)
            .await;

        let methods = client_for(&server).list_payment_methods().await.unwrap();
        assert_eq!(methods[0].id_text(), "pm-1");
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_kept_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/subscriptions/s1"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_subscription("s1").await.unwrap_err();
        match err {
            ProvisionError::Transport { status, body, path, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body, json!("Bad Gateway"));
                assert_eq!(path, "/subscriptions/s1");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let api = ApiConfig::new("http://127.0.0.1:1/v1", "a", "u");
        let client = ProvisioningClient::new(&api).unwrap();
        let err = client.get_task("t1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::Connection { .. }));
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_activation_times_out_while_pending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/subscriptions/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
            .mount(&server)
            .await;

        let client = client_for(&server).with_polling(
            PollingConfig::builder()
                .interval(std::time::Duration::from_millis(5))
                .activation_timeout(std::time::Duration::from_millis(40))
                .build(),
        );
        let err = client.wait_until_active("s1").await.unwrap_err();
        match &err {
            ProvisionError::Timeout { resource, last_status, .. } => {
                assert_eq!(resource, "subscription s1");
                assert_eq!(last_status.as_deref(), Some("pending"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.kind(), "timeout");
    }

    #[tokio::test]
    async fn test_resolve_task_times_out_on_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "paused"})))
            .mount(&server)
            .await;

        let client = client_for(&server).with_polling(
            PollingConfig::builder()
                .interval(std::time::Duration::from_millis(5))
                .timeout(std::time::Duration::from_millis(50))
                .build(),
        );
        let err = client
            .resolve_task("t1", ResourceKind::Subscription)
            .await
            .unwrap_err();
        match err {
            ProvisionError::Timeout { last_status, .. } => {
                assert_eq!(last_status.as_deref(), Some("paused"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_task_reports_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "taskId": "t2",
                "status": "processing-error",
                "response": {"error": {"type": "SUBSCRIPTION_PI_NOT_FOUND", "description": "Payment info was not found"}}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .resolve_task("t2", ResourceKind::Subscription)
            .await
            .unwrap_err();
        match err {
            ProvisionError::AsyncOperationFailed { status, detail, .. } => {
                assert_eq!(status, "processing-error");
                assert_eq!(detail.as_deref(), Some("Payment info was not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_completed_task_without_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tasks/t3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "processing-completed"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .resolve_task("t3", ResourceKind::Subscription)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::SchemaResolution { .. }));
    }

    #[tokio::test]
    async fn test_create_subscription_requires_plan() {
        let server = MockServer::start().await;
        let request = ProvisionRequest::from_json(r#"{"databases": []}"#).unwrap();
        let err = client_for(&server)
            .create_subscription(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidRequest { .. }));
    }

    #[test]
    fn test_invalid_header_value_is_configuration_error() {
        let api = ApiConfig::new("http://localhost", "bad\nkey", "u");
        assert!(matches!(
            ProvisioningClient::new(&api),
            Err(ProvisionError::Configuration { .. })
        ));
    }
}
