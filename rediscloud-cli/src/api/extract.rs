//! Reading identifiers and statuses out of loosely-shaped response bodies

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::error::{ProvisionError, ProvisionResult};
use super::models::{ResourceKind, SubscriptionHandle, TASK_ID_FIELDS};

static SUBSCRIPTION_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/subscriptions/([^/?#]+)").expect("valid subscription link pattern"));

static DATABASE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/databases/([^/?#]+)").expect("valid database link pattern"));

/// Body locations holding a `links` array
const LINK_ARRAYS: &[&str] = &["links", "response.links"];

/// Where a failed task explains itself, most specific first
const FAILURE_DETAIL_PATHS: &[&str] = &[
    "response.error.description",
    "response.error.type",
    "result.error",
    "description",
    "error",
    "message",
    "detail",
];

/// Resolve a dotted path (`result.subscriptionId`) against a JSON body
pub fn lookup_path<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = body;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// A JSON scalar usable as an identifier: non-empty string or number
pub fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First path that resolves to an identifier, in the given order
pub fn first_identifier(body: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup_path(body, path).and_then(identifier_text))
}

/// Task handle carried by a create response, if any
pub fn task_handle(body: &Value) -> Option<String> {
    first_identifier(body, TASK_ID_FIELDS)
}

/// Read a create response: a direct identifier wins over a task handle
pub fn creation_handle(body: &Value, kind: ResourceKind) -> ProvisionResult<SubscriptionHandle> {
    if let Some(id) = first_identifier(body, kind.direct_id_fields()) {
        return Ok(SubscriptionHandle::Direct(id));
    }
    if let Some(task) = task_handle(body) {
        return Ok(SubscriptionHandle::Task(task));
    }
    Err(ProvisionError::schema_resolution(
        format!("{} id or task id", kind.label()),
        body,
    ))
}

fn link_pattern(kind: ResourceKind) -> &'static Regex {
    match kind {
        ResourceKind::Subscription => &*SUBSCRIPTION_LINK,
        ResourceKind::Database => &*DATABASE_LINK,
    }
}

/// Pull a resource id out of `links[].href`
pub fn identifier_from_links(body: &Value, kind: ResourceKind) -> Option<String> {
    let pattern = link_pattern(kind);
    LINK_ARRAYS
        .iter()
        .filter_map(|path| lookup_path(body, path).and_then(Value::as_array))
        .flatten()
        .filter_map(|link| link.get("href").and_then(Value::as_str))
        .find_map(|href| {
            pattern
                .captures(href)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
}

/// Identifier of the resource a completed task created: probe paths first, then links
pub fn probe_task_result(body: &Value, kind: ResourceKind) -> Option<String> {
    first_identifier(body, kind.task_result_paths()).or_else(|| identifier_from_links(body, kind))
}

/// Lowercased `status` (or `state`) of a body
pub fn status_of(body: &Value) -> Option<String> {
    ["status", "state"]
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .map(|s| s.trim().to_lowercase())
        .find(|s| !s.is_empty())
}

/// Human-readable reason a task failed, when the body has one
pub fn failure_detail(body: &Value) -> Option<String> {
    FAILURE_DETAIL_PATHS.iter().find_map(|path| match lookup_path(body, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) if !obj.is_empty() => Some(Value::Object(obj.clone()).to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_path() {
        let body = json!({"result": {"subscriptionId": 42}, "id": "x"});
        assert_eq!(lookup_path(&body, "result.subscriptionId"), Some(&json!(42)));
        assert_eq!(lookup_path(&body, "id"), Some(&json!("x")));
        assert_eq!(lookup_path(&body, "result.missing"), None);
        assert_eq!(lookup_path(&body, "id.deeper"), None);
    }

    #[test]
    fn test_first_identifier_respects_priority() {
        let body = json!({
            "resourceId": "from-resource",
            "response": {"subscriptionId": "from-response"},
            "result": {"id": "from-result-id"}
        });
        assert_eq!(
            probe_task_result(&body, ResourceKind::Subscription),
            Some("from-response".to_string())
        );

        let body = json!({"result": {"subscriptionId": "", "id": 7}});
        assert_eq!(
            probe_task_result(&body, ResourceKind::Subscription),
            Some("7".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_links() {
        let body = json!({
            "taskId": "t1",
            "links": [
                {"rel": "self", "href": "https://api.example.com/v1/tasks/t1"},
                {"rel": "resource", "href": "https://api.example.com/v1/subscriptions/sub-77?x=1"}
            ]
        });
        assert_eq!(
            probe_task_result(&body, ResourceKind::Subscription),
            Some("sub-77".to_string())
        );
        assert_eq!(probe_task_result(&body, ResourceKind::Database), None);

        let body = json!({"response": {"links": [
            {"href": "https://api.example.com/v1/subscriptions/5/databases/901"}
        ]}});
        assert_eq!(
            probe_task_result(&body, ResourceKind::Database),
            Some("901".to_string())
        );
    }

    #[test]
    fn test_database_probe_prefers_database_fields() {
        let body = json!({"response": {"resourceId": 55, "id": 1}, "result": {"databaseId": 99}});
        assert_eq!(
            probe_task_result(&body, ResourceKind::Database),
            Some("99".to_string())
        );
    }

    #[test]
    fn test_status_and_task_handle() {
        assert_eq!(status_of(&json!({"status": "Active"})), Some("active".to_string()));
        assert_eq!(status_of(&json!({"status": "", "state": "READY"})), Some("ready".to_string()));
        assert_eq!(status_of(&json!({"id": 1})), None);

        assert_eq!(task_handle(&json!({"task_id": "t9"})), Some("t9".to_string()));
        assert_eq!(task_handle(&json!({"id": "t9"})), None);
    }

    #[test]
    fn test_creation_handle() {
        assert_eq!(
            creation_handle(&json!({"subscriptionId": 12, "taskId": "t"}), ResourceKind::Subscription)
                .unwrap(),
            SubscriptionHandle::Direct("12".into())
        );
        assert_eq!(
            creation_handle(&json!({"taskId": "t1"}), ResourceKind::Subscription).unwrap(),
            SubscriptionHandle::Task("t1".into())
        );
        assert_eq!(
            creation_handle(&json!({"database_id": "d1"}), ResourceKind::Database).unwrap(),
            SubscriptionHandle::Direct("d1".into())
        );

        let err = creation_handle(&json!({"ok": true}), ResourceKind::Subscription).unwrap_err();
        assert!(matches!(err, ProvisionError::SchemaResolution { .. }));
    }

    #[test]
    fn test_failure_detail() {
        let body = json!({
            "status": "processing-error",
            "response": {"error": {"type": "QUOTA", "description": "Quota exceeded"}}
        });
        assert_eq!(failure_detail(&body), Some("Quota exceeded".to_string()));
        assert_eq!(failure_detail(&json!({"status": "failed"})), None);
    }
}
