//! Terminal-status vocabularies for polled resources

use crate::api::models::{SubscriptionStatus, TaskStatus};

/// Status strings grouped by what they mean; comparison is case-insensitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusVocabulary {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Known in-flight statuses; anything unlisted is `Unknown` and keeps polling too
    pub pending: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl StatusVocabulary {
    pub fn new(succeeded: &[&str], failed: &[&str], pending: &[&str]) -> Self {
        Self {
            succeeded: owned(succeeded),
            failed: owned(failed),
            pending: owned(pending),
        }
    }

    /// Statuses reported by `GET /tasks/{id}`
    pub fn tasks() -> Self {
        Self::new(
            &["processing-completed", "completed", "succeeded", "success", "done"],
            &["processing-error", "failed", "error"],
            &[
                "received",
                "initialized",
                "processing-in-progress",
                "processing",
                "pending",
                "in-progress",
                "queued",
                "running",
            ],
        )
    }

    /// Statuses reported by `GET /subscriptions/{id}`
    pub fn subscriptions() -> Self {
        Self::new(
            &["active", "activated", "running", "ready"],
            &["error", "failed"],
            &["pending", "provisioning", "creating"],
        )
    }

    pub fn classify(&self, status: &str) -> TaskStatus {
        let status = status.trim().to_lowercase();
        let contains = |set: &[String]| set.iter().any(|s| s.eq_ignore_ascii_case(&status));

        if contains(&self.succeeded) {
            TaskStatus::Succeeded
        } else if contains(&self.failed) {
            TaskStatus::Failed
        } else if contains(&self.pending) {
            TaskStatus::Pending
        } else {
            TaskStatus::Unknown
        }
    }

    /// Subscription reading of [`classify`](Self::classify): only terminal statuses leave `Provisioning`
    pub fn classify_subscription(&self, status: &str) -> SubscriptionStatus {
        match self.classify(status) {
            TaskStatus::Succeeded => SubscriptionStatus::Active,
            TaskStatus::Failed => SubscriptionStatus::Failed,
            TaskStatus::Pending | TaskStatus::Unknown => SubscriptionStatus::Provisioning,
        }
    }
}
