//! Redis Cloud provisioning API
//!
//! Client, wire models and the error taxonomy for the subscription/database
//! provisioning calls, plus the response-probing helpers that cope with the
//! service's inconsistent response shapes.

pub mod client;
pub mod error;
pub mod extract;
pub mod models;
pub mod polling;
pub mod traits;

pub use client::ProvisioningClient;
pub use error::{ProvisionError, ProvisionResult};
pub use models::{
    DatabasePayload, PaymentMethod, PlanEntryPayload, ResourceKind, Subscription,
    SubscriptionHandle, SubscriptionPayload, SubscriptionShape, SubscriptionStatus, Task,
    TaskStatus,
};
pub use polling::{PollingConfig, StatusVocabulary};
pub use traits::ProvisioningApi;
