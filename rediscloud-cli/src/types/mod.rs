//! Canonical sizing types shared by the converters and the provisioning workflow

pub mod database;
pub mod plan;
pub mod request;

pub use database::{
    DEFAULT_THROUGHPUT_MEASUREMENT, DatabaseSpec, MAX_SIZE_PRECISION, ceil_whole_gb,
    is_truthy_token, nearest_whole_gb, precision_factor, round_to_precision, split_modules,
};
pub use plan::CreationPlanEntry;
pub use request::{ProvisionRequest, SubscriptionBlock};
