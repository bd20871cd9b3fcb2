//! Provisioning workflow state machine

pub mod runner;
pub mod state;

pub use runner::{CreatedDatabase, ProvisionReport, ProvisioningWorkflow};
pub use state::WorkflowState;
