//! Workflow error taxonomy.

use soclink_core::step::ProvisionStep;

use crate::meta::MetaStoreError;

/// Errors surfaced by the provisioning and decommissioning workflows.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A required connector has no usable configuration. Raised before any
    /// external call is made.
    #[error("Connector '{0}' is not configured")]
    NotConfigured(String),

    /// A workflow step before the metadata persist failed. The run aborts
    /// and no customer record is written.
    #[error("Provisioning step '{step}' failed on {system}: {detail}", step = .step.label())]
    StepFailed {
        step: ProvisionStep,
        system: &'static str,
        detail: String,
    },

    /// The stream was created but could not be started. Named separately so
    /// the operator can intervene on the already-created stream.
    #[error("Failed to start stream {stream_id}: {detail}")]
    StreamStartFailed { stream_id: String, detail: String },

    /// Another provisioning or decommissioning run currently holds the lock
    /// for this customer.
    #[error("A provisioning operation for customer '{0}' is already in progress")]
    ConcurrentProvisionInProgress(String),

    /// The customer already has a durable provisioning record.
    #[error("Customer '{0}' is already provisioned; decommission it first")]
    AlreadyProvisioned(String),

    /// Decommission target has no provisioning record.
    #[error("Customer '{0}' not found")]
    CustomerNotFound(String),

    /// The metadata store failed.
    #[error(transparent)]
    Meta(#[from] MetaStoreError),

    /// The connector registry could not be read while resolving adapters.
    #[error("Connector registry error: {0}")]
    Registry(String),
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Registry(err.to_string())
    }
}
