//! Domain-level error taxonomy.
//!
//! [`CoreError`] is the vocabulary shared by all crates; the API layer maps
//! each variant to an HTTP status in one place. Workflow-specific errors
//! (step failures, lock contention) live in `soclink-provisioning` and wrap
//! into this taxonomy at the handler boundary.

/// Domain error shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A named entity does not exist.
    #[error("{entity} '{name}' not found")]
    NotFound {
        /// Entity kind, e.g. `"Connector"` or `"Customer"`.
        entity: &'static str,
        /// The lookup key (always the name; names are the stable key here).
        name: String,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A connector update whose credential fields do not match the declared
    /// `accepts_*` capability flags. No mutation is applied.
    #[error("Invalid credential shape: {0}")]
    InvalidCredentialShape(String),

    /// A required connector is missing or lacks usable credentials.
    #[error("Connector '{0}' is not configured")]
    NotConfigured(String),

    /// State conflict (duplicate name, concurrent workflow, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Programming-contract violation or unexpected infrastructure failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
