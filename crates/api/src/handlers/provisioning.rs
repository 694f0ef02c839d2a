//! Handlers for the provisioning and decommissioning workflows.
//!
//! Both endpoints require the analyst or admin role. Adapter clients are
//! built fresh per request from the connector registry, so credential
//! rotations take effect immediately. Workflow responses carry their own
//! `success`/`message` body: a best-effort failure after the metadata
//! persist still returns HTTP 200 with the embedded sub-flag.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use soclink_core::error::CoreError;
use soclink_provisioning::request::DecommissionCustomer;
use soclink_provisioning::{ProvisionNewCustomer, WorkflowAdapters};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAnalyst;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /provision
// ---------------------------------------------------------------------------

/// Run the full multi-system provisioning workflow for a new customer.
pub async fn provision_customer(
    RequireAnalyst(user): RequireAnalyst,
    State(state): State<AppState>,
    Json(request): Json<ProvisionNewCustomer>,
) -> AppResult<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let adapters = WorkflowAdapters::from_factory(&state.factory).await?;

    tracing::info!(
        customer = %request.customer_name,
        user_id = user.user_id,
        "Provisioning requested",
    );

    let response = state.orchestrator.provision(&adapters, &request).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// POST /decommission
// ---------------------------------------------------------------------------

/// Tear down everything provisioned for a customer.
pub async fn decommission_customer(
    RequireAnalyst(user): RequireAnalyst,
    State(state): State<AppState>,
    Json(request): Json<DecommissionCustomer>,
) -> AppResult<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let adapters = WorkflowAdapters::from_factory(&state.factory).await?;

    tracing::info!(
        customer = %request.customer_name,
        user_id = user.user_id,
        "Decommissioning requested",
    );

    let response = state
        .orchestrator
        .decommission(&adapters, &request.customer_name)
        .await?;
    Ok(Json(response))
}
