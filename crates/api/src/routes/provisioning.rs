//! Route definitions for the customer workflows.

use axum::routing::post;
use axum::Router;

use crate::handlers::provisioning;
use crate::state::AppState;

/// Workflow routes mounted directly under `/api/v1`.
///
/// Both require the `analyst` or `admin` role (enforced by handler
/// extractors).
///
/// ```text
/// POST /provision    -> provision_customer
/// POST /decommission -> decommission_customer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/provision", post(provisioning::provision_customer))
        .route("/decommission", post(provisioning::decommission_customer))
}
