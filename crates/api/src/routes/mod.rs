//! Route registration.

use axum::Router;

use crate::state::AppState;

pub mod connectors;
pub mod health;
pub mod provisioning;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/connectors", connectors::router())
        .merge(provisioning::router())
}
