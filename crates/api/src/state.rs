use std::sync::Arc;

use soclink_connectors::ClientFactory;
use soclink_provisioning::Orchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: soclink_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Builds request-scoped adapter clients from the connector registry.
    pub factory: ClientFactory,
    /// Workflow orchestrator; owns the per-customer locks.
    pub orchestrator: Arc<Orchestrator>,
}
