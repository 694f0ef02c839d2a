//! Route definitions for connector registry management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::connectors;
use crate::state::AppState;

/// Connector routes mounted at `/connectors`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /               -> list_connectors
/// GET  /{name}         -> get_connector
/// PUT  /{name}         -> update_connector
/// POST /{name}/verify  -> verify_connector
/// POST /{name}/upload  -> upload_credential_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(connectors::list_connectors))
        .route(
            "/{name}",
            get(connectors::get_connector).put(connectors::update_connector),
        )
        .route("/{name}/verify", post(connectors::verify_connector))
        .route("/{name}/upload", post(connectors::upload_credential_file))
}
