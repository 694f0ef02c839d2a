//! Shared response envelope types for API handlers.
//!
//! Registry endpoints use a `{ "data": ... }` envelope. Workflow endpoints
//! return their own `success`/`message` response bodies, because partial
//! failure must be expressible inside an HTTP 200.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
