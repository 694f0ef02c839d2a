//! Customer provisioning metadata entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use soclink_core::types::{DbId, Timestamp};

/// A row from the `customers_meta` table.
///
/// Holds the identifiers each external system returned during provisioning.
/// Decommissioning resolves every teardown target from these fields and never
/// re-derives resource names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerMeta {
    pub id: DbId,
    pub customer_code: String,
    pub customer_name: String,
    pub index_set_id: String,
    pub stream_id: String,
    pub dashboard_org_id: i64,
    pub datasource_uid: String,
    pub agent_group: String,
    pub index_retention: String,
    pub registration_port: i32,
    pub log_ingestion_port: i32,
    #[serde(skip_serializing)]
    pub worker_auth_password: String,
    pub created_at: Timestamp,
}

/// DTO for inserting the metadata row at the end of a provisioning run.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomerMeta {
    pub customer_code: String,
    pub customer_name: String,
    pub index_set_id: String,
    pub stream_id: String,
    pub dashboard_org_id: i64,
    pub datasource_uid: String,
    pub agent_group: String,
    pub index_retention: String,
    pub registration_port: i32,
    pub log_ingestion_port: i32,
    pub worker_auth_password: String,
}
