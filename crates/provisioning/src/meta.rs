//! Provisioning metadata store.
//!
//! The orchestrator persists and reads the durable customer record through
//! the [`MetaStore`] trait so workflow tests can run against
//! [`InMemoryMetaStore`]; production wires in [`PgMetaStore`], which
//! delegates to the repository in `soclink-db`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use soclink_db::models::customer_meta::{CustomerMeta, NewCustomerMeta};
use soclink_db::repositories::CustomerMetaRepo;
use soclink_db::DbPool;

/// Error from the metadata store backend.
#[derive(Debug, thiserror::Error)]
#[error("Metadata store error: {0}")]
pub struct MetaStoreError(pub String);

impl From<sqlx::Error> for MetaStoreError {
    fn from(err: sqlx::Error) -> Self {
        MetaStoreError(err.to_string())
    }
}

/// Durable store for customer provisioning records.
#[async_trait]
pub trait MetaStore: Send + Sync {
    /// Insert the record for a freshly provisioned customer.
    async fn insert(&self, meta: &NewCustomerMeta) -> Result<CustomerMeta, MetaStoreError>;

    /// Find the record for a customer by name.
    async fn find(&self, customer_name: &str) -> Result<Option<CustomerMeta>, MetaStoreError>;

    /// Delete a customer's record; returns whether a row existed.
    async fn delete(&self, customer_name: &str) -> Result<bool, MetaStoreError>;
}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

/// Production metadata store backed by the `customers_meta` table.
#[derive(Clone)]
pub struct PgMetaStore {
    pool: DbPool,
}

impl PgMetaStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetaStore for PgMetaStore {
    async fn insert(&self, meta: &NewCustomerMeta) -> Result<CustomerMeta, MetaStoreError> {
        Ok(CustomerMetaRepo::insert(&self.pool, meta).await?)
    }

    async fn find(&self, customer_name: &str) -> Result<Option<CustomerMeta>, MetaStoreError> {
        Ok(CustomerMetaRepo::find_by_customer_name(&self.pool, customer_name).await?)
    }

    async fn delete(&self, customer_name: &str) -> Result<bool, MetaStoreError> {
        Ok(CustomerMetaRepo::delete_by_customer_name(&self.pool, customer_name).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests)
// ---------------------------------------------------------------------------

/// In-memory metadata store for workflow tests.
#[derive(Debug, Default)]
pub struct InMemoryMetaStore {
    rows: Mutex<HashMap<String, CustomerMeta>>,
}

impl InMemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetaStore for InMemoryMetaStore {
    async fn insert(&self, meta: &NewCustomerMeta) -> Result<CustomerMeta, MetaStoreError> {
        let mut rows = self.rows.lock().expect("meta rows poisoned");
        if rows.contains_key(&meta.customer_name) {
            return Err(MetaStoreError(format!(
                "duplicate customer_name '{}'",
                meta.customer_name
            )));
        }
        let row = CustomerMeta {
            id: rows.len() as i64 + 1,
            customer_code: meta.customer_code.clone(),
            customer_name: meta.customer_name.clone(),
            index_set_id: meta.index_set_id.clone(),
            stream_id: meta.stream_id.clone(),
            dashboard_org_id: meta.dashboard_org_id,
            datasource_uid: meta.datasource_uid.clone(),
            agent_group: meta.agent_group.clone(),
            index_retention: meta.index_retention.clone(),
            registration_port: meta.registration_port,
            log_ingestion_port: meta.log_ingestion_port,
            worker_auth_password: meta.worker_auth_password.clone(),
            created_at: chrono::Utc::now(),
        };
        rows.insert(meta.customer_name.clone(), row.clone());
        Ok(row)
    }

    async fn find(&self, customer_name: &str) -> Result<Option<CustomerMeta>, MetaStoreError> {
        Ok(self
            .rows
            .lock()
            .expect("meta rows poisoned")
            .get(customer_name)
            .cloned())
    }

    async fn delete(&self, customer_name: &str) -> Result<bool, MetaStoreError> {
        Ok(self
            .rows
            .lock()
            .expect("meta rows poisoned")
            .remove(customer_name)
            .is_some())
    }
}
