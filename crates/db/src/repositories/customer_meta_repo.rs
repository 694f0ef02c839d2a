//! Repository for the `customers_meta` table.

use sqlx::PgPool;

use crate::models::customer_meta::{CustomerMeta, NewCustomerMeta};

// ---------------------------------------------------------------------------
// Column list
// ---------------------------------------------------------------------------

const META_COLUMNS: &str = "\
    id, customer_code, customer_name, index_set_id, stream_id, \
    dashboard_org_id, datasource_uid, agent_group, index_retention, \
    registration_port, log_ingestion_port, worker_auth_password, created_at";

/// Provides persistence for the durable customer provisioning record.
pub struct CustomerMetaRepo;

impl CustomerMetaRepo {
    /// Insert the metadata row produced by a successful provisioning run.
    ///
    /// Fails with a unique violation if the customer already has a record;
    /// provisioning the same customer twice requires decommissioning first.
    pub async fn insert(
        pool: &PgPool,
        meta: &NewCustomerMeta,
    ) -> Result<CustomerMeta, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers_meta \
                 (customer_code, customer_name, index_set_id, stream_id, \
                  dashboard_org_id, datasource_uid, agent_group, \
                  index_retention, registration_port, log_ingestion_port, \
                  worker_auth_password) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {META_COLUMNS}"
        );
        sqlx::query_as::<_, CustomerMeta>(&query)
            .bind(&meta.customer_code)
            .bind(&meta.customer_name)
            .bind(&meta.index_set_id)
            .bind(&meta.stream_id)
            .bind(meta.dashboard_org_id)
            .bind(&meta.datasource_uid)
            .bind(&meta.agent_group)
            .bind(&meta.index_retention)
            .bind(meta.registration_port)
            .bind(meta.log_ingestion_port)
            .bind(&meta.worker_auth_password)
            .fetch_one(pool)
            .await
    }

    /// Find the provisioning record for a customer by name.
    pub async fn find_by_customer_name(
        pool: &PgPool,
        customer_name: &str,
    ) -> Result<Option<CustomerMeta>, sqlx::Error> {
        let query = format!("SELECT {META_COLUMNS} FROM customers_meta WHERE customer_name = $1");
        sqlx::query_as::<_, CustomerMeta>(&query)
            .bind(customer_name)
            .fetch_optional(pool)
            .await
    }

    /// Delete the provisioning record after decommissioning.
    pub async fn delete_by_customer_name(
        pool: &PgPool,
        customer_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers_meta WHERE customer_name = $1")
            .bind(customer_name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
