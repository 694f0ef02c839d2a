//! Repository for the `connectors` table.

use sqlx::PgPool;

use crate::models::connector::{Connector, NewConnector, UpdateConnector};

// ---------------------------------------------------------------------------
// Column list
// ---------------------------------------------------------------------------

const CONNECTOR_COLUMNS: &str = "\
    id, name, connector_type, url, username, password, api_key, \
    credential_file_path, accepts_username_password, accepts_api_key, \
    accepts_file, configured, verified, description, created_at, updated_at";

/// Provides CRUD and seed operations for connector records.
pub struct ConnectorRepo;

impl ConnectorRepo {
    /// Find a connector by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Connector>, sqlx::Error> {
        let query = format!("SELECT {CONNECTOR_COLUMNS} FROM connectors WHERE name = $1");
        sqlx::query_as::<_, Connector>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all connectors ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Connector>, sqlx::Error> {
        let query = format!("SELECT {CONNECTOR_COLUMNS} FROM connectors ORDER BY name ASC");
        sqlx::query_as::<_, Connector>(&query).fetch_all(pool).await
    }

    /// Insert a connector if no row with the same name exists.
    ///
    /// Returns `true` when a row was inserted. Existing rows are never
    /// touched, so admin-edited values survive repeated seeding.
    pub async fn insert_if_absent(
        pool: &PgPool,
        connector: &NewConnector,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO connectors \
                 (name, connector_type, url, username, password, api_key, \
                  credential_file_path, accepts_username_password, \
                  accepts_api_key, accepts_file, configured, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&connector.name)
        .bind(&connector.connector_type)
        .bind(&connector.url)
        .bind(&connector.username)
        .bind(&connector.password)
        .bind(&connector.api_key)
        .bind(&connector.credential_file_path)
        .bind(connector.accepts_username_password)
        .bind(connector.accepts_api_key)
        .bind(connector.accepts_file)
        .bind(connector.configured)
        .bind(&connector.description)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a partial update to a connector.
    ///
    /// Credential-shape validation happens in the handler before this is
    /// called; this method only persists.
    pub async fn update(
        pool: &PgPool,
        name: &str,
        input: &UpdateConnector,
    ) -> Result<Option<Connector>, sqlx::Error> {
        let query = format!(
            "UPDATE connectors SET \
                 connector_type = COALESCE($2, connector_type), \
                 url = COALESCE($3, url), \
                 username = COALESCE($4, username), \
                 password = COALESCE($5, password), \
                 api_key = COALESCE($6, api_key), \
                 accepts_username_password = COALESCE($7, accepts_username_password), \
                 accepts_api_key = COALESCE($8, accepts_api_key), \
                 accepts_file = COALESCE($9, accepts_file), \
                 configured = COALESCE($10, configured), \
                 description = COALESCE($11, description) \
             WHERE name = $1 \
             RETURNING {CONNECTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Connector>(&query)
            .bind(name)
            .bind(&input.connector_type)
            .bind(&input.url)
            .bind(&input.username)
            .bind(&input.password)
            .bind(&input.api_key)
            .bind(input.accepts_username_password)
            .bind(input.accepts_api_key)
            .bind(input.accepts_file)
            .bind(input.configured)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Mark a connector as verified.
    ///
    /// Only ever called with `true` from the verify path: a failed probe must
    /// not clear a previously verified flag.
    pub async fn set_verified(pool: &PgPool, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE connectors SET verified = TRUE WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Replace the stored credential file path for a file-variant connector.
    pub async fn replace_file_credential(
        pool: &PgPool,
        name: &str,
        path: &str,
    ) -> Result<Option<Connector>, sqlx::Error> {
        let query = format!(
            "UPDATE connectors SET credential_file_path = $2, configured = TRUE \
             WHERE name = $1 AND accepts_file \
             RETURNING {CONNECTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Connector>(&query)
            .bind(name)
            .bind(path)
            .fetch_optional(pool)
            .await
    }
}
