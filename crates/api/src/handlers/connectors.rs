//! Handlers for connector registry management.
//!
//! Provides:
//! - Admin endpoints for listing, fetching and updating connectors.
//! - The verification endpoint that runs the per-system health probe.
//! - Credential file upload for file-variant connectors.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;

use soclink_connectors::verify::{self, verified_flag_update};
use soclink_core::credentials::{self, CredentialFields, CredentialFlags};
use soclink_core::error::CoreError;
use soclink_db::models::connector::{Connector, UpdateConnector};
use soclink_db::repositories::ConnectorRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a connector exists, returning the full row.
async fn ensure_connector_exists(pool: &sqlx::PgPool, name: &str) -> AppResult<Connector> {
    ConnectorRepo::find_by_name(pool, name)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Connector",
                name: name.to_string(),
            })
        })
}

/// Validate the credential shape the row would have after applying `input`.
///
/// Rejects with `InvalidCredentialShape` before any mutation: a credential
/// variant change must come with the matching `accepts_*` flag, and a
/// configured row must carry exactly the declared variant. Unconfigured rows
/// only need consistent flags -- their credentials may still be empty.
fn validate_merged_shape(current: &Connector, input: &UpdateConnector) -> AppResult<()> {
    let flags = CredentialFlags {
        accepts_username_password: input
            .accepts_username_password
            .unwrap_or(current.accepts_username_password),
        accepts_api_key: input.accepts_api_key.unwrap_or(current.accepts_api_key),
        accepts_file: input.accepts_file.unwrap_or(current.accepts_file),
    };
    let fields = CredentialFields {
        username: input.username.as_deref().or(current.username.as_deref()),
        password: input.password.as_deref().or(current.password.as_deref()),
        api_key: input.api_key.as_deref().or(current.api_key.as_deref()),
        file_path: current.credential_file_path.as_deref(),
    };

    let configured = input.configured.unwrap_or(current.configured);
    if configured {
        credentials::validate_shape(flags, fields)?;
    } else {
        flags.declared_kind()?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GET /connectors
// ---------------------------------------------------------------------------

/// List all configured connectors.
pub async fn list_connectors(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let connectors = ConnectorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: connectors }))
}

// ---------------------------------------------------------------------------
// GET /connectors/{name}
// ---------------------------------------------------------------------------

/// Fetch a single connector by name.
pub async fn get_connector(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let connector = ensure_connector_exists(&state.pool, &name).await?;
    Ok(Json(DataResponse { data: connector }))
}

// ---------------------------------------------------------------------------
// PUT /connectors/{name}
// ---------------------------------------------------------------------------

/// Partially update a connector.
///
/// The resulting credential shape is validated first; on violation nothing
/// is written.
pub async fn update_connector(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<UpdateConnector>,
) -> AppResult<impl IntoResponse> {
    let current = ensure_connector_exists(&state.pool, &name).await?;

    validate_merged_shape(&current, &input)?;

    let updated = ConnectorRepo::update(&state.pool, &name, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Connector",
                name: name.clone(),
            })
        })?;

    tracing::info!(
        connector = %name,
        admin_id = admin.user_id,
        "Connector updated",
    );

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /connectors/{name}/verify
// ---------------------------------------------------------------------------

/// Run the capability-specific health probe for a connector.
///
/// A successful probe persists `verified = true`. A failed probe returns
/// `ok = false` with the diagnostic message and leaves the stored flag
/// untouched -- one failed probe must not flap a previously verified
/// connector.
pub async fn verify_connector(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let connector = ensure_connector_exists(&state.pool, &name).await?;

    let outcome = verify::verify(&connector).await?;

    if verified_flag_update(&outcome) == Some(true) {
        ConnectorRepo::set_verified(&state.pool, &name).await?;
    }

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// POST /connectors/{name}/upload
// ---------------------------------------------------------------------------

/// Replace the credential file for a file-variant connector.
///
/// Only `.yaml` uploads are accepted, and only for connectors whose declared
/// credential variant is a file.
pub async fn upload_credential_file(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let connector = ensure_connector_exists(&state.pool, &name).await?;
    if !connector.accepts_file {
        return Err(AppError::BadRequest(format!(
            "Connector '{name}' does not accept file credentials"
        )));
    }

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let file_name = field.file_name().unwrap_or_default().to_string();
    if !file_name.ends_with(".yaml") {
        return Err(AppError::BadRequest(
            "Only .yaml files are allowed".to_string(),
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

    let store_dir =
        std::env::var("SOCLINK_FILE_STORE").unwrap_or_else(|_| "file-store".to_string());
    tokio::fs::create_dir_all(&store_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create file store: {e}")))?;

    // One credential file per connector, keyed by a sanitized name.
    let safe_name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let path = format!("{store_dir}/{safe_name}.yaml");
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store credential file: {e}")))?;

    let updated = ConnectorRepo::replace_file_credential(&state.pool, &name, &path)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Connector",
                name: name.clone(),
            })
        })?;

    tracing::info!(
        connector = %name,
        admin_id = admin.user_id,
        path = %path,
        "Credential file replaced",
    );

    Ok(Json(DataResponse { data: updated }))
}
