//! Connector registry entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use soclink_core::credentials::{CredentialFields, CredentialFlags};
use soclink_core::types::{DbId, Timestamp};

/// A connector row from the `connectors` table.
///
/// `name` is globally unique and is the only stable cross-reference key;
/// numeric ids are not guaranteed stable across environments.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Connector {
    pub id: DbId,
    pub name: String,
    /// Vendor type/version tag, e.g. `"5.0"`.
    pub connector_type: String,
    pub url: String,
    #[serde(skip_serializing)]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub credential_file_path: Option<String>,
    pub accepts_username_password: bool,
    pub accepts_api_key: bool,
    pub accepts_file: bool,
    pub configured: bool,
    pub verified: bool,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Connector {
    /// The `accepts_*` flags as a core credential-flags value.
    pub fn credential_flags(&self) -> CredentialFlags {
        CredentialFlags {
            accepts_username_password: self.accepts_username_password,
            accepts_api_key: self.accepts_api_key,
            accepts_file: self.accepts_file,
        }
    }

    /// Borrowed view of the stored credential columns.
    pub fn credential_fields(&self) -> CredentialFields<'_> {
        CredentialFields {
            username: self.username.as_deref(),
            password: self.password.as_deref(),
            api_key: self.api_key.as_deref(),
            file_path: self.credential_file_path.as_deref(),
        }
    }
}

/// DTO for seeding or administratively creating a connector.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConnector {
    pub name: String,
    pub connector_type: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub credential_file_path: Option<String>,
    pub accepts_username_password: bool,
    pub accepts_api_key: bool,
    pub accepts_file: bool,
    pub configured: bool,
    pub description: Option<String>,
}

/// DTO for a partial connector update. All fields are optional; the handler
/// validates the resulting credential shape before any mutation is applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateConnector {
    pub connector_type: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub accepts_username_password: Option<bool>,
    pub accepts_api_key: Option<bool>,
    pub accepts_file: Option<bool>,
    pub configured: Option<bool>,
    pub description: Option<String>,
}
