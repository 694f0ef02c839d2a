//! Credential variants for connector records.
//!
//! A connector declares which credential shape it accepts via three boolean
//! capability flags; the stored row carries one nullable column set per
//! variant. [`validate_shape`] enforces the registry invariant: exactly one
//! flag is set, the matching columns are populated, and the other variants
//! are empty. Adapters consume the extracted [`Credentials`] value and never
//! touch raw columns.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which credential shape a connector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// HTTP basic or vendor login with username + password.
    UsernamePassword,
    /// Single API key / bearer token.
    ApiKey,
    /// Path to a credential file on disk (e.g. an API config YAML).
    File,
}

/// The `accepts_*` capability flags stored on a connector row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialFlags {
    pub accepts_username_password: bool,
    pub accepts_api_key: bool,
    pub accepts_file: bool,
}

impl CredentialFlags {
    /// Resolve the single declared credential kind.
    ///
    /// Errors if zero or more than one flag is set -- a row in that state is
    /// malformed and must never have been written.
    pub fn declared_kind(&self) -> Result<CredentialKind, CoreError> {
        let mut kinds = Vec::with_capacity(1);
        if self.accepts_username_password {
            kinds.push(CredentialKind::UsernamePassword);
        }
        if self.accepts_api_key {
            kinds.push(CredentialKind::ApiKey);
        }
        if self.accepts_file {
            kinds.push(CredentialKind::File);
        }
        match kinds.as_slice() {
            [kind] => Ok(*kind),
            [] => Err(CoreError::InvalidCredentialShape(
                "no accepts_* flag is set".into(),
            )),
            _ => Err(CoreError::InvalidCredentialShape(
                "more than one accepts_* flag is set".into(),
            )),
        }
    }
}

/// Borrowed view of the nullable credential columns on a connector row
/// (or on a pending update).
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialFields<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub api_key: Option<&'a str>,
    pub file_path: Option<&'a str>,
}

/// An extracted, ready-to-use credential value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    UsernamePassword { username: String, password: String },
    ApiKey(String),
    File(String),
}

impl Credentials {
    /// Build the credential value for `kind` from the row columns.
    ///
    /// Returns `None` when a required field is missing or empty -- the client
    /// factory treats that as "connector unavailable", never as an error.
    pub fn from_fields(kind: CredentialKind, fields: CredentialFields<'_>) -> Option<Self> {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.trim().is_empty())
        }

        match kind {
            CredentialKind::UsernamePassword => {
                let username = non_empty(fields.username)?;
                let password = non_empty(fields.password)?;
                Some(Credentials::UsernamePassword {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            CredentialKind::ApiKey => {
                Some(Credentials::ApiKey(non_empty(fields.api_key)?.to_string()))
            }
            CredentialKind::File => {
                Some(Credentials::File(non_empty(fields.file_path)?.to_string()))
            }
        }
    }
}

/// Validate that `fields` matches the shape declared by `flags`.
///
/// The matching variant must be fully populated and every other variant must
/// be empty. Returns the resolved kind so callers can extract credentials
/// without re-deriving it.
pub fn validate_shape(
    flags: CredentialFlags,
    fields: CredentialFields<'_>,
) -> Result<CredentialKind, CoreError> {
    let kind = flags.declared_kind()?;

    let has = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());
    let has_login = has(fields.username) || has(fields.password);
    let has_key = has(fields.api_key);
    let has_file = has(fields.file_path);

    let shape_error = |msg: &str| CoreError::InvalidCredentialShape(msg.to_string());

    match kind {
        CredentialKind::UsernamePassword => {
            if !has(fields.username) || !has(fields.password) {
                return Err(shape_error(
                    "connector accepts username/password but username or password is empty",
                ));
            }
            if has_key || has_file {
                return Err(shape_error(
                    "connector accepts username/password but another credential variant is set",
                ));
            }
        }
        CredentialKind::ApiKey => {
            if !has_key {
                return Err(shape_error("connector accepts an API key but none is set"));
            }
            if has_login || has_file {
                return Err(shape_error(
                    "connector accepts an API key but another credential variant is set",
                ));
            }
        }
        CredentialKind::File => {
            if !has_file {
                return Err(shape_error(
                    "connector accepts a credential file but no file path is set",
                ));
            }
            if has_login || has_key {
                return Err(shape_error(
                    "connector accepts a credential file but another credential variant is set",
                ));
            }
        }
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::CoreError;

    fn login_flags() -> CredentialFlags {
        CredentialFlags {
            accepts_username_password: true,
            ..Default::default()
        }
    }

    fn key_flags() -> CredentialFlags {
        CredentialFlags {
            accepts_api_key: true,
            ..Default::default()
        }
    }

    fn file_flags() -> CredentialFlags {
        CredentialFlags {
            accepts_file: true,
            ..Default::default()
        }
    }

    #[test]
    fn declared_kind_requires_exactly_one_flag() {
        assert_matches!(
            CredentialFlags::default().declared_kind(),
            Err(CoreError::InvalidCredentialShape(_))
        );

        let both = CredentialFlags {
            accepts_api_key: true,
            accepts_file: true,
            ..Default::default()
        };
        assert_matches!(
            both.declared_kind(),
            Err(CoreError::InvalidCredentialShape(_))
        );

        assert_eq!(key_flags().declared_kind().unwrap(), CredentialKind::ApiKey);
    }

    #[test]
    fn matching_variants_pass_shape_validation() {
        let login = CredentialFields {
            username: Some("svc"),
            password: Some("hunter2"),
            ..Default::default()
        };
        assert_eq!(
            validate_shape(login_flags(), login).unwrap(),
            CredentialKind::UsernamePassword
        );

        let key = CredentialFields {
            api_key: Some("abc123"),
            ..Default::default()
        };
        assert_eq!(
            validate_shape(key_flags(), key).unwrap(),
            CredentialKind::ApiKey
        );

        let file = CredentialFields {
            file_path: Some("/etc/soclink/api.config.yaml"),
            ..Default::default()
        };
        assert_eq!(
            validate_shape(file_flags(), file).unwrap(),
            CredentialKind::File
        );
    }

    #[test]
    fn mismatched_variant_is_rejected_without_mutation() {
        // Declared login, supplied API key.
        let fields = CredentialFields {
            api_key: Some("abc123"),
            ..Default::default()
        };
        assert_matches!(
            validate_shape(login_flags(), fields),
            Err(CoreError::InvalidCredentialShape(_))
        );

        // Declared API key, supplied login as well.
        let fields = CredentialFields {
            username: Some("svc"),
            password: Some("hunter2"),
            api_key: Some("abc123"),
            ..Default::default()
        };
        assert_matches!(
            validate_shape(key_flags(), fields),
            Err(CoreError::InvalidCredentialShape(_))
        );

        // Declared file, nothing supplied.
        assert_matches!(
            validate_shape(file_flags(), CredentialFields::default()),
            Err(CoreError::InvalidCredentialShape(_))
        );
    }

    #[test]
    fn from_fields_returns_none_for_empty_required_values() {
        let blank = CredentialFields {
            username: Some("svc"),
            password: Some("   "),
            ..Default::default()
        };
        assert_eq!(
            Credentials::from_fields(CredentialKind::UsernamePassword, blank),
            None
        );
        assert_eq!(
            Credentials::from_fields(CredentialKind::ApiKey, CredentialFields::default()),
            None
        );
        assert_eq!(
            Credentials::from_fields(CredentialKind::File, CredentialFields::default()),
            None
        );
    }
}
