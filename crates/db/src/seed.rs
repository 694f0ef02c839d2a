//! Idempotent seeding of well-known connectors.
//!
//! The defaults below are a declarative table keyed by connector name.
//! Seeding inserts only rows that are absent, so it is safe to run on every
//! process start and never clobbers admin-edited values. URLs and
//! credentials can be supplied per connector through environment variables
//! (`SOCLINK_CONNECTOR_<NAME>_URL`, `_USERNAME`, `_PASSWORD`, `_API_KEY`);
//! a connector is seeded `configured = true` only when its credential
//! variant is fully supplied by the environment.

use sqlx::PgPool;

use crate::models::connector::NewConnector;
use crate::repositories::ConnectorRepo;

// ---------------------------------------------------------------------------
// Well-known connector names
// ---------------------------------------------------------------------------

pub const WAZUH_INDEXER: &str = "Wazuh-Indexer";
pub const WAZUH_MANAGER: &str = "Wazuh-Manager";
pub const GRAYLOG: &str = "Graylog";
pub const GRAFANA: &str = "Grafana";
pub const DFIR_IRIS: &str = "DFIR-IRIS";
pub const VELOCIRAPTOR: &str = "Velociraptor";
pub const SHUFFLE: &str = "Shuffle";
pub const INFLUXDB: &str = "InfluxDB";
pub const SMTP: &str = "SMTP";
pub const WAZUH_WORKER: &str = "Wazuh-Worker-Provisioner";

/// Which credential shape a seeded connector declares.
enum SeedCredential {
    UsernamePassword,
    ApiKey,
    File,
}

struct SeedEntry {
    name: &'static str,
    connector_type: &'static str,
    default_url: &'static str,
    credential: SeedCredential,
    description: &'static str,
}

const SEED_TABLE: &[SeedEntry] = &[
    SeedEntry {
        name: WAZUH_INDEXER,
        connector_type: "4.x",
        default_url: "https://wazuh-indexer:9200",
        credential: SeedCredential::UsernamePassword,
        description: "Log index cluster health and alert queries",
    },
    SeedEntry {
        name: WAZUH_MANAGER,
        connector_type: "4.x",
        default_url: "https://wazuh-manager:55000",
        credential: SeedCredential::UsernamePassword,
        description: "EDR agent group management and agent commands",
    },
    SeedEntry {
        name: GRAYLOG,
        connector_type: "5.x",
        default_url: "http://graylog:9000",
        credential: SeedCredential::UsernamePassword,
        description: "Index sets, event streams and processing pipelines",
    },
    SeedEntry {
        name: GRAFANA,
        connector_type: "10.x",
        default_url: "http://grafana:3000",
        credential: SeedCredential::UsernamePassword,
        description: "Per-customer dashboard organizations and datasources",
    },
    SeedEntry {
        name: DFIR_IRIS,
        connector_type: "2.x",
        default_url: "https://dfir-iris",
        credential: SeedCredential::ApiKey,
        description: "Case management",
    },
    SeedEntry {
        name: VELOCIRAPTOR,
        connector_type: "0.7",
        default_url: "https://velociraptor:8001",
        credential: SeedCredential::File,
        description: "Endpoint forensics; authenticates with an API config file",
    },
    SeedEntry {
        name: SHUFFLE,
        connector_type: "1.x",
        default_url: "https://shuffle:3443",
        credential: SeedCredential::ApiKey,
        description: "SOAR workflow automation",
    },
    SeedEntry {
        name: INFLUXDB,
        connector_type: "2.x",
        default_url: "http://influxdb:8086",
        credential: SeedCredential::ApiKey,
        description: "Metrics and alerting time-series store",
    },
    SeedEntry {
        name: SMTP,
        connector_type: "smtp",
        default_url: "smtp://mail:587",
        credential: SeedCredential::UsernamePassword,
        description: "Outbound notification email",
    },
    SeedEntry {
        name: WAZUH_WORKER,
        connector_type: "1.x",
        default_url: "http://wazuh-worker-provisioner:8000",
        credential: SeedCredential::UsernamePassword,
        description: "Remote agent that deploys per-customer Wazuh workers",
    },
];

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

/// `"DFIR-IRIS"` -> `"SOCLINK_CONNECTOR_DFIR_IRIS"` prefix.
fn env_prefix(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("SOCLINK_CONNECTOR_{normalized}")
}

fn env_override(name: &str, suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{suffix}", env_prefix(name)))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Materialize the declarative table into insertable rows, layering
/// environment-supplied URLs and credentials over the defaults.
pub fn default_connectors() -> Vec<NewConnector> {
    SEED_TABLE
        .iter()
        .map(|entry| {
            let url =
                env_override(entry.name, "URL").unwrap_or_else(|| entry.default_url.to_string());

            let (username, password, api_key, file_path) = match entry.credential {
                SeedCredential::UsernamePassword => (
                    env_override(entry.name, "USERNAME"),
                    env_override(entry.name, "PASSWORD"),
                    None,
                    None,
                ),
                SeedCredential::ApiKey => (None, None, env_override(entry.name, "API_KEY"), None),
                SeedCredential::File => (None, None, None, env_override(entry.name, "FILE")),
            };

            let configured = match entry.credential {
                SeedCredential::UsernamePassword => username.is_some() && password.is_some(),
                SeedCredential::ApiKey => api_key.is_some(),
                SeedCredential::File => file_path.is_some(),
            };

            NewConnector {
                name: entry.name.to_string(),
                connector_type: entry.connector_type.to_string(),
                url,
                username,
                password,
                api_key,
                credential_file_path: file_path,
                accepts_username_password: matches!(
                    entry.credential,
                    SeedCredential::UsernamePassword
                ),
                accepts_api_key: matches!(entry.credential, SeedCredential::ApiKey),
                accepts_file: matches!(entry.credential, SeedCredential::File),
                configured,
                description: Some(entry.description.to_string()),
            }
        })
        .collect()
}

/// Insert every well-known connector that is not already present.
///
/// Returns the number of rows inserted. Matching is by name equality only;
/// existing rows are left untouched.
pub async fn seed_connectors(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for connector in default_connectors() {
        if ConnectorRepo::insert_if_absent(pool, &connector).await? {
            tracing::info!(connector = %connector.name, "Seeded connector");
            inserted += 1;
        }
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use soclink_core::credentials::CredentialFlags;

    use super::*;

    #[test]
    fn seed_names_are_unique() {
        let names: Vec<_> = default_connectors().into_iter().map(|c| c.name).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len(), "duplicate seed connector name");
    }

    #[test]
    fn every_seed_entry_declares_exactly_one_credential_variant() {
        for connector in default_connectors() {
            let flags = CredentialFlags {
                accepts_username_password: connector.accepts_username_password,
                accepts_api_key: connector.accepts_api_key,
                accepts_file: connector.accepts_file,
            };
            flags
                .declared_kind()
                .unwrap_or_else(|e| panic!("{}: {e}", connector.name));
        }
    }

    #[test]
    fn seed_without_env_credentials_is_unconfigured() {
        // No SOCLINK_CONNECTOR_* variables are set in the test environment,
        // so every row must come out unconfigured with empty credentials.
        for connector in default_connectors() {
            assert!(
                !connector.configured,
                "{} should not be configured without env credentials",
                connector.name
            );
        }
    }

    #[test]
    fn env_prefix_normalizes_punctuation() {
        assert_eq!(env_prefix("DFIR-IRIS"), "SOCLINK_CONNECTOR_DFIR_IRIS");
        assert_eq!(env_prefix("Graylog"), "SOCLINK_CONNECTOR_GRAYLOG");
    }
}
