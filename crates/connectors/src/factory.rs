//! Connector client factory.
//!
//! Builds request-scoped adapter clients from stored connector records.
//! A missing record, an unconfigured record, or an empty required credential
//! all yield `None` -- callers treat that as "feature unavailable" and map it
//! to `NotConfigured` at the workflow boundary. Nothing is cached across
//! calls, because credentials may be rotated at any time; construction never
//! performs network I/O (verification is a separate explicit step).

use soclink_core::credentials::Credentials;
use soclink_db::models::connector::Connector;
use soclink_db::repositories::ConnectorRepo;
use soclink_db::{seed, DbPool};

use crate::grafana::GrafanaClient;
use crate::graylog::GraylogClient;
use crate::iris::IrisClient;
use crate::mailer::SmtpMailer;
use crate::wazuh::WazuhManagerClient;
use crate::worker::WorkerProvisioner;

/// Default sender for the notification mailer when `SOCLINK_SMTP_FROM` is
/// not set.
const DEFAULT_FROM_ADDRESS: &str = "soclink@localhost";

/// Extract the endpoint URL and usable credentials from a record.
///
/// Returns `None` unless the record is configured, declares exactly one
/// credential variant, and that variant's fields are non-empty.
pub fn client_inputs(record: &Connector) -> Option<(String, Credentials)> {
    if !record.configured {
        return None;
    }
    let kind = record.credential_flags().declared_kind().ok()?;
    let credentials = Credentials::from_fields(kind, record.credential_fields())?;
    Some((record.url.clone(), credentials))
}

/// Builds adapter clients on demand from the connector registry.
#[derive(Clone)]
pub struct ClientFactory {
    pool: DbPool,
}

impl ClientFactory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(&self, name: &str) -> Result<Option<(String, Credentials)>, sqlx::Error> {
        let Some(record) = ConnectorRepo::find_by_name(&self.pool, name).await? else {
            return Ok(None);
        };
        Ok(client_inputs(&record))
    }

    /// Log platform client (index sets + streams).
    pub async fn indexing(&self) -> Result<Option<GraylogClient>, sqlx::Error> {
        Ok(self
            .load(seed::GRAYLOG)
            .await?
            .map(|(url, creds)| GraylogClient::new(&url, &creds)))
    }

    /// Log platform client for pipeline operations.
    ///
    /// Same product as [`indexing`](Self::indexing) but looked up fresh --
    /// clients are never shared between capabilities or requests.
    pub async fn pipelines(&self) -> Result<Option<GraylogClient>, sqlx::Error> {
        self.indexing().await
    }

    /// Dashboard platform client.
    pub async fn dashboards(&self) -> Result<Option<GrafanaClient>, sqlx::Error> {
        Ok(self
            .load(seed::GRAFANA)
            .await?
            .map(|(url, creds)| GrafanaClient::new(&url, &creds)))
    }

    /// EDR manager client (agent groups).
    pub async fn agent_groups(&self) -> Result<Option<WazuhManagerClient>, sqlx::Error> {
        Ok(self
            .load(seed::WAZUH_MANAGER)
            .await?
            .map(|(url, creds)| WazuhManagerClient::new(&url, &creds)))
    }

    /// Remote worker provisioner client.
    pub async fn remote_worker(&self) -> Result<Option<WorkerProvisioner>, sqlx::Error> {
        Ok(self
            .load(seed::WAZUH_WORKER)
            .await?
            .map(|(url, creds)| WorkerProvisioner::new(&url, &creds)))
    }

    /// Case-management client.
    pub async fn case_manager(&self) -> Result<Option<IrisClient>, sqlx::Error> {
        Ok(self
            .load(seed::DFIR_IRIS)
            .await?
            .map(|(url, creds)| IrisClient::new(&url, &creds)))
    }

    /// Notification mailer.
    pub async fn mailer(&self) -> Result<Option<SmtpMailer>, sqlx::Error> {
        let Some((url, creds)) = self.load(seed::SMTP).await? else {
            return Ok(None);
        };
        let from_address =
            std::env::var("SOCLINK_SMTP_FROM").unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string());
        Ok(SmtpMailer::new(&url, &creds, &from_address))
    }
}

#[cfg(test)]
mod tests {
    use soclink_db::models::connector::Connector;

    use super::*;

    fn base_record() -> Connector {
        let now = chrono::Utc::now();
        Connector {
            id: 1,
            name: "Graylog".to_string(),
            connector_type: "5.x".to_string(),
            url: "http://graylog:9000".to_string(),
            username: None,
            password: None,
            api_key: None,
            credential_file_path: None,
            accepts_username_password: false,
            accepts_api_key: false,
            accepts_file: false,
            configured: true,
            verified: false,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unconfigured_record_yields_none() {
        let mut record = base_record();
        record.accepts_api_key = true;
        record.api_key = Some("key".to_string());
        record.configured = false;
        assert!(client_inputs(&record).is_none());
    }

    #[test]
    fn empty_required_field_yields_none_for_every_variant() {
        // Username/password with blank password.
        let mut record = base_record();
        record.accepts_username_password = true;
        record.username = Some("svc".to_string());
        record.password = Some("".to_string());
        assert!(client_inputs(&record).is_none());

        // API key variant with no key.
        let mut record = base_record();
        record.accepts_api_key = true;
        assert!(client_inputs(&record).is_none());

        // File variant with whitespace path.
        let mut record = base_record();
        record.accepts_file = true;
        record.credential_file_path = Some("   ".to_string());
        assert!(client_inputs(&record).is_none());
    }

    #[test]
    fn configured_record_yields_url_and_credentials() {
        let mut record = base_record();
        record.accepts_username_password = true;
        record.username = Some("svc".to_string());
        record.password = Some("hunter2".to_string());

        let (url, creds) = client_inputs(&record).expect("inputs should resolve");
        assert_eq!(url, "http://graylog:9000");
        assert_eq!(
            creds,
            Credentials::UsernamePassword {
                username: "svc".to_string(),
                password: "hunter2".to_string(),
            }
        );
    }

    #[test]
    fn malformed_flags_yield_none() {
        // Two variants declared at once: the record is unusable, not fatal,
        // from the factory's point of view.
        let mut record = base_record();
        record.accepts_api_key = true;
        record.accepts_file = true;
        record.api_key = Some("key".to_string());
        assert!(client_inputs(&record).is_none());
    }
}
