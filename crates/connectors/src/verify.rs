//! Connector verification.
//!
//! [`verify`] runs a capability-specific lightweight probe against a
//! connector's endpoint with its stored credentials. Expected failure modes
//! (network error, bad credentials, non-2xx) become `ok = false` with a
//! diagnostic message -- they are never `Err`. Only malformed records
//! (impossible credential shape) propagate as errors.
//!
//! Flag policy: a successful probe may set `verified = true`; a failed probe
//! must never write `verified = false`. A single failed background probe
//! against a previously verified connector would otherwise flap the flag on
//! every transient outage. [`verified_flag_update`] encodes that policy.

use serde::Serialize;
use soclink_core::credentials::Credentials;
use soclink_core::error::CoreError;
use soclink_db::models::connector::Connector;
use soclink_db::seed;

use crate::http::HttpConnector;
use crate::mailer::SmtpMailer;

/// Result of one verification probe.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutcome {
    pub ok: bool,
    pub message: String,
}

impl VerifyOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// The `verified` flag write implied by a probe outcome.
///
/// `Some(true)` on success; `None` on failure -- the flag is never cleared by
/// a failed probe.
pub fn verified_flag_update(outcome: &VerifyOutcome) -> Option<bool> {
    outcome.ok.then_some(true)
}

/// Run the capability-specific probe for `record`.
///
/// Errors only on contract violations: a record whose `accepts_*` flags are
/// inconsistent, or a configured record missing its declared credential.
pub async fn verify(record: &Connector) -> Result<VerifyOutcome, CoreError> {
    let kind = record.credential_flags().declared_kind()?;
    let Some(credentials) = Credentials::from_fields(kind, record.credential_fields()) else {
        return Err(CoreError::NotConfigured(record.name.clone()));
    };

    tracing::info!(connector = %record.name, url = %record.url, "Verifying connector");

    let outcome = match record.name.as_str() {
        seed::GRAYLOG => {
            probe_http(&record.name, &record.url, &credentials, "/api/system/cluster/nodes").await
        }
        seed::GRAFANA => probe_http(&record.name, &record.url, &credentials, "/api/org").await,
        seed::WAZUH_MANAGER => {
            probe_http(&record.name, &record.url, &credentials, "/security/user/authenticate").await
        }
        seed::WAZUH_INDEXER => {
            probe_http(&record.name, &record.url, &credentials, "/_cluster/health").await
        }
        seed::DFIR_IRIS => probe_http(&record.name, &record.url, &credentials, "/api/ping").await,
        seed::SHUFFLE => {
            probe_http(&record.name, &record.url, &credentials, "/api/v1/workflows").await
        }
        seed::INFLUXDB => probe_http(&record.name, &record.url, &credentials, "/ping").await,
        seed::WAZUH_WORKER => probe_http(&record.name, &record.url, &credentials, "/health").await,
        seed::VELOCIRAPTOR => probe_credential_file(&credentials).await,
        seed::SMTP => probe_smtp(&record.url, &credentials).await,
        // Unknown connectors get a bare endpoint probe.
        _ => probe_http(&record.name, &record.url, &credentials, "/").await,
    };

    if outcome.ok {
        tracing::info!(connector = %record.name, "Connector verified");
    } else {
        tracing::warn!(connector = %record.name, message = %outcome.message, "Connector verification failed");
    }

    Ok(outcome)
}

/// Authenticated GET of a lightweight status endpoint.
async fn probe_http(
    name: &str,
    url: &str,
    credentials: &Credentials,
    path: &str,
) -> VerifyOutcome {
    // The probe is ad hoc per record, so the system label is informational
    // only; failures fold into the outcome message either way.
    let http = HttpConnector::new("probe", url, credentials);
    match http.get(path).await {
        Ok(_) => VerifyOutcome::success(format!("{name} connection successful")),
        Err(err) => VerifyOutcome::failure(format!("Connection to {url} failed: {err}")),
    }
}

/// File-variant connectors are verified by checking the credential file is
/// present and readable; the vendor client consumes it from disk.
async fn probe_credential_file(credentials: &Credentials) -> VerifyOutcome {
    let Credentials::File(path) = credentials else {
        return VerifyOutcome::failure("connector does not carry a credential file");
    };
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {
            VerifyOutcome::success(format!("credential file {path} is readable"))
        }
        Ok(_) => VerifyOutcome::failure(format!("credential path {path} is not a file")),
        Err(err) => VerifyOutcome::failure(format!("credential file {path} unavailable: {err}")),
    }
}

/// SMTP probe: EHLO + authentication, no mail sent.
async fn probe_smtp(url: &str, credentials: &Credentials) -> VerifyOutcome {
    let Some(mailer) = SmtpMailer::new(url, credentials, "probe@localhost") else {
        return VerifyOutcome::failure(format!("invalid SMTP endpoint {url}"));
    };
    match mailer.test_connection().await {
        Ok(true) => VerifyOutcome::success("SMTP connection successful"),
        Ok(false) => VerifyOutcome::failure("SMTP server rejected the connection"),
        Err(err) => VerifyOutcome::failure(format!("SMTP connection failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn record(name: &str) -> Connector {
        let now = chrono::Utc::now();
        Connector {
            id: 1,
            name: name.to_string(),
            connector_type: "test".to_string(),
            url: "http://127.0.0.1:1".to_string(),
            username: None,
            password: None,
            api_key: Some("key".to_string()),
            credential_file_path: None,
            accepts_username_password: false,
            accepts_api_key: true,
            accepts_file: false,
            configured: true,
            verified: true,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn failed_probe_never_clears_the_flag() {
        let failed = VerifyOutcome::failure("unreachable");
        assert_eq!(verified_flag_update(&failed), None);

        let succeeded = VerifyOutcome::success("ok");
        assert_eq!(verified_flag_update(&succeeded), Some(true));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_failure_outcome_not_an_error() {
        // Port 1 on loopback refuses immediately; the probe must fold the
        // connection error into `ok = false`.
        let outcome = verify(&record("Shuffle")).await.expect("not a hard error");
        assert!(!outcome.ok);
        assert!(outcome.message.contains("failed"));
    }

    #[tokio::test]
    async fn missing_credential_is_a_contract_error() {
        let mut rec = record("Shuffle");
        rec.api_key = None;
        assert_matches!(verify(&rec).await, Err(CoreError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn inconsistent_flags_are_a_contract_error() {
        let mut rec = record("Shuffle");
        rec.accepts_file = true;
        assert_matches!(verify(&rec).await, Err(CoreError::InvalidCredentialShape(_)));
    }

    #[tokio::test]
    async fn missing_credential_file_is_a_failure_outcome() {
        let mut rec = record("Velociraptor");
        rec.accepts_api_key = false;
        rec.api_key = None;
        rec.accepts_file = true;
        rec.credential_file_path = Some("/nonexistent/soclink/api.config.yaml".to_string());
        let outcome = verify(&rec).await.expect("not a hard error");
        assert!(!outcome.ok);
    }
}
