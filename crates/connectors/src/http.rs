//! Shared HTTP plumbing for the REST-based adapters.
//!
//! [`HttpConnector`] owns a pre-configured `reqwest` client with a bounded
//! request timeout and applies the connector's credential variant to every
//! request. Non-2xx responses and transport errors both resolve to
//! [`AdapterError::CallFailed`] carrying the system name, so callers never
//! see `reqwest` internals.

use std::time::Duration;

use serde::Serialize;
use soclink_core::credentials::Credentials;

use crate::error::{AdapterError, AdapterResult};

/// Timeout for a single adapter call. A hung external system must never
/// stall a workflow indefinitely; a timed-out call is a failed call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cap on how much of an error response body is carried into diagnostics.
const ERROR_BODY_LIMIT: usize = 512;

/// How a credential variant is presented on the wire.
#[derive(Debug, Clone)]
enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
    None,
}

/// An authenticated HTTP endpoint for one external system.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    system: &'static str,
    base_url: String,
    client: reqwest::Client,
    auth: Auth,
    /// Extra headers some platforms insist on (e.g. `X-Requested-By`).
    headers: Vec<(&'static str, String)>,
}

impl HttpConnector {
    /// Build a connector for `system` at `base_url` with the given
    /// credentials. Construction is cheap and performs no network I/O.
    pub fn new(system: &'static str, base_url: &str, credentials: &Credentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");

        let auth = match credentials {
            Credentials::UsernamePassword { username, password } => Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            Credentials::ApiKey(key) => Auth::Bearer(key.clone()),
            // File-based credentials are consumed by the owning adapter, not
            // by the HTTP layer.
            Credentials::File(_) => Auth::None,
        };

        Self {
            system,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth,
            headers: Vec::new(),
        }
    }

    /// Attach a static header sent with every request.
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn system(&self) -> &'static str {
        self.system
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.client.request(method, url);

        builder = match &self.auth {
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::None => builder,
        };

        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        builder
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> AdapterResult<serde_json::Value> {
        let response = builder
            .send()
            .await
            .map_err(|e| AdapterError::call_failed(self.system, sanitize_reqwest_error(&e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let mut detail = body;
            detail.truncate(ERROR_BODY_LIMIT);
            return Err(AdapterError::call_failed(
                self.system,
                format!("HTTP {}: {detail}", status.as_u16()),
            ));
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }

    pub async fn get(&self, path: &str) -> AdapterResult<serde_json::Value> {
        self.execute(self.request(reqwest::Method::GET, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AdapterResult<serde_json::Value> {
        self.execute(self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AdapterResult<serde_json::Value> {
        self.execute(self.request(reqwest::Method::PUT, path).json(body))
            .await
    }

    /// POST with no body (some platforms use bodyless action endpoints).
    pub async fn post_empty(&self, path: &str) -> AdapterResult<serde_json::Value> {
        self.execute(self.request(reqwest::Method::POST, path))
            .await
    }

    pub async fn delete(&self, path: &str) -> AdapterResult<serde_json::Value> {
        self.execute(self.request(reqwest::Method::DELETE, path))
            .await
    }
}

/// Reduce a `reqwest` error to a stable, operator-safe phrase.
fn sanitize_reqwest_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        format!("request failed: {err}")
    }
}

/// Pull a string field out of a JSON response, with system context on miss.
pub fn extract_str(
    system: &'static str,
    value: &serde_json::Value,
    field: &str,
) -> AdapterResult<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| AdapterError::UnexpectedResponse {
            system,
            detail: format!("missing string field '{field}'"),
        })
}

/// Pull an integer field out of a JSON response, with system context on miss.
pub fn extract_i64(
    system: &'static str,
    value: &serde_json::Value,
    field: &str,
) -> AdapterResult<i64> {
    value
        .get(field)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| AdapterError::UnexpectedResponse {
            system,
            detail: format!("missing integer field '{field}'"),
        })
}

#[cfg(test)]
mod tests {
    use soclink_core::credentials::Credentials;

    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let conn = HttpConnector::new(
            "Graylog",
            "http://graylog:9000/",
            &Credentials::ApiKey("k".into()),
        );
        assert_eq!(conn.base_url(), "http://graylog:9000");
    }

    #[test]
    fn extract_str_reports_missing_field_with_system() {
        let value = serde_json::json!({"other": 1});
        let err = extract_str("Grafana", &value, "uid").unwrap_err();
        assert_eq!(err.system(), "Grafana");
        assert!(err.to_string().contains("uid"));
    }

    #[test]
    fn extract_i64_reads_numeric_field() {
        let value = serde_json::json!({"orgId": 7});
        assert_eq!(extract_i64("Grafana", &value, "orgId").unwrap(), 7);
    }
}
