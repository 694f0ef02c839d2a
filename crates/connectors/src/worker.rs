//! Remote worker provisioner client.
//!
//! The provisioner is a separately-deployed agent that builds per-customer
//! log collectors. It is best-effort by contract: expected failures come
//! back as a [`WorkerOutcome`] with `success = false` so the workflow can
//! finish successfully without it.

use async_trait::async_trait;
use serde_json::json;
use soclink_core::credentials::Credentials;

use crate::error::{AdapterError, AdapterResult};
use crate::http::HttpConnector;
use crate::traits::{RemoteWorkerSystem, WorkerOutcome, WorkerSpec};

const SYSTEM: &str = "Wazuh-Worker-Provisioner";

/// Client for the remote worker provisioning agent.
#[derive(Debug, Clone)]
pub struct WorkerProvisioner {
    http: HttpConnector,
}

impl WorkerProvisioner {
    pub fn new(url: &str, credentials: &Credentials) -> Self {
        Self {
            http: HttpConnector::new(SYSTEM, url, credentials),
        }
    }

    /// Collapse an adapter failure into a non-success outcome.
    fn outcome_from_error(err: AdapterError) -> WorkerOutcome {
        WorkerOutcome {
            success: false,
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl RemoteWorkerSystem for WorkerProvisioner {
    async fn provision_worker(&self, spec: &WorkerSpec) -> AdapterResult<WorkerOutcome> {
        let result = self.http.post_json("/provision_worker", spec).await;
        Ok(match result {
            Ok(_) => WorkerOutcome {
                success: true,
                message: format!("Worker provisioned for {}", spec.customer_name),
            },
            Err(err) => {
                tracing::warn!(customer = %spec.customer_name, error = %err, "Worker provisioning failed");
                Self::outcome_from_error(err)
            }
        })
    }

    async fn decommission_worker(&self, customer_name: &str) -> AdapterResult<WorkerOutcome> {
        let body = json!({ "customer_name": customer_name });
        let result = self.http.post_json("/decommission_worker", &body).await;
        Ok(match result {
            Ok(_) => WorkerOutcome {
                success: true,
                message: format!("Worker decommissioned for {customer_name}"),
            },
            Err(err) => {
                tracing::warn!(customer = %customer_name, error = %err, "Worker decommission failed");
                Self::outcome_from_error(err)
            }
        })
    }
}
