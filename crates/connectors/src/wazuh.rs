//! EDR manager client: per-customer agent groups.

use async_trait::async_trait;
use serde_json::json;
use soclink_core::credentials::Credentials;

use crate::error::AdapterResult;
use crate::http::HttpConnector;
use crate::traits::{AgentGroupSystem, GroupConfigSpec, GroupSpec};

const SYSTEM: &str = "Wazuh-Manager";

/// Client for the EDR manager's REST API.
#[derive(Debug, Clone)]
pub struct WazuhManagerClient {
    http: HttpConnector,
}

impl WazuhManagerClient {
    pub fn new(url: &str, credentials: &Credentials) -> Self {
        Self {
            http: HttpConnector::new(SYSTEM, url, credentials),
        }
    }
}

#[async_trait]
impl AgentGroupSystem for WazuhManagerClient {
    async fn create_group(&self, spec: &GroupSpec) -> AdapterResult<()> {
        self.http
            .post_json("/groups", &json!({ "group_id": spec.group }))
            .await?;
        Ok(())
    }

    async fn apply_group_config(&self, spec: &GroupConfigSpec) -> AdapterResult<()> {
        // The manager takes the rendered agent configuration document as the
        // request body for the group's configuration resource.
        self.http
            .put_json(
                &format!("/groups/{}/configuration", spec.group),
                &spec.configuration,
            )
            .await?;
        Ok(())
    }

    async fn delete_group(&self, group: &str) -> AdapterResult<()> {
        self.http
            .delete(&format!("/groups?groups_list={group}"))
            .await?;
        Ok(())
    }
}
