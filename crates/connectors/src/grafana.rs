//! Dashboard platform client: organizations, datasources, folders, imports.

use async_trait::async_trait;
use serde_json::json;
use soclink_core::credentials::Credentials;

use crate::error::AdapterResult;
use crate::http::{extract_i64, extract_str, HttpConnector};
use crate::traits::{
    DashboardProvisionSpec, DashboardSystem, DatasourceSpec, FolderSpec, OrganizationSpec,
};

const SYSTEM: &str = "Grafana";

/// Client for the dashboard platform's REST API.
#[derive(Debug, Clone)]
pub struct GrafanaClient {
    http: HttpConnector,
}

impl GrafanaClient {
    pub fn new(url: &str, credentials: &Credentials) -> Self {
        Self {
            http: HttpConnector::new(SYSTEM, url, credentials),
        }
    }

    /// Scope a request to an organization.
    ///
    /// The platform selects the org from a header rather than the path, so
    /// each org-scoped call builds a connector carrying it.
    fn org_scoped(&self, org_id: i64) -> HttpConnector {
        self.http.clone().with_header("X-Grafana-Org-Id", org_id.to_string())
    }
}

#[async_trait]
impl DashboardSystem for GrafanaClient {
    async fn create_organization(&self, spec: &OrganizationSpec) -> AdapterResult<i64> {
        let response = self
            .http
            .post_json("/api/orgs", &json!({ "name": spec.name }))
            .await?;
        extract_i64(SYSTEM, &response, "orgId")
    }

    async fn create_datasource(&self, spec: &DatasourceSpec) -> AdapterResult<String> {
        let body = json!({
            "name": spec.name,
            "type": "elasticsearch",
            "access": "proxy",
            "database": spec.index_pattern,
            "jsonData": {
                "timeField": "timestamp",
                "maxConcurrentShardRequests": 5,
            },
        });
        let response = self
            .org_scoped(spec.org_id)
            .post_json("/api/datasources", &body)
            .await?;
        let datasource = response.get("datasource").cloned().unwrap_or(response);
        extract_str(SYSTEM, &datasource, "uid")
    }

    async fn create_folder(&self, spec: &FolderSpec) -> AdapterResult<i64> {
        let response = self
            .org_scoped(spec.org_id)
            .post_json("/api/folders", &json!({ "title": spec.title }))
            .await?;
        extract_i64(SYSTEM, &response, "id")
    }

    async fn provision_dashboards(&self, spec: &DashboardProvisionSpec) -> AdapterResult<()> {
        let scoped = self.org_scoped(spec.org_id);
        for dashboard in &spec.dashboards {
            let body = json!({
                "dashboard": {
                    "title": dashboard,
                    "tags": ["soclink"],
                },
                "folderId": spec.folder_id,
                "overwrite": true,
                "inputs": [{
                    "name": "DS_DATASOURCE",
                    "type": "datasource",
                    "pluginId": "elasticsearch",
                    "value": spec.datasource_uid,
                }],
            });
            scoped.post_json("/api/dashboards/import", &body).await?;
            tracing::debug!(dashboard = %dashboard, org_id = spec.org_id, "Dashboard imported");
        }
        Ok(())
    }

    async fn delete_organization(&self, org_id: i64) -> AdapterResult<()> {
        self.http.delete(&format!("/api/orgs/{org_id}")).await?;
        Ok(())
    }
}
