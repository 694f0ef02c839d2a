//! Case-management client.

use async_trait::async_trait;
use serde_json::json;
use soclink_core::credentials::Credentials;

use crate::error::AdapterResult;
use crate::http::{extract_i64, HttpConnector};
use crate::traits::{CaseManagerSystem, CaseSpec};

const SYSTEM: &str = "DFIR-IRIS";

/// Client for the case-management platform's REST API.
#[derive(Debug, Clone)]
pub struct IrisClient {
    http: HttpConnector,
}

impl IrisClient {
    pub fn new(url: &str, credentials: &Credentials) -> Self {
        Self {
            http: HttpConnector::new(SYSTEM, url, credentials),
        }
    }
}

#[async_trait]
impl CaseManagerSystem for IrisClient {
    async fn create_case(&self, spec: &CaseSpec) -> AdapterResult<i64> {
        let body = json!({
            "case_name": spec.title,
            "case_description": spec.description,
            "case_customer": spec.customer,
            "case_soc_id": "",
        });
        let response = self.http.post_json("/manage/cases/add", &body).await?;
        let data = response.get("data").cloned().unwrap_or(response);
        extract_i64(SYSTEM, &data, "case_id")
    }

    async fn add_case_note(&self, case_id: i64, note: &str) -> AdapterResult<()> {
        let body = json!({
            "note_title": "soclink",
            "note_content": note,
        });
        self.http
            .post_json(&format!("/case/notes/add?cid={case_id}"), &body)
            .await?;
        Ok(())
    }
}
