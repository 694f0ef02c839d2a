//! Log platform client: index sets, event streams, processing pipelines.

use async_trait::async_trait;
use serde_json::json;
use soclink_core::credentials::Credentials;

use crate::error::AdapterResult;
use crate::http::{extract_str, HttpConnector};
use crate::traits::{IndexSetSpec, IndexingSystem, Pipeline, PipelineSystem, StreamSpec};

const SYSTEM: &str = "Graylog";

/// Client for the log platform's REST API.
///
/// Implements both [`IndexingSystem`] and [`PipelineSystem`] -- index sets,
/// streams and pipelines all live on the same product.
#[derive(Debug, Clone)]
pub struct GraylogClient {
    http: HttpConnector,
}

impl GraylogClient {
    pub fn new(url: &str, credentials: &Credentials) -> Self {
        // The platform rejects state-changing requests without this header.
        let http = HttpConnector::new(SYSTEM, url, credentials).with_header("X-Requested-By", "soclink");
        Self { http }
    }
}

#[async_trait]
impl IndexingSystem for GraylogClient {
    async fn create_index_set(&self, spec: &IndexSetSpec) -> AdapterResult<String> {
        let body = json!({
            "title": spec.title,
            "description": format!("Index set for {}", spec.title),
            "index_prefix": spec.index_prefix,
            "shards": 1,
            "replicas": 0,
            "rotation_strategy_class":
                "org.graylog2.indexer.rotation.strategies.TimeBasedRotationStrategy",
            "rotation_strategy": {
                "type": "org.graylog2.indexer.rotation.strategies.TimeBasedRotationStrategyConfig",
                "rotation_period": "P1D",
            },
            "retention_strategy_class":
                "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategy",
            "retention_strategy": {
                "type": "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategyConfig",
                "max_number_of_indices": spec.retention_days,
            },
            "index_analyzer": "standard",
            "index_optimization_max_num_segments": 1,
            "index_optimization_disabled": false,
            "writable": true,
        });
        let response = self.http.post_json("/api/system/indices/index_sets", &body).await?;
        extract_str(SYSTEM, &response, "id")
    }

    async fn create_stream(&self, spec: &StreamSpec) -> AdapterResult<String> {
        let body = json!({
            "title": spec.title,
            "description": spec.description,
            "index_set_id": spec.index_set_id,
            "rules": [{
                "field": "agent_labels_customer",
                "type": 1,
                "inverted": false,
                "value": spec.customer_code,
            }],
            "matching_type": "AND",
            "remove_matches_from_default_stream": true,
        });
        let response = self.http.post_json("/api/streams", &body).await?;
        extract_str(SYSTEM, &response, "stream_id")
    }

    async fn start_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.http
            .post_empty(&format!("/api/streams/{stream_id}/resume"))
            .await?;
        Ok(())
    }

    async fn stop_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.http
            .post_empty(&format!("/api/streams/{stream_id}/pause"))
            .await?;
        Ok(())
    }

    async fn delete_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.http.delete(&format!("/api/streams/{stream_id}")).await?;
        Ok(())
    }

    async fn delete_index_set(&self, index_set_id: &str) -> AdapterResult<()> {
        self.http
            .delete(&format!("/api/system/indices/index_sets/{index_set_id}"))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PipelineSystem for GraylogClient {
    async fn list_pipelines(&self) -> AdapterResult<Vec<Pipeline>> {
        let response = self.http.get("/api/system/pipelines/pipeline").await?;
        let pipelines = response
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some(Pipeline {
                            id: item.get("id")?.as_str()?.to_string(),
                            title: item.get("title")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(pipelines)
    }

    async fn connect_stream_to_pipelines(
        &self,
        stream_id: &str,
        pipeline_ids: &[String],
    ) -> AdapterResult<()> {
        let body = json!({
            "stream_id": stream_id,
            "pipeline_ids": pipeline_ids,
        });
        self.http
            .post_json("/api/system/pipelines/connections/to_stream", &body)
            .await?;
        Ok(())
    }
}
