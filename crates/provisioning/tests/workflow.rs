//! End-to-end workflow tests against mock adapters and the in-memory
//! metadata store.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use tokio::sync::Semaphore;

use soclink_connectors::error::AdapterResult;
use soclink_connectors::testing::{CallLog, FailOn, MockAgentGroups, MockDashboards, MockIndexing, MockWorker};
use soclink_connectors::traits::{
    IndexSetSpec, IndexingSystem, Pipeline, PipelineSystem, StreamSpec,
};
use soclink_db::models::customer_meta::NewCustomerMeta;
use soclink_provisioning::{
    CustomerLocks, InMemoryMetaStore, MetaStore, Orchestrator, ProvisionNewCustomer,
    WorkflowAdapters, WorkflowError,
};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

fn provision_request(customer_name: &str, customer_code: &str) -> ProvisionNewCustomer {
    ProvisionNewCustomer {
        customer_name: customer_name.to_string(),
        customer_code: customer_code.to_string(),
        hot_data_retention: 30,
        auth_password: "agent-secret".to_string(),
        registration_port: 1515,
        logs_port: 1514,
        api_port: 55000,
        cluster_name: format!("{customer_code}-cluster"),
        cluster_key: "cluster-key".to_string(),
        master_ip: "10.0.0.1".to_string(),
        dashboards: vec!["EDR Overview".to_string(), "Agent Inventory".to_string()],
    }
}

fn mock_adapters(log: &CallLog, fail: &FailOn) -> WorkflowAdapters {
    WorkflowAdapters {
        indexing: Arc::new(MockIndexing::new(log.clone(), fail.clone())),
        pipelines: Arc::new(MockIndexing::new(log.clone(), fail.clone())),
        dashboards: Arc::new(MockDashboards::new(log.clone(), fail.clone())),
        agent_groups: Arc::new(MockAgentGroups::new(log.clone(), fail.clone())),
        remote_worker: Arc::new(MockWorker::new(log.clone(), fail.clone())),
        mailer: None,
    }
}

fn orchestrator() -> (Orchestrator, Arc<InMemoryMetaStore>) {
    let meta = Arc::new(InMemoryMetaStore::new());
    let orchestrator = Orchestrator::new(meta.clone(), CustomerLocks::new());
    (orchestrator, meta)
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn happy_path_provisions_every_system_and_persists_meta() {
    let (orchestrator, meta) = orchestrator();
    let log = CallLog::new();
    let adapters = mock_adapters(&log, &FailOn::new());

    let response = orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .expect("provisioning should succeed");

    assert!(response.success);
    assert!(response.wazuh_worker_provisioned);
    assert_eq!(response.customer_meta.customer_name, "Acme");
    assert!(response.steps.all_succeeded());

    // The durable record carries the ids the external systems returned.
    let row = meta.find("Acme").await.unwrap().expect("meta row exists");
    assert_eq!(row.index_set_id, "idx-1");
    assert_eq!(row.stream_id, "stream-1");
    assert_eq!(row.dashboard_org_id, 42);
    assert_eq!(row.datasource_uid, "ds-uid-1");
    assert_eq!(row.agent_group, "ACME");

    // Steps ran in workflow order.
    let calls = log.calls();
    assert_eq!(calls[0], "create_index_set:Acme - EDR");
    assert_eq!(calls[1], "create_stream:idx-1");
    assert!(calls.contains(&"provision_worker:Acme".to_string()));
}

#[tokio::test]
async fn stream_start_failure_aborts_without_persisting_meta() {
    let (orchestrator, meta) = orchestrator();
    let fail = FailOn::new();
    fail.add("start_stream");
    let adapters = mock_adapters(&CallLog::new(), &fail);

    let err = orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .expect_err("start failure must abort the run");

    // The error names the already-created stream for manual intervention.
    assert_matches!(err, WorkflowError::StreamStartFailed { ref stream_id, .. } if stream_id.as_str() == "stream-1");
    assert!(meta.find("Acme").await.unwrap().is_none());
}

#[tokio::test]
async fn failure_before_persist_names_step_and_system() {
    let (orchestrator, meta) = orchestrator();
    let log = CallLog::new();
    let fail = FailOn::new();
    fail.add("create_organization");
    let adapters = mock_adapters(&log, &fail);

    let err = orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .expect_err("dashboard org failure must abort");

    assert_matches!(
        err,
        WorkflowError::StepFailed { system: "Grafana", .. }
    );
    assert!(meta.find("Acme").await.unwrap().is_none());
    // Later dashboard steps were never attempted.
    assert!(!log.calls().iter().any(|c| c.starts_with("create_datasource")));
}

#[tokio::test]
async fn worker_failure_after_persist_is_best_effort() {
    let (orchestrator, meta) = orchestrator();
    let fail = FailOn::new();
    fail.add("provision_worker");
    let adapters = mock_adapters(&CallLog::new(), &fail);

    let response = orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .expect("worker failure must not fail the run");

    assert!(response.success);
    assert!(!response.wazuh_worker_provisioned);
    assert!(response.message.contains("remote worker failed"));
    assert!(meta.find("Acme").await.unwrap().is_some());
}

#[tokio::test]
async fn already_provisioned_customer_is_rejected_before_any_call() {
    let (orchestrator, _meta) = orchestrator();
    let log = CallLog::new();
    let adapters = mock_adapters(&log, &FailOn::new());

    orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .unwrap();
    let first_run_calls = log.calls().len();

    let err = orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .expect_err("second provisioning must be rejected");
    assert_matches!(err, WorkflowError::AlreadyProvisioned(_));
    assert_eq!(log.calls().len(), first_run_calls, "no further adapter calls");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// Indexing mock that blocks in `create_index_set` until a permit arrives,
/// holding the customer lock open for as long as the test needs.
#[derive(Clone)]
struct GatedIndexing {
    inner: MockIndexing,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl IndexingSystem for GatedIndexing {
    async fn create_index_set(&self, spec: &IndexSetSpec) -> AdapterResult<String> {
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        self.inner.create_index_set(spec).await
    }

    async fn create_stream(&self, spec: &StreamSpec) -> AdapterResult<String> {
        self.inner.create_stream(spec).await
    }

    async fn start_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.inner.start_stream(stream_id).await
    }

    async fn stop_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.inner.stop_stream(stream_id).await
    }

    async fn delete_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.inner.delete_stream(stream_id).await
    }

    async fn delete_index_set(&self, index_set_id: &str) -> AdapterResult<()> {
        self.inner.delete_index_set(index_set_id).await
    }
}

#[async_trait]
impl PipelineSystem for GatedIndexing {
    async fn list_pipelines(&self) -> AdapterResult<Vec<Pipeline>> {
        self.inner.list_pipelines().await
    }

    async fn connect_stream_to_pipelines(
        &self,
        stream_id: &str,
        pipeline_ids: &[String],
    ) -> AdapterResult<()> {
        self.inner.connect_stream_to_pipelines(stream_id, pipeline_ids).await
    }
}

#[tokio::test]
async fn concurrent_provisioning_of_same_customer_is_rejected() {
    let meta = Arc::new(InMemoryMetaStore::new());
    let orchestrator = Arc::new(Orchestrator::new(meta.clone(), CustomerLocks::new()));

    let log = CallLog::new();
    let fail = FailOn::new();
    let gate = Arc::new(Semaphore::new(0));
    let gated = GatedIndexing {
        inner: MockIndexing::new(log.clone(), fail.clone()),
        gate: Arc::clone(&gate),
    };
    let adapters = Arc::new(WorkflowAdapters {
        indexing: Arc::new(gated.clone()),
        pipelines: Arc::new(gated),
        dashboards: Arc::new(MockDashboards::new(log.clone(), fail.clone())),
        agent_groups: Arc::new(MockAgentGroups::new(log.clone(), fail.clone())),
        remote_worker: Arc::new(MockWorker::new(log.clone(), fail.clone())),
        mailer: None,
    });

    // First run parks inside the gated first step, holding the lock.
    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        let adapters = Arc::clone(&adapters);
        async move {
            orchestrator
                .provision(&adapters, &provision_request("Acme", "ACME"))
                .await
        }
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Second run for the same customer is rejected immediately.
    let err = orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .expect_err("lock contention expected");
    assert_matches!(err, WorkflowError::ConcurrentProvisionInProgress(_));

    // Release the gate; the first run completes normally.
    gate.add_permits(1);
    let response = first.await.unwrap().expect("first run should succeed");
    assert!(response.success);
    assert!(meta.find("Acme").await.unwrap().is_some());
}

#[tokio::test]
async fn different_customers_provision_in_parallel() {
    let meta = Arc::new(InMemoryMetaStore::new());
    let orchestrator = Orchestrator::new(meta.clone(), CustomerLocks::new());
    let log = CallLog::new();
    let adapters = mock_adapters(&log, &FailOn::new());

    let acme_request = provision_request("Acme", "ACME");
    let globex_request = provision_request("Globex", "GLBX");
    let (a, b) = tokio::join!(
        orchestrator.provision(&adapters, &acme_request),
        orchestrator.provision(&adapters, &globex_request),
    );

    assert!(a.unwrap().success);
    assert!(b.unwrap().success);
    assert!(meta.find("Acme").await.unwrap().is_some());
    assert!(meta.find("Globex").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Decommissioning
// ---------------------------------------------------------------------------

/// Insert a metadata row with distinctive ids so the teardown calls prove
/// they resolve targets from the record, not from derived names.
async fn seed_meta(meta: &InMemoryMetaStore, customer_name: &str) {
    meta.insert(&NewCustomerMeta {
        customer_code: "ACME".to_string(),
        customer_name: customer_name.to_string(),
        index_set_id: "idx-stored-9".to_string(),
        stream_id: "stream-stored-9".to_string(),
        dashboard_org_id: 99,
        datasource_uid: "ds-stored-9".to_string(),
        agent_group: "ACME-GROUP".to_string(),
        index_retention: "30".to_string(),
        registration_port: 1515,
        log_ingestion_port: 1514,
        worker_auth_password: "agent-secret".to_string(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn decommission_unknown_customer_makes_zero_adapter_calls() {
    let (orchestrator, _meta) = orchestrator();
    let log = CallLog::new();
    let adapters = mock_adapters(&log, &FailOn::new());

    let err = orchestrator
        .decommission(&adapters, "Nobody")
        .await
        .expect_err("unknown customer");

    assert_matches!(err, WorkflowError::CustomerNotFound(_));
    assert!(log.is_empty(), "no adapter call may happen: {:?}", log.calls());
}

#[tokio::test]
async fn decommission_resolves_targets_from_the_stored_record() {
    let (orchestrator, meta) = orchestrator();
    seed_meta(&meta, "Acme").await;

    let log = CallLog::new();
    let adapters = mock_adapters(&log, &FailOn::new());

    let response = orchestrator
        .decommission(&adapters, "Acme")
        .await
        .expect("decommission should succeed");

    assert!(response.success);
    assert!(response.failed.is_empty());

    let calls = log.calls();
    assert!(calls.contains(&"stop_stream:stream-stored-9".to_string()));
    assert!(calls.contains(&"delete_stream:stream-stored-9".to_string()));
    assert!(calls.contains(&"delete_index_set:idx-stored-9".to_string()));
    assert!(calls.contains(&"delete_organization:99".to_string()));
    assert!(calls.contains(&"delete_group:ACME-GROUP".to_string()));
    assert!(calls.contains(&"decommission_worker:Acme".to_string()));

    // The record is gone afterwards.
    assert!(meta.find("Acme").await.unwrap().is_none());
}

#[tokio::test]
async fn decommission_keeps_going_past_a_failing_step() {
    let (orchestrator, meta) = orchestrator();
    seed_meta(&meta, "Acme").await;

    let log = CallLog::new();
    let fail = FailOn::new();
    fail.add("delete_index_set");
    let adapters = mock_adapters(&log, &fail);

    let response = orchestrator
        .decommission(&adapters, "Acme")
        .await
        .expect("partial failure must not abort teardown");

    // The failing step is reported, the later ones were still attempted.
    assert_eq!(response.failed, vec!["delete index set"]);
    let calls = log.calls();
    assert!(calls.contains(&"delete_organization:99".to_string()));
    assert!(calls.contains(&"delete_group:ACME-GROUP".to_string()));
    assert!(response.message.contains("failures"));
}

#[tokio::test]
async fn provision_then_decommission_round_trip() {
    let (orchestrator, meta) = orchestrator();
    let log = CallLog::new();
    let adapters = mock_adapters(&log, &FailOn::new());

    orchestrator
        .provision(&adapters, &provision_request("Acme", "ACME"))
        .await
        .unwrap();
    let response = orchestrator.decommission(&adapters, "Acme").await.unwrap();

    assert!(response.success);
    assert!(meta.find("Acme").await.unwrap().is_none());
    // Teardown used the ids provisioning stored.
    assert!(log.calls().contains(&"delete_stream:stream-1".to_string()));
}
