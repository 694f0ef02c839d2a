//! Mock capability adapters for workflow tests.
//!
//! Each mock records every operation it performs into a shared [`CallLog`]
//! and can be scripted to fail on a named operation, so tests can drive the
//! orchestrator through any partial-failure path without a live system.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{AdapterError, AdapterResult};
use crate::traits::{
    AgentGroupSystem, DashboardProvisionSpec, DashboardSystem, DatasourceSpec, FolderSpec,
    GroupConfigSpec, GroupSpec, IndexSetSpec, IndexingSystem, MailMessage, MailerSystem,
    OrganizationSpec, Pipeline, PipelineSystem, RemoteWorkerSystem, StreamSpec, WorkerOutcome,
    WorkerSpec,
};

/// Shared, ordered record of every adapter call made during a test.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("call log poisoned").push(call.into());
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().expect("call log poisoned").is_empty()
    }
}

/// Scripted failure set shared by the mocks.
#[derive(Debug, Clone, Default)]
pub struct FailOn {
    ops: Arc<Mutex<Vec<&'static str>>>,
}

impl FailOn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future call to `op` fail.
    pub fn add(&self, op: &'static str) {
        self.ops.lock().expect("fail set poisoned").push(op);
    }

    fn check(&self, system: &'static str, op: &'static str) -> AdapterResult<()> {
        if self.ops.lock().expect("fail set poisoned").contains(&op) {
            return Err(AdapterError::call_failed(
                system,
                format!("scripted failure in {op}"),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Indexing + pipelines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockIndexing {
    pub log: CallLog,
    pub fail: FailOn,
}

impl MockIndexing {
    pub fn new(log: CallLog, fail: FailOn) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl IndexingSystem for MockIndexing {
    async fn create_index_set(&self, spec: &IndexSetSpec) -> AdapterResult<String> {
        self.fail.check("Graylog", "create_index_set")?;
        self.log.record(format!("create_index_set:{}", spec.title));
        Ok("idx-1".to_string())
    }

    async fn create_stream(&self, spec: &StreamSpec) -> AdapterResult<String> {
        self.fail.check("Graylog", "create_stream")?;
        self.log.record(format!("create_stream:{}", spec.index_set_id));
        Ok("stream-1".to_string())
    }

    async fn start_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.fail.check("Graylog", "start_stream")?;
        self.log.record(format!("start_stream:{stream_id}"));
        Ok(())
    }

    async fn stop_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.fail.check("Graylog", "stop_stream")?;
        self.log.record(format!("stop_stream:{stream_id}"));
        Ok(())
    }

    async fn delete_stream(&self, stream_id: &str) -> AdapterResult<()> {
        self.fail.check("Graylog", "delete_stream")?;
        self.log.record(format!("delete_stream:{stream_id}"));
        Ok(())
    }

    async fn delete_index_set(&self, index_set_id: &str) -> AdapterResult<()> {
        self.fail.check("Graylog", "delete_index_set")?;
        self.log.record(format!("delete_index_set:{index_set_id}"));
        Ok(())
    }
}

#[async_trait]
impl PipelineSystem for MockIndexing {
    async fn list_pipelines(&self) -> AdapterResult<Vec<Pipeline>> {
        self.fail.check("Graylog", "list_pipelines")?;
        self.log.record("list_pipelines");
        Ok(vec![
            Pipeline {
                id: "pipe-1".to_string(),
                title: "Processing".to_string(),
            },
            Pipeline {
                id: "pipe-2".to_string(),
                title: "Enrichment".to_string(),
            },
        ])
    }

    async fn connect_stream_to_pipelines(
        &self,
        stream_id: &str,
        pipeline_ids: &[String],
    ) -> AdapterResult<()> {
        self.fail.check("Graylog", "connect_stream_to_pipelines")?;
        self.log.record(format!(
            "connect_stream_to_pipelines:{stream_id}:{}",
            pipeline_ids.join(",")
        ));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dashboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockDashboards {
    pub log: CallLog,
    pub fail: FailOn,
}

impl MockDashboards {
    pub fn new(log: CallLog, fail: FailOn) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl DashboardSystem for MockDashboards {
    async fn create_organization(&self, spec: &OrganizationSpec) -> AdapterResult<i64> {
        self.fail.check("Grafana", "create_organization")?;
        self.log.record(format!("create_organization:{}", spec.name));
        Ok(42)
    }

    async fn create_datasource(&self, spec: &DatasourceSpec) -> AdapterResult<String> {
        self.fail.check("Grafana", "create_datasource")?;
        self.log.record(format!("create_datasource:{}", spec.org_id));
        Ok("ds-uid-1".to_string())
    }

    async fn create_folder(&self, spec: &FolderSpec) -> AdapterResult<i64> {
        self.fail.check("Grafana", "create_folder")?;
        self.log.record(format!("create_folder:{}", spec.title));
        Ok(7)
    }

    async fn provision_dashboards(&self, spec: &DashboardProvisionSpec) -> AdapterResult<()> {
        self.fail.check("Grafana", "provision_dashboards")?;
        self.log
            .record(format!("provision_dashboards:{}", spec.dashboards.len()));
        Ok(())
    }

    async fn delete_organization(&self, org_id: i64) -> AdapterResult<()> {
        self.fail.check("Grafana", "delete_organization")?;
        self.log.record(format!("delete_organization:{org_id}"));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Agent groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockAgentGroups {
    pub log: CallLog,
    pub fail: FailOn,
}

impl MockAgentGroups {
    pub fn new(log: CallLog, fail: FailOn) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl AgentGroupSystem for MockAgentGroups {
    async fn create_group(&self, spec: &GroupSpec) -> AdapterResult<()> {
        self.fail.check("Wazuh-Manager", "create_group")?;
        self.log.record(format!("create_group:{}", spec.group));
        Ok(())
    }

    async fn apply_group_config(&self, spec: &GroupConfigSpec) -> AdapterResult<()> {
        self.fail.check("Wazuh-Manager", "apply_group_config")?;
        self.log.record(format!("apply_group_config:{}", spec.group));
        Ok(())
    }

    async fn delete_group(&self, group: &str) -> AdapterResult<()> {
        self.fail.check("Wazuh-Manager", "delete_group")?;
        self.log.record(format!("delete_group:{group}"));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Remote worker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockWorker {
    pub log: CallLog,
    pub fail: FailOn,
}

impl MockWorker {
    pub fn new(log: CallLog, fail: FailOn) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl RemoteWorkerSystem for MockWorker {
    async fn provision_worker(&self, spec: &WorkerSpec) -> AdapterResult<WorkerOutcome> {
        self.log.record(format!("provision_worker:{}", spec.customer_name));
        // Scripted failures surface as a non-success outcome, matching the
        // real client's best-effort contract.
        if self.fail.check("Wazuh-Worker-Provisioner", "provision_worker").is_err() {
            return Ok(WorkerOutcome {
                success: false,
                message: "scripted worker failure".to_string(),
            });
        }
        Ok(WorkerOutcome {
            success: true,
            message: format!("Worker provisioned for {}", spec.customer_name),
        })
    }

    async fn decommission_worker(&self, customer_name: &str) -> AdapterResult<WorkerOutcome> {
        self.log.record(format!("decommission_worker:{customer_name}"));
        if self
            .fail
            .check("Wazuh-Worker-Provisioner", "decommission_worker")
            .is_err()
        {
            return Ok(WorkerOutcome {
                success: false,
                message: "scripted worker failure".to_string(),
            });
        }
        Ok(WorkerOutcome {
            success: true,
            message: format!("Worker decommissioned for {customer_name}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockMailer {
    pub log: CallLog,
    pub fail: FailOn,
}

impl MockMailer {
    pub fn new(log: CallLog, fail: FailOn) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl MailerSystem for MockMailer {
    async fn send(&self, message: &MailMessage) -> AdapterResult<()> {
        self.fail.check("SMTP", "send")?;
        self.log.record(format!("send:{}", message.to));
        Ok(())
    }
}
