//! Capability trait definitions.
//!
//! The orchestrator drives external systems exclusively through these
//! traits, so it never branches on vendor. Each trait exposes exactly the
//! operations the workflows need; anything protocol-specific stays in the
//! concrete clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdapterResult;

// ---------------------------------------------------------------------------
// Indexing (index sets + event streams)
// ---------------------------------------------------------------------------

/// Parameters for a per-customer index set.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSetSpec {
    pub title: String,
    pub index_prefix: String,
    /// Hot data retention in days; drives the rotation/retention strategy.
    pub retention_days: u32,
}

/// Parameters for a per-customer event stream routed into an index set.
#[derive(Debug, Clone, Serialize)]
pub struct StreamSpec {
    pub title: String,
    pub description: String,
    pub index_set_id: String,
    /// Agent label the stream matches on; equals the customer code.
    pub customer_code: String,
}

/// Log platform: index sets and event streams.
#[async_trait]
pub trait IndexingSystem: Send + Sync {
    /// Create an index set, returning the platform-assigned id.
    async fn create_index_set(&self, spec: &IndexSetSpec) -> AdapterResult<String>;

    /// Create an event stream, returning the platform-assigned id.
    async fn create_stream(&self, spec: &StreamSpec) -> AdapterResult<String>;

    /// Start (resume) a stream so it begins routing messages.
    async fn start_stream(&self, stream_id: &str) -> AdapterResult<()>;

    /// Pause a stream ahead of deletion.
    async fn stop_stream(&self, stream_id: &str) -> AdapterResult<()>;

    async fn delete_stream(&self, stream_id: &str) -> AdapterResult<()>;

    async fn delete_index_set(&self, index_set_id: &str) -> AdapterResult<()>;
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// A processing pipeline as reported by the log platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub title: String,
}

/// Log platform pipeline engine.
#[async_trait]
pub trait PipelineSystem: Send + Sync {
    /// List all processing pipelines.
    async fn list_pipelines(&self) -> AdapterResult<Vec<Pipeline>>;

    /// Connect a stream to the given pipelines.
    async fn connect_stream_to_pipelines(
        &self,
        stream_id: &str,
        pipeline_ids: &[String],
    ) -> AdapterResult<()>;
}

// ---------------------------------------------------------------------------
// Dashboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSpec {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasourceSpec {
    pub name: String,
    pub org_id: i64,
    /// Index pattern the datasource reads, e.g. `"acme*"`.
    pub index_pattern: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderSpec {
    pub org_id: i64,
    pub title: String,
}

/// Everything needed to import the selected dashboard set.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardProvisionSpec {
    pub dashboards: Vec<String>,
    pub org_id: i64,
    pub folder_id: i64,
    pub datasource_uid: String,
}

/// Dashboard platform: per-customer organizations, datasources, folders.
#[async_trait]
pub trait DashboardSystem: Send + Sync {
    /// Create an organization, returning its id.
    async fn create_organization(&self, spec: &OrganizationSpec) -> AdapterResult<i64>;

    /// Create a datasource inside an organization, returning its uid.
    async fn create_datasource(&self, spec: &DatasourceSpec) -> AdapterResult<String>;

    /// Create a dashboard folder, returning its id.
    async fn create_folder(&self, spec: &FolderSpec) -> AdapterResult<i64>;

    /// Import the selected dashboards into the folder.
    async fn provision_dashboards(&self, spec: &DashboardProvisionSpec) -> AdapterResult<()>;

    async fn delete_organization(&self, org_id: i64) -> AdapterResult<()>;
}

// ---------------------------------------------------------------------------
// Agent groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GroupSpec {
    /// Group code; equals the customer code.
    pub group: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupConfigSpec {
    pub group: String,
    /// Rendered agent configuration document pushed to the group.
    pub configuration: String,
}

/// EDR manager: per-customer agent groups.
#[async_trait]
pub trait AgentGroupSystem: Send + Sync {
    async fn create_group(&self, spec: &GroupSpec) -> AdapterResult<()>;

    async fn apply_group_config(&self, spec: &GroupConfigSpec) -> AdapterResult<()>;

    async fn delete_group(&self, group: &str) -> AdapterResult<()>;
}

// ---------------------------------------------------------------------------
// Remote worker provisioner
// ---------------------------------------------------------------------------

/// Parameters forwarded to the separately-deployed worker provisioner.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSpec {
    pub customer_name: String,
    pub auth_password: String,
    pub registration_port: i32,
    pub logs_port: i32,
    pub api_port: i32,
    pub cluster_name: String,
    pub cluster_key: String,
    pub master_ip: String,
}

/// Outcome of a remote worker call. Expected failures (non-2xx, network)
/// come back as `success = false`, never as an `Err` -- the workflow treats
/// this system as best-effort.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerOutcome {
    pub success: bool,
    pub message: String,
}

#[async_trait]
pub trait RemoteWorkerSystem: Send + Sync {
    async fn provision_worker(&self, spec: &WorkerSpec) -> AdapterResult<WorkerOutcome>;

    async fn decommission_worker(&self, customer_name: &str) -> AdapterResult<WorkerOutcome>;
}

// ---------------------------------------------------------------------------
// Case manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CaseSpec {
    pub title: String,
    pub description: String,
    pub customer: String,
}

/// Case-management platform.
#[async_trait]
pub trait CaseManagerSystem: Send + Sync {
    /// Open a case, returning the platform-assigned case id.
    async fn create_case(&self, spec: &CaseSpec) -> AdapterResult<i64>;

    async fn add_case_note(&self, case_id: i64, note: &str) -> AdapterResult<()>;
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound notification email.
#[async_trait]
pub trait MailerSystem: Send + Sync {
    async fn send(&self, message: &MailMessage) -> AdapterResult<()>;
}
