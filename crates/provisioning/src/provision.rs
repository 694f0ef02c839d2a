//! The provisioning workflow.
//!
//! A linear state machine: each step drives exactly one capability adapter
//! operation and is recorded in the step report. Any failure before the
//! metadata persist aborts the run with no customer record written. After
//! the persist, the remote worker step is best-effort -- its failure flips a
//! flag on an otherwise successful response.

use std::sync::Arc;

use soclink_connectors::error::AdapterResult;
use soclink_connectors::traits::{
    AgentGroupSystem, DashboardProvisionSpec, DashboardSystem, DatasourceSpec, FolderSpec,
    GroupConfigSpec, GroupSpec, IndexSetSpec, IndexingSystem, MailMessage, MailerSystem,
    OrganizationSpec, PipelineSystem, RemoteWorkerSystem, StreamSpec, WorkerOutcome, WorkerSpec,
};
use soclink_connectors::ClientFactory;
use soclink_core::step::{ProvisionStep, StepReport};
use soclink_db::models::customer_meta::NewCustomerMeta;
use soclink_db::seed;

use crate::error::WorkflowError;
use crate::locks::CustomerLocks;
use crate::meta::MetaStore;
use crate::request::{ProvisionNewCustomer, ProvisionResponse};

/// Title of the dashboard folder created for each customer.
const DASHBOARD_FOLDER_TITLE: &str = "EDR";

/// The adapter handles driven by one workflow run.
///
/// Request-scoped: built fresh per invocation from the client factory and
/// discarded afterwards, so rotated credentials take effect immediately.
pub struct WorkflowAdapters {
    pub indexing: Arc<dyn IndexingSystem>,
    pub pipelines: Arc<dyn PipelineSystem>,
    pub dashboards: Arc<dyn DashboardSystem>,
    pub agent_groups: Arc<dyn AgentGroupSystem>,
    pub remote_worker: Arc<dyn RemoteWorkerSystem>,
    /// Optional outcome notification mailer; never fatal.
    pub mailer: Option<Arc<dyn MailerSystem>>,
}

impl WorkflowAdapters {
    /// Resolve every required adapter from the connector registry.
    ///
    /// Fails with [`WorkflowError::NotConfigured`] naming the first missing
    /// connector, before any external call is made. The mailer is optional.
    pub async fn from_factory(factory: &ClientFactory) -> Result<Self, WorkflowError> {
        let indexing = factory
            .indexing()
            .await?
            .ok_or_else(|| WorkflowError::NotConfigured(seed::GRAYLOG.to_string()))?;
        let pipelines = factory
            .pipelines()
            .await?
            .ok_or_else(|| WorkflowError::NotConfigured(seed::GRAYLOG.to_string()))?;
        let dashboards = factory
            .dashboards()
            .await?
            .ok_or_else(|| WorkflowError::NotConfigured(seed::GRAFANA.to_string()))?;
        let agent_groups = factory
            .agent_groups()
            .await?
            .ok_or_else(|| WorkflowError::NotConfigured(seed::WAZUH_MANAGER.to_string()))?;
        let remote_worker = factory
            .remote_worker()
            .await?
            .ok_or_else(|| WorkflowError::NotConfigured(seed::WAZUH_WORKER.to_string()))?;
        let mailer = factory.mailer().await?;

        Ok(Self {
            indexing: Arc::new(indexing),
            pipelines: Arc::new(pipelines),
            dashboards: Arc::new(dashboards),
            agent_groups: Arc::new(agent_groups),
            remote_worker: Arc::new(remote_worker),
            mailer: mailer.map(|m| Arc::new(m) as Arc<dyn MailerSystem>),
        })
    }
}

/// Sequences the multi-system workflows and owns the per-customer locks.
pub struct Orchestrator {
    pub(crate) meta: Arc<dyn MetaStore>,
    pub(crate) locks: CustomerLocks,
}

impl Orchestrator {
    pub fn new(meta: Arc<dyn MetaStore>, locks: CustomerLocks) -> Self {
        Self { meta, locks }
    }

    /// Provision every external system for a new customer.
    pub async fn provision(
        &self,
        adapters: &WorkflowAdapters,
        request: &ProvisionNewCustomer,
    ) -> Result<ProvisionResponse, WorkflowError> {
        let customer = request.customer_name.clone();

        let _guard = self.locks.try_acquire(&customer).ok_or_else(|| {
            WorkflowError::ConcurrentProvisionInProgress(customer.clone())
        })?;

        if self.meta.find(&customer).await?.is_some() {
            return Err(WorkflowError::AlreadyProvisioned(customer));
        }

        tracing::info!(customer = %customer, code = %request.customer_code, "Provisioning customer");
        let mut report = StepReport::new();

        // --- Log platform -------------------------------------------------
        let index_set_id = record(
            &mut report,
            ProvisionStep::CreateIndexSet,
            adapters
                .indexing
                .create_index_set(&IndexSetSpec {
                    title: format!("{customer} - EDR"),
                    index_prefix: request.customer_code.to_lowercase(),
                    retention_days: request.hot_data_retention,
                })
                .await,
        )?;

        let stream_id = record(
            &mut report,
            ProvisionStep::CreateStream,
            adapters
                .indexing
                .create_stream(&StreamSpec {
                    title: format!("{customer} - EDR"),
                    description: format!("Agent events for {customer}"),
                    index_set_id: index_set_id.clone(),
                    customer_code: request.customer_code.clone(),
                })
                .await,
        )?;

        let pipelines = record(
            &mut report,
            ProvisionStep::ConnectPipelines,
            adapters.pipelines.list_pipelines().await,
        )?;
        let pipeline_ids: Vec<String> = pipelines.into_iter().map(|p| p.id).collect();
        if let Err(err) = adapters
            .pipelines
            .connect_stream_to_pipelines(&stream_id, &pipeline_ids)
            .await
        {
            report.record_failure(ProvisionStep::ConnectPipelines, err.to_string());
            return Err(WorkflowError::StepFailed {
                step: ProvisionStep::ConnectPipelines,
                system: err.system(),
                detail: err.to_string(),
            });
        }

        // The stream already exists on the platform at this point, so a
        // start failure names the stream id for manual intervention.
        if let Err(err) = adapters.indexing.start_stream(&stream_id).await {
            report.record_failure(ProvisionStep::StartStream, err.to_string());
            return Err(WorkflowError::StreamStartFailed {
                stream_id,
                detail: err.to_string(),
            });
        }
        report.record_success(ProvisionStep::StartStream);

        // --- EDR manager --------------------------------------------------
        record(
            &mut report,
            ProvisionStep::CreateAgentGroups,
            adapters
                .agent_groups
                .create_group(&GroupSpec {
                    group: request.customer_code.clone(),
                })
                .await,
        )?;

        record(
            &mut report,
            ProvisionStep::ApplyGroupConfig,
            adapters
                .agent_groups
                .apply_group_config(&GroupConfigSpec {
                    group: request.customer_code.clone(),
                    configuration: render_group_config(request),
                })
                .await,
        )?;

        // --- Dashboard platform -------------------------------------------
        let org_id = record(
            &mut report,
            ProvisionStep::CreateDashboardOrg,
            adapters
                .dashboards
                .create_organization(&OrganizationSpec {
                    name: customer.clone(),
                })
                .await,
        )?;

        let datasource_uid = record(
            &mut report,
            ProvisionStep::CreateDatasource,
            adapters
                .dashboards
                .create_datasource(&DatasourceSpec {
                    name: format!("{customer} - EDR"),
                    org_id,
                    index_pattern: format!("{}*", request.customer_code.to_lowercase()),
                })
                .await,
        )?;

        let folder_id = record(
            &mut report,
            ProvisionStep::CreateFolder,
            adapters
                .dashboards
                .create_folder(&FolderSpec {
                    org_id,
                    title: DASHBOARD_FOLDER_TITLE.to_string(),
                })
                .await,
        )?;

        record(
            &mut report,
            ProvisionStep::ProvisionDashboards,
            adapters
                .dashboards
                .provision_dashboards(&DashboardProvisionSpec {
                    dashboards: request.dashboards.clone(),
                    org_id,
                    folder_id,
                    datasource_uid: datasource_uid.clone(),
                })
                .await,
        )?;

        // --- Persist the durable record -----------------------------------
        let meta = NewCustomerMeta {
            customer_code: request.customer_code.clone(),
            customer_name: customer.clone(),
            index_set_id,
            stream_id,
            dashboard_org_id: org_id,
            datasource_uid,
            agent_group: request.customer_code.clone(),
            index_retention: request.hot_data_retention.to_string(),
            registration_port: request.registration_port,
            log_ingestion_port: request.logs_port,
            worker_auth_password: request.auth_password.clone(),
        };
        let customer_meta = match self.meta.insert(&meta).await {
            Ok(row) => {
                report.record_success(ProvisionStep::PersistMeta);
                row
            }
            Err(err) => {
                report.record_failure(ProvisionStep::PersistMeta, err.to_string());
                return Err(WorkflowError::Meta(err));
            }
        };

        // --- Best-effort remote worker ------------------------------------
        // Spawned so the attempt runs to completion even if the original
        // caller has disconnected; from here on the run always succeeds.
        let worker_outcome = spawn_worker_provision(adapters, request).await;
        let worker_ok = worker_outcome.success;
        if worker_ok {
            report.record_success(ProvisionStep::ProvisionWorker);
        } else {
            report.record_failure(ProvisionStep::ProvisionWorker, worker_outcome.message.clone());
        }

        let message = if worker_ok {
            format!("Customer {customer} provisioned successfully")
        } else {
            format!(
                "Customer {customer} provisioned successfully, but the remote worker failed to provision: {}",
                worker_outcome.message
            )
        };

        notify_outcome(adapters, &customer, &message);

        tracing::info!(customer = %customer, worker_provisioned = worker_ok, "Provisioning complete");

        Ok(ProvisionResponse {
            success: true,
            message,
            wazuh_worker_provisioned: worker_ok,
            customer_meta,
            steps: report,
        })
    }
}

/// Record the outcome of a fatal step and convert failures into
/// [`WorkflowError::StepFailed`].
fn record<T>(
    report: &mut StepReport<ProvisionStep>,
    step: ProvisionStep,
    result: AdapterResult<T>,
) -> Result<T, WorkflowError> {
    match result {
        Ok(value) => {
            tracing::debug!(step = step.label(), "Provisioning step succeeded");
            report.record_success(step);
            Ok(value)
        }
        Err(err) => {
            tracing::error!(step = step.label(), error = %err, "Provisioning step failed");
            report.record_failure(step, err.to_string());
            Err(WorkflowError::StepFailed {
                step,
                system: err.system(),
                detail: err.to_string(),
            })
        }
    }
}

/// Run the remote worker call on its own task and fold every failure shape
/// (adapter error, task panic) into a non-success [`WorkerOutcome`].
async fn spawn_worker_provision(
    adapters: &WorkflowAdapters,
    request: &ProvisionNewCustomer,
) -> WorkerOutcome {
    let worker = Arc::clone(&adapters.remote_worker);
    let spec = WorkerSpec {
        customer_name: request.customer_name.clone(),
        auth_password: request.auth_password.clone(),
        registration_port: request.registration_port,
        logs_port: request.logs_port,
        api_port: request.api_port,
        cluster_name: request.cluster_name.clone(),
        cluster_key: request.cluster_key.clone(),
        master_ip: request.master_ip.clone(),
    };

    let handle = tokio::spawn(async move { worker.provision_worker(&spec).await });
    match handle.await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => WorkerOutcome {
            success: false,
            message: err.to_string(),
        },
        Err(join_err) => WorkerOutcome {
            success: false,
            message: format!("worker provisioning task failed: {join_err}"),
        },
    }
}

/// Send the outcome notification if a mailer is configured. Detached and
/// best-effort; failures are logged and never surfaced.
fn notify_outcome(adapters: &WorkflowAdapters, customer: &str, message: &str) {
    let Some(mailer) = adapters.mailer.clone() else {
        return;
    };
    let Ok(recipient) = std::env::var("SOCLINK_NOTIFY_EMAIL") else {
        return;
    };

    let mail = MailMessage {
        to: recipient,
        subject: format!("[soclink] Provisioning: {customer}"),
        body: message.to_string(),
    };
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&mail).await {
            tracing::warn!(error = %err, "Outcome notification mail failed");
        }
    });
}

/// Render the agent configuration document pushed to the customer group.
fn render_group_config(request: &ProvisionNewCustomer) -> String {
    format!(
        "<agent_config>\n  \
           <client>\n    \
             <server>\n      \
               <address>{master}</address>\n      \
               <port>{logs}</port>\n      \
               <protocol>tcp</protocol>\n    \
             </server>\n    \
             <enrollment>\n      \
               <port>{registration}</port>\n    \
             </enrollment>\n  \
           </client>\n  \
           <labels>\n    \
             <label key=\"customer\">{code}</label>\n  \
           </labels>\n\
         </agent_config>\n",
        master = request.master_ip,
        logs = request.logs_port,
        registration = request.registration_port,
        code = request.customer_code,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProvisionNewCustomer {
        ProvisionNewCustomer {
            customer_name: "Acme".into(),
            customer_code: "ACME".into(),
            hot_data_retention: 30,
            auth_password: "secret".into(),
            registration_port: 1515,
            logs_port: 1514,
            api_port: 55000,
            cluster_name: "acme-cluster".into(),
            cluster_key: "key".into(),
            master_ip: "10.0.0.1".into(),
            dashboards: vec!["EDR Overview".into()],
        }
    }

    #[test]
    fn group_config_embeds_connection_parameters() {
        let config = render_group_config(&request());
        assert!(config.contains("<address>10.0.0.1</address>"));
        assert!(config.contains("<port>1514</port>"));
        assert!(config.contains("key=\"customer\">ACME<"));
    }
}
