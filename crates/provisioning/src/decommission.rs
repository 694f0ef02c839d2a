//! The decommissioning workflow.
//!
//! The inverse of provisioning: every teardown target is resolved from the
//! durable customer record, never re-derived from names. All steps are
//! best-effort -- a stuck teardown is worse than a partially-cleaned one --
//! so each failure is recorded and the workflow moves on, finishing with an
//! aggregated report of what was and was not cleaned up.

use soclink_core::step::{DecommissionStep, StepReport};

use crate::error::WorkflowError;
use crate::provision::{Orchestrator, WorkflowAdapters};
use crate::request::DecommissionResponse;

impl Orchestrator {
    /// Tear down every external resource provisioned for a customer.
    ///
    /// Fails fast with [`WorkflowError::CustomerNotFound`] (zero adapter
    /// calls) when no provisioning record exists. Holds the same
    /// per-customer lock as provisioning for the whole run.
    pub async fn decommission(
        &self,
        adapters: &WorkflowAdapters,
        customer_name: &str,
    ) -> Result<DecommissionResponse, WorkflowError> {
        let _guard = self.locks.try_acquire(customer_name).ok_or_else(|| {
            WorkflowError::ConcurrentProvisionInProgress(customer_name.to_string())
        })?;

        let meta = self
            .meta
            .find(customer_name)
            .await?
            .ok_or_else(|| WorkflowError::CustomerNotFound(customer_name.to_string()))?;

        tracing::info!(customer = %customer_name, "Decommissioning customer");
        let mut report = StepReport::new();

        // --- Log platform -------------------------------------------------
        attempt(
            &mut report,
            DecommissionStep::StopStream,
            adapters.indexing.stop_stream(&meta.stream_id).await,
        );
        attempt(
            &mut report,
            DecommissionStep::DeleteStream,
            adapters.indexing.delete_stream(&meta.stream_id).await,
        );
        attempt(
            &mut report,
            DecommissionStep::DeleteIndexSet,
            adapters.indexing.delete_index_set(&meta.index_set_id).await,
        );

        // --- Dashboard platform -------------------------------------------
        attempt(
            &mut report,
            DecommissionStep::DeleteDashboardOrg,
            adapters
                .dashboards
                .delete_organization(meta.dashboard_org_id)
                .await,
        );

        // --- EDR manager --------------------------------------------------
        attempt(
            &mut report,
            DecommissionStep::DeleteAgentGroup,
            adapters.agent_groups.delete_group(&meta.agent_group).await,
        );

        // --- Remote worker ------------------------------------------------
        match adapters.remote_worker.decommission_worker(customer_name).await {
            Ok(outcome) if outcome.success => {
                report.record_success(DecommissionStep::DecommissionWorker);
            }
            Ok(outcome) => {
                report.record_failure(DecommissionStep::DecommissionWorker, outcome.message);
            }
            Err(err) => {
                report.record_failure(DecommissionStep::DecommissionWorker, err.to_string());
            }
        }

        // The record is removed even when some teardown steps failed: the
        // report tells the operator what remains, and keeping the row would
        // block the customer name forever.
        match self.meta.delete(customer_name).await {
            Ok(_) => report.record_success(DecommissionStep::DeleteMeta),
            Err(err) => report.record_failure(DecommissionStep::DeleteMeta, err.to_string()),
        }

        let response = DecommissionResponse::from_report(customer_name.to_string(), report);
        tracing::info!(
            customer = %customer_name,
            cleaned = response.cleaned.len(),
            failed = response.failed.len(),
            "Decommissioning complete",
        );
        Ok(response)
    }
}

/// Record a best-effort teardown outcome and keep going.
fn attempt(
    report: &mut StepReport<DecommissionStep>,
    step: DecommissionStep,
    result: soclink_connectors::error::AdapterResult<()>,
) {
    match result {
        Ok(()) => {
            tracing::debug!(step = step.label(), "Teardown step succeeded");
            report.record_success(step);
        }
        Err(err) => {
            tracing::warn!(step = step.label(), error = %err, "Teardown step failed, continuing");
            report.record_failure(step, err.to_string());
        }
    }
}
