//! Step model for the multi-system workflows.
//!
//! Both provisioning and decommissioning record every step they take in an
//! ordered [`StepReport`] instead of ad hoc branching. Provisioning aborts on
//! the first failed step before the metadata persist; decommissioning keeps
//! going and reports everything it could and could not clean up.

use serde::Serialize;

/// A single step of the provisioning workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStep {
    CreateIndexSet,
    CreateStream,
    ConnectPipelines,
    StartStream,
    CreateAgentGroups,
    ApplyGroupConfig,
    CreateDashboardOrg,
    CreateDatasource,
    CreateFolder,
    ProvisionDashboards,
    PersistMeta,
    ProvisionWorker,
}

impl ProvisionStep {
    /// Human-readable label used in log lines and workflow messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProvisionStep::CreateIndexSet => "create index set",
            ProvisionStep::CreateStream => "create event stream",
            ProvisionStep::ConnectPipelines => "connect stream to pipelines",
            ProvisionStep::StartStream => "start stream",
            ProvisionStep::CreateAgentGroups => "create agent groups",
            ProvisionStep::ApplyGroupConfig => "apply agent group configuration",
            ProvisionStep::CreateDashboardOrg => "create dashboard organization",
            ProvisionStep::CreateDatasource => "create datasource",
            ProvisionStep::CreateFolder => "create dashboard folder",
            ProvisionStep::ProvisionDashboards => "provision dashboards",
            ProvisionStep::PersistMeta => "persist customer metadata",
            ProvisionStep::ProvisionWorker => "provision remote worker",
        }
    }
}

/// A single teardown step of the decommission workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecommissionStep {
    StopStream,
    DeleteStream,
    DeleteIndexSet,
    DeleteDashboardOrg,
    DeleteAgentGroup,
    DecommissionWorker,
    DeleteMeta,
}

impl DecommissionStep {
    pub fn label(&self) -> &'static str {
        match self {
            DecommissionStep::StopStream => "stop stream",
            DecommissionStep::DeleteStream => "delete stream",
            DecommissionStep::DeleteIndexSet => "delete index set",
            DecommissionStep::DeleteDashboardOrg => "delete dashboard organization",
            DecommissionStep::DeleteAgentGroup => "delete agent group",
            DecommissionStep::DecommissionWorker => "decommission remote worker",
            DecommissionStep::DeleteMeta => "delete customer metadata",
        }
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step completed against the external system.
    Succeeded,
    /// The step failed; `detail` names the external system's complaint.
    Failed { detail: String },
    /// The step was not attempted (an earlier fatal step aborted the run).
    Skipped,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// One recorded `{step, outcome}` pair.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult<S> {
    pub step: S,
    pub outcome: StepOutcome,
}

/// Ordered accumulator of step results for one workflow run.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport<S> {
    steps: Vec<StepResult<S>>,
}

impl<S: Copy> StepReport<S> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Record an outcome for `step`.
    pub fn record(&mut self, step: S, outcome: StepOutcome) {
        self.steps.push(StepResult { step, outcome });
    }

    pub fn record_success(&mut self, step: S) {
        self.record(step, StepOutcome::Succeeded);
    }

    pub fn record_failure(&mut self, step: S, detail: impl Into<String>) {
        self.record(
            step,
            StepOutcome::Failed {
                detail: detail.into(),
            },
        );
    }

    /// All recorded results in execution order.
    pub fn steps(&self) -> &[StepResult<S>] {
        &self.steps
    }

    /// True when every recorded step succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_success())
    }

    /// The steps that failed, with their failure detail.
    pub fn failures(&self) -> impl Iterator<Item = &StepResult<S>> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed { .. }))
    }
}

impl<S: Copy> Default for StepReport<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_preserves_execution_order() {
        let mut report = StepReport::new();
        report.record_success(ProvisionStep::CreateIndexSet);
        report.record_failure(ProvisionStep::CreateStream, "boom");

        let steps: Vec<_> = report.steps().iter().map(|s| s.step).collect();
        assert_eq!(
            steps,
            vec![ProvisionStep::CreateIndexSet, ProvisionStep::CreateStream]
        );
        assert!(!report.all_succeeded());
    }

    #[test]
    fn failures_filter_only_failed_steps() {
        let mut report = StepReport::new();
        report.record_success(DecommissionStep::DeleteStream);
        report.record_failure(DecommissionStep::DeleteIndexSet, "410 gone");
        report.record_success(DecommissionStep::DeleteAgentGroup);

        let failed: Vec<_> = report.failures().map(|s| s.step).collect();
        assert_eq!(failed, vec![DecommissionStep::DeleteIndexSet]);
    }

    #[test]
    fn empty_report_counts_as_all_succeeded() {
        let report: StepReport<ProvisionStep> = StepReport::new();
        assert!(report.all_succeeded());
    }
}
