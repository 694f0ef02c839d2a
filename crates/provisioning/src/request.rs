//! Workflow request and response types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use soclink_core::step::{DecommissionStep, ProvisionStep, StepReport};
use soclink_db::models::customer_meta::CustomerMeta;

/// Inbound body for `POST /provision`.
///
/// Consumed entirely by one orchestration run; never persisted as-is.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProvisionNewCustomer {
    #[validate(length(min = 1, max = 128))]
    pub customer_name: String,

    /// Short code used for index prefixes and the agent group name.
    #[validate(length(min = 1, max = 32))]
    pub customer_code: String,

    /// Hot data retention in days.
    #[validate(range(min = 1, max = 3650))]
    pub hot_data_retention: u32,

    #[validate(length(min = 1))]
    pub auth_password: String,

    #[validate(range(min = 1, max = 65535))]
    pub registration_port: i32,

    #[validate(range(min = 1, max = 65535))]
    pub logs_port: i32,

    #[validate(range(min = 1, max = 65535))]
    pub api_port: i32,

    #[validate(length(min = 1))]
    pub cluster_name: String,

    #[validate(length(min = 1))]
    pub cluster_key: String,

    #[validate(length(min = 1))]
    pub master_ip: String,

    /// Dashboard identifiers to import for this customer.
    pub dashboards: Vec<String>,
}

/// Response for `POST /provision`.
///
/// `success` reflects the core log-ingestion/dashboard setup. The remote
/// worker is best-effort: when it fails, `success` stays `true`,
/// `wazuh_worker_provisioned` flips to `false`, and `message` carries the
/// failure detail.
#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub success: bool,
    pub message: String,
    pub wazuh_worker_provisioned: bool,
    pub customer_meta: CustomerMeta,
    pub steps: StepReport<ProvisionStep>,
}

/// Inbound body for `POST /decommission`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DecommissionCustomer {
    #[validate(length(min = 1, max = 128))]
    pub customer_name: String,
}

/// Response for `POST /decommission`.
///
/// Teardown is best-effort throughout: `cleaned` and `failed` list which
/// external resources were and were not removed; the caller decides whether
/// the leftovers need manual attention.
#[derive(Debug, Serialize)]
pub struct DecommissionResponse {
    pub success: bool,
    pub message: String,
    pub customer_name: String,
    pub cleaned: Vec<String>,
    pub failed: Vec<String>,
    pub steps: StepReport<DecommissionStep>,
}

impl DecommissionResponse {
    /// Fold a step report into the aggregated response.
    pub fn from_report(customer_name: String, steps: StepReport<DecommissionStep>) -> Self {
        let cleaned: Vec<String> = steps
            .steps()
            .iter()
            .filter(|s| s.outcome.is_success())
            .map(|s| s.step.label().to_string())
            .collect();
        let failed: Vec<String> = steps
            .failures()
            .map(|s| s.step.label().to_string())
            .collect();

        let message = if failed.is_empty() {
            format!("Customer {customer_name} decommissioned successfully")
        } else {
            format!(
                "Customer {customer_name} decommissioned with failures: {}",
                failed.join(", ")
            )
        };

        Self {
            success: true,
            message,
            customer_name,
            cleaned,
            failed,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use soclink_core::step::StepOutcome;

    use super::*;

    #[test]
    fn decommission_report_splits_cleaned_and_failed() {
        let mut report = StepReport::new();
        report.record_success(DecommissionStep::DeleteStream);
        report.record_failure(DecommissionStep::DeleteIndexSet, "boom");
        report.record(DecommissionStep::DeleteAgentGroup, StepOutcome::Succeeded);

        let response = DecommissionResponse::from_report("acme".to_string(), report);
        assert!(response.success);
        assert_eq!(response.cleaned.len(), 2);
        assert_eq!(response.failed, vec!["delete index set"]);
        assert!(response.message.contains("failures"));
    }

    #[test]
    fn provision_request_validation_rejects_bad_ports() {
        let request = ProvisionNewCustomer {
            customer_name: "Acme".into(),
            customer_code: "acme".into(),
            hot_data_retention: 30,
            auth_password: "secret".into(),
            registration_port: 0,
            logs_port: 1514,
            api_port: 55000,
            cluster_name: "acme-cluster".into(),
            cluster_key: "key".into(),
            master_ip: "10.0.0.1".into(),
            dashboards: vec!["EDR Overview".into()],
        };
        assert!(validator::Validate::validate(&request).is_err());
    }
}
