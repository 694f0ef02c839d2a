//! Canonical role names for RBAC checks.

/// Full administrative access, including connector credential management.
pub const ROLE_ADMIN: &str = "admin";

/// SOC analyst: may run provisioning and decommissioning workflows.
pub const ROLE_ANALYST: &str = "analyst";

/// Service role for scheduled automation.
pub const ROLE_SCHEDULER: &str = "scheduler";
