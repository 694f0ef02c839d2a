//! Per-customer provisioning locks.
//!
//! Provisioning the same customer twice concurrently would create duplicate
//! external resources, so each run holds a logical lock on the customer name
//! for its entire duration. Contention is surfaced immediately as
//! [`WorkflowError::ConcurrentProvisionInProgress`] rather than queued --
//! the caller decides whether to retry. Different customers never contend.
//!
//! [`WorkflowError::ConcurrentProvisionInProgress`]: crate::WorkflowError::ConcurrentProvisionInProgress

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Registry of in-flight per-customer workflow runs.
#[derive(Debug, Clone, Default)]
pub struct CustomerLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

impl CustomerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for `customer`.
    ///
    /// Returns `None` when another run already holds it. The returned guard
    /// releases on drop, including on failure paths.
    pub fn try_acquire(&self, customer: &str) -> Option<CustomerLockGuard> {
        let mut held = self.held.lock().expect("customer lock set poisoned");
        if !held.insert(customer.to_string()) {
            return None;
        }
        Some(CustomerLockGuard {
            held: Arc::clone(&self.held),
            customer: customer.to_string(),
        })
    }
}

/// RAII guard for one customer's workflow lock.
#[derive(Debug)]
pub struct CustomerLockGuard {
    held: Arc<Mutex<HashSet<String>>>,
    customer: String,
}

impl Drop for CustomerLockGuard {
    fn drop(&mut self) {
        self.held
            .lock()
            .expect("customer lock set poisoned")
            .remove(&self.customer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_customer_fails() {
        let locks = CustomerLocks::new();
        let guard = locks.try_acquire("acme");
        assert!(guard.is_some());
        assert!(locks.try_acquire("acme").is_none());
    }

    #[test]
    fn different_customers_do_not_contend() {
        let locks = CustomerLocks::new();
        let _a = locks.try_acquire("acme").unwrap();
        assert!(locks.try_acquire("globex").is_some());
    }

    #[test]
    fn dropping_the_guard_releases_the_lock() {
        let locks = CustomerLocks::new();
        {
            let _guard = locks.try_acquire("acme").unwrap();
            assert!(locks.try_acquire("acme").is_none());
        }
        assert!(locks.try_acquire("acme").is_some());
    }
}
