//! Per-project lifetime request accounting.
//!
//! The query path touches one piece of process-wide mutable state: a counter
//! of how many requests each project has served. Rather than a global, it is
//! an explicit object handlers inject where they need it; its lifecycle is
//! process start to process stop.

use std::collections::HashMap;
use std::sync::Mutex;

/// Default lifetime request limit per project.
pub const DEFAULT_PROJECT_REQUEST_LIMIT: u32 = 20;

/// A lifetime request counter keyed by `(user_id, project_id)`.
///
/// `try_acquire` increments and checks in one step under the lock, so
/// concurrent requests can never jointly exceed the limit.
#[derive(Debug)]
pub struct RequestBudget {
    limit: u32,
    counts: Mutex<HashMap<String, u32>>,
}

impl Default for RequestBudget {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_REQUEST_LIMIT)
    }
}

impl RequestBudget {
    /// Create a budget with the given per-project lifetime limit.
    pub fn new(limit: u32) -> Self {
        Self { limit, counts: Mutex::new(HashMap::new()) }
    }

    /// The configured per-project limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether the project has already exhausted its budget. Does not charge.
    pub fn is_exhausted(&self, user_id: &str, project_id: &str) -> bool {
        self.used(user_id, project_id) >= self.limit
    }

    /// Charge one request against the project. Returns `false` (without
    /// charging) once the project has exhausted its budget.
    pub fn try_acquire(&self, user_id: &str, project_id: &str) -> bool {
        let mut counts = match self.counts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = counts.entry(project_key(user_id, project_id)).or_insert(0);
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }

    /// Number of requests the project has used so far.
    pub fn used(&self, user_id: &str, project_id: &str) -> u32 {
        let counts = match self.counts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counts.get(&project_key(user_id, project_id)).copied().unwrap_or(0)
    }
}

fn project_key(user_id: &str, project_id: &str) -> String {
    format!("{user_id}/{project_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_charges_until_the_limit() {
        let budget = RequestBudget::new(2);
        assert!(budget.try_acquire("u", "p"));
        assert!(budget.try_acquire("u", "p"));
        assert!(!budget.try_acquire("u", "p"));
        assert_eq!(budget.used("u", "p"), 2);
    }

    #[test]
    fn projects_are_charged_independently() {
        let budget = RequestBudget::new(1);
        assert!(budget.try_acquire("u", "p1"));
        assert!(budget.try_acquire("u", "p2"));
        assert!(budget.try_acquire("other", "p1"));
        assert!(!budget.try_acquire("u", "p1"));
    }

    #[test]
    fn exhausted_budget_is_not_charged_further() {
        let budget = RequestBudget::new(1);
        assert!(budget.try_acquire("u", "p"));
        assert!(!budget.try_acquire("u", "p"));
        assert_eq!(budget.used("u", "p"), 1);
    }

    #[test]
    fn is_exhausted_reads_without_charging() {
        let budget = RequestBudget::new(1);
        assert!(!budget.is_exhausted("u", "p"));
        assert_eq!(budget.used("u", "p"), 0);
        assert!(budget.try_acquire("u", "p"));
        assert!(budget.is_exhausted("u", "p"));
        assert_eq!(budget.used("u", "p"), 1);
    }
}
