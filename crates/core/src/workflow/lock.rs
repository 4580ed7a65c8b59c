//! Per-expense mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use spendflow_shared::types::ExpenseId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<ExpenseId, Arc<Mutex<()>>>;

/// Registry of one async mutex per expense currently being worked on.
///
/// Entries are created on demand and removed when the last holder or waiter
/// lets go, so the map only ever contains expenses with work in flight.
#[derive(Debug, Default, Clone)]
pub struct ExpenseLocks {
    inner: Arc<LockMap>,
}

/// Held while an expense is being read and written.
#[derive(Debug)]
pub struct ExpenseLockGuard {
    expense_id: ExpenseId,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ExpenseLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no one else holds `expense_id`, then takes it.
    pub async fn acquire(&self, expense_id: ExpenseId) -> ExpenseLockGuard {
        let mutex = Arc::clone(&self.inner.entry(expense_id).or_default());
        let guard = mutex.lock_owned().await;
        ExpenseLockGuard {
            expense_id,
            locks: Arc::clone(&self.inner),
            guard: Some(guard),
        }
    }

    /// Number of expenses with a holder or waiter.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.len()
    }
}

impl ExpenseLockGuard {
    /// The locked expense.
    #[must_use]
    pub fn expense_id(&self) -> ExpenseId {
        self.expense_id
    }
}

impl Drop for ExpenseLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody is waiting.
        self.locks
            .remove_if(&self.expense_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
