//! In-memory implementation of [`WorkflowStore`].
//!
//! Used by tests and by callers that do not need durability. All state sits
//! behind one `RwLock`; a scope is a cloned snapshot that is validated again
//! when it commits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use spendflow_shared::types::{ApprovalRequestId, CurrencyCode, ExpenseId, OrganizationId, UserId};
use tokio::sync::RwLock;

use crate::expense::{Employee, Expense, UserRole};
use crate::workflow::error::WorkflowError;
use crate::workflow::store::{ExpenseScope, WorkflowStore};
use crate::workflow::types::{ApprovalStatus, ApprovalStep};

#[derive(Debug, Default)]
struct MemoryState {
    organizations: HashMap<OrganizationId, CurrencyCode>,
    users: HashMap<UserId, Employee>,
    expenses: HashMap<ExpenseId, Expense>,
    steps: HashMap<ApprovalRequestId, ApprovalStep>,
}

impl MemoryState {
    fn steps_for(&self, expense_id: ExpenseId) -> Vec<ApprovalStep> {
        let mut steps: Vec<ApprovalStep> = self
            .steps
            .values()
            .filter(|s| s.expense_id == expense_id)
            .cloned()
            .collect();
        steps.sort_by_key(|s| (s.step_number, s.id));
        steps
    }
}

/// Workflow store backed by hash maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an organization and its base currency.
    pub async fn add_organization(&self, organization_id: OrganizationId, currency: CurrencyCode) {
        self.state
            .write()
            .await
            .organizations
            .insert(organization_id, currency);
    }

    /// Registers a user.
    pub async fn add_user(&self, user: Employee) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Current state of an expense.
    pub async fn expense(&self, expense_id: ExpenseId) -> Option<Expense> {
        self.state.read().await.expenses.get(&expense_id).cloned()
    }

    /// Current steps of an expense, ordered by step number.
    pub async fn steps_for(&self, expense_id: ExpenseId) -> Vec<ApprovalStep> {
        self.state.read().await.steps_for(expense_id)
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    type Scope = InMemoryExpenseScope;

    async fn organization_currency(
        &self,
        organization_id: OrganizationId,
    ) -> Result<CurrencyCode, WorkflowError> {
        self.state
            .read()
            .await
            .organizations
            .get(&organization_id)
            .cloned()
            .ok_or(WorkflowError::OrganizationNotFound(organization_id))
    }

    async fn first_admin(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<UserId>, WorkflowError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.organization_id == organization_id && u.role == UserRole::Admin)
            .map(|u| u.id)
            .min())
    }

    async fn find_request(
        &self,
        request_id: ApprovalRequestId,
    ) -> Result<Option<ApprovalStep>, WorkflowError> {
        Ok(self.state.read().await.steps.get(&request_id).cloned())
    }

    async fn insert_submission(
        &self,
        expense: &Expense,
        steps: &[ApprovalStep],
    ) -> Result<(), WorkflowError> {
        let mut state = self.state.write().await;
        state.expenses.insert(expense.id, expense.clone());
        for step in steps {
            state.steps.insert(step.id, step.clone());
        }
        Ok(())
    }

    async fn open_expense_scope(&self, expense_id: ExpenseId) -> Result<Self::Scope, WorkflowError> {
        let state = self.state.read().await;
        let expense = state
            .expenses
            .get(&expense_id)
            .cloned()
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))?;
        let steps = state.steps_for(expense_id);

        Ok(InMemoryExpenseScope {
            state: Arc::clone(&self.state),
            expense,
            steps,
        })
    }
}

/// Snapshot scope over the in-memory store.
#[derive(Debug)]
pub struct InMemoryExpenseScope {
    state: Arc<RwLock<MemoryState>>,
    expense: Expense,
    steps: Vec<ApprovalStep>,
}

#[async_trait]
impl ExpenseScope for InMemoryExpenseScope {
    fn expense(&self) -> &Expense {
        &self.expense
    }

    fn steps(&self) -> &[ApprovalStep] {
        &self.steps
    }

    async fn commit(
        self,
        step: &ApprovalStep,
        expense_status: Option<ApprovalStatus>,
    ) -> Result<(), WorkflowError> {
        let mut state = self.state.write().await;

        // Re-validate against live state; a stale snapshot must not win.
        let stored = state
            .steps
            .get(&step.id)
            .ok_or(WorkflowError::RequestNotFound(step.id))?;
        if stored.status.is_terminal() {
            return Err(WorkflowError::StepAlreadyDecided {
                request_id: step.id,
                status: stored.status,
            });
        }
        let expense = state
            .expenses
            .get(&self.expense.id)
            .ok_or(WorkflowError::ExpenseNotFound(self.expense.id))?;
        if expense.status.is_terminal() {
            return Err(WorkflowError::ExpenseAlreadyResolved {
                expense_id: expense.id,
                status: expense.status,
            });
        }

        state.steps.insert(step.id, step.clone());
        if let Some(status) = expense_status
            && let Some(expense) = state.expenses.get_mut(&self.expense.id)
        {
            expense.status = status;
        }
        Ok(())
    }
}
