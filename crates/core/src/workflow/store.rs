//! Storage seam for the workflow coordinator.
//!
//! The coordinator never talks to a database directly. It reads and writes
//! through [`WorkflowStore`], and does every read-modify-write of one
//! expense inside an [`ExpenseScope`]: a snapshot of the expense and its
//! steps taken under the store's own isolation, committed all at once or
//! not at all.

use async_trait::async_trait;
use spendflow_shared::types::{ApprovalRequestId, CurrencyCode, ExpenseId, OrganizationId, UserId};

use crate::expense::Expense;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalStatus, ApprovalStep};

/// Persistence operations the workflow needs.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Scope type returned by [`WorkflowStore::open_expense_scope`].
    type Scope: ExpenseScope;

    /// Base currency of an organization.
    ///
    /// # Errors
    /// * `WorkflowError::OrganizationNotFound` if the organization is unknown
    async fn organization_currency(
        &self,
        organization_id: OrganizationId,
    ) -> Result<CurrencyCode, WorkflowError>;

    /// The organization's first administrator, if any.
    async fn first_admin(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<UserId>, WorkflowError>;

    /// Looks up a single approval step by id.
    async fn find_request(
        &self,
        request_id: ApprovalRequestId,
    ) -> Result<Option<ApprovalStep>, WorkflowError>;

    /// Persists a new expense together with its chain, atomically.
    async fn insert_submission(
        &self,
        expense: &Expense,
        steps: &[ApprovalStep],
    ) -> Result<(), WorkflowError>;

    /// Opens an exclusive read-modify-write scope over one expense.
    ///
    /// # Errors
    /// * `WorkflowError::ExpenseNotFound` if the expense does not exist
    async fn open_expense_scope(&self, expense_id: ExpenseId) -> Result<Self::Scope, WorkflowError>;
}

/// Snapshot of one expense and its steps, writable exactly once.
///
/// Dropping a scope without calling [`ExpenseScope::commit`] discards it
/// and leaves storage untouched.
#[async_trait]
pub trait ExpenseScope: Send {
    /// The expense as read when the scope was opened.
    fn expense(&self) -> &Expense;

    /// All steps of the expense, ordered by step number.
    fn steps(&self) -> &[ApprovalStep];

    /// Writes the decided step and, when present, the new expense status.
    async fn commit(
        self,
        step: &ApprovalStep,
        expense_status: Option<ApprovalStatus>,
    ) -> Result<(), WorkflowError>;
}
