//! `SeaORM` implementation of the workflow store.
//!
//! An expense scope is a database transaction. The expense row is read with
//! `SELECT ... FOR UPDATE` so that coordinators in other processes queue
//! behind it (`SQLite` has no row locks and serializes writers instead).
//! Dropping the scope without committing rolls the transaction back.
//! Commits are guarded on PENDING; a guard that matches nothing is reported
//! as the step or expense having already moved on.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use spendflow_core::expense::Expense;
use spendflow_core::workflow::{
    ApprovalStatus, ApprovalStep, ExpenseScope, WorkflowError, WorkflowStore,
};
use spendflow_shared::types::{ApprovalRequestId, CurrencyCode, ExpenseId, OrganizationId, UserId};
use tracing::debug;

use crate::entities::{approval_requests, expenses, organizations, sea_orm_active_enums};
use crate::repositories::approval_request::{collect_steps, step_from_model, step_to_active};
use crate::repositories::error::RepositoryError;
use crate::repositories::expense::{expense_from_model, expense_to_active};
use crate::repositories::user::first_admin;

fn storage(err: sea_orm::DbErr) -> WorkflowError {
    WorkflowError::Storage(err.to_string())
}

/// Workflow store over a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmWorkflowStore {
    db: DatabaseConnection,
}

impl SeaOrmWorkflowStore {
    /// Creates a new workflow store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkflowStore for SeaOrmWorkflowStore {
    type Scope = SeaOrmExpenseScope;

    async fn organization_currency(
        &self,
        organization_id: OrganizationId,
    ) -> Result<CurrencyCode, WorkflowError> {
        let org = organizations::Entity::find_by_id(organization_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or(WorkflowError::OrganizationNotFound(organization_id))?;

        org.currency
            .parse()
            .map_err(|e| RepositoryError::corrupt("Organization", e).into())
    }

    async fn first_admin(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<UserId>, WorkflowError> {
        let admin = first_admin(&self.db, organization_id).await?;
        Ok(admin.map(|a| a.id))
    }

    async fn find_request(
        &self,
        request_id: ApprovalRequestId,
    ) -> Result<Option<ApprovalStep>, WorkflowError> {
        let model = approval_requests::Entity::find_by_id(request_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?;
        Ok(model.map(step_from_model).transpose()?)
    }

    async fn insert_submission(
        &self,
        expense: &Expense,
        steps: &[ApprovalStep],
    ) -> Result<(), WorkflowError> {
        let rows = steps
            .iter()
            .map(step_to_active)
            .collect::<Result<Vec<_>, _>>()?;

        let txn = self.db.begin().await.map_err(storage)?;

        expenses::Entity::insert(expense_to_active(expense))
            .exec(&txn)
            .await
            .map_err(storage)?;
        if !rows.is_empty() {
            approval_requests::Entity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(storage)?;
        }

        txn.commit().await.map_err(storage)
    }

    async fn open_expense_scope(&self, expense_id: ExpenseId) -> Result<Self::Scope, WorkflowError> {
        let txn = self.db.begin().await.map_err(storage)?;

        let expense = expenses::Entity::find_by_id(expense_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(storage)?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))?;
        let expense = expense_from_model(expense)?;

        let steps = approval_requests::Entity::find()
            .filter(approval_requests::Column::ExpenseId.eq(expense_id.into_inner()))
            .order_by_asc(approval_requests::Column::StepNumber)
            .order_by_asc(approval_requests::Column::Id)
            .all(&txn)
            .await
            .map_err(storage)?;
        let steps = collect_steps(steps)?;

        debug!(%expense_id, steps = steps.len(), "Opened expense scope");
        Ok(SeaOrmExpenseScope {
            txn,
            expense,
            steps,
        })
    }
}

/// Expense scope backed by an open database transaction.
pub struct SeaOrmExpenseScope {
    txn: DatabaseTransaction,
    expense: Expense,
    steps: Vec<ApprovalStep>,
}

impl SeaOrmExpenseScope {
    /// Explains why the guarded step update matched no row.
    async fn step_conflict(&self, request_id: ApprovalRequestId) -> WorkflowError {
        match approval_requests::Entity::find_by_id(request_id.into_inner())
            .one(&self.txn)
            .await
        {
            Ok(Some(row)) => WorkflowError::StepAlreadyDecided {
                request_id,
                status: row.status.into(),
            },
            Ok(None) => WorkflowError::RequestNotFound(request_id),
            Err(err) => storage(err),
        }
    }

    /// Explains why the guarded expense update matched no row.
    async fn expense_conflict(&self) -> WorkflowError {
        let expense_id = self.expense.id;
        match expenses::Entity::find_by_id(expense_id.into_inner())
            .one(&self.txn)
            .await
        {
            Ok(Some(row)) => WorkflowError::ExpenseAlreadyResolved {
                expense_id,
                status: row.status.into(),
            },
            Ok(None) => WorkflowError::ExpenseNotFound(expense_id),
            Err(err) => storage(err),
        }
    }
}

#[async_trait]
impl ExpenseScope for SeaOrmExpenseScope {
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
        let decided_at = step.decided_at.unwrap_or_else(Utc::now);

        // Guarded on PENDING so a step can only ever be decided once.
        let updated = approval_requests::Entity::update_many()
            .col_expr(
                approval_requests::Column::Status,
                Expr::value(sea_orm_active_enums::ApprovalStatus::from(step.status)),
            )
            .col_expr(
                approval_requests::Column::Comments,
                Expr::value(step.comments.clone()),
            )
            .col_expr(
                approval_requests::Column::DecidedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(decided_at)),
            )
            .filter(approval_requests::Column::Id.eq(step.id.into_inner()))
            .filter(approval_requests::Column::Status.eq(sea_orm_active_enums::ApprovalStatus::Pending))
            .exec(&self.txn)
            .await
            .map_err(storage)?;

        if updated.rows_affected != 1 {
            return Err(self.step_conflict(step.id).await);
        }

        if let Some(status) = expense_status {
            let updated = expenses::Entity::update_many()
                .col_expr(
                    expenses::Column::Status,
                    Expr::value(sea_orm_active_enums::ApprovalStatus::from(status)),
                )
                .filter(expenses::Column::Id.eq(self.expense.id.into_inner()))
                .filter(expenses::Column::Status.eq(sea_orm_active_enums::ApprovalStatus::Pending))
                .exec(&self.txn)
                .await
                .map_err(storage)?;

            if updated.rows_affected != 1 {
                return Err(self.expense_conflict().await);
            }
        }

        self.txn.commit().await.map_err(storage)
    }
}
