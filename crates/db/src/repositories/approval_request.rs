//! Approval request repository.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use spendflow_core::workflow::ApprovalStep;
use spendflow_shared::types::{ApprovalRequestId, ExpenseId, UserId};

use crate::entities::{approval_requests, expenses, sea_orm_active_enums::ApprovalStatus};
use crate::repositories::error::RepositoryError;

pub(crate) fn step_from_model(model: approval_requests::Model) -> Result<ApprovalStep, RepositoryError> {
    let step_number =
        u32::try_from(model.step_number).map_err(|e| RepositoryError::corrupt("ApprovalRequest", e))?;

    Ok(ApprovalStep {
        id: ApprovalRequestId::from_uuid(model.id),
        expense_id: ExpenseId::from_uuid(model.expense_id),
        approver_id: UserId::from_uuid(model.approver_id),
        step_number,
        status: model.status.into(),
        comments: model.comments,
        decided_at: model.decided_at.map(|at| at.with_timezone(&Utc)),
    })
}

pub(crate) fn step_to_active(
    step: &ApprovalStep,
) -> Result<approval_requests::ActiveModel, RepositoryError> {
    let step_number =
        i32::try_from(step.step_number).map_err(|e| RepositoryError::corrupt("ApprovalRequest", e))?;

    Ok(approval_requests::ActiveModel {
        id: Set(step.id.into_inner()),
        expense_id: Set(step.expense_id.into_inner()),
        approver_id: Set(step.approver_id.into_inner()),
        step_number: Set(step_number),
        status: Set(step.status.into()),
        comments: Set(step.comments.clone()),
        decided_at: Set(step.decided_at.map(Into::into)),
        created_at: Set(Utc::now().into()),
    })
}

pub(crate) fn collect_steps(
    models: Vec<approval_requests::Model>,
) -> Result<Vec<ApprovalStep>, RepositoryError> {
    models.into_iter().map(step_from_model).collect()
}

/// Read access to approval requests.
#[derive(Debug, Clone)]
pub struct ApprovalRequestRepository {
    db: DatabaseConnection,
}

impl ApprovalRequestRepository {
    /// Creates a new approval request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Pending requests waiting on `approver_id`, oldest first.
    ///
    /// Requests whose expense is already resolved are left out: they can no
    /// longer be decided.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be mapped.
    pub async fn pending_for_approver(
        &self,
        approver_id: UserId,
    ) -> Result<Vec<ApprovalStep>, RepositoryError> {
        let models = approval_requests::Entity::find()
            .join(JoinType::InnerJoin, approval_requests::Relation::Expenses.def())
            .filter(approval_requests::Column::ApproverId.eq(approver_id.into_inner()))
            .filter(approval_requests::Column::Status.eq(ApprovalStatus::Pending))
            .filter(expenses::Column::Status.eq(ApprovalStatus::Pending))
            .order_by_asc(approval_requests::Column::CreatedAt)
            .order_by_asc(approval_requests::Column::StepNumber)
            .all(&self.db)
            .await?;
        collect_steps(models)
    }

    /// All requests of an expense, ordered by step number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be mapped.
    pub async fn list_by_expense(
        &self,
        expense_id: ExpenseId,
    ) -> Result<Vec<ApprovalStep>, RepositoryError> {
        let models = approval_requests::Entity::find()
            .filter(approval_requests::Column::ExpenseId.eq(expense_id.into_inner()))
            .order_by_asc(approval_requests::Column::StepNumber)
            .order_by_asc(approval_requests::Column::Id)
            .all(&self.db)
            .await?;
        collect_steps(models)
    }
}
