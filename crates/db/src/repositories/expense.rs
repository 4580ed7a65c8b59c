//! Expense repository for database operations.

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use spendflow_core::expense::Expense;
use spendflow_shared::types::{ExpenseId, OrganizationId, UserId};

use crate::entities::expenses;
use crate::repositories::error::RepositoryError;

pub(crate) fn expense_from_model(model: expenses::Model) -> Result<Expense, RepositoryError> {
    let source_currency = model
        .source_currency
        .parse()
        .map_err(|e| RepositoryError::corrupt("Expense", e))?;

    Ok(Expense {
        id: ExpenseId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        employee_id: UserId::from_uuid(model.employee_id),
        amount: model.amount,
        source_currency,
        amount_in_org_currency: model.amount_in_org_currency,
        category: model.category.into(),
        description: model.description,
        date: model.date,
        status: model.status.into(),
        submitted_at: model.submitted_at.with_timezone(&Utc),
    })
}

pub(crate) fn expense_to_active(expense: &Expense) -> expenses::ActiveModel {
    expenses::ActiveModel {
        id: Set(expense.id.into_inner()),
        organization_id: Set(expense.organization_id.into_inner()),
        employee_id: Set(expense.employee_id.into_inner()),
        amount: Set(expense.amount),
        source_currency: Set(expense.source_currency.to_string()),
        amount_in_org_currency: Set(expense.amount_in_org_currency),
        category: Set(expense.category.into()),
        description: Set(expense.description.clone()),
        date: Set(expense.date),
        status: Set(expense.status.into()),
        submitted_at: Set(expense.submitted_at.into()),
    }
}

fn collect(models: Vec<expenses::Model>) -> Result<Vec<Expense>, RepositoryError> {
    models.into_iter().map(expense_from_model).collect()
}

/// Read access to submitted expenses.
///
/// Expenses are written only through the workflow store, together with
/// their approval chain.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an expense by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be mapped.
    pub async fn find_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, RepositoryError> {
        expenses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(expense_from_model)
            .transpose()
    }

    /// Lists an employee's expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be mapped.
    pub async fn list_by_employee(&self, employee_id: UserId) -> Result<Vec<Expense>, RepositoryError> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_desc(expenses::Column::SubmittedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.db)
            .await?;
        collect(models)
    }

    /// Lists an organization's expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be mapped.
    pub async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, RepositoryError> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_desc(expenses::Column::SubmittedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.db)
            .await?;
        collect(models)
    }
}
