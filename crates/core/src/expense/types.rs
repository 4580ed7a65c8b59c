//! Expense domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendflow_shared::types::{CurrencyCode, ExpenseId, OrganizationId, UserId};

use crate::workflow::types::ApprovalStatus;

/// Role of a user within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Manages users and approval rules; fallback approver.
    Admin,
    /// Approves expenses for their reports.
    Manager,
    /// Submits expenses.
    Employee,
}

impl UserRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

/// Snapshot of the submitting user, as the chain builder needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The user's id.
    pub id: UserId,
    /// Organization the user belongs to.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Role within the organization.
    pub role: UserRole,
    /// Direct manager, if any.
    pub manager_id: Option<UserId>,
}

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Meals.
    Food,
    /// Transport and fares.
    Travel,
    /// Hotels and lodging.
    Accommodation,
    /// Office supplies.
    Supplies,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Parse a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "travel" => Some(Self::Travel),
            "accommodation" => Some(Self::Accommodation),
            "supplies" => Some(Self::Supplies),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns the string representation of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Travel => "travel",
            Self::Accommodation => "accommodation",
            Self::Supplies => "supplies",
            Self::Other => "other",
        }
    }
}

/// An expense as submitted by an employee.
///
/// `status` is the only field that changes after creation, and it changes at
/// most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Submitting employee.
    pub employee_id: UserId,
    /// Amount in the currency it was spent in.
    pub amount: Decimal,
    /// Currency the expense was spent in.
    pub source_currency: CurrencyCode,
    /// Amount converted into the organization currency.
    pub amount_in_org_currency: Decimal,
    /// Category.
    pub category: ExpenseCategory,
    /// Free-text description.
    pub description: String,
    /// Date the expense was incurred.
    pub date: NaiveDate,
    /// Approval status.
    pub status: ApprovalStatus,
    /// When the expense was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Input for submitting a new expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    /// Amount in the currency it was spent in.
    pub amount: Decimal,
    /// Currency the expense was spent in.
    pub currency: CurrencyCode,
    /// Category.
    pub category: ExpenseCategory,
    /// Free-text description.
    pub description: String,
    /// Date the expense was incurred.
    pub date: NaiveDate,
}

impl NewExpense {
    /// Materializes the expense for `employee` with a converted amount.
    #[must_use]
    pub fn into_expense(self, employee: &Employee, amount_in_org_currency: Decimal) -> Expense {
        Expense {
            id: ExpenseId::new(),
            organization_id: employee.organization_id,
            employee_id: employee.id,
            amount: self.amount,
            source_currency: self.currency,
            amount_in_org_currency,
            category: self.category,
            description: self.description,
            date: self.date,
            status: ApprovalStatus::Pending,
            submitted_at: Utc::now(),
        }
    }
}
