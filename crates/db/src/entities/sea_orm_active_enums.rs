//! String-backed enums shared by several tables.
//!
//! Stored as short strings rather than native database enums so the same
//! schema runs on `PostgreSQL` and `SQLite`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use spendflow_core::expense;
use spendflow_core::workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "employee")]
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "food")]
    Food,
    #[sea_orm(string_value = "travel")]
    Travel,
    #[sea_orm(string_value = "accommodation")]
    Accommodation,
    #[sea_orm(string_value = "supplies")]
    Supplies,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum RuleType {
    #[sea_orm(string_value = "sequential")]
    Sequential,
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "specific_approver")]
    SpecificApprover,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

impl From<expense::UserRole> for UserRole {
    fn from(role: expense::UserRole) -> Self {
        match role {
            expense::UserRole::Admin => Self::Admin,
            expense::UserRole::Manager => Self::Manager,
            expense::UserRole::Employee => Self::Employee,
        }
    }
}

impl From<UserRole> for expense::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Manager => Self::Manager,
            UserRole::Employee => Self::Employee,
        }
    }
}

impl From<workflow::ApprovalStatus> for ApprovalStatus {
    fn from(status: workflow::ApprovalStatus) -> Self {
        match status {
            workflow::ApprovalStatus::Pending => Self::Pending,
            workflow::ApprovalStatus::Approved => Self::Approved,
            workflow::ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStatus> for workflow::ApprovalStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => Self::Pending,
            ApprovalStatus::Approved => Self::Approved,
            ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<expense::ExpenseCategory> for ExpenseCategory {
    fn from(category: expense::ExpenseCategory) -> Self {
        match category {
            expense::ExpenseCategory::Food => Self::Food,
            expense::ExpenseCategory::Travel => Self::Travel,
            expense::ExpenseCategory::Accommodation => Self::Accommodation,
            expense::ExpenseCategory::Supplies => Self::Supplies,
            expense::ExpenseCategory::Other => Self::Other,
        }
    }
}

impl From<ExpenseCategory> for expense::ExpenseCategory {
    fn from(category: ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::Food => Self::Food,
            ExpenseCategory::Travel => Self::Travel,
            ExpenseCategory::Accommodation => Self::Accommodation,
            ExpenseCategory::Supplies => Self::Supplies,
            ExpenseCategory::Other => Self::Other,
        }
    }
}

impl From<workflow::RuleType> for RuleType {
    fn from(rule_type: workflow::RuleType) -> Self {
        match rule_type {
            workflow::RuleType::Sequential => Self::Sequential,
            workflow::RuleType::Percentage => Self::Percentage,
            workflow::RuleType::SpecificApprover => Self::SpecificApprover,
            workflow::RuleType::Hybrid => Self::Hybrid,
        }
    }
}

impl From<RuleType> for workflow::RuleType {
    fn from(rule_type: RuleType) -> Self {
        match rule_type {
            RuleType::Sequential => Self::Sequential,
            RuleType::Percentage => Self::Percentage,
            RuleType::SpecificApprover => Self::SpecificApprover,
            RuleType::Hybrid => Self::Hybrid,
        }
    }
}
