//! Workflow error types for expense approval.
//!
//! This module defines all error types that can occur while building
//! approval chains and recording decisions.

use spendflow_shared::AppError;
use spendflow_shared::types::{
    ApprovalRequestId, ApprovalRuleId, ExpenseId, OrganizationId, UserId,
};
use thiserror::Error;

use crate::workflow::types::ApprovalStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Expense not found.
    #[error("Expense {0} not found")]
    ExpenseNotFound(ExpenseId),

    /// Approval request not found.
    #[error("Approval request {0} not found")]
    RequestNotFound(ApprovalRequestId),

    /// Approval rule not found.
    #[error("Approval rule {0} not found")]
    RuleNotFound(ApprovalRuleId),

    /// User not found.
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// Organization not found.
    #[error("Organization {0} not found")]
    OrganizationNotFound(OrganizationId),

    /// The step has already been decided.
    #[error("Approval request {request_id} is already {status}")]
    StepAlreadyDecided {
        /// The step that was targeted.
        request_id: ApprovalRequestId,
        /// Its current (terminal) status.
        status: ApprovalStatus,
    },

    /// The step does not belong to the expense being evaluated.
    #[error("Approval request {request_id} does not belong to expense {expense_id}")]
    StepNotInExpense {
        /// The step that was targeted.
        request_id: ApprovalRequestId,
        /// The expense being evaluated.
        expense_id: ExpenseId,
    },

    /// Someone other than the designated approver tried to decide a step.
    #[error("User {user_id} is not the designated approver for request {request_id}")]
    NotDesignatedApprover {
        /// The step that was targeted.
        request_id: ApprovalRequestId,
        /// The user who attempted the decision.
        user_id: UserId,
    },

    /// A sequential step was approved while an earlier step is still open.
    #[error("Approval request {request_id} is out of turn; request {waiting_on} comes first")]
    OutOfTurn {
        /// The step that was targeted.
        request_id: ApprovalRequestId,
        /// The lowest earlier step not yet approved.
        waiting_on: ApprovalRequestId,
    },

    /// The expense already reached a terminal status.
    #[error("Expense {expense_id} is already {status}")]
    ExpenseAlreadyResolved {
        /// The expense.
        expense_id: ExpenseId,
        /// Its terminal status.
        status: ApprovalStatus,
    },

    /// The approver sequence of a rule could not be parsed.
    #[error("Approval rule has a malformed approver sequence: {0}")]
    MalformedRule(String),

    /// A rule failed validation.
    #[error("Invalid approval rule: {0}")]
    InvalidRule(String),

    /// No approver could be resolved for the expense.
    #[error("No approver could be resolved for an expense in organization {0}")]
    NoResolvableApprover(OrganizationId),

    /// Storage collaborator failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedRule(_) | Self::InvalidRule(_) => 400,

            Self::NotDesignatedApprover { .. } => 403,

            Self::ExpenseNotFound(_)
            | Self::RequestNotFound(_)
            | Self::RuleNotFound(_)
            | Self::UserNotFound(_)
            | Self::OrganizationNotFound(_) => 404,

            Self::StepAlreadyDecided { .. }
            | Self::StepNotInExpense { .. }
            | Self::OutOfTurn { .. }
            | Self::ExpenseAlreadyResolved { .. } => 409,

            Self::NoResolvableApprover(_) => 422,

            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::RequestNotFound(_) => "APPROVAL_REQUEST_NOT_FOUND",
            Self::RuleNotFound(_) => "APPROVAL_RULE_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            Self::StepAlreadyDecided { .. } => "STEP_ALREADY_DECIDED",
            Self::StepNotInExpense { .. } => "STEP_NOT_IN_EXPENSE",
            Self::NotDesignatedApprover { .. } => "NOT_DESIGNATED_APPROVER",
            Self::OutOfTurn { .. } => "OUT_OF_TURN",
            Self::ExpenseAlreadyResolved { .. } => "EXPENSE_ALREADY_RESOLVED",
            Self::MalformedRule(_) => "MALFORMED_RULE",
            Self::InvalidRule(_) => "INVALID_RULE",
            Self::NoResolvableApprover(_) => "NO_RESOLVABLE_APPROVER",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true for errors that leave no state mutated because the
    /// targeted step or expense is not in a decidable state.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::StepAlreadyDecided { .. }
                | Self::StepNotInExpense { .. }
                | Self::OutOfTurn { .. }
                | Self::ExpenseAlreadyResolved { .. }
        )
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::Validation(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::InvalidState(message),
            422 => Self::Unprocessable(message),
            _ => Self::Storage(message),
        }
    }
}
