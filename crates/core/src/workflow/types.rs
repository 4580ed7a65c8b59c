//! Workflow domain types for expense approval.
//!
//! This module defines the status shared by expenses and their approval
//! steps, the step record itself, and the inputs/outputs of a decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spendflow_shared::types::{ApprovalRequestId, ExpenseId, UserId};
use std::fmt;

/// Status of an expense or of one of its approval steps.
///
/// The only valid transitions are:
/// - Pending → Approved
/// - Pending → Rejected
///
/// Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved (terminal).
    Approved,
    /// Rejected (terminal).
    Rejected,
}

impl ApprovalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once a decision has been made.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Approved | Self::Rejected)
        )
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One approver's checkpoint against one expense.
///
/// Persisted as an approval request. A step is decided exactly once, by the
/// approver it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStep {
    /// Unique identifier for the step.
    pub id: ApprovalRequestId,
    /// The expense this step gates.
    pub expense_id: ExpenseId,
    /// The only user allowed to decide this step.
    pub approver_id: UserId,
    /// Ordering key. Not necessarily contiguous.
    pub step_number: u32,
    /// Current status.
    pub status: ApprovalStatus,
    /// Optional comments left with the decision.
    pub comments: Option<String>,
    /// When the decision was made.
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApprovalStep {
    /// Creates a fresh pending step.
    #[must_use]
    pub fn pending(expense_id: ExpenseId, approver_id: UserId, step_number: u32) -> Self {
        Self {
            id: ApprovalRequestId::new(),
            expense_id,
            approver_id,
            step_number,
            status: ApprovalStatus::Pending,
            comments: None,
            decided_at: None,
        }
    }

    /// Returns true if the step has been approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}

/// A single approver's decision on one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDecision {
    /// The step being decided.
    pub request_id: ApprovalRequestId,
    /// The user acting on the step.
    pub approver_id: UserId,
    /// `true` to approve, `false` to reject.
    pub approve: bool,
    /// Optional comments.
    pub comments: Option<String>,
}

impl ApprovalDecision {
    /// Builds an approval.
    #[must_use]
    pub fn approve(request_id: ApprovalRequestId, approver_id: UserId) -> Self {
        Self {
            request_id,
            approver_id,
            approve: true,
            comments: None,
        }
    }

    /// Builds a rejection.
    #[must_use]
    pub fn reject(request_id: ApprovalRequestId, approver_id: UserId) -> Self {
        Self {
            request_id,
            approver_id,
            approve: false,
            comments: None,
        }
    }

    /// Attaches comments to the decision.
    #[must_use]
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// The status the decided step moves to.
    #[must_use]
    pub fn target_status(&self) -> ApprovalStatus {
        if self.approve {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        }
    }
}

/// Result of evaluating one decision against an expense's steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// The decided step, ready to persist.
    pub step: ApprovalStep,
    /// The expense's new status, present only when the expense resolves.
    pub expense_status: Option<ApprovalStatus>,
}

/// Result of a recorded decision, as returned to callers of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    /// The persisted step.
    pub step: ApprovalStep,
    /// The expense status after the decision.
    pub expense_status: ApprovalStatus,
    /// Whether this decision changed the expense status.
    pub changed: bool,
}
