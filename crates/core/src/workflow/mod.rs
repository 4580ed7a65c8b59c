//! Expense approval workflow.
//!
//! This module builds approval chains for submitted expenses and evaluates
//! each approver's decision against the governing rule.
//!
//! # Modules
//!
//! - `types` - Statuses, steps, and decisions
//! - `error` - Workflow-specific error types
//! - `rule` - Approval rules and their evaluation policies
//! - `chain` - Chain construction at submission time
//! - `decision` - Decision evaluation
//! - `store` - Storage seam used by the coordinator
//! - `lock` - Per-expense mutual exclusion
//! - `coordinator` - Submission and decision entry points
//! - `memory` - In-memory store

pub mod chain;
pub mod coordinator;
pub mod decision;
pub mod error;
pub mod lock;
pub mod memory;
pub mod rule;
pub mod store;
pub mod types;

#[cfg(test)]
mod decision_props;

pub use chain::ChainBuilder;
pub use coordinator::WorkflowCoordinator;
pub use decision::DecisionEvaluator;
pub use error::WorkflowError;
pub use lock::{ExpenseLockGuard, ExpenseLocks};
pub use memory::{InMemoryExpenseScope, InMemoryWorkflowStore};
pub use rule::{ApprovalRule, ApproverSequence, RulePolicy, RuleType};
pub use store::{ExpenseScope, WorkflowStore};
pub use types::{ApprovalDecision, ApprovalStatus, ApprovalStep, DecisionOutcome, DecisionRecord};
