//! Approval chain construction.
//!
//! Turns a submitted expense and its governing rule into the pending steps
//! that will be persisted alongside it.

use spendflow_shared::types::UserId;
use tracing::warn;

use crate::expense::{Employee, Expense};
use crate::workflow::rule::ApprovalRule;
use crate::workflow::types::ApprovalStep;

/// Stateless builder for approval chains.
pub struct ChainBuilder;

impl ChainBuilder {
    /// Build the approval chain for an expense.
    ///
    /// With a rule: the employee's manager at step 0 when the rule asks for
    /// one and the employee has one, then one step per entry of the approver
    /// sequence, numbered after the manager step. A malformed sequence is
    /// logged and treated as empty.
    ///
    /// Without a rule: a single step for `fallback_admin`, or no steps at
    /// all when there is no administrator. Callers must refuse an empty
    /// chain.
    ///
    /// Every returned step is pending and not yet persisted.
    #[must_use]
    pub fn build(
        expense: &Expense,
        rule: Option<&ApprovalRule>,
        employee: &Employee,
        fallback_admin: Option<UserId>,
    ) -> Vec<ApprovalStep> {
        let Some(rule) = rule else {
            return fallback_admin
                .map(|admin| vec![ApprovalStep::pending(expense.id, admin, 0)])
                .unwrap_or_default();
        };

        let mut steps = Vec::new();

        if rule.requires_direct_manager
            && let Some(manager_id) = employee.manager_id
        {
            steps.push(ApprovalStep::pending(expense.id, manager_id, 0));
        }

        let approvers = match rule.approver_sequence.approvers() {
            Ok(approvers) => approvers,
            Err(err) => {
                warn!(
                    rule_id = %rule.id,
                    expense_id = %expense.id,
                    error = %err,
                    "Treating malformed approver sequence as empty"
                );
                &[]
            }
        };

        let offset = u32::try_from(steps.len()).unwrap_or(u32::MAX);
        steps.extend(approvers.iter().zip(offset..).map(|(approver, step_number)| {
            ApprovalStep::pending(expense.id, *approver, step_number)
        }));

        steps
    }
}
