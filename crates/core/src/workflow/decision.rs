//! Decision evaluation.
//!
//! Applies one approver's decision to the step set of an expense and works
//! out whether the expense as a whole is now approved, rejected, or still
//! pending under its governing rule.

use chrono::{DateTime, Utc};

use crate::workflow::error::WorkflowError;
use crate::workflow::rule::{ApprovalRule, RulePolicy};
use crate::workflow::types::{ApprovalDecision, ApprovalStatus, ApprovalStep, DecisionOutcome};

/// Stateless evaluator for approval decisions.
pub struct DecisionEvaluator;

impl DecisionEvaluator {
    /// Apply a decision, stamping it with the current time.
    ///
    /// See [`DecisionEvaluator::decide_at`].
    pub fn decide(
        decision: &ApprovalDecision,
        steps: &[ApprovalStep],
        rule: Option<&ApprovalRule>,
    ) -> Result<DecisionOutcome, WorkflowError> {
        Self::decide_at(decision, steps, rule, Utc::now())
    }

    /// Apply a decision to the full step set of one expense.
    ///
    /// A rejection vetoes the expense regardless of rule type or step order.
    /// Under a sequential rule an approval is only accepted once every lower
    /// numbered step is approved. An approval is evaluated against the
    /// updated step set:
    /// - sequential: this is the last step
    /// - percentage: approved share of all steps at or above the threshold
    /// - specific approver: this step belongs to the designated approver
    /// - hybrid: either of the two above
    /// - no rule: every step approved
    ///
    /// # Returns
    /// The decided step and, only when the expense resolves, its new status.
    ///
    /// # Errors
    /// * `WorkflowError::RequestNotFound` if the step is not in `steps`
    /// * `WorkflowError::NotDesignatedApprover` if someone else decides it
    /// * `WorkflowError::StepAlreadyDecided` if the step is not pending
    /// * `WorkflowError::OutOfTurn` if a sequential approval skips an open step
    pub fn decide_at(
        decision: &ApprovalDecision,
        steps: &[ApprovalStep],
        rule: Option<&ApprovalRule>,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, WorkflowError> {
        let current = steps
            .iter()
            .find(|s| s.id == decision.request_id)
            .ok_or(WorkflowError::RequestNotFound(decision.request_id))?;

        if current.approver_id != decision.approver_id {
            return Err(WorkflowError::NotDesignatedApprover {
                request_id: current.id,
                user_id: decision.approver_id,
            });
        }

        if current.status.is_terminal() {
            return Err(WorkflowError::StepAlreadyDecided {
                request_id: current.id,
                status: current.status,
            });
        }

        let policy = rule.map(ApprovalRule::policy);
        if decision.approve
            && policy == Some(RulePolicy::Sequential)
            && let Some(waiting_on) = Self::first_open_before(current, steps)
        {
            return Err(WorkflowError::OutOfTurn {
                request_id: current.id,
                waiting_on: waiting_on.id,
            });
        }

        let mut decided = current.clone();
        decided.status = decision.target_status();
        decided.comments.clone_from(&decision.comments);
        decided.decided_at = Some(now);

        if !decision.approve {
            return Ok(DecisionOutcome {
                step: decided,
                expense_status: Some(ApprovalStatus::Rejected),
            });
        }

        let updated: Vec<ApprovalStep> = steps
            .iter()
            .map(|s| if s.id == decided.id { decided.clone() } else { s.clone() })
            .collect();

        let resolved = match policy {
            Some(RulePolicy::Sequential) => Self::sequence_complete(&decided, &updated),
            Some(RulePolicy::Percentage { threshold }) => {
                Self::threshold_reached(&updated, threshold)
            }
            Some(RulePolicy::SpecificApprover { approver }) => {
                approver == Some(decided.approver_id)
            }
            Some(RulePolicy::Hybrid {
                threshold,
                approver,
            }) => {
                approver == Some(decided.approver_id) || Self::threshold_reached(&updated, threshold)
            }
            None => updated.iter().all(ApprovalStep::is_approved),
        };

        Ok(DecisionOutcome {
            step: decided,
            expense_status: resolved.then_some(ApprovalStatus::Approved),
        })
    }

    /// The lowest numbered step before `current` that is not approved.
    #[must_use]
    pub fn first_open_before<'a>(
        current: &ApprovalStep,
        steps: &'a [ApprovalStep],
    ) -> Option<&'a ApprovalStep> {
        steps
            .iter()
            .filter(|s| s.step_number < current.step_number && !s.is_approved())
            .min_by_key(|s| (s.step_number, s.id))
    }

    /// True when `decided` is the last step and everything up to it approved.
    #[must_use]
    pub fn sequence_complete(decided: &ApprovalStep, steps: &[ApprovalStep]) -> bool {
        let has_later_step = steps.iter().any(|s| s.step_number > decided.step_number);
        let prefix_approved = steps
            .iter()
            .filter(|s| s.step_number <= decided.step_number)
            .all(ApprovalStep::is_approved);

        !has_later_step && prefix_approved
    }

    /// True when at least `threshold` percent of all steps are approved.
    ///
    /// Compared as `approved * 100 >= threshold * total` so no rounding is
    /// involved. An empty step set never reaches a threshold.
    #[must_use]
    pub fn threshold_reached(steps: &[ApprovalStep], threshold: u8) -> bool {
        if steps.is_empty() {
            return false;
        }
        let approved = steps.iter().filter(|s| s.is_approved()).count() as u64;
        let total = steps.len() as u64;
        approved * 100 >= u64::from(threshold) * total
    }
}
