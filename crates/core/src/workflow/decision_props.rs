//! Property-based tests for the chain builder and decision evaluator.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use spendflow_shared::types::{OrganizationId, UserId};

use crate::expense::{Employee, ExpenseCategory, NewExpense, UserRole};
use crate::workflow::chain::ChainBuilder;
use crate::workflow::decision::DecisionEvaluator;
use crate::workflow::error::WorkflowError;
use crate::workflow::rule::{ApprovalRule, RuleType};
use crate::workflow::types::{ApprovalDecision, ApprovalStatus, ApprovalStep};

/// Strategy for generating rule types.
fn arb_rule_type() -> impl Strategy<Value = RuleType> {
    prop_oneof![
        Just(RuleType::Sequential),
        Just(RuleType::Percentage),
        Just(RuleType::SpecificApprover),
        Just(RuleType::Hybrid),
    ]
}

fn employee(manager_id: Option<UserId>) -> Employee {
    Employee {
        id: UserId::new(),
        organization_id: OrganizationId::new(),
        name: "Prop".to_string(),
        role: UserRole::Employee,
        manager_id,
    }
}

/// Builds a chain of `len` steps governed by a rule of `rule_type`.
fn governed_chain(
    rule_type: RuleType,
    len: usize,
    threshold: u8,
    designated: Option<usize>,
) -> (Vec<ApprovalStep>, ApprovalRule) {
    let employee = employee(None);
    let approvers: Vec<UserId> = (0..len).map(|_| UserId::new()).collect();
    let mut rule = ApprovalRule::new(
        employee.organization_id,
        "prop",
        rule_type,
        approvers.clone(),
    )
    .with_threshold(threshold);
    rule.specific_approver_id = designated.map(|i| approvers[i % len]);

    let expense = NewExpense {
        amount: Decimal::ONE_HUNDRED,
        currency: "USD".parse().unwrap(),
        category: ExpenseCategory::Other,
        description: "prop".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    }
    .into_expense(&employee, Decimal::ONE_HUNDRED);

    let steps = ChainBuilder::build(&expense, Some(&rule), &employee, None);
    (steps, rule)
}

/// Applies decisions in `order` until the expense resolves.
///
/// Approvals refused as out of turn change nothing and are skipped.
/// Returns every status the expense reported along the way.
fn run(
    steps: &mut [ApprovalStep],
    rule: &ApprovalRule,
    order: &[usize],
    reject_at: Option<usize>,
) -> Vec<ApprovalStatus> {
    let mut transitions = Vec::new();
    for (turn, &index) in order.iter().enumerate() {
        let step = &steps[index];
        let decision = if reject_at == Some(turn) {
            ApprovalDecision::reject(step.id, step.approver_id)
        } else {
            ApprovalDecision::approve(step.id, step.approver_id)
        };
        let outcome = match DecisionEvaluator::decide(&decision, steps, Some(rule)) {
            Err(WorkflowError::OutOfTurn { .. }) => continue,
            other => other.unwrap(),
        };
        steps[index] = outcome.step;
        if let Some(status) = outcome.expense_status {
            transitions.push(status);
            break;
        }
    }
    transitions
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Manager step (when present) plus one step per sequence entry,
    /// numbered contiguously from zero.
    #[test]
    fn prop_chain_shape(
        with_manager in any::<bool>(),
        has_manager in any::<bool>(),
        len in 0usize..8
    ) {
        let manager = has_manager.then(UserId::new);
        let employee = employee(manager);
        let approvers: Vec<UserId> = (0..len).map(|_| UserId::new()).collect();
        let mut rule = ApprovalRule::new(
            employee.organization_id,
            "prop",
            RuleType::Sequential,
            approvers.clone(),
        );
        rule.requires_direct_manager = with_manager;
        let expense = NewExpense {
            amount: Decimal::ONE,
            currency: "USD".parse().unwrap(),
            category: ExpenseCategory::Other,
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
        .into_expense(&employee, Decimal::ONE);

        let steps = ChainBuilder::build(&expense, Some(&rule), &employee, None);

        let manager_step = usize::from(with_manager && has_manager);
        prop_assert_eq!(steps.len(), manager_step + len);
        for (i, step) in steps.iter().enumerate() {
            prop_assert_eq!(step.step_number as usize, i);
            prop_assert_eq!(step.status, ApprovalStatus::Pending);
        }
        if manager_step == 1 {
            prop_assert_eq!(Some(steps[0].approver_id), manager);
        }
        let tail: Vec<UserId> = steps[manager_step..].iter().map(|s| s.approver_id).collect();
        prop_assert_eq!(tail, approvers);
    }

    /// A rejection anywhere yields REJECTED, and the expense resolves at most once.
    #[test]
    fn prop_rejection_is_a_veto(
        rule_type in arb_rule_type(),
        len in 1usize..6,
        threshold in 0u8..=100,
        designated in proptest::option::of(0usize..6),
        seed in any::<u64>(),
    ) {
        let (mut steps, rule) = governed_chain(rule_type, len, threshold, designated);
        let order = shuffled(len, seed);
        let reject_at = usize::try_from(seed % len as u64).unwrap();

        let transitions = run(&mut steps, &rule, &order, Some(reject_at));

        prop_assert!(transitions.len() <= 1);
        // Either something resolved it first, or the rejection did.
        if transitions.first() != Some(&ApprovalStatus::Approved) {
            prop_assert_eq!(transitions, vec![ApprovalStatus::Rejected]);
        }
    }

    /// Approvals never reject, and only a terminal status is ever reported.
    #[test]
    fn prop_approvals_only_approve(
        rule_type in arb_rule_type(),
        len in 1usize..6,
        threshold in 0u8..=100,
        designated in proptest::option::of(0usize..6),
        seed in any::<u64>(),
    ) {
        let (mut steps, rule) = governed_chain(rule_type, len, threshold, designated);
        let order = shuffled(len, seed);

        let transitions = run(&mut steps, &rule, &order, None);

        prop_assert!(transitions.iter().all(|s| *s == ApprovalStatus::Approved));
    }

    /// Sequential approvals are accepted only in step order, and retrying
    /// refused approvals in any order always resolves the expense on the
    /// last step.
    #[test]
    fn prop_sequential_in_order_only(len in 1usize..6, seed in any::<u64>()) {
        let (mut steps, rule) = governed_chain(RuleType::Sequential, len, 100, None);
        let order = shuffled(len, seed);
        let mut resolved = None;

        for _round in 0..len {
            for &index in &order {
                if steps[index].status != ApprovalStatus::Pending {
                    continue;
                }
                let step = &steps[index];
                let decision = ApprovalDecision::approve(step.id, step.approver_id);
                let lower_all_approved = steps[..index].iter().all(ApprovalStep::is_approved);

                match DecisionEvaluator::decide(&decision, &steps, Some(&rule)) {
                    Ok(outcome) => {
                        prop_assert!(lower_all_approved);
                        let expected = (index == len - 1).then_some(ApprovalStatus::Approved);
                        prop_assert_eq!(outcome.expense_status, expected);
                        steps[index] = outcome.step;
                        if outcome.expense_status.is_some() {
                            resolved = outcome.expense_status;
                        }
                    }
                    Err(WorkflowError::OutOfTurn { waiting_on, .. }) => {
                        prop_assert!(!lower_all_approved);
                        let first_open = steps.iter().find(|s| !s.is_approved()).map(|s| s.id);
                        prop_assert_eq!(Some(waiting_on), first_open);
                    }
                    Err(other) => prop_assert!(false, "unexpected {other:?}"),
                }
            }
        }

        prop_assert_eq!(resolved, Some(ApprovalStatus::Approved));
        prop_assert!(steps.iter().all(ApprovalStep::is_approved));
    }

    /// Percentage rules resolve on the first approval that reaches the
    /// threshold, independent of order.
    #[test]
    fn prop_percentage_order_independent(
        len in 1usize..8,
        threshold in 1u8..=100,
        seed in any::<u64>(),
    ) {
        let (mut steps, rule) = governed_chain(RuleType::Percentage, len, threshold, None);
        let order = shuffled(len, seed);
        // Smallest approval count whose share meets the threshold.
        let needed = (usize::from(threshold) * len).div_ceil(100);

        for (turn, &index) in order.iter().enumerate() {
            let step = &steps[index];
            let decision = ApprovalDecision::approve(step.id, step.approver_id);
            let outcome = DecisionEvaluator::decide(&decision, &steps, Some(&rule)).unwrap();
            steps[index] = outcome.step;

            if turn + 1 == needed {
                prop_assert_eq!(outcome.expense_status, Some(ApprovalStatus::Approved));
                break;
            }
            prop_assert_eq!(outcome.expense_status, None);
        }
    }
}

/// Deterministic permutation of `0..len` from a seed.
fn shuffled(len: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    let mut state = seed | 1;
    for i in (1..len).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = usize::try_from(state % (i as u64 + 1)).unwrap();
        order.swap(i, j);
    }
    order
}
