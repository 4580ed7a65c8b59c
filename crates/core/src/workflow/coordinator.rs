//! Workflow coordinator.
//!
//! Ties chain building and decision evaluation to storage. Every operation
//! on one expense runs under that expense's lock and inside one storage
//! scope, so decisions on the same expense are applied one at a time to the
//! latest persisted steps, and each decision either lands completely or not
//! at all.

use spendflow_shared::types::ExpenseId;
use tracing::{debug, info};

use crate::currency::{CurrencyService, RateProvider};
use crate::expense::{Employee, Expense, NewExpense};
use crate::workflow::chain::ChainBuilder;
use crate::workflow::decision::DecisionEvaluator;
use crate::workflow::error::WorkflowError;
use crate::workflow::lock::{ExpenseLockGuard, ExpenseLocks};
use crate::workflow::rule::ApprovalRule;
use crate::workflow::store::{ExpenseScope, WorkflowStore};
use crate::workflow::types::{ApprovalDecision, ApprovalStep, DecisionRecord};

/// Entry point for submitting expenses and recording decisions.
pub struct WorkflowCoordinator<S, R> {
    store: S,
    rates: R,
    locks: ExpenseLocks,
}

impl<S, R> WorkflowCoordinator<S, R>
where
    S: WorkflowStore,
    R: RateProvider,
{
    /// Creates a coordinator over a store and a rate provider.
    pub fn new(store: S, rates: R) -> Self {
        Self {
            store,
            rates,
            locks: ExpenseLocks::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn lock(&self, expense_id: ExpenseId) -> ExpenseLockGuard {
        let guard = self.locks.acquire(expense_id).await;
        debug!(%expense_id, "Acquired expense lock");
        guard
    }

    /// Submit an expense and materialize its approval chain.
    ///
    /// The amount is converted into the organization currency (1:1 when no
    /// rate is available). Without a rule, the organization's first
    /// administrator becomes the single approver.
    ///
    /// # Errors
    /// * `WorkflowError::OrganizationNotFound` if the employee's organization is unknown
    /// * `WorkflowError::NoResolvableApprover` if the chain would be empty
    /// * `WorkflowError::Storage` if persisting fails; nothing is stored
    pub async fn submit(
        &self,
        submission: NewExpense,
        rule: Option<&ApprovalRule>,
        employee: &Employee,
    ) -> Result<(Expense, Vec<ApprovalStep>), WorkflowError> {
        let organization_id = employee.organization_id;
        let org_currency = self.store.organization_currency(organization_id).await?;

        let conversion = CurrencyService::convert_or_identity(
            &self.rates,
            submission.amount,
            &submission.currency,
            &org_currency,
        )
        .await;
        let expense = submission.into_expense(employee, conversion.amount);

        let fallback_admin = match rule {
            Some(_) => None,
            None => self.store.first_admin(organization_id).await?,
        };

        let steps = ChainBuilder::build(&expense, rule, employee, fallback_admin);
        if steps.is_empty() {
            return Err(WorkflowError::NoResolvableApprover(organization_id));
        }

        let _guard = self.lock(expense.id).await;
        self.store.insert_submission(&expense, &steps).await?;

        info!(
            expense_id = %expense.id,
            employee_id = %employee.id,
            rule_id = ?rule.map(|r| r.id),
            steps = steps.len(),
            fallback_rate = conversion.fallback,
            "Expense submitted"
        );

        Ok((expense, steps))
    }

    /// Record one approver's decision and re-evaluate the expense.
    ///
    /// `rule` must be the rule that governed chain building, or `None` if
    /// the chain came from the administrator fallback.
    ///
    /// # Errors
    /// * `WorkflowError::RequestNotFound` if the step does not exist
    /// * `WorkflowError::ExpenseNotFound` if its expense does not exist
    /// * `WorkflowError::ExpenseAlreadyResolved` if the expense is terminal
    /// * `WorkflowError::StepNotInExpense` if the step is not part of the expense
    /// * `WorkflowError::NotDesignatedApprover` if the user is not the step's approver
    /// * `WorkflowError::StepAlreadyDecided` if the step is not pending
    /// * `WorkflowError::Storage` if the commit fails; nothing is written
    pub async fn record_decision(
        &self,
        decision: ApprovalDecision,
        rule: Option<&ApprovalRule>,
    ) -> Result<DecisionRecord, WorkflowError> {
        let request = self
            .store
            .find_request(decision.request_id)
            .await?
            .ok_or(WorkflowError::RequestNotFound(decision.request_id))?;
        let expense_id = request.expense_id;

        let _guard = self.lock(expense_id).await;
        let scope = self.store.open_expense_scope(expense_id).await?;

        let current_status = scope.expense().status;
        if current_status.is_terminal() {
            return Err(WorkflowError::ExpenseAlreadyResolved {
                expense_id,
                status: current_status,
            });
        }

        if !scope.steps().iter().any(|s| s.id == decision.request_id) {
            return Err(WorkflowError::StepNotInExpense {
                request_id: decision.request_id,
                expense_id,
            });
        }

        let outcome = DecisionEvaluator::decide(&decision, scope.steps(), rule)?;
        scope.commit(&outcome.step, outcome.expense_status).await?;

        let record = DecisionRecord {
            expense_status: outcome.expense_status.unwrap_or(current_status),
            changed: outcome.expense_status.is_some(),
            step: outcome.step,
        };

        if record.changed {
            info!(
                %expense_id,
                request_id = %record.step.id,
                status = %record.expense_status,
                "Expense resolved"
            );
        } else {
            debug!(
                %expense_id,
                request_id = %record.step.id,
                step_status = %record.step.status,
                "Decision recorded, expense still pending"
            );
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyError;
    use crate::expense::{ExpenseCategory, UserRole};
    use crate::workflow::memory::InMemoryWorkflowStore;
    use crate::workflow::rule::RuleType;
    use crate::workflow::types::ApprovalStatus;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use spendflow_shared::types::{ApprovalRequestId, CurrencyCode, OrganizationId, UserId};

    struct FixedRate(Decimal);

    #[async_trait]
    impl RateProvider for FixedRate {
        async fn rate(&self, _: &CurrencyCode, _: &CurrencyCode) -> Result<Decimal, CurrencyError> {
            Ok(self.0)
        }
    }

    struct Org {
        id: OrganizationId,
        admin: Employee,
        manager: Employee,
        employee: Employee,
        approvers: Vec<Employee>,
    }

    fn user(org: OrganizationId, name: &str, role: UserRole, manager: Option<UserId>) -> Employee {
        Employee {
            id: UserId::new(),
            organization_id: org,
            name: name.to_string(),
            role,
            manager_id: manager,
        }
    }

    async fn setup(
        with_admin: bool,
    ) -> (WorkflowCoordinator<InMemoryWorkflowStore, FixedRate>, Org) {
        let store = InMemoryWorkflowStore::new();
        let id = OrganizationId::new();
        store.add_organization(id, "USD".parse().unwrap()).await;

        let admin = user(id, "Ada", UserRole::Admin, None);
        let manager = user(id, "Max", UserRole::Manager, None);
        let employee = user(id, "Eve", UserRole::Employee, Some(manager.id));
        let approvers: Vec<Employee> = ["Ann", "Bob", "Cid"]
            .iter()
            .map(|name| user(id, name, UserRole::Manager, None))
            .collect();

        if with_admin {
            store.add_user(admin.clone()).await;
        }
        for u in [&manager, &employee].into_iter().chain(&approvers) {
            store.add_user(u.clone()).await;
        }

        let org = Org {
            id,
            admin,
            manager,
            employee,
            approvers,
        };
        (WorkflowCoordinator::new(store, FixedRate(dec!(1.1))), org)
    }

    fn new_expense(currency: &str) -> NewExpense {
        NewExpense {
            amount: dec!(250.00),
            currency: currency.parse().unwrap(),
            category: ExpenseCategory::Travel,
            description: "Client visit".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        }
    }

    fn ids(users: &[Employee]) -> Vec<UserId> {
        users.iter().map(|u| u.id).collect()
    }

    async fn decide(
        coordinator: &WorkflowCoordinator<InMemoryWorkflowStore, FixedRate>,
        step: &ApprovalStep,
        approve: bool,
        rule: Option<&ApprovalRule>,
    ) -> Result<DecisionRecord, WorkflowError> {
        let decision = if approve {
            ApprovalDecision::approve(step.id, step.approver_id)
        } else {
            ApprovalDecision::reject(step.id, step.approver_id)
        };
        coordinator.record_decision(decision, rule).await
    }

    #[tokio::test]
    async fn test_submit_persists_expense_and_chain() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Travel", RuleType::Sequential, ids(&org.approvers))
            .with_manager();

        let (expense, steps) = coordinator
            .submit(new_expense("EUR"), Some(&rule), &org.employee)
            .await
            .unwrap();

        assert_eq!(expense.status, ApprovalStatus::Pending);
        assert_eq!(expense.amount, dec!(250.00));
        assert_eq!(expense.amount_in_org_currency, dec!(275.00));
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].approver_id, org.manager.id);

        let store = coordinator.store();
        assert_eq!(store.expense(expense.id).await, Some(expense.clone()));
        assert_eq!(store.steps_for(expense.id).await, steps);
    }

    #[tokio::test]
    async fn test_submit_same_currency_keeps_amount() {
        let (coordinator, org) = setup(true).await;
        let (expense, _) = coordinator
            .submit(new_expense("USD"), None, &org.employee)
            .await
            .unwrap();
        assert_eq!(expense.amount_in_org_currency, dec!(250.00));
    }

    #[tokio::test]
    async fn test_submit_without_rule_goes_to_admin() {
        let (coordinator, org) = setup(true).await;
        let (_, steps) = coordinator
            .submit(new_expense("USD"), None, &org.employee)
            .await
            .unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].approver_id, org.admin.id);
        assert_eq!(steps[0].step_number, 0);
    }

    #[tokio::test]
    async fn test_submit_without_rule_or_admin_is_refused() {
        let (coordinator, org) = setup(false).await;
        let result = coordinator.submit(new_expense("USD"), None, &org.employee).await;
        assert!(matches!(
            result,
            Err(WorkflowError::NoResolvableApprover(id)) if id == org.id
        ));
    }

    #[tokio::test]
    async fn test_submit_with_empty_chain_is_refused() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Empty", RuleType::Sequential, vec![]);
        let result = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await;
        assert!(matches!(result, Err(WorkflowError::NoResolvableApprover(_))));
    }

    #[tokio::test]
    async fn test_submit_unknown_organization() {
        let (coordinator, _org) = setup(true).await;
        let stranger = user(OrganizationId::new(), "Zed", UserRole::Employee, None);
        let result = coordinator.submit(new_expense("USD"), None, &stranger).await;
        assert!(matches!(result, Err(WorkflowError::OrganizationNotFound(_))));
    }

    #[tokio::test]
    async fn test_sequential_flow_to_approval() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Chain", RuleType::Sequential, ids(&org.approvers));
        let (expense, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        for step in &steps[..2] {
            let record = decide(&coordinator, step, true, Some(&rule)).await.unwrap();
            assert_eq!(record.expense_status, ApprovalStatus::Pending);
            assert!(!record.changed);
        }
        let record = decide(&coordinator, &steps[2], true, Some(&rule)).await.unwrap();
        assert_eq!(record.expense_status, ApprovalStatus::Approved);
        assert!(record.changed);

        let stored = coordinator.store().expense(expense.id).await.unwrap();
        assert_eq!(stored.status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_sequential_out_of_turn_approval_is_refused() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Chain", RuleType::Sequential, ids(&org.approvers));
        let (expense, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        let result = decide(&coordinator, &steps[2], true, Some(&rule)).await;
        assert!(matches!(
            result,
            Err(WorkflowError::OutOfTurn { waiting_on, .. }) if waiting_on == steps[0].id
        ));
        let stored = coordinator.store().steps_for(expense.id).await;
        assert!(stored.iter().all(|s| s.status == ApprovalStatus::Pending));

        // Taking turns in order still reaches approval.
        for step in &steps[..2] {
            decide(&coordinator, step, true, Some(&rule)).await.unwrap();
        }
        let record = decide(&coordinator, &steps[2], true, Some(&rule)).await.unwrap();
        assert_eq!(record.expense_status, ApprovalStatus::Approved);
        assert_eq!(
            coordinator.store().expense(expense.id).await.unwrap().status,
            ApprovalStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_rejection_resolves_and_blocks_later_decisions() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Chain", RuleType::Percentage, ids(&org.approvers))
            .with_threshold(50);
        let (expense, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        let record = decide(&coordinator, &steps[1], false, Some(&rule)).await.unwrap();
        assert_eq!(record.expense_status, ApprovalStatus::Rejected);

        let result = decide(&coordinator, &steps[0], true, Some(&rule)).await;
        assert!(matches!(
            result,
            Err(WorkflowError::ExpenseAlreadyResolved { status: ApprovalStatus::Rejected, .. })
        ));

        // The refused decision left its step untouched.
        let stored = coordinator.store().steps_for(expense.id).await;
        assert_eq!(stored[0].status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_specific_approver_short_circuits() {
        let (coordinator, org) = setup(true).await;
        let cfo = org.approvers[2].id;
        let rule = ApprovalRule::new(
            org.id,
            "CFO",
            RuleType::SpecificApprover,
            ids(&org.approvers),
        )
        .with_specific_approver(cfo);
        let (_, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        let record = decide(&coordinator, &steps[2], true, Some(&rule)).await.unwrap();
        assert_eq!(record.expense_status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_wrong_approver_is_refused() {
        let (coordinator, org) = setup(true).await;
        let (_, steps) = coordinator
            .submit(new_expense("USD"), None, &org.employee)
            .await
            .unwrap();

        let decision = ApprovalDecision::approve(steps[0].id, org.employee.id);
        let result = coordinator.record_decision(decision, None).await;
        assert!(matches!(
            result,
            Err(WorkflowError::NotDesignatedApprover { user_id, .. }) if user_id == org.employee.id
        ));
    }

    #[tokio::test]
    async fn test_deciding_twice_is_refused() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "All", RuleType::Sequential, ids(&org.approvers));
        let (_, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        decide(&coordinator, &steps[0], true, Some(&rule)).await.unwrap();
        let result = decide(&coordinator, &steps[0], false, Some(&rule)).await;
        assert!(matches!(
            result,
            Err(WorkflowError::StepAlreadyDecided { status: ApprovalStatus::Approved, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_request() {
        let (coordinator, org) = setup(true).await;
        let decision = ApprovalDecision::approve(ApprovalRequestId::new(), org.admin.id);
        let result = coordinator.record_decision(decision, None).await;
        assert!(matches!(result, Err(WorkflowError::RequestNotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_resolve_once() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Quorum", RuleType::Percentage, ids(&org.approvers))
            .with_threshold(60);
        let (expense, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        let results = futures::future::join_all(
            steps.iter().map(|step| decide(&coordinator, step, true, Some(&rule))),
        )
        .await;

        // Two of three reach 60%; the third finds the expense resolved.
        let changed = results
            .iter()
            .filter(|r| matches!(r, Ok(record) if record.changed))
            .count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(WorkflowError::ExpenseAlreadyResolved { .. })))
            .count();
        assert_eq!(changed, 1);
        assert_eq!(refused, 1);

        let stored = coordinator.store().steps_for(expense.id).await;
        let approved = stored.iter().filter(|s| s.is_approved()).count();
        assert_eq!(approved, 2);
        assert_eq!(
            coordinator.store().expense(expense.id).await.unwrap().status,
            ApprovalStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_concurrent_rejections_resolve_once() {
        let (coordinator, org) = setup(true).await;
        let rule = ApprovalRule::new(org.id, "Chain", RuleType::Sequential, ids(&org.approvers));
        let (_, steps) = coordinator
            .submit(new_expense("USD"), Some(&rule), &org.employee)
            .await
            .unwrap();

        let results = futures::future::join_all(
            steps.iter().map(|step| decide(&coordinator, step, false, Some(&rule))),
        )
        .await;

        let ok: Vec<&DecisionRecord> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].expense_status, ApprovalStatus::Rejected);
    }
}
