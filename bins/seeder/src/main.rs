//! Demo data seeder for Spendflow.
//!
//! Creates one organization with an admin, a manager, two employees and a
//! sequential approval rule, then pushes a sample expense through the whole
//! workflow. Running it twice is harmless: it stops if the admin exists.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;
use spendflow_core::expense::{Employee, ExpenseCategory, NewExpense, UserRole};
use spendflow_core::workflow::{
    ApprovalDecision, ApprovalRule, ApproverSequence, RuleType, WorkflowCoordinator,
};
use spendflow_db::migration::Migrator;
use spendflow_db::repositories::{CreateOrganizationInput, CreateUserInput};
use spendflow_db::{
    ApprovalRuleRepository, OrganizationRepository, SeaOrmWorkflowStore, UserRepository,
};
use spendflow_rates::ExchangeRateClient;
use spendflow_shared::AppConfig;
use spendflow_shared::types::{ApprovalRuleId, OrganizationId, UserId};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ADMIN_EMAIL: &str = "admin@spendflow.dev";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=debug,spendflow_core=debug,spendflow_db=debug,spendflow_rates=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = spendflow_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None).await.context("migrations failed")?;
    info!("Database ready");

    let users = UserRepository::new(db.clone());
    if users.find_by_email(ADMIN_EMAIL).await?.is_some() {
        warn!(email = ADMIN_EMAIL, "Demo organization already seeded, skipping");
        return Ok(());
    }

    let (org, admin) = OrganizationRepository::new(db.clone())
        .create_with_admin(CreateOrganizationInput {
            name: "Spendflow Demo".to_string(),
            country: "United States".to_string(),
            currency: config.workflow.default_currency.parse().map_err(anyhow::Error::msg)?,
            currency_symbol: "$".to_string(),
            admin_email: ADMIN_EMAIL.to_string(),
            admin_password_hash: None,
            admin_name: "Ada Admin".to_string(),
        })
        .await?;
    let organization_id = OrganizationId::from_uuid(org.id);

    let team = seed_team(&users, organization_id).await?;
    let rule = seed_rule(&ApprovalRuleRepository::new(db.clone()), organization_id, &team, &admin)
        .await?;

    let rates = ExchangeRateClient::new(&config.exchange_rates)?;
    let coordinator = WorkflowCoordinator::new(SeaOrmWorkflowStore::new(db), rates);
    run_sample_expense(&coordinator, &rule, &team).await?;

    info!(organization_id = %organization_id, "Seeding complete");
    Ok(())
}

struct Team {
    manager: Employee,
    finance: Employee,
    employee: Employee,
}

async fn seed_team(users: &UserRepository, organization_id: OrganizationId) -> anyhow::Result<Team> {
    let manager = users
        .create(CreateUserInput {
            organization_id,
            email: "manager@spendflow.dev".to_string(),
            password_hash: None,
            name: "Max Manager".to_string(),
            role: UserRole::Manager,
            manager_id: None,
        })
        .await?;

    let finance = users
        .create(CreateUserInput {
            organization_id,
            email: "finance@spendflow.dev".to_string(),
            password_hash: None,
            name: "Fin Approver".to_string(),
            role: UserRole::Manager,
            manager_id: None,
        })
        .await?;

    let employee = users
        .create(CreateUserInput {
            organization_id,
            email: "employee@spendflow.dev".to_string(),
            password_hash: None,
            name: "Eve Employee".to_string(),
            role: UserRole::Employee,
            manager_id: Some(manager.id),
        })
        .await?;

    info!(count = 3, "Seeded team");
    Ok(Team {
        manager,
        finance,
        employee,
    })
}

async fn seed_rule(
    rules: &ApprovalRuleRepository,
    organization_id: OrganizationId,
    team: &Team,
    admin: &Employee,
) -> anyhow::Result<ApprovalRule> {
    let approvers: Vec<UserId> = vec![team.finance.id, admin.id];
    let rule = rules
        .create(&ApprovalRule {
            id: ApprovalRuleId::new(),
            organization_id,
            name: "Manager, finance, then admin".to_string(),
            requires_direct_manager: true,
            approver_sequence: ApproverSequence::from(approvers),
            rule_type: RuleType::Sequential,
            percentage_threshold: None,
            specific_approver_id: None,
        })
        .await?;

    info!(rule_id = %rule.id, "Seeded approval rule");
    Ok(rule)
}

/// Submits one expense and approves it step by step.
async fn run_sample_expense(
    coordinator: &WorkflowCoordinator<SeaOrmWorkflowStore, ExchangeRateClient>,
    rule: &ApprovalRule,
    team: &Team,
) -> anyhow::Result<()> {
    let (expense, steps) = coordinator
        .submit(
            NewExpense {
                amount: dec!(120.00),
                currency: "EUR".parse().map_err(anyhow::Error::msg)?,
                category: ExpenseCategory::Travel,
                description: "Train to the client workshop".to_string(),
                date: Utc::now().date_naive(),
            },
            Some(rule),
            &team.employee,
        )
        .await?;
    info!(
        expense_id = %expense.id,
        converted = %expense.amount_in_org_currency,
        first_approver = %team.manager.name,
        "Submitted sample expense"
    );

    for step in &steps {
        let record = coordinator
            .record_decision(ApprovalDecision::approve(step.id, step.approver_id), Some(rule))
            .await?;
        info!(
            step = step.step_number,
            expense_status = %record.expense_status,
            "Recorded approval"
        );
        if record.expense_status.is_terminal() {
            break;
        }
    }

    Ok(())
}
