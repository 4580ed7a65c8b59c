//! Shared fixtures for database integration tests.
//!
//! Every test gets its own in-memory `SQLite` database. The pool is capped at
//! one connection because each `SQLite` memory connection is a separate
//! database.

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use spendflow_core::currency::{CurrencyError, RateProvider};
use spendflow_core::expense::{Employee, UserRole};
use spendflow_db::migration::{Migrator, MigratorTrait};
use spendflow_db::repositories::{
    CreateOrganizationInput, CreateUserInput, OrganizationRepository, UserRepository,
};
use spendflow_shared::types::{CurrencyCode, OrganizationId};

pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open SQLite database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub org: OrganizationId,
    pub admin: Employee,
    pub manager: Employee,
    pub employee: Employee,
    pub approvers: Vec<Employee>,
}

impl Fixture {
    pub fn approver_ids(&self) -> Vec<spendflow_shared::types::UserId> {
        self.approvers.iter().map(|a| a.id).collect()
    }
}

/// An organization in USD with an admin, a manager, one employee reporting
/// to the manager, and three further approvers.
pub async fn fixture() -> Fixture {
    let db = setup().await;

    let (org, admin) = OrganizationRepository::new(db.clone())
        .create_with_admin(CreateOrganizationInput {
            name: "Acme".to_string(),
            country: "United States".to_string(),
            currency: "USD".parse().unwrap(),
            currency_symbol: "$".to_string(),
            admin_email: "ada@acme.test".to_string(),
            admin_password_hash: None,
            admin_name: "Ada".to_string(),
        })
        .await
        .expect("Failed to create organization");
    let org = OrganizationId::from_uuid(org.id);

    let users = UserRepository::new(db.clone());
    let create = |email: &str, name: &str, role, manager_id| CreateUserInput {
        organization_id: org,
        email: email.to_string(),
        password_hash: None,
        name: name.to_string(),
        role,
        manager_id,
    };

    let manager = users
        .create(create("max@acme.test", "Max", UserRole::Manager, None))
        .await
        .unwrap();
    let employee = users
        .create(create("eve@acme.test", "Eve", UserRole::Employee, Some(manager.id)))
        .await
        .unwrap();

    let mut approvers = Vec::new();
    for name in ["Ann", "Bob", "Cid"] {
        let email = format!("{}@acme.test", name.to_lowercase());
        approvers.push(
            users
                .create(create(&email, name, UserRole::Manager, None))
                .await
                .unwrap(),
        );
    }

    Fixture {
        db,
        org,
        admin,
        manager,
        employee,
        approvers,
    }
}

/// Rate provider returning one fixed factor.
pub struct FixedRate(pub Decimal);

#[async_trait]
impl RateProvider for FixedRate {
    async fn rate(&self, _: &CurrencyCode, _: &CurrencyCode) -> Result<Decimal, CurrencyError> {
        Ok(self.0)
    }
}
