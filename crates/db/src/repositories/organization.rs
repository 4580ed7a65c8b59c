//! Organization repository for database operations.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use spendflow_core::expense::{Employee, UserRole};
use spendflow_shared::types::{CurrencyCode, OrganizationId};
use tracing::info;

use crate::entities::organizations;
use crate::repositories::error::RepositoryError;
use crate::repositories::user::{CreateUserInput, insert_user};

/// Input for creating an organization together with its administrator.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Organization name.
    pub name: String,
    /// Country the organization operates in.
    pub country: String,
    /// Base currency every expense is converted into.
    pub currency: CurrencyCode,
    /// Display symbol of the base currency.
    pub currency_symbol: String,
    /// Administrator email.
    pub admin_email: String,
    /// Administrator password hash.
    pub admin_password_hash: Option<String>,
    /// Administrator display name.
    pub admin_name: String,
}

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<organizations::Model>, RepositoryError> {
        Ok(organizations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?)
    }

    /// Creates a new organization with its first administrator.
    ///
    /// Both rows are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; nothing is written then.
    pub async fn create_with_admin(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<(organizations::Model, Employee), RepositoryError> {
        let txn = self.db.begin().await?;

        let org_id = OrganizationId::new();
        let org = organizations::ActiveModel {
            id: Set(org_id.into_inner()),
            name: Set(input.name),
            country: Set(input.country),
            currency: Set(input.currency.to_string()),
            currency_symbol: Set(input.currency_symbol),
            created_at: Set(Utc::now().into()),
        };
        let org = org.insert(&txn).await?;

        let admin = insert_user(
            &txn,
            CreateUserInput {
                organization_id: org_id,
                email: input.admin_email,
                password_hash: input.admin_password_hash,
                name: input.admin_name,
                role: UserRole::Admin,
                manager_id: None,
            },
        )
        .await?;

        txn.commit().await?;

        info!(organization_id = %org_id, admin_id = %admin.id, "Organization created");
        Ok((org, admin))
    }
}
