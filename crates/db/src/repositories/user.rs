//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use spendflow_core::expense::{Employee, UserRole};
use spendflow_shared::types::{OrganizationId, UserId};

use crate::entities::{sea_orm_active_enums, users};
use crate::repositories::error::RepositoryError;

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Organization the user belongs to.
    pub organization_id: OrganizationId,
    /// Login email, unique across organizations.
    pub email: String,
    /// Pre-computed password hash, if the user can log in.
    pub password_hash: Option<String>,
    /// Display name.
    pub name: String,
    /// Role within the organization.
    pub role: UserRole,
    /// Direct manager.
    pub manager_id: Option<UserId>,
}

/// Input for updating a user.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New manager (`Some(None)` clears it).
    pub manager_id: Option<Option<UserId>>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

pub(crate) fn employee_from_model(model: users::Model) -> Employee {
    Employee {
        id: UserId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        name: model.name,
        role: model.role.into(),
        manager_id: model.manager_id.map(UserId::from_uuid),
    }
}

/// Earliest-created administrator of an organization.
pub(crate) async fn first_admin<C: ConnectionTrait>(
    db: &C,
    organization_id: OrganizationId,
) -> Result<Option<Employee>, RepositoryError> {
    let admin = users::Entity::find()
        .filter(users::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(users::Column::Role.eq(sea_orm_active_enums::UserRole::Admin))
        .order_by_asc(users::Column::CreatedAt)
        .order_by_asc(users::Column::Id)
        .one(db)
        .await?;

    Ok(admin.map(employee_from_model))
}

/// Inserts a user on any connection or transaction.
pub(crate) async fn insert_user<C: ConnectionTrait>(
    db: &C,
    input: CreateUserInput,
) -> Result<Employee, RepositoryError> {
    let user = users::ActiveModel {
        id: Set(UserId::new().into_inner()),
        organization_id: Set(input.organization_id.into_inner()),
        email: Set(input.email.trim().to_lowercase()),
        password_hash: Set(input.password_hash),
        name: Set(input.name),
        role: Set(input.role.into()),
        manager_id: Set(input.manager_id.map(UserId::into_inner)),
        created_at: Set(Utc::now().into()),
    };

    let model = user.insert(db).await?;
    Ok(employee_from_model(model))
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, e.g. on a duplicate email.
    pub async fn create(&self, input: CreateUserInput) -> Result<Employee, RepositoryError> {
        insert_user(&self.db, input).await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Employee>, RepositoryError> {
        let user = users::Entity::find_by_id(id.into_inner()).one(&self.db).await?;
        Ok(user.map(employee_from_model))
    }

    /// Finds a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RepositoryError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(user.map(employee_from_model))
    }

    /// Lists the users of an organization, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Employee>, RepositoryError> {
        let users = users::Entity::find()
            .filter(users::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(employee_from_model).collect())
    }

    /// Lists the users of an organization holding `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_role(
        &self,
        organization_id: OrganizationId,
        role: UserRole,
    ) -> Result<Vec<Employee>, RepositoryError> {
        let users = users::Entity::find()
            .filter(users::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(users::Column::Role.eq(sea_orm_active_enums::UserRole::from(role)))
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(employee_from_model).collect())
    }

    /// Updates a user's name, role, or manager.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist, or a database error.
    pub async fn update(
        &self,
        id: UserId,
        input: UpdateUserInput,
    ) -> Result<Employee, RepositoryError> {
        let user = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("User", id))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(role) = input.role {
            active.role = Set(role.into());
        }
        if let Some(manager_id) = input.manager_id {
            active.manager_id = Set(manager_id.map(UserId::into_inner));
        }

        let updated = active.update(&self.db).await?;
        Ok(employee_from_model(updated))
    }

    /// First administrator of an organization, by creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn first_admin(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Employee>, RepositoryError> {
        first_admin(&self.db, organization_id).await
    }
}
