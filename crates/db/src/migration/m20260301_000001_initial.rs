//! Initial schema: organizations, users, expenses, approval rules and
//! approval requests.
//!
//! Built with the schema builder only, so it runs unchanged on `PostgreSQL`
//! and `SQLite`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Organizations::Country).string_len(128).not_null())
                    .col(ColumnDef::new(Organizations::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Organizations::CurrencySymbol)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::OrganizationId).uuid().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).null())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::ManagerId).uuid().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_organization")
                            .from(Users::Table, Users::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_manager")
                            .from(Users::Table, Users::ManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_organization_role")
                    .table(Users::Table)
                    .col(Users::OrganizationId)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::Amount).decimal_len(19, 4).not_null())
                    .col(ColumnDef::new(Expenses::SourceCurrency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountInOrgCurrency)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Expenses::Description).text().not_null())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Expenses::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_organization")
                            .from(Expenses::Table, Expenses::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_employee")
                            .from(Expenses::Table, Expenses::EmployeeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_employee")
                    .table(Expenses::Table)
                    .col(Expenses::EmployeeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_organization")
                    .table(Expenses::Table)
                    .col(Expenses::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApprovalRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalRules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApprovalRules::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(ApprovalRules::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ApprovalRules::RequiresDirectManager)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ApprovalRules::ApproverSequence)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(ApprovalRules::RuleType).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ApprovalRules::PercentageThreshold)
                            .integer()
                            .null()
                            .check(
                                Expr::col(ApprovalRules::PercentageThreshold)
                                    .between(0, 100),
                            ),
                    )
                    .col(ColumnDef::new(ApprovalRules::SpecificApproverId).uuid().null())
                    .col(
                        ColumnDef::new(ApprovalRules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_rules_organization")
                            .from(ApprovalRules::Table, ApprovalRules::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApprovalRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApprovalRequests::ExpenseId).uuid().not_null())
                    .col(ColumnDef::new(ApprovalRequests::ApproverId).uuid().not_null())
                    .col(ColumnDef::new(ApprovalRequests::StepNumber).integer().not_null())
                    .col(ColumnDef::new(ApprovalRequests::Status).string_len(16).not_null())
                    .col(ColumnDef::new(ApprovalRequests::Comments).text().null())
                    .col(
                        ColumnDef::new(ApprovalRequests::DecidedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_expense")
                            .from(ApprovalRequests::Table, ApprovalRequests::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_approver")
                            .from(ApprovalRequests::Table, ApprovalRequests::ApproverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_approval_requests_expense")
                    .table(ApprovalRequests::Table)
                    .col(ApprovalRequests::ExpenseId)
                    .col(ApprovalRequests::StepNumber)
                    .to_owned(),
            )
            .await?;

        // Pending-queue lookups by approver
        manager
            .create_index(
                Index::create()
                    .name("idx_approval_requests_approver_status")
                    .table(ApprovalRequests::Table)
                    .col(ApprovalRequests::ApproverId)
                    .col(ApprovalRequests::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApprovalRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApprovalRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Country,
    Currency,
    CurrencySymbol,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    OrganizationId,
    Email,
    PasswordHash,
    Name,
    Role,
    ManagerId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    OrganizationId,
    EmployeeId,
    Amount,
    SourceCurrency,
    AmountInOrgCurrency,
    Category,
    Description,
    Date,
    Status,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum ApprovalRules {
    Table,
    Id,
    OrganizationId,
    Name,
    RequiresDirectManager,
    ApproverSequence,
    RuleType,
    PercentageThreshold,
    SpecificApproverId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ApprovalRequests {
    Table,
    Id,
    ExpenseId,
    ApproverId,
    StepNumber,
    Status,
    Comments,
    DecidedAt,
    CreatedAt,
}
