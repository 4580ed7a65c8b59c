//! Approval rule repository.
//!
//! Rules are validated before they are stored. The approver sequence is
//! stored as JSON text and read back verbatim, so a malformed value survives
//! the round trip and is dealt with at chain-building time.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use spendflow_core::workflow::{ApprovalRule, ApproverSequence};
use spendflow_shared::types::{ApprovalRuleId, OrganizationId, UserId};
use tracing::info;

use crate::entities::approval_rules;
use crate::repositories::error::RepositoryError;

fn rule_from_model(model: approval_rules::Model) -> Result<ApprovalRule, RepositoryError> {
    let percentage_threshold = model
        .percentage_threshold
        .map(u8::try_from)
        .transpose()
        .map_err(|e| RepositoryError::corrupt("ApprovalRule", e))?;

    Ok(ApprovalRule {
        id: ApprovalRuleId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        name: model.name,
        requires_direct_manager: model.requires_direct_manager,
        approver_sequence: ApproverSequence::parse(&model.approver_sequence),
        rule_type: model.rule_type.into(),
        percentage_threshold,
        specific_approver_id: model.specific_approver_id.map(UserId::from_uuid),
    })
}

/// Repository for approval rule operations.
#[derive(Debug, Clone)]
pub struct ApprovalRuleRepository {
    db: DatabaseConnection,
}

impl ApprovalRuleRepository {
    /// Creates a new approval rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and stores a rule.
    ///
    /// # Errors
    ///
    /// Returns `Workflow(InvalidRule | MalformedRule)` if validation fails,
    /// or a database error.
    pub async fn create(&self, rule: &ApprovalRule) -> Result<ApprovalRule, RepositoryError> {
        rule.validate()?;

        let model = approval_rules::ActiveModel {
            id: Set(rule.id.into_inner()),
            organization_id: Set(rule.organization_id.into_inner()),
            name: Set(rule.name.trim().to_string()),
            requires_direct_manager: Set(rule.requires_direct_manager),
            approver_sequence: Set(rule.approver_sequence.to_json()),
            rule_type: Set(rule.rule_type.into()),
            percentage_threshold: Set(rule.percentage_threshold.map(i32::from)),
            specific_approver_id: Set(rule.specific_approver_id.map(UserId::into_inner)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(rule_id = %rule.id, rule_type = rule.rule_type.as_str(), "Approval rule created");
        rule_from_model(model)
    }

    /// Lists an organization's rules, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be mapped.
    pub async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<ApprovalRule>, RepositoryError> {
        approval_rules::Entity::find()
            .filter(approval_rules::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_asc(approval_rules::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(rule_from_model)
            .collect()
    }

    /// Finds a rule by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such rule, or a database error.
    pub async fn find_by_id(&self, id: ApprovalRuleId) -> Result<ApprovalRule, RepositoryError> {
        let model = approval_rules::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("ApprovalRule", id))?;
        rule_from_model(model)
    }
}
