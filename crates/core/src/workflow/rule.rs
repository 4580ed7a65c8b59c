//! Approval rules.
//!
//! A rule says who has to look at an expense (the approver sequence, plus
//! optionally the employee's manager) and how their decisions combine into a
//! verdict (the rule type).

use serde::{Deserialize, Serialize};
use spendflow_shared::types::{ApprovalRuleId, OrganizationId, UserId};

use crate::workflow::error::WorkflowError;

/// How individual approvals combine into an expense verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Every step up to the last must approve, in order.
    Sequential,
    /// A share of all steps must approve.
    Percentage,
    /// One designated approver's approval is enough.
    SpecificApprover,
    /// Either the designated approver or the percentage.
    Hybrid,
}

impl RuleType {
    /// Parse a rule type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sequential" => Some(Self::Sequential),
            "percentage" => Some(Self::Percentage),
            "specific_approver" => Some(Self::SpecificApprover),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Returns the string representation of the rule type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Percentage => "percentage",
            Self::SpecificApprover => "specific_approver",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Ordered approver list of a rule, as persisted.
///
/// Sequences are stored as JSON arrays of ids. A stored value that does not
/// parse is kept as [`ApproverSequence::Malformed`] so loading a rule never
/// fails on it; chain building treats it as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverSequence {
    /// A well-formed list of approvers.
    Approvers(Vec<UserId>),
    /// The raw stored text, which could not be parsed.
    Malformed(String),
}

impl ApproverSequence {
    /// Parses a stored JSON array.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Vec<UserId>>(raw) {
            Ok(approvers) => Self::Approvers(approvers),
            Err(_) => Self::Malformed(raw.to_string()),
        }
    }

    /// The approvers, or an error describing the unparseable value.
    pub fn approvers(&self) -> Result<&[UserId], WorkflowError> {
        match self {
            Self::Approvers(approvers) => Ok(approvers),
            Self::Malformed(raw) => Err(WorkflowError::MalformedRule(raw.clone())),
        }
    }

    /// Serializes the sequence back to its stored form.
    #[must_use]
    pub fn to_json(&self) -> String {
        match self {
            Self::Approvers(approvers) => {
                serde_json::to_string(approvers).unwrap_or_else(|_| "[]".to_string())
            }
            Self::Malformed(raw) => raw.clone(),
        }
    }
}

impl From<Vec<UserId>> for ApproverSequence {
    fn from(approvers: Vec<UserId>) -> Self {
        Self::Approvers(approvers)
    }
}

/// An approval rule configured by an organization administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRule {
    /// Unique identifier for the rule.
    pub id: ApprovalRuleId,
    /// Organization the rule belongs to.
    pub organization_id: OrganizationId,
    /// Human-readable name for the rule.
    pub name: String,
    /// Whether the employee's direct manager approves first.
    pub requires_direct_manager: bool,
    /// Approvers after the manager, in order. Duplicates each get a step.
    pub approver_sequence: ApproverSequence,
    /// How decisions combine.
    pub rule_type: RuleType,
    /// Required approval percentage in `0..=100`. Absent means 100.
    pub percentage_threshold: Option<u8>,
    /// Approver whose approval resolves the expense on its own.
    pub specific_approver_id: Option<UserId>,
}

/// Threshold used when a percentage rule has none.
pub const DEFAULT_PERCENTAGE_THRESHOLD: u8 = 100;

/// The evaluation policy of a rule, with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePolicy {
    /// In-order approval of every step.
    Sequential,
    /// `threshold` percent of all steps approved.
    Percentage {
        /// Required percentage.
        threshold: u8,
    },
    /// Approval by `approver`. `None` never resolves.
    SpecificApprover {
        /// The designated approver.
        approver: Option<UserId>,
    },
    /// Either condition.
    Hybrid {
        /// Required percentage.
        threshold: u8,
        /// The designated approver.
        approver: Option<UserId>,
    },
}

impl ApprovalRule {
    /// Creates a rule with no manager step, threshold, or designated approver.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: impl Into<String>,
        rule_type: RuleType,
        approvers: Vec<UserId>,
    ) -> Self {
        Self {
            id: ApprovalRuleId::new(),
            organization_id,
            name: name.into(),
            requires_direct_manager: false,
            approver_sequence: ApproverSequence::Approvers(approvers),
            rule_type,
            percentage_threshold: None,
            specific_approver_id: None,
        }
    }

    /// Requires the employee's manager as the first step.
    #[must_use]
    pub fn with_manager(mut self) -> Self {
        self.requires_direct_manager = true;
        self
    }

    /// Sets the percentage threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.percentage_threshold = Some(threshold);
        self
    }

    /// Sets the designated approver.
    #[must_use]
    pub fn with_specific_approver(mut self, approver: UserId) -> Self {
        self.specific_approver_id = Some(approver);
        self
    }

    /// Returns the evaluation policy, applying the default threshold.
    #[must_use]
    pub fn policy(&self) -> RulePolicy {
        let threshold = self
            .percentage_threshold
            .unwrap_or(DEFAULT_PERCENTAGE_THRESHOLD);
        match self.rule_type {
            RuleType::Sequential => RulePolicy::Sequential,
            RuleType::Percentage => RulePolicy::Percentage { threshold },
            RuleType::SpecificApprover => RulePolicy::SpecificApprover {
                approver: self.specific_approver_id,
            },
            RuleType::Hybrid => RulePolicy::Hybrid {
                threshold,
                approver: self.specific_approver_id,
            },
        }
    }

    /// Validates the rule before it is stored.
    ///
    /// # Errors
    /// * `WorkflowError::InvalidRule` if the name is blank, the threshold is
    ///   above 100, or a specific-approver rule names nobody
    /// * `WorkflowError::MalformedRule` if the approver sequence does not parse
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::InvalidRule("name is required".to_string()));
        }

        if let Some(threshold) = self.percentage_threshold
            && threshold > 100
        {
            return Err(WorkflowError::InvalidRule(format!(
                "percentage threshold {threshold} is outside 0..=100"
            )));
        }

        if matches!(
            self.rule_type,
            RuleType::SpecificApprover | RuleType::Hybrid
        ) && self.specific_approver_id.is_none()
        {
            return Err(WorkflowError::InvalidRule(format!(
                "{} rules need a specific approver",
                self.rule_type.as_str()
            )));
        }

        self.approver_sequence.approvers()?;
        Ok(())
    }
}
