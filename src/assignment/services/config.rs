//! Engine configuration.

use crate::assignment::domain::{AssignmentDomainError, AssignmentType, RoleName, SlaPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Default role allowed to cancel any assignment.
pub const DEFAULT_ADMIN_ROLE: &str = "Admin";

/// Default limit on the parent chain of a new assignment.
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 16;

/// How notifications are delivered after a committed transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationDispatch {
    /// Delivered from a spawned task; the caller never waits.
    #[default]
    Detached,
    /// Awaited before the engine call returns.
    Inline,
}

/// Tunables of the assignment engine.
///
/// # Examples
///
/// ```
/// use universal_assignment::assignment::domain::AssignmentType;
/// use universal_assignment::assignment::services::{EngineConfig, NotificationDispatch};
///
/// let config = EngineConfig::from_json(
///     r#"{ "sla_days": { "Rule Approval": 2 }, "notification_dispatch": "inline" }"#,
/// )
/// .expect("valid configuration");
/// let policy = config.sla_policy().expect("known assignment types");
/// assert_eq!(policy.days_for(AssignmentType::RuleApproval), 2);
/// assert_eq!(config.notification_dispatch, NotificationDispatch::Inline);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// SLA overrides keyed by assignment type label.
    pub sla_days: BTreeMap<String, u32>,
    /// SLA for types without an entry; the standard table's fallback when
    /// unset.
    pub default_sla_days: Option<u32>,
    /// Notification delivery mode.
    pub notification_dispatch: NotificationDispatch,
    /// Role whose holders may cancel any assignment.
    pub admin_role: String,
    /// Maximum number of ancestors a new assignment may have.
    pub max_hierarchy_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sla_days: BTreeMap::new(),
            default_sla_days: None,
            notification_dispatch: NotificationDispatch::default(),
            admin_role: DEFAULT_ADMIN_ROLE.to_owned(),
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError::Parse`] for malformed JSON or unknown
    /// keys.
    pub fn from_json(document: &str) -> Result<Self, EngineConfigError> {
        serde_json::from_str(document).map_err(|err| EngineConfigError::Parse(err.to_string()))
    }

    /// Builds the SLA policy: the standard table with overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError::UnknownAssignmentType`] when an override
    /// names an unknown type.
    pub fn sla_policy(&self) -> Result<SlaPolicy, EngineConfigError> {
        let mut policy = SlaPolicy::standard();
        if let Some(days) = self.default_sla_days {
            policy = policy.with_default_days(days);
        }
        for (label, days) in &self.sla_days {
            let assignment_type = AssignmentType::try_from(label.as_str())
                .map_err(|_| EngineConfigError::UnknownAssignmentType(label.clone()))?;
            policy = policy.with_days(assignment_type, *days);
        }
        Ok(policy)
    }

    /// Validates the configuration into engine settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError::UnknownAssignmentType`] for an SLA
    /// override naming an unknown type and
    /// [`EngineConfigError::InvalidAdminRole`] for a blank admin role.
    pub fn settings(&self) -> Result<EngineSettings, EngineConfigError> {
        Ok(EngineSettings {
            sla: self.sla_policy()?,
            admin_role: RoleName::new(self.admin_role.as_str())
                .map_err(EngineConfigError::InvalidAdminRole)?,
            notification_dispatch: self.notification_dispatch,
            max_hierarchy_depth: self.max_hierarchy_depth,
        })
    }
}

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Due-date table.
    pub sla: SlaPolicy,
    /// Role whose holders may cancel any assignment.
    pub admin_role: RoleName,
    /// Notification delivery mode.
    pub notification_dispatch: NotificationDispatch,
    /// Maximum number of ancestors a new assignment may have.
    pub max_hierarchy_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sla: SlaPolicy::standard(),
            admin_role: RoleName::from_static(DEFAULT_ADMIN_ROLE),
            notification_dispatch: NotificationDispatch::default(),
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }
}

/// Errors raised while loading engine configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid engine configuration: {0}")]
    Parse(String),
    /// An SLA override names an unknown assignment type.
    #[error("SLA override for unknown assignment type: {0}")]
    UnknownAssignmentType(String),
    /// The administrator role is blank.
    #[error("invalid admin role: {0}")]
    InvalidAdminRole(AssignmentDomainError),
}
