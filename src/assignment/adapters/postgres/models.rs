//! Diesel row models for assignment persistence.

use super::schema::{assignment_history, assignments};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for assignments.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Assignment identifier.
    pub id: uuid::Uuid,
    /// Assignment type label.
    pub assignment_type: String,
    /// Context type label.
    pub context_type: String,
    /// Context map.
    pub context_data: Value,
    /// Requester role.
    pub from_role: String,
    /// Assignee role.
    pub to_role: String,
    /// Requesting user.
    pub from_user_id: i64,
    /// Assignee.
    pub to_user_id: Option<i64>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Instructions.
    pub task_instructions: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Status restored on resume.
    pub status_before_hold: Option<String>,
    /// Priority label.
    pub priority: String,
    /// Creation timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Acknowledgement timestamp.
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Start timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completion payload.
    pub completion: Option<Value>,
    /// Whether sign-off is required.
    pub requires_approval: bool,
    /// Sign-off role.
    pub approval_role: Option<String>,
    /// Sign-off decision.
    pub approval: Option<Value>,
    /// Escalation flag.
    pub escalated: bool,
    /// Escalation record.
    pub escalation: Option<Value>,
    /// Current delegate.
    pub delegated_to_user_id: Option<i64>,
    /// Delegation record.
    pub delegation: Option<Value>,
    /// Parent assignment.
    pub parent_assignment_id: Option<uuid::Uuid>,
    /// Revision.
    pub revision: i64,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and full-replacement model for assignments.
///
/// `None` fields overwrite stored values with `NULL` on update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
pub struct AssignmentRecord {
    /// Assignment identifier; skipped by the changeset.
    pub id: uuid::Uuid,
    /// Assignment type label.
    pub assignment_type: String,
    /// Context type label.
    pub context_type: String,
    /// Context map.
    pub context_data: Value,
    /// Requester role.
    pub from_role: String,
    /// Assignee role.
    pub to_role: String,
    /// Requesting user.
    pub from_user_id: i64,
    /// Assignee.
    pub to_user_id: Option<i64>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Instructions.
    pub task_instructions: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Status restored on resume.
    pub status_before_hold: Option<String>,
    /// Priority label.
    pub priority: String,
    /// Creation timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Acknowledgement timestamp.
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Start timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completion payload.
    pub completion: Option<Value>,
    /// Whether sign-off is required.
    pub requires_approval: bool,
    /// Sign-off role.
    pub approval_role: Option<String>,
    /// Sign-off decision.
    pub approval: Option<Value>,
    /// Escalation flag.
    pub escalated: bool,
    /// Escalation record.
    pub escalation: Option<Value>,
    /// Current delegate.
    pub delegated_to_user_id: Option<i64>,
    /// Delegation record.
    pub delegation: Option<Value>,
    /// Parent assignment.
    pub parent_assignment_id: Option<uuid::Uuid>,
    /// Revision.
    pub revision: i64,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for history entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignment_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning assignment.
    pub assignment_id: uuid::Uuid,
    /// Acting user.
    pub actor_user_id: i64,
    /// Action tag.
    pub action: String,
    /// Changed fields before the action.
    pub old_value: Option<String>,
    /// Changed fields after the action.
    pub new_value: Option<String>,
    /// Free-form details.
    pub metadata: Value,
    /// Action timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for history entries. `sequence` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignment_history)]
pub struct NewHistoryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning assignment.
    pub assignment_id: uuid::Uuid,
    /// Acting user.
    pub actor_user_id: i64,
    /// Action tag.
    pub action: String,
    /// Changed fields before the action.
    pub old_value: Option<String>,
    /// Changed fields after the action.
    pub new_value: Option<String>,
    /// Free-form details.
    pub metadata: Value,
    /// Action timestamp.
    pub recorded_at: DateTime<Utc>,
}
