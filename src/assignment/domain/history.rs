//! Append-only audit records for assignment state changes.

use super::{AssignmentAction, AssignmentId, HistoryEntryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field-level description of one state change, produced by the aggregate.
///
/// `before` and `after` only contain the fields the action touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentChange {
    action: AssignmentAction,
    actor: UserId,
    before: Map<String, Value>,
    after: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl AssignmentChange {
    pub(super) fn new(action: AssignmentAction, actor: UserId) -> Self {
        Self {
            action,
            actor,
            before: Map::new(),
            after: Map::new(),
            metadata: Map::new(),
        }
    }

    /// Records a field's value before and after the change.
    pub(super) fn field(
        &mut self,
        name: &str,
        before: impl Into<Value>,
        after: impl Into<Value>,
    ) -> &mut Self {
        self.before.insert(name.to_owned(), before.into());
        self.after.insert(name.to_owned(), after.into());
        self
    }

    /// Adds free-form metadata to the change.
    pub(super) fn meta(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    /// Returns the action that produced this change.
    #[must_use]
    pub const fn action(&self) -> AssignmentAction {
        self.action
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the changed fields' previous values.
    #[must_use]
    pub const fn before(&self) -> &Map<String, Value> {
        &self.before
    }

    /// Returns the changed fields' new values.
    #[must_use]
    pub const fn after(&self) -> &Map<String, Value> {
        &self.after
    }
}

/// Immutable audit entry for one state-changing engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentHistory {
    /// Entry identifier.
    pub id: HistoryEntryId,
    /// Assignment the entry belongs to.
    pub assignment_id: AssignmentId,
    /// User who performed the action.
    pub actor: UserId,
    /// Action tag.
    pub action: AssignmentAction,
    /// JSON snapshot of the changed fields before the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// JSON snapshot of the changed fields after the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Free-form details such as reasons or delegate ids.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

impl AssignmentHistory {
    /// Builds the audit entry for a change applied at `recorded_at`.
    #[must_use]
    pub fn record(
        assignment_id: AssignmentId,
        change: &AssignmentChange,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            assignment_id,
            actor: change.actor,
            action: change.action,
            old_value: snapshot(&change.before),
            new_value: snapshot(&change.after),
            metadata: change.metadata.clone(),
            recorded_at,
        }
    }
}

fn snapshot(fields: &Map<String, Value>) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    Some(Value::Object(fields.clone()).to_string())
}
