//! Assignment aggregate root and its side-channel records.

use super::{
    AssignmentAction, AssignmentChange, AssignmentDomainError, AssignmentId, AssignmentStatus,
    AssignmentType, ContextData, ContextType, DueDate, Priority, RoleName, SlaPolicy, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel returned by [`Assignment::days_until_due`] when there is no due
/// date.
pub const NO_DUE_DATE_DAYS: i64 = 999;

const SECONDS_PER_DAY: i64 = 86_400;

/// File handed in with a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name.
    pub file_name: String,
    /// Storage location (path, object key or URL).
    pub location: String,
    /// MIME type, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Size in bytes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl Attachment {
    /// Creates an attachment descriptor.
    #[must_use]
    pub fn new(file_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            location: location.into(),
            content_type: None,
            size_bytes: None,
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the file size.
    #[must_use]
    pub const fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}

/// Payload recorded when an assignment is completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// User who completed the work.
    pub completed_by: Option<UserId>,
    /// Free-text completion notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Structured results for the caller to act on.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    /// Files handed in with the completion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Outcome of a sign-off on a completed assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// User who approved or rejected.
    pub decided_by: UserId,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
    /// Approval notes, or the rejection reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Alarm raised on an assignment. Does not reassign it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    /// User who raised the alarm.
    pub escalated_by: UserId,
    /// When the alarm was raised.
    pub escalated_at: DateTime<Utc>,
    /// User asked to intervene, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated_to: Option<UserId>,
    /// Why the alarm was raised.
    pub reason: String,
}

/// Hand-over of execution to another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// User now allowed to complete the assignment.
    pub delegated_to: UserId,
    /// When execution was handed over.
    pub delegated_at: DateTime<Utc>,
    /// Why execution was handed over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Validated input for a new assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Kind of work.
    pub assignment_type: AssignmentType,
    /// Kind of business object the work is about.
    pub context_type: ContextType,
    /// Identifiers of the business object.
    pub context_data: ContextData,
    /// Role of the requester.
    pub from_role: RoleName,
    /// Role expected to do the work.
    pub to_role: RoleName,
    /// Requesting user.
    pub from_user_id: UserId,
    /// Resolved assignee; `None` leaves the assignment claimable.
    pub to_user_id: Option<UserId>,
    /// Short description of the work.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Step-by-step instructions.
    pub task_instructions: Option<String>,
    /// Display priority.
    pub priority: Priority,
    /// How to pick the due date.
    pub due_date: DueDate,
    /// Whether a second party must sign off after completion.
    pub requires_approval: bool,
    /// Role allowed to sign off, when restricted.
    pub approval_role: Option<RoleName>,
    /// Assignment whose completion spawned this one.
    pub parent_assignment_id: Option<AssignmentId>,
}

/// Assignment aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub(super) id: AssignmentId,
    pub(super) assignment_type: AssignmentType,
    pub(super) context_type: ContextType,
    pub(super) context_data: ContextData,
    pub(super) from_role: RoleName,
    pub(super) to_role: RoleName,
    pub(super) from_user_id: UserId,
    pub(super) to_user_id: Option<UserId>,
    pub(super) title: String,
    pub(super) description: Option<String>,
    pub(super) task_instructions: Option<String>,
    pub(super) status: AssignmentStatus,
    pub(super) status_before_hold: Option<AssignmentStatus>,
    pub(super) priority: Priority,
    pub(super) assigned_at: DateTime<Utc>,
    pub(super) due_date: Option<DateTime<Utc>>,
    pub(super) acknowledged_at: Option<DateTime<Utc>>,
    pub(super) started_at: Option<DateTime<Utc>>,
    pub(super) completed_at: Option<DateTime<Utc>>,
    pub(super) completion: Option<Completion>,
    pub(super) requires_approval: bool,
    pub(super) approval_role: Option<RoleName>,
    pub(super) approval: Option<ApprovalDecision>,
    pub(super) escalation: Option<Escalation>,
    pub(super) delegation: Option<Delegation>,
    pub(super) parent_assignment_id: Option<AssignmentId>,
    pub(super) revision: u64,
    pub(super) updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentData {
    /// Persisted identifier.
    pub id: AssignmentId,
    /// Persisted assignment type.
    pub assignment_type: AssignmentType,
    /// Persisted context type.
    pub context_type: ContextType,
    /// Persisted context data.
    pub context_data: ContextData,
    /// Persisted requester role.
    pub from_role: RoleName,
    /// Persisted assignee role.
    pub to_role: RoleName,
    /// Persisted requester.
    pub from_user_id: UserId,
    /// Persisted assignee.
    pub to_user_id: Option<UserId>,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted instructions.
    pub task_instructions: Option<String>,
    /// Persisted status.
    pub status: AssignmentStatus,
    /// Persisted status to restore when resuming from hold.
    pub status_before_hold: Option<AssignmentStatus>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted acknowledgement timestamp.
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Persisted start timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted completion payload.
    pub completion: Option<Completion>,
    /// Persisted approval requirement.
    pub requires_approval: bool,
    /// Persisted approval role.
    pub approval_role: Option<RoleName>,
    /// Persisted approval decision.
    pub approval: Option<ApprovalDecision>,
    /// Persisted escalation.
    pub escalation: Option<Escalation>,
    /// Persisted delegation.
    pub delegation: Option<Delegation>,
    /// Persisted parent link.
    pub parent_assignment_id: Option<AssignmentId>,
    /// Persisted optimistic-concurrency revision.
    pub revision: u64,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates a new assignment and the change describing its creation.
    ///
    /// The assignment starts `Assigned` when an assignee is known and
    /// `Unassigned` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyTitle`] for a blank title and
    /// [`AssignmentDomainError::ApprovalRoleWithoutApproval`] when an
    /// approval role is given without requiring approval, and
    /// [`AssignmentDomainError::DueDateOutOfRange`] when the SLA offset
    /// overflows the calendar.
    pub fn new(
        draft: NewAssignment,
        sla: &SlaPolicy,
        clock: &impl Clock,
    ) -> Result<(Self, AssignmentChange), AssignmentDomainError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AssignmentDomainError::EmptyTitle);
        }
        if draft.approval_role.is_some() && !draft.requires_approval {
            return Err(AssignmentDomainError::ApprovalRoleWithoutApproval);
        }

        let assigned_at = clock.utc();
        let due_date = sla.due_date(draft.assignment_type, draft.due_date, assigned_at)?;
        let status = if draft.to_user_id.is_some() {
            AssignmentStatus::Assigned
        } else {
            AssignmentStatus::Unassigned
        };

        let assignment = Self {
            id: AssignmentId::new(),
            assignment_type: draft.assignment_type,
            context_type: draft.context_type,
            context_data: draft.context_data,
            from_role: draft.from_role,
            to_role: draft.to_role,
            from_user_id: draft.from_user_id,
            to_user_id: draft.to_user_id,
            title: title.to_owned(),
            description: non_blank(draft.description),
            task_instructions: non_blank(draft.task_instructions),
            status,
            status_before_hold: None,
            priority: draft.priority,
            assigned_at,
            due_date,
            acknowledged_at: None,
            started_at: None,
            completed_at: None,
            completion: None,
            requires_approval: draft.requires_approval,
            approval_role: draft.approval_role,
            approval: None,
            escalation: None,
            delegation: None,
            parent_assignment_id: draft.parent_assignment_id,
            revision: 1,
            updated_at: assigned_at,
        };

        let mut change = AssignmentChange::new(AssignmentAction::Created, draft.from_user_id);
        change
            .field("status", Value::Null, assignment.status.as_str())
            .field("to_user_id", Value::Null, user_value(assignment.to_user_id))
            .field("due_date", Value::Null, timestamp_value(assignment.due_date))
            .meta("assignment_type", assignment.assignment_type.as_str())
            .meta("context_type", assignment.context_type.as_str())
            .meta("to_role", assignment.to_role.as_str());
        Ok((assignment, change))
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAssignmentData) -> Self {
        Self {
            id: data.id,
            assignment_type: data.assignment_type,
            context_type: data.context_type,
            context_data: data.context_data,
            from_role: data.from_role,
            to_role: data.to_role,
            from_user_id: data.from_user_id,
            to_user_id: data.to_user_id,
            title: data.title,
            description: data.description,
            task_instructions: data.task_instructions,
            status: data.status,
            status_before_hold: data.status_before_hold,
            priority: data.priority,
            assigned_at: data.assigned_at,
            due_date: data.due_date,
            acknowledged_at: data.acknowledged_at,
            started_at: data.started_at,
            completed_at: data.completed_at,
            completion: data.completion,
            requires_approval: data.requires_approval,
            approval_role: data.approval_role,
            approval: data.approval,
            escalation: data.escalation,
            delegation: data.delegation,
            parent_assignment_id: data.parent_assignment_id,
            revision: data.revision,
            updated_at: data.updated_at,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the assignment type.
    #[must_use]
    pub const fn assignment_type(&self) -> AssignmentType {
        self.assignment_type
    }

    /// Returns the context type.
    #[must_use]
    pub const fn context_type(&self) -> ContextType {
        self.context_type
    }

    /// Returns the context data.
    #[must_use]
    pub const fn context_data(&self) -> &ContextData {
        &self.context_data
    }

    /// Returns the requester's role.
    #[must_use]
    pub const fn from_role(&self) -> &RoleName {
        &self.from_role
    }

    /// Returns the role expected to do the work.
    #[must_use]
    pub const fn to_role(&self) -> &RoleName {
        &self.to_role
    }

    /// Returns the requesting user.
    #[must_use]
    pub const fn from_user_id(&self) -> UserId {
        self.from_user_id
    }

    /// Returns the assignee, or `None` while unclaimed.
    #[must_use]
    pub const fn to_user_id(&self) -> Option<UserId> {
        self.to_user_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task instructions.
    #[must_use]
    pub fn task_instructions(&self) -> Option<&str> {
        self.task_instructions.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AssignmentStatus {
        self.status
    }

    /// Returns the status restored by `resume` while on hold.
    #[must_use]
    pub const fn status_before_hold(&self) -> Option<AssignmentStatus> {
        self.status_before_hold
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns when the assignment was created.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns when the assignee acknowledged the work.
    #[must_use]
    pub const fn acknowledged_at(&self) -> Option<DateTime<Utc>> {
        self.acknowledged_at
    }

    /// Returns when work started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when work was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the completion payload.
    #[must_use]
    pub const fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Returns the user who completed the work.
    #[must_use]
    pub fn completed_by_user_id(&self) -> Option<UserId> {
        self.completion
            .as_ref()
            .and_then(|completion| completion.completed_by)
    }

    /// Returns whether a sign-off is required after completion.
    #[must_use]
    pub const fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    /// Returns the role allowed to sign off, when restricted.
    #[must_use]
    pub const fn approval_role(&self) -> Option<&RoleName> {
        self.approval_role.as_ref()
    }

    /// Returns the sign-off decision, once made.
    #[must_use]
    pub const fn approval(&self) -> Option<&ApprovalDecision> {
        self.approval.as_ref()
    }

    /// Returns the escalation, if one was raised.
    #[must_use]
    pub const fn escalation(&self) -> Option<&Escalation> {
        self.escalation.as_ref()
    }

    /// Returns `true` once an escalation has been raised.
    #[must_use]
    pub const fn escalated(&self) -> bool {
        self.escalation.is_some()
    }

    /// Returns the delegation, if execution was handed over.
    #[must_use]
    pub const fn delegation(&self) -> Option<&Delegation> {
        self.delegation.as_ref()
    }

    /// Returns the current delegate.
    #[must_use]
    pub fn delegated_to_user_id(&self) -> Option<UserId> {
        self.delegation
            .as_ref()
            .map(|delegation| delegation.delegated_to)
    }

    /// Returns the parent assignment.
    #[must_use]
    pub const fn parent_assignment_id(&self) -> Option<AssignmentId> {
        self.parent_assignment_id
    }

    /// Returns the optimistic-concurrency revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the assignment is past due at `now`.
    ///
    /// Completed, approved, rejected and cancelled assignments are never
    /// overdue.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status.stops_due_clock() {
            return false;
        }
        self.due_date.is_some_and(|due| now > due)
    }

    /// Returns whole days until the due date, negative once overdue, or
    /// [`NO_DUE_DATE_DAYS`] without a due date.
    #[must_use]
    pub fn days_until_due(&self, now: DateTime<Utc>) -> i64 {
        self.due_date.map_or(NO_DUE_DATE_DAYS, |due| {
            (due - now).num_seconds().div_euclid(SECONDS_PER_DAY)
        })
    }

    /// Returns whether the assignment is on the main working path.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns whether the assignee has finished working it.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.status.is_worked()
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal(self.requires_approval)
    }

    /// Returns whether `user` is the assignee or the current delegate.
    #[must_use]
    pub fn is_worked_by(&self, user: UserId) -> bool {
        self.to_user_id == Some(user) || self.delegated_to_user_id() == Some(user)
    }
}

pub(super) fn user_value(user: Option<UserId>) -> Value {
    Value::from(user.map(UserId::value))
}

pub(super) fn timestamp_value(timestamp: Option<DateTime<Utc>>) -> Value {
    Value::from(timestamp.map(|instant| instant.to_rfc3339()))
}

pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}
