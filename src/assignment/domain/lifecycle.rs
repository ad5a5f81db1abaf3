//! State transitions of the assignment aggregate.
//!
//! Every transition validates input, then the current status, then the
//! actor's authority, and only mutates once all checks pass. Each returns
//! the [`AssignmentChange`] the audit trail records.

use super::assignment::{non_blank, timestamp_value, user_value};
use super::{
    Actor, ApprovalDecision, Assignment, AssignmentAction, AssignmentChange,
    AssignmentDomainError, AssignmentStatus, Attachment, Completion, Delegation, Escalation,
    RoleName, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::{Map, Value};

/// Results handed in when completing an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionPayload {
    /// Free-text notes.
    pub notes: Option<String>,
    /// Structured results.
    pub data: Map<String, Value>,
    /// Files handed in.
    pub attachments: Vec<Attachment>,
}

impl CompletionPayload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets completion notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Adds a structured result.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

impl Assignment {
    /// Takes an unassigned assignment on behalf of a holder of its role.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] unless the
    /// assignment is `Unassigned` or escalated without an assignee, and
    /// [`AssignmentDomainError::NotAuthorized`] when the actor does not hold
    /// the target role.
    pub fn claim(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Claimed;
        self.ensure_permitted(action)?;
        if self.to_user_id.is_some() {
            return Err(self.invalid_transition(action));
        }
        if !actor.holds(&self.to_role) {
            return Err(self.not_authorized(actor.user_id(), action));
        }

        let mut change = AssignmentChange::new(action, actor.user_id());
        change.field("to_user_id", Value::Null, actor.user_id().value());
        self.to_user_id = Some(actor.user_id());
        self.move_to(AssignmentStatus::Assigned, &mut change, clock);
        Ok(change)
    }

    /// Records that the assignee has seen the work.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] unless the
    /// assignment is `Assigned`, and [`AssignmentDomainError::NotAuthorized`]
    /// when `user` is not the assignee.
    pub fn acknowledge(
        &mut self,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Acknowledged;
        self.ensure_permitted(action)?;
        self.ensure_assignee(user, action)?;

        let mut change = AssignmentChange::new(action, user);
        let now = self.move_to(AssignmentStatus::Acknowledged, &mut change, clock);
        if self.acknowledged_at.is_none() {
            change.field("acknowledged_at", Value::Null, timestamp_value(Some(now)));
            self.acknowledged_at = Some(now);
        }
        Ok(change)
    }

    /// Records that the assignee has started working.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] unless the
    /// assignment is `Assigned` or `Acknowledged`, and
    /// [`AssignmentDomainError::NotAuthorized`] when `user` is not the
    /// assignee.
    pub fn start(
        &mut self,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Started;
        self.ensure_permitted(action)?;
        self.ensure_assignee(user, action)?;

        let mut change = AssignmentChange::new(action, user);
        let now = self.move_to(AssignmentStatus::InProgress, &mut change, clock);
        if self.started_at.is_none() {
            change.field("started_at", Value::Null, timestamp_value(Some(now)));
            self.started_at = Some(now);
        }
        Ok(change)
    }

    /// Completes the work. The assignee and the current delegate are equally
    /// authorized.
    ///
    /// Acknowledging and starting are optional: completion is accepted from
    /// any open status once the assignment has an assignee.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] when the
    /// assignment is unclaimed, completed, or closed, and
    /// [`AssignmentDomainError::NotAuthorized`] when `user` neither is the
    /// assignee nor the delegate.
    pub fn complete(
        &mut self,
        user: UserId,
        payload: CompletionPayload,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Completed;
        self.ensure_permitted(action)?;
        if !self.is_worked_by(user) {
            return Err(self.not_authorized(user, action));
        }

        let mut change = AssignmentChange::new(action, user);
        let now = self.move_to(AssignmentStatus::Completed, &mut change, clock);
        let notes = non_blank(payload.notes);
        change
            .field("completed_at", Value::Null, timestamp_value(Some(now)))
            .field("completed_by_user_id", Value::Null, user.value())
            .meta("attachment_count", payload.attachments.len());
        if let Some(text) = notes.as_deref() {
            change.meta("completion_notes", text);
        }

        self.completed_at = Some(now);
        self.status_before_hold = None;
        self.completion = Some(Completion {
            completed_by: Some(user),
            notes,
            data: payload.data,
            attachments: payload.attachments,
        });
        Ok(change)
    }

    /// Signs off a completed assignment.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] unless the
    /// assignment is `Completed`, [`AssignmentDomainError::ApprovalNotRequired`]
    /// when approval is disabled, and [`AssignmentDomainError::NotAuthorized`]
    /// when the actor lacks the approval role.
    pub fn approve(
        &mut self,
        actor: &Actor,
        notes: Option<String>,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Approved;
        self.ensure_awaiting_approval(action)?;
        self.ensure_approver(actor, action)?;

        let mut change = AssignmentChange::new(action, actor.user_id());
        let now = self.move_to(AssignmentStatus::Approved, &mut change, clock);
        let approval_notes = non_blank(notes);
        change
            .field("approved_by_user_id", Value::Null, actor.user_id().value())
            .field("approved_at", Value::Null, timestamp_value(Some(now)));
        if let Some(text) = approval_notes.as_deref() {
            change.meta("approval_notes", text);
        }
        self.approval = Some(ApprovalDecision {
            decided_by: actor.user_id(),
            decided_at: now,
            notes: approval_notes,
        });
        Ok(change)
    }

    /// Refuses a completed assignment. Rejection is final; resubmission is
    /// a new assignment whose parent is this one.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Assignment::approve`], except that a
    /// blank reason on an assignment awaiting sign-off is
    /// [`AssignmentDomainError::MissingReason`] ahead of the authority check.
    pub fn reject(
        &mut self,
        actor: &Actor,
        reason: &str,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Rejected;
        self.ensure_awaiting_approval(action)?;
        let reason_text = required_reason(reason, action)?;
        self.ensure_approver(actor, action)?;

        let mut change = AssignmentChange::new(action, actor.user_id());
        let now = self.move_to(AssignmentStatus::Rejected, &mut change, clock);
        change
            .field("approved_by_user_id", Value::Null, actor.user_id().value())
            .field("approved_at", Value::Null, timestamp_value(Some(now)))
            .meta("reason", reason_text.as_str());
        self.approval = Some(ApprovalDecision {
            decided_by: actor.user_id(),
            decided_at: now,
            notes: Some(reason_text),
        });
        Ok(change)
    }

    /// Raises an alarm on the assignment. The assignee is left unchanged and
    /// a repeat escalation replaces the recorded one.
    ///
    /// Any user may escalate.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::MissingReason`] for a blank reason and
    /// [`AssignmentDomainError::InvalidTransition`] once the assignment is
    /// completed or closed.
    pub fn escalate(
        &mut self,
        user: UserId,
        reason: &str,
        escalated_to: Option<UserId>,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Escalated;
        let reason_text = required_reason(reason, action)?;
        self.ensure_permitted(action)?;

        let mut change = AssignmentChange::new(action, user);
        let previous_target = self.escalation.as_ref().and_then(|prior| prior.escalated_to);
        let was_escalated = self.escalation.is_some();
        let now = self.move_to(AssignmentStatus::Escalated, &mut change, clock);
        change
            .field("escalated", was_escalated, true)
            .field(
                "escalated_to_user_id",
                user_value(previous_target),
                user_value(escalated_to),
            )
            .meta("reason", reason_text.as_str());
        self.status_before_hold = None;
        self.escalation = Some(Escalation {
            escalated_by: user,
            escalated_at: now,
            escalated_to,
            reason: reason_text,
        });
        Ok(change)
    }

    /// Hands execution to `delegate`. Both the assignee and the delegate may
    /// then complete the assignment.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::SelfDelegation`] when delegating to
    /// oneself, [`AssignmentDomainError::InvalidTransition`] when the
    /// assignment is unclaimed, completed or closed, and
    /// [`AssignmentDomainError::NotAuthorized`] unless `user` is the
    /// assignee.
    pub fn delegate(
        &mut self,
        user: UserId,
        delegate: UserId,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Delegated;
        if delegate == user {
            return Err(AssignmentDomainError::SelfDelegation(user));
        }
        self.ensure_permitted(action)?;
        self.ensure_assignee(user, action)?;

        let mut change = AssignmentChange::new(action, user);
        let previous = self.delegated_to_user_id();
        let now = self.move_to(AssignmentStatus::Delegated, &mut change, clock);
        let delegation_reason = non_blank(reason);
        change.field(
            "delegated_to_user_id",
            user_value(previous),
            delegate.value(),
        );
        if let Some(text) = delegation_reason.as_deref() {
            change.meta("reason", text);
        }
        self.status_before_hold = None;
        self.delegation = Some(Delegation {
            delegated_to: delegate,
            delegated_at: now,
            reason: delegation_reason,
        });
        Ok(change)
    }

    /// Pauses the work, remembering the status to restore.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] when the
    /// assignment is unclaimed, already on hold, completed or closed, and
    /// [`AssignmentDomainError::NotAuthorized`] unless `user` is the
    /// assignee, the delegate or the requester.
    pub fn hold(
        &mut self,
        user: UserId,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Held;
        self.ensure_permitted(action)?;
        self.ensure_participant(user, action)?;

        let mut change = AssignmentChange::new(action, user);
        let previous = self.status;
        self.move_to(AssignmentStatus::OnHold, &mut change, clock);
        if let Some(text) = non_blank(reason) {
            change.meta("reason", text);
        }
        self.status_before_hold = Some(previous);
        Ok(change)
    }

    /// Resumes paused work in the status it had before the hold.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidTransition`] unless the
    /// assignment is on hold, and [`AssignmentDomainError::NotAuthorized`]
    /// unless `user` is the assignee, the delegate or the requester.
    pub fn resume(
        &mut self,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Resumed;
        self.ensure_permitted(action)?;
        self.ensure_participant(user, action)?;

        let target = self
            .status_before_hold
            .unwrap_or_else(|| self.inferred_working_status());
        let mut change = AssignmentChange::new(action, user);
        self.move_to(target, &mut change, clock);
        self.status_before_hold = None;
        Ok(change)
    }

    /// Withdraws the assignment before completion.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::MissingReason`] for a blank reason,
    /// [`AssignmentDomainError::InvalidTransition`] once the assignment is
    /// completed or closed, and [`AssignmentDomainError::NotAuthorized`]
    /// unless the actor is the requester or holds `admin_role`.
    pub fn cancel(
        &mut self,
        actor: &Actor,
        admin_role: &RoleName,
        reason: &str,
        clock: &impl Clock,
    ) -> Result<AssignmentChange, AssignmentDomainError> {
        let action = AssignmentAction::Cancelled;
        let reason_text = required_reason(reason, action)?;
        self.ensure_permitted(action)?;
        if actor.user_id() != self.from_user_id && !actor.holds(admin_role) {
            return Err(self.not_authorized(actor.user_id(), action));
        }

        let mut change = AssignmentChange::new(action, actor.user_id());
        self.move_to(AssignmentStatus::Cancelled, &mut change, clock);
        change.meta("reason", reason_text);
        self.status_before_hold = None;
        Ok(change)
    }

    fn ensure_permitted(&self, action: AssignmentAction) -> Result<(), AssignmentDomainError> {
        if action.permitted_from(self.status) {
            return Ok(());
        }
        Err(self.invalid_transition(action))
    }

    const fn invalid_transition(&self, action: AssignmentAction) -> AssignmentDomainError {
        AssignmentDomainError::InvalidTransition {
            id: self.id,
            action,
            from: self.status,
        }
    }

    fn ensure_assignee(
        &self,
        user: UserId,
        action: AssignmentAction,
    ) -> Result<(), AssignmentDomainError> {
        if self.to_user_id == Some(user) {
            return Ok(());
        }
        Err(self.not_authorized(user, action))
    }

    fn ensure_participant(
        &self,
        user: UserId,
        action: AssignmentAction,
    ) -> Result<(), AssignmentDomainError> {
        if self.is_worked_by(user) || self.from_user_id == user {
            return Ok(());
        }
        Err(self.not_authorized(user, action))
    }

    fn ensure_awaiting_approval(
        &self,
        action: AssignmentAction,
    ) -> Result<(), AssignmentDomainError> {
        if !self.requires_approval {
            return Err(AssignmentDomainError::ApprovalNotRequired(self.id));
        }
        self.ensure_permitted(action)
    }

    fn ensure_approver(
        &self,
        actor: &Actor,
        action: AssignmentAction,
    ) -> Result<(), AssignmentDomainError> {
        match &self.approval_role {
            Some(role) if !actor.holds(role) => Err(self.not_authorized(actor.user_id(), action)),
            _ => Ok(()),
        }
    }

    const fn not_authorized(&self, user: UserId, action: AssignmentAction) -> AssignmentDomainError {
        AssignmentDomainError::NotAuthorized {
            id: self.id,
            user,
            action,
        }
    }

    /// Status implied by the timeline, for holds persisted without a saved
    /// status.
    const fn inferred_working_status(&self) -> AssignmentStatus {
        if self.started_at.is_some() {
            AssignmentStatus::InProgress
        } else if self.acknowledged_at.is_some() {
            AssignmentStatus::Acknowledged
        } else {
            AssignmentStatus::Assigned
        }
    }

    fn move_to(
        &mut self,
        target: AssignmentStatus,
        change: &mut AssignmentChange,
        clock: &impl Clock,
    ) -> DateTime<Utc> {
        debug_assert!(
            self.status
                .can_transition_to(target, self.requires_approval),
            "transition {} -> {} is not a lifecycle edge",
            self.status,
            target
        );
        let now = clock.utc();
        change.field("status", self.status.as_str(), target.as_str());
        self.status = target;
        self.revision += 1;
        self.updated_at = now;
        now
    }
}

fn required_reason(
    reason: &str,
    action: AssignmentAction,
) -> Result<String, AssignmentDomainError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(AssignmentDomainError::MissingReason(action));
    }
    Ok(trimmed.to_owned())
}
