//! Assignment lifecycle status and the actions that move it.

use super::{ParseAssignmentActionError, ParseAssignmentStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assignment lifecycle status.
///
/// `Overdue` is deliberately absent: it is derived from the due date and the
/// clock at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    /// Routed to a role but no user holds it yet; must be claimed.
    Unassigned,
    /// Routed to a concrete user who has not responded.
    Assigned,
    /// The assignee has seen the work.
    Acknowledged,
    /// The assignee is working on it.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work is done; awaits sign-off when approval is required.
    Completed,
    /// Sign-off granted.
    Approved,
    /// Sign-off refused.
    Rejected,
    /// An alarm has been raised on the assignment.
    Escalated,
    /// Execution has been handed to a delegate.
    Delegated,
    /// Work is paused.
    #[serde(rename = "On Hold")]
    OnHold,
    /// Withdrawn before completion.
    Cancelled,
}

impl AssignmentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 11] = [
        Self::Unassigned,
        Self::Assigned,
        Self::Acknowledged,
        Self::InProgress,
        Self::Completed,
        Self::Approved,
        Self::Rejected,
        Self::Escalated,
        Self::Delegated,
        Self::OnHold,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "Unassigned",
            Self::Assigned => "Assigned",
            Self::Acknowledged => "Acknowledged",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Escalated => "Escalated",
            Self::Delegated => "Delegated",
            Self::OnHold => "On Hold",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns whether work has not been completed or withdrawn yet.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            Self::Unassigned
                | Self::Assigned
                | Self::Acknowledged
                | Self::InProgress
                | Self::Escalated
                | Self::Delegated
                | Self::OnHold
        )
    }

    /// Returns whether the assignment is on the main working path.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Assigned | Self::Acknowledged | Self::InProgress)
    }

    /// Returns whether the assignee has finished working it.
    #[must_use]
    pub const fn is_worked(self) -> bool {
        matches!(self, Self::Completed | Self::Approved | Self::Rejected)
    }

    /// Returns whether the due date no longer applies.
    #[must_use]
    pub const fn stops_due_clock(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Approved | Self::Rejected | Self::Cancelled
        )
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self, requires_approval: bool) -> bool {
        match self {
            Self::Approved | Self::Rejected | Self::Cancelled => true,
            Self::Completed => !requires_approval,
            _ => false,
        }
    }

    /// Returns whether a transition to `target` is an edge of the lifecycle.
    ///
    /// `Delegated` and `Escalated` loop on themselves: a repeat delegation
    /// or escalation replaces the recorded one. Escalated work nobody holds
    /// returns to `Assigned` when it is claimed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self, requires_approval: bool) -> bool {
        match self {
            Self::Unassigned => {
                matches!(target, Self::Assigned | Self::Escalated | Self::Cancelled)
            }
            Self::Assigned => matches!(
                target,
                Self::Acknowledged
                    | Self::InProgress
                    | Self::Completed
                    | Self::Escalated
                    | Self::Delegated
                    | Self::OnHold
                    | Self::Cancelled
            ),
            Self::Acknowledged => matches!(
                target,
                Self::InProgress
                    | Self::Completed
                    | Self::Escalated
                    | Self::Delegated
                    | Self::OnHold
                    | Self::Cancelled
            ),
            Self::InProgress => matches!(
                target,
                Self::Completed | Self::Escalated | Self::Delegated | Self::OnHold | Self::Cancelled
            ),
            Self::Escalated => matches!(
                target,
                Self::Assigned
                    | Self::Completed
                    | Self::Escalated
                    | Self::Delegated
                    | Self::OnHold
                    | Self::Cancelled
            ),
            Self::Delegated => matches!(
                target,
                Self::Completed | Self::Escalated | Self::Delegated | Self::OnHold | Self::Cancelled
            ),
            Self::OnHold => matches!(
                target,
                Self::Assigned
                    | Self::Acknowledged
                    | Self::InProgress
                    | Self::Escalated
                    | Self::Delegated
                    | Self::Completed
                    | Self::Cancelled
            ),
            Self::Completed => {
                requires_approval && matches!(target, Self::Approved | Self::Rejected)
            }
            Self::Approved | Self::Rejected | Self::Cancelled => false,
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseAssignmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ParseAssignmentStatusError(value.to_owned()))
    }
}

/// State-changing action recorded in the audit trail and sent with
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentAction {
    /// The assignment was created.
    Created,
    /// A role holder took an unassigned assignment.
    Claimed,
    /// The assignee acknowledged the work.
    Acknowledged,
    /// The assignee started the work.
    Started,
    /// The work was completed.
    Completed,
    /// Completion was signed off.
    Approved,
    /// Completion was refused.
    Rejected,
    /// An alarm was raised.
    Escalated,
    /// Execution was handed to a delegate.
    Delegated,
    /// Work was paused.
    Held,
    /// Paused work resumed.
    Resumed,
    /// The assignment was withdrawn.
    Cancelled,
}

impl AssignmentAction {
    const ALL: [Self; 12] = [
        Self::Created,
        Self::Claimed,
        Self::Acknowledged,
        Self::Started,
        Self::Completed,
        Self::Approved,
        Self::Rejected,
        Self::Escalated,
        Self::Delegated,
        Self::Held,
        Self::Resumed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Claimed => "claimed",
            Self::Acknowledged => "acknowledged",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Escalated => "escalated",
            Self::Delegated => "delegated",
            Self::Held => "held",
            Self::Resumed => "resumed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the action may be taken while the assignment is in
    /// `status`. Approval actions additionally require approval to be
    /// enabled on the assignment, and escalated work can only be claimed
    /// while nobody holds it.
    #[must_use]
    pub const fn permitted_from(self, status: AssignmentStatus) -> bool {
        use AssignmentStatus as S;
        match self {
            Self::Created => false,
            Self::Claimed => matches!(status, S::Unassigned | S::Escalated),
            Self::Acknowledged => matches!(status, S::Assigned),
            Self::Started => matches!(status, S::Assigned | S::Acknowledged),
            Self::Completed => status.is_open() && !matches!(status, S::Unassigned),
            Self::Approved | Self::Rejected => matches!(status, S::Completed),
            Self::Escalated | Self::Cancelled => status.is_open(),
            Self::Delegated => status.is_open() && !matches!(status, S::Unassigned),
            Self::Held => status.is_open() && !matches!(status, S::Unassigned | S::OnHold),
            Self::Resumed => matches!(status, S::OnHold),
        }
    }

    /// Returns the imperative verb used in error messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Created => "create",
            Self::Claimed => "claim",
            Self::Acknowledged => "acknowledge",
            Self::Started => "start",
            Self::Completed => "complete",
            Self::Approved => "approve",
            Self::Rejected => "reject",
            Self::Escalated => "escalate",
            Self::Delegated => "delegate",
            Self::Held => "hold",
            Self::Resumed => "resume",
            Self::Cancelled => "cancel",
        }
    }
}

impl fmt::Display for AssignmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentAction {
    type Error = ParseAssignmentActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
            .ok_or_else(|| ParseAssignmentActionError(value.to_owned()))
    }
}
