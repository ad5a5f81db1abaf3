//! Shared builders for assignment unit tests.

use crate::assignment::{
    adapters::memory::ManualClock,
    domain::{
        Actor, Assignment, AssignmentDomainError, AssignmentStatus, AssignmentType, ContextData,
        ContextType, CompletionPayload, DueDate, NewAssignment, Priority, RoleName, SlaPolicy,
        UserId,
    },
};
use chrono::{DateTime, TimeZone, Utc};

pub(super) const REQUESTER: UserId = UserId::new(1);
pub(super) const ASSIGNEE: UserId = UserId::new(2);
pub(super) const DELEGATE: UserId = UserId::new(3);
pub(super) const APPROVER: UserId = UserId::new(4);
pub(super) const OUTSIDER: UserId = UserId::new(9);

pub(super) fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

pub(super) fn manual_clock() -> ManualClock {
    ManualClock::new(start_instant())
}

pub(super) fn role(name: &str) -> RoleName {
    RoleName::new(name).expect("test role names are non-blank")
}

pub(super) fn actor(user: UserId, roles: &[&str]) -> Actor {
    Actor::new(user, roles.iter().map(|name| role(name)))
}

pub(super) fn draft(to_user_id: Option<UserId>) -> NewAssignment {
    NewAssignment {
        assignment_type: AssignmentType::DataUploadRequest,
        context_type: ContextType::Report,
        context_data: ContextData::new()
            .with("report_id", 58)
            .with("phase", "Data Provider ID"),
        from_role: role("Tester"),
        to_role: role("Data Owner"),
        from_user_id: REQUESTER,
        to_user_id,
        title: "Upload customer sample data".to_owned(),
        description: Some("Provide the sampled records".to_owned()),
        task_instructions: None,
        priority: Priority::High,
        due_date: DueDate::Default,
        requires_approval: false,
        approval_role: None,
        parent_assignment_id: None,
    }
}

pub(super) fn approval_draft(approval_role: Option<&str>) -> NewAssignment {
    NewAssignment {
        assignment_type: AssignmentType::ScopingApproval,
        requires_approval: true,
        approval_role: approval_role.map(role),
        ..draft(Some(ASSIGNEE))
    }
}

pub(super) fn create(
    draft: NewAssignment,
    clock: &ManualClock,
) -> Result<Assignment, AssignmentDomainError> {
    let (assignment, _) = Assignment::new(draft, &SlaPolicy::standard(), clock)?;
    Ok(assignment)
}

/// Drives a fresh assignment into `status` through legal transitions.
pub(super) fn assignment_in(
    status: AssignmentStatus,
    requires_approval: bool,
    clock: &ManualClock,
) -> Result<Assignment, AssignmentDomainError> {
    let base = if requires_approval {
        approval_draft(None)
    } else {
        draft(Some(ASSIGNEE))
    };
    if status == AssignmentStatus::Unassigned {
        return create(
            NewAssignment {
                to_user_id: None,
                ..base
            },
            clock,
        );
    }

    let mut assignment = create(base, clock)?;
    let requester = actor(REQUESTER, &[]);
    match status {
        AssignmentStatus::Unassigned | AssignmentStatus::Assigned => {}
        AssignmentStatus::Acknowledged => {
            assignment.acknowledge(ASSIGNEE, clock)?;
        }
        AssignmentStatus::InProgress => {
            assignment.start(ASSIGNEE, clock)?;
        }
        AssignmentStatus::Completed => {
            assignment.complete(ASSIGNEE, CompletionPayload::new(), clock)?;
        }
        AssignmentStatus::Approved => {
            assignment.complete(ASSIGNEE, CompletionPayload::new(), clock)?;
            assignment.approve(&actor(APPROVER, &[]), None, clock)?;
        }
        AssignmentStatus::Rejected => {
            assignment.complete(ASSIGNEE, CompletionPayload::new(), clock)?;
            assignment.reject(&actor(APPROVER, &[]), "sample is incomplete", clock)?;
        }
        AssignmentStatus::Escalated => {
            assignment.escalate(REQUESTER, "no response", None, clock)?;
        }
        AssignmentStatus::Delegated => {
            assignment.delegate(ASSIGNEE, DELEGATE, None, clock)?;
        }
        AssignmentStatus::OnHold => {
            assignment.hold(ASSIGNEE, None, clock)?;
        }
        AssignmentStatus::Cancelled => {
            assignment.cancel(&requester, &role("Admin"), "scope changed", clock)?;
        }
    }
    Ok(assignment)
}
