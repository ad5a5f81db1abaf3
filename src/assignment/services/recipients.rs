//! Who hears about each assignment event.

use crate::assignment::domain::{Assignment, AssignmentAction, UserId};

/// Returns the users to notify after `action` was performed by `actor`.
///
/// The actor is never notified of their own action, and no user appears
/// twice.
#[must_use]
pub fn recipients_for(
    assignment: &Assignment,
    action: AssignmentAction,
    actor: UserId,
) -> Vec<UserId> {
    let creator = Some(assignment.from_user_id());
    let assignee = assignment.to_user_id();
    let candidates = match action {
        AssignmentAction::Created | AssignmentAction::Claimed => vec![assignee],
        AssignmentAction::Acknowledged
        | AssignmentAction::Started
        | AssignmentAction::Completed
        | AssignmentAction::Held
        | AssignmentAction::Resumed => vec![creator],
        AssignmentAction::Approved | AssignmentAction::Rejected => vec![assignee, creator],
        AssignmentAction::Escalated => vec![
            assignment
                .escalation()
                .and_then(|escalation| escalation.escalated_to),
            creator,
        ],
        AssignmentAction::Delegated => vec![assignment.delegated_to_user_id()],
        AssignmentAction::Cancelled => vec![assignee, assignment.delegated_to_user_id()],
    };

    let mut recipients: Vec<UserId> = Vec::with_capacity(candidates.len());
    for user in candidates.into_iter().flatten() {
        if user != actor && !recipients.contains(&user) {
            recipients.push(user);
        }
    }
    recipients
}
