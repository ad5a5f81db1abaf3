//! Query criteria shared by the repository adapters and the engine.

use super::{
    Assignment, AssignmentId, AssignmentStatus, AssignmentType, ContextData, ContextType,
    RoleName, UserId,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Criteria for listing assignments. Empty criteria match everything.
///
/// # Examples
///
/// ```
/// use universal_assignment::assignment::domain::{AssignmentFilter, AssignmentStatus, UserId};
///
/// let filter = AssignmentFilter::new()
///     .worked_by(UserId::new(7))
///     .with_status(AssignmentStatus::Assigned);
/// assert_eq!(filter.statuses(), &[AssignmentStatus::Assigned]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    worked_by: Option<UserId>,
    statuses: Vec<AssignmentStatus>,
    assignment_types: Vec<AssignmentType>,
    context_type: Option<ContextType>,
    context: Option<ContextData>,
    to_role: Option<RoleName>,
    parent: Option<AssignmentId>,
    assigned_from: Option<DateTime<Utc>>,
    assigned_until: Option<DateTime<Utc>>,
}

impl AssignmentFilter {
    /// Creates a filter matching every assignment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps assignments where `user` is the assignee or the delegate.
    #[must_use]
    pub const fn worked_by(mut self, user: UserId) -> Self {
        self.worked_by = Some(user);
        self
    }

    /// Adds an accepted status.
    #[must_use]
    pub fn with_status(mut self, status: AssignmentStatus) -> Self {
        self.statuses.push(status);
        self
    }

    /// Replaces the accepted statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = AssignmentStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Replaces the accepted assignment types.
    #[must_use]
    pub fn with_assignment_types(
        mut self,
        assignment_types: impl IntoIterator<Item = AssignmentType>,
    ) -> Self {
        self.assignment_types = assignment_types.into_iter().collect();
        self
    }

    /// Keeps assignments about the given kind of business object.
    #[must_use]
    pub const fn with_context_type(mut self, context_type: ContextType) -> Self {
        self.context_type = Some(context_type);
        self
    }

    /// Keeps assignments whose context data contains every entry of
    /// `context`.
    #[must_use]
    pub fn with_context(mut self, context: ContextData) -> Self {
        self.context = Some(context);
        self
    }

    /// Keeps assignments routed to `role`.
    #[must_use]
    pub fn with_to_role(mut self, role: RoleName) -> Self {
        self.to_role = Some(role);
        self
    }

    /// Keeps direct children of `parent`.
    #[must_use]
    pub const fn with_parent(mut self, parent: AssignmentId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Keeps assignments created inside `[from, until)`; either bound may be
    /// open.
    #[must_use]
    pub const fn assigned_between(
        mut self,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Self {
        self.assigned_from = from;
        self.assigned_until = until;
        self
    }

    /// Returns the user filter.
    #[must_use]
    pub const fn worked_by_user(&self) -> Option<UserId> {
        self.worked_by
    }

    /// Returns the accepted statuses; empty accepts all.
    #[must_use]
    pub fn statuses(&self) -> &[AssignmentStatus] {
        &self.statuses
    }

    /// Returns the accepted assignment types; empty accepts all.
    #[must_use]
    pub fn assignment_types(&self) -> &[AssignmentType] {
        &self.assignment_types
    }

    /// Returns the context type filter.
    #[must_use]
    pub const fn context_type(&self) -> Option<ContextType> {
        self.context_type
    }

    /// Returns the target role filter.
    #[must_use]
    pub const fn to_role(&self) -> Option<&RoleName> {
        self.to_role.as_ref()
    }

    /// Returns the parent filter.
    #[must_use]
    pub const fn parent(&self) -> Option<AssignmentId> {
        self.parent
    }

    /// Returns whether `assignment` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.worked_by
            .is_none_or(|user| assignment.is_worked_by(user))
            && (self.statuses.is_empty() || self.statuses.contains(&assignment.status()))
            && (self.assignment_types.is_empty()
                || self.assignment_types.contains(&assignment.assignment_type()))
            && self
                .context_type
                .is_none_or(|context_type| context_type == assignment.context_type())
            && self
                .context
                .as_ref()
                .is_none_or(|partial| assignment.context_data().contains(partial))
            && self.to_role.as_ref().is_none_or(|role| {
                role.as_str()
                    .eq_ignore_ascii_case(assignment.to_role().as_str())
            })
            && self
                .parent
                .is_none_or(|parent| assignment.parent_assignment_id() == Some(parent))
            && self
                .assigned_from
                .is_none_or(|from| assignment.assigned_at() >= from)
            && self
                .assigned_until
                .is_none_or(|until| assignment.assigned_at() < until)
    }
}

/// Work-queue ordering: priority descending, then due date ascending with
/// undated assignments last, then oldest first.
#[must_use]
pub fn work_queue_order(left: &Assignment, right: &Assignment) -> Ordering {
    right
        .priority()
        .cmp(&left.priority())
        .then_with(|| match (left.due_date(), right.due_date()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| left.assigned_at().cmp(&right.assigned_at()))
        .then_with(|| left.id().cmp(&right.id()))
}
