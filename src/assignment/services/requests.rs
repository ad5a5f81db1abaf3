//! Request payloads accepted by the assignment engine.

use crate::assignment::domain::{AssignmentId, ContextData, DueDate, UserId};
use serde_json::{Map, Value};

/// Request payload for creating an assignment.
///
/// Type, context type, priority and role names arrive as raw strings from
/// phase adapters and are validated by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssignmentRequest {
    pub(super) assignment_type: String,
    pub(super) context_type: String,
    pub(super) from_role: String,
    pub(super) to_role: String,
    pub(super) from_user_id: UserId,
    pub(super) to_user_id: Option<UserId>,
    pub(super) title: Option<String>,
    pub(super) description: Option<String>,
    pub(super) task_instructions: Option<String>,
    pub(super) context_data: ContextData,
    pub(super) priority: Option<String>,
    pub(super) due_date: DueDate,
    pub(super) requires_approval: Option<bool>,
    pub(super) approval_role: Option<String>,
    pub(super) parent_assignment_id: Option<AssignmentId>,
    pub(super) use_template: bool,
    pub(super) template_variables: Map<String, Value>,
}

impl CreateAssignmentRequest {
    /// Creates a request with the required routing fields and a title.
    #[must_use]
    pub fn new(
        assignment_type: impl Into<String>,
        context_type: impl Into<String>,
        from_role: impl Into<String>,
        to_role: impl Into<String>,
        from_user_id: UserId,
        title: impl Into<String>,
    ) -> Self {
        let mut request = Self::routed(
            assignment_type.into(),
            context_type.into(),
            from_role.into(),
            to_role.into(),
            from_user_id,
        );
        request.title = Some(title.into());
        request
    }

    /// Creates a request whose text fields come from the active template for
    /// the routing.
    ///
    /// Fields set explicitly on the request override the template.
    #[must_use]
    pub fn from_template(
        assignment_type: impl Into<String>,
        context_type: impl Into<String>,
        from_role: impl Into<String>,
        to_role: impl Into<String>,
        from_user_id: UserId,
    ) -> Self {
        let mut request = Self::routed(
            assignment_type.into(),
            context_type.into(),
            from_role.into(),
            to_role.into(),
            from_user_id,
        );
        request.use_template = true;
        request
    }

    fn routed(
        assignment_type: String,
        context_type: String,
        from_role: String,
        to_role: String,
        from_user_id: UserId,
    ) -> Self {
        Self {
            assignment_type,
            context_type,
            from_role,
            to_role,
            from_user_id,
            to_user_id: None,
            title: None,
            description: None,
            task_instructions: None,
            context_data: ContextData::new(),
            priority: None,
            due_date: DueDate::Default,
            requires_approval: None,
            approval_role: None,
            parent_assignment_id: None,
            use_template: false,
            template_variables: Map::new(),
        }
    }

    /// Routes the assignment to a specific user instead of resolving the
    /// role.
    #[must_use]
    pub const fn with_to_user(mut self, user: UserId) -> Self {
        self.to_user_id = Some(user);
        self
    }

    /// Overrides the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the instructions.
    #[must_use]
    pub fn with_task_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.task_instructions = Some(instructions.into());
        self
    }

    /// Sets the context data.
    #[must_use]
    pub fn with_context_data(mut self, context_data: ContextData) -> Self {
        self.context_data = context_data;
        self
    }

    /// Sets the priority label.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets how the due date is chosen.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DueDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Requires sign-off after completion by any user.
    #[must_use]
    pub const fn requiring_approval(mut self) -> Self {
        self.requires_approval = Some(true);
        self
    }

    /// Sets whether sign-off is required.
    #[must_use]
    pub const fn with_requires_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = Some(requires_approval);
        self
    }

    /// Restricts sign-off to holders of `role`.
    #[must_use]
    pub fn with_approval_role(mut self, role: impl Into<String>) -> Self {
        self.approval_role = Some(role.into());
        self
    }

    /// Links the assignment to the one that spawned it.
    #[must_use]
    pub const fn with_parent(mut self, parent: AssignmentId) -> Self {
        self.parent_assignment_id = Some(parent);
        self
    }

    /// Adds a template variable. Variables shadow context data entries of
    /// the same name.
    #[must_use]
    pub fn with_template_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.template_variables.insert(key.into(), value.into());
        self
    }
}
