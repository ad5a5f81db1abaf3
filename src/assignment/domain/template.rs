//! Reusable presets for common routings.

use super::{AssignmentDomainError, AssignmentType, Priority, RoleName, TemplateId};
use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Preset for an `(assignment_type, from_role, to_role)` routing.
///
/// Text fields are `minijinja` templates rendered against the request's
/// context data and explicit template variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTemplate {
    id: TemplateId,
    assignment_type: AssignmentType,
    from_role: RoleName,
    to_role: RoleName,
    title_template: String,
    description_template: Option<String>,
    instructions_template: Option<String>,
    default_priority: Priority,
    default_sla_days: Option<u32>,
    requires_approval: bool,
    approval_role: Option<RoleName>,
    active: bool,
}

/// Text fields of a template after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Rendered title.
    pub title: String,
    /// Rendered description.
    pub description: Option<String>,
    /// Rendered instructions.
    pub task_instructions: Option<String>,
}

impl AssignmentTemplate {
    /// Creates an active template with medium priority and no approval.
    #[must_use]
    pub fn new(
        assignment_type: AssignmentType,
        from_role: RoleName,
        to_role: RoleName,
        title_template: impl Into<String>,
    ) -> Self {
        Self {
            id: TemplateId::new(),
            assignment_type,
            from_role,
            to_role,
            title_template: title_template.into(),
            description_template: None,
            instructions_template: None,
            default_priority: Priority::default(),
            default_sla_days: None,
            requires_approval: false,
            approval_role: None,
            active: true,
        }
    }

    /// Sets the description template.
    #[must_use]
    pub fn with_description_template(mut self, template: impl Into<String>) -> Self {
        self.description_template = Some(template.into());
        self
    }

    /// Sets the instructions template.
    #[must_use]
    pub fn with_instructions_template(mut self, template: impl Into<String>) -> Self {
        self.instructions_template = Some(template.into());
        self
    }

    /// Sets the priority used when the request gives none.
    #[must_use]
    pub const fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    /// Overrides the per-type SLA for assignments created from this template.
    #[must_use]
    pub const fn with_default_sla_days(mut self, days: u32) -> Self {
        self.default_sla_days = Some(days);
        self
    }

    /// Requires sign-off, optionally restricted to `approval_role`.
    #[must_use]
    pub fn requiring_approval(mut self, approval_role: Option<RoleName>) -> Self {
        self.requires_approval = true;
        self.approval_role = approval_role;
        self
    }

    /// Marks the template inactive; lookups skip it.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Returns the routed assignment type.
    #[must_use]
    pub const fn assignment_type(&self) -> AssignmentType {
        self.assignment_type
    }

    /// Returns the requester role.
    #[must_use]
    pub const fn from_role(&self) -> &RoleName {
        &self.from_role
    }

    /// Returns the assignee role.
    #[must_use]
    pub const fn to_role(&self) -> &RoleName {
        &self.to_role
    }

    /// Returns the default priority.
    #[must_use]
    pub const fn default_priority(&self) -> Priority {
        self.default_priority
    }

    /// Returns the SLA override in days.
    #[must_use]
    pub const fn default_sla_days(&self) -> Option<u32> {
        self.default_sla_days
    }

    /// Returns whether assignments from this template require sign-off.
    #[must_use]
    pub const fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    /// Returns the sign-off role.
    #[must_use]
    pub const fn approval_role(&self) -> Option<&RoleName> {
        self.approval_role.as_ref()
    }

    /// Returns whether lookups may select this template.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the template serves the given routing. Role names
    /// compare ignoring ASCII case.
    #[must_use]
    pub fn routes(
        &self,
        assignment_type: AssignmentType,
        from_role: &RoleName,
        to_role: &RoleName,
    ) -> bool {
        self.assignment_type == assignment_type
            && self
                .from_role
                .as_str()
                .eq_ignore_ascii_case(from_role.as_str())
            && self.to_role.as_str().eq_ignore_ascii_case(to_role.as_str())
    }

    /// Renders the text fields against `variables`.
    ///
    /// Undefined placeholders are errors rather than empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::TemplateRender`] when a template does
    /// not parse or references an unknown variable.
    pub fn render(
        &self,
        variables: &Map<String, Value>,
    ) -> Result<RenderedTemplate, AssignmentDomainError> {
        let mut environment = Environment::new();
        environment.set_undefined_behavior(UndefinedBehavior::Strict);

        let title = render_field(&environment, "title", &self.title_template, variables)?;
        let description = self
            .description_template
            .as_deref()
            .map(|template| render_field(&environment, "description", template, variables))
            .transpose()?;
        let task_instructions = self
            .instructions_template
            .as_deref()
            .map(|template| {
                render_field(&environment, "task_instructions", template, variables)
            })
            .transpose()?;

        Ok(RenderedTemplate {
            title,
            description,
            task_instructions,
        })
    }
}

fn render_field(
    environment: &Environment<'_>,
    field: &'static str,
    template: &str,
    variables: &Map<String, Value>,
) -> Result<String, AssignmentDomainError> {
    environment
        .render_str(template, variables)
        .map_err(|error| AssignmentDomainError::TemplateRender {
            field,
            reason: error.to_string(),
        })
}
