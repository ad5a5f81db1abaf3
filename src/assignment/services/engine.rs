//! Assignment engine: creation, lifecycle transitions, queries and metrics.

use super::{CreateAssignmentRequest, EngineSettings, NotificationDispatch, recipients_for};
use crate::assignment::{
    domain::{
        Actor, Assignment, AssignmentAction, AssignmentChange, AssignmentDomainError,
        AssignmentFilter, AssignmentHistory, AssignmentId, AssignmentMetrics, AssignmentStatus,
        AssignmentTemplate, AssignmentType, CompletionPayload, ContextData, ContextType, DueDate,
        ErrorKind, NewAssignment, Priority, RenderedTemplate, RoleName, UserId, work_queue_order,
    },
    ports::{
        AssignmentRepository, AssignmentRepositoryError, AssignmentTemplateRepository,
        NotificationGateway, RoleResolutionError, RoleResolver, TemplateRepositoryError,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentEngineError {
    /// The assignment does not exist.
    #[error("assignment not found: {0}")]
    NotFound(AssignmentId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AssignmentDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRepositoryError),
    /// Role directory lookup failed.
    #[error(transparent)]
    RoleResolution(#[from] RoleResolutionError),
    /// Template lookup failed.
    #[error(transparent)]
    Templates(#[from] TemplateRepositoryError),
}

impl AssignmentEngineError {
    /// Classifies the error for callers that translate it to transport codes.
    ///
    /// A lost optimistic-concurrency race reads as an invalid transition:
    /// the winning writer already moved the assignment on.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::Repository(AssignmentRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Domain(err) => err.kind(),
            Self::Repository(AssignmentRepositoryError::StaleRevision { .. }) => {
                ErrorKind::InvalidTransition
            }
            Self::Repository(_) | Self::RoleResolution(_) | Self::Templates(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for assignment engine operations.
pub type AssignmentEngineResult<T> = Result<T, AssignmentEngineError>;

/// Assignment orchestration service.
///
/// Every mutation loads the assignment, applies one domain transition,
/// writes the row and its history entry with an optimistic revision check,
/// and then notifies the affected users.
pub struct AssignmentEngine<R, D, N, C>
where
    R: AssignmentRepository,
    D: RoleResolver,
    N: NotificationGateway + 'static,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    roles: Arc<D>,
    notifier: Arc<N>,
    clock: Arc<C>,
    templates: Option<Arc<dyn AssignmentTemplateRepository>>,
    settings: EngineSettings,
}

impl<R, D, N, C> Clone for AssignmentEngine<R, D, N, C>
where
    R: AssignmentRepository,
    D: RoleResolver,
    N: NotificationGateway + 'static,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            roles: Arc::clone(&self.roles),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            templates: self.templates.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R, D, N, C> AssignmentEngine<R, D, N, C>
where
    R: AssignmentRepository,
    D: RoleResolver,
    N: NotificationGateway + 'static,
    C: Clock + Send + Sync,
{
    /// Creates an engine with default settings and no template store.
    #[must_use]
    pub fn new(repository: Arc<R>, roles: Arc<D>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            roles,
            notifier,
            clock,
            templates: None,
            settings: EngineSettings::default(),
        }
    }

    /// Replaces the engine settings.
    #[must_use]
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attaches a template store used by template-based creation.
    #[must_use]
    pub fn with_templates(mut self, templates: Arc<dyn AssignmentTemplateRepository>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the engine's current time.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Creates an assignment, resolving the assignee from the target role
    /// when the request names none.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::Domain`] for invalid input, a
    /// missing template or an invalid parent chain, and infrastructure
    /// errors from the store, role directory or template store.
    pub async fn create(
        &self,
        request: CreateAssignmentRequest,
    ) -> AssignmentEngineResult<Assignment> {
        let assignment_type = AssignmentType::try_from(request.assignment_type.as_str())?;
        let context_type = ContextType::try_from(request.context_type.as_str())?;
        let from_role = RoleName::new(request.from_role.as_str())?;
        let to_role = RoleName::new(request.to_role.as_str())?;
        let requested_priority = request
            .priority
            .as_deref()
            .map(Priority::try_from)
            .transpose()?;
        let requested_approval_role = request
            .approval_role
            .as_deref()
            .map(RoleName::new)
            .transpose()?;

        let template = if request.use_template {
            Some(
                self.find_template(assignment_type, &from_role, &to_role)
                    .await?,
            )
        } else {
            None
        };
        let rendered = template
            .as_ref()
            .map(|preset| preset.render(&template_variables(&request)))
            .transpose()?;

        if let Some(parent) = request.parent_assignment_id {
            self.validate_parent(parent).await?;
        }

        let to_user_id = if request.to_user_id.is_some() {
            request.to_user_id
        } else {
            self.roles.resolve(&to_role, &request.context_data).await?
        };

        let requires_approval = request
            .requires_approval
            .or_else(|| template.as_ref().map(AssignmentTemplate::requires_approval))
            .unwrap_or(false);
        let approval_role = requested_approval_role.or_else(|| {
            template
                .as_ref()
                .filter(|_| requires_approval)
                .and_then(|preset| preset.approval_role().cloned())
        });
        let due_date = match (request.due_date, template.as_ref()) {
            (DueDate::Default, Some(preset)) => preset
                .default_sla_days()
                .map_or(DueDate::Default, DueDate::InDays),
            (requested, _) => requested,
        };
        let RenderedTemplate {
            title: rendered_title,
            description: rendered_description,
            task_instructions: rendered_instructions,
        } = rendered.unwrap_or_else(|| RenderedTemplate {
            title: String::new(),
            description: None,
            task_instructions: None,
        });

        let draft = NewAssignment {
            assignment_type,
            context_type,
            context_data: request.context_data,
            from_role,
            to_role,
            from_user_id: request.from_user_id,
            to_user_id,
            title: request.title.unwrap_or(rendered_title),
            description: request.description.or(rendered_description),
            task_instructions: request.task_instructions.or(rendered_instructions),
            priority: requested_priority
                .or_else(|| template.as_ref().map(AssignmentTemplate::default_priority))
                .unwrap_or_default(),
            due_date,
            requires_approval,
            approval_role,
            parent_assignment_id: request.parent_assignment_id,
        };

        let (assignment, change) = Assignment::new(draft, &self.settings.sla, &*self.clock)?;
        let entry = AssignmentHistory::record(assignment.id(), &change, assignment.assigned_at());
        self.repository.insert(&assignment, &entry).await?;

        info!(
            assignment_id = %assignment.id(),
            assignment_type = assignment.assignment_type().as_str(),
            to_role = assignment.to_role().as_str(),
            to_user_id = assignment.to_user_id().map(UserId::value),
            status = assignment.status().as_str(),
            "assignment created"
        );
        self.dispatch(&assignment, &change).await;
        Ok(assignment)
    }

    /// Takes an unassigned assignment for `user`, who must hold its role.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::NotFound`] for unknown assignments
    /// and [`AssignmentEngineError::Domain`] when the transition or the
    /// caller's authority is invalid.
    pub async fn claim(&self, id: AssignmentId, user: UserId) -> AssignmentEngineResult<Assignment> {
        self.transition_as(id, user, |assignment, actor, clock| {
            assignment.claim(actor, clock)
        })
        .await
    }

    /// Records that the assignee has seen the work.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn acknowledge(
        &self,
        id: AssignmentId,
        user: UserId,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| assignment.acknowledge(user, clock))
            .await
    }

    /// Records that the assignee has started working.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn start(&self, id: AssignmentId, user: UserId) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| assignment.start(user, clock))
            .await
    }

    /// Completes the work on behalf of the assignee or the delegate.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`]. Losing a race against a concurrent
    /// writer returns a repository `StaleRevision` error whose
    /// [`AssignmentEngineError::kind`] is `InvalidTransition`.
    pub async fn complete(
        &self,
        id: AssignmentId,
        user: UserId,
        payload: CompletionPayload,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| {
            assignment.complete(user, payload, clock)
        })
        .await
    }

    /// Signs off a completed assignment.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn approve(
        &self,
        id: AssignmentId,
        user: UserId,
        notes: Option<String>,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition_as(id, user, |assignment, actor, clock| {
            assignment.approve(actor, notes, clock)
        })
        .await
    }

    /// Refuses a completed assignment.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn reject(
        &self,
        id: AssignmentId,
        user: UserId,
        reason: &str,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition_as(id, user, |assignment, actor, clock| {
            assignment.reject(actor, reason, clock)
        })
        .await
    }

    /// Raises an alarm on the assignment, optionally naming who should
    /// intervene.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn escalate(
        &self,
        id: AssignmentId,
        user: UserId,
        reason: &str,
        escalated_to: Option<UserId>,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| {
            assignment.escalate(user, reason, escalated_to, clock)
        })
        .await
    }

    /// Hands execution to `delegate`.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn delegate(
        &self,
        id: AssignmentId,
        user: UserId,
        delegate: UserId,
        reason: Option<String>,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| {
            assignment.delegate(user, delegate, reason, clock)
        })
        .await
    }

    /// Pauses the work.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn hold(
        &self,
        id: AssignmentId,
        user: UserId,
        reason: Option<String>,
    ) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| assignment.hold(user, reason, clock))
            .await
    }

    /// Resumes paused work in its previous status.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn resume(&self, id: AssignmentId, user: UserId) -> AssignmentEngineResult<Assignment> {
        self.transition(id, |assignment, clock| assignment.resume(user, clock))
            .await
    }

    /// Withdraws the assignment. Allowed for the requester and holders of
    /// the configured admin role.
    ///
    /// # Errors
    ///
    /// See [`AssignmentEngine::claim`].
    pub async fn cancel(
        &self,
        id: AssignmentId,
        user: UserId,
        reason: &str,
    ) -> AssignmentEngineResult<Assignment> {
        let admin_role = &self.settings.admin_role;
        self.transition_as(id, user, |assignment, actor, clock| {
            assignment.cancel(actor, admin_role, reason, clock)
        })
        .await
    }

    /// Returns one assignment.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::NotFound`] for unknown assignments.
    pub async fn get(&self, id: AssignmentId) -> AssignmentEngineResult<Assignment> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AssignmentEngineError::NotFound(id))
    }

    /// Returns the audit trail of an assignment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::NotFound`] for unknown assignments.
    pub async fn history(&self, id: AssignmentId) -> AssignmentEngineResult<Vec<AssignmentHistory>> {
        self.get(id).await?;
        Ok(self.repository.history(id).await?)
    }

    /// Lists the work queue of `user`: assignments they hold as assignee or
    /// delegate, narrowed by `query`, most urgent first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::Repository`] when the store fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
        query: AssignmentFilter,
    ) -> AssignmentEngineResult<Vec<Assignment>> {
        let mut assignments = self.repository.list(&query.worked_by(user)).await?;
        assignments.sort_by(work_queue_order);
        Ok(assignments)
    }

    /// Lists assignments nobody holds yet that are routed to a role `user`
    /// holds. Escalated work without an assignee is included.
    ///
    /// # Errors
    ///
    /// Returns infrastructure errors from the store or role directory.
    pub async fn list_claimable(&self, user: UserId) -> AssignmentEngineResult<Vec<Assignment>> {
        let actor = self.actor(user).await?;
        if actor.roles().is_empty() {
            return Ok(Vec::new());
        }
        let filter = AssignmentFilter::new()
            .with_statuses([AssignmentStatus::Unassigned, AssignmentStatus::Escalated]);
        let mut assignments = self.repository.list(&filter).await?;
        assignments.retain(|assignment| {
            assignment.to_user_id().is_none() && actor.holds(assignment.to_role())
        });
        assignments.sort_by(work_queue_order);
        Ok(assignments)
    }

    /// Lists assignments about a business object, matching every supplied
    /// context key. An empty status list accepts every status.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::Repository`] when the store fails.
    pub async fn list_by_context(
        &self,
        context_type: ContextType,
        context: ContextData,
        statuses: impl IntoIterator<Item = AssignmentStatus>,
    ) -> AssignmentEngineResult<Vec<Assignment>> {
        let filter = AssignmentFilter::new()
            .with_context_type(context_type)
            .with_context(context)
            .with_statuses(statuses);
        let mut assignments = self.repository.list(&filter).await?;
        assignments.sort_by_key(|assignment| (assignment.assigned_at(), assignment.id()));
        Ok(assignments)
    }

    /// Lists the direct children of `parent`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::NotFound`] for an unknown parent.
    pub async fn list_children(
        &self,
        parent: AssignmentId,
    ) -> AssignmentEngineResult<Vec<Assignment>> {
        self.get(parent).await?;
        let filter = AssignmentFilter::new().with_parent(parent);
        let mut assignments = self.repository.list(&filter).await?;
        assignments.sort_by_key(|assignment| (assignment.assigned_at(), assignment.id()));
        Ok(assignments)
    }

    /// Lists assignments past their due date, earliest due first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::Repository`] when the store fails.
    pub async fn list_overdue(&self) -> AssignmentEngineResult<Vec<Assignment>> {
        let now = self.clock.utc();
        let open = AssignmentStatus::ALL
            .into_iter()
            .filter(|status| status.is_open());
        let filter = AssignmentFilter::new().with_statuses(open);
        let mut assignments = self.repository.list(&filter).await?;
        assignments.retain(|assignment| assignment.is_overdue(now));
        assignments.sort_by_key(|assignment| (assignment.due_date(), assignment.id()));
        Ok(assignments)
    }

    /// Computes metrics over the assignments matching `filter`. Overdue
    /// counts are judged at call time.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentEngineError::Repository`] when the store fails.
    pub async fn metrics(
        &self,
        filter: AssignmentFilter,
    ) -> AssignmentEngineResult<AssignmentMetrics> {
        let assignments = self.repository.list(&filter).await?;
        Ok(AssignmentMetrics::from_assignments(
            &assignments,
            self.clock.utc(),
        ))
    }

    async fn transition<F>(&self, id: AssignmentId, apply: F) -> AssignmentEngineResult<Assignment>
    where
        F: FnOnce(&mut Assignment, &C) -> Result<AssignmentChange, AssignmentDomainError> + Send,
    {
        let assignment = self.get(id).await?;
        self.commit(assignment, apply).await
    }

    /// Like [`Self::transition`], for actions that depend on the caller's
    /// roles. The assignment is loaded before the role lookup.
    async fn transition_as<F>(
        &self,
        id: AssignmentId,
        user: UserId,
        apply: F,
    ) -> AssignmentEngineResult<Assignment>
    where
        F: FnOnce(&mut Assignment, &Actor, &C) -> Result<AssignmentChange, AssignmentDomainError>
            + Send,
    {
        let assignment = self.get(id).await?;
        let actor = self.actor(user).await?;
        self.commit(assignment, |current, clock| apply(current, &actor, clock))
            .await
    }

    async fn commit<F>(
        &self,
        mut assignment: Assignment,
        apply: F,
    ) -> AssignmentEngineResult<Assignment>
    where
        F: FnOnce(&mut Assignment, &C) -> Result<AssignmentChange, AssignmentDomainError> + Send,
    {
        let id = assignment.id();
        let expected_revision = assignment.revision();
        let change = apply(&mut assignment, &*self.clock)?;
        let entry = AssignmentHistory::record(id, &change, assignment.updated_at());
        self.repository
            .update(&assignment, expected_revision, &entry)
            .await?;

        info!(
            assignment_id = %id,
            action = change.action().as_str(),
            actor = change.actor().value(),
            status = assignment.status().as_str(),
            revision = assignment.revision(),
            "assignment transitioned"
        );
        self.dispatch(&assignment, &change).await;
        Ok(assignment)
    }

    async fn actor(&self, user: UserId) -> AssignmentEngineResult<Actor> {
        let roles = self.roles.roles_of(user).await?;
        Ok(Actor::new(user, roles))
    }

    async fn find_template(
        &self,
        assignment_type: AssignmentType,
        from_role: &RoleName,
        to_role: &RoleName,
    ) -> AssignmentEngineResult<AssignmentTemplate> {
        let missing = || AssignmentDomainError::TemplateNotFound {
            assignment_type: assignment_type.as_str().to_owned(),
            from_role: from_role.as_str().to_owned(),
            to_role: to_role.as_str().to_owned(),
        };
        let Some(templates) = &self.templates else {
            return Err(missing().into());
        };
        let found = templates
            .find_active(assignment_type, from_role, to_role)
            .await?;
        found.ok_or_else(|| missing().into())
    }

    /// Walks the ancestor chain of a prospective parent.
    async fn validate_parent(&self, parent: AssignmentId) -> AssignmentEngineResult<()> {
        let max_depth = self.settings.max_hierarchy_depth;
        let mut visited = HashSet::new();
        let mut cursor = Some(parent);
        let mut depth = 0_usize;
        while let Some(current) = cursor {
            if !visited.insert(current) {
                return Err(AssignmentDomainError::HierarchyCycle(parent).into());
            }
            depth += 1;
            if depth > max_depth {
                return Err(AssignmentDomainError::HierarchyTooDeep { parent, max_depth }.into());
            }
            let ancestor = self
                .repository
                .find_by_id(current)
                .await?
                .ok_or(AssignmentDomainError::ParentNotFound(current))?;
            cursor = ancestor.parent_assignment_id();
        }
        Ok(())
    }

    async fn dispatch(&self, assignment: &Assignment, change: &AssignmentChange) {
        let action = change.action();
        let recipients = recipients_for(assignment, action, change.actor());
        if recipients.is_empty() {
            return;
        }

        if self.settings.notification_dispatch == NotificationDispatch::Inline {
            deliver(self.notifier.as_ref(), recipients, assignment, action).await;
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            deliver(self.notifier.as_ref(), recipients, assignment, action).await;
            return;
        };
        let notifier = Arc::clone(&self.notifier);
        let snapshot = assignment.clone();
        drop(runtime.spawn(async move {
            deliver(notifier.as_ref(), recipients, &snapshot, action).await;
        }));
    }
}

/// Context data merged with explicit variables; variables win on clashes.
fn template_variables(request: &CreateAssignmentRequest) -> Map<String, Value> {
    let mut variables = request.context_data.to_json_object();
    for (key, value) in &request.template_variables {
        variables.insert(key.clone(), value.clone());
    }
    variables
}

async fn deliver<N>(
    notifier: &N,
    recipients: Vec<UserId>,
    assignment: &Assignment,
    action: AssignmentAction,
) where
    N: NotificationGateway + ?Sized,
{
    for recipient in recipients {
        if let Err(err) = notifier.notify(recipient, assignment, action).await {
            warn!(
                recipient = recipient.value(),
                assignment_id = %assignment.id(),
                action = action.as_str(),
                error = %err,
                "assignment notification failed"
            );
        }
    }
}
