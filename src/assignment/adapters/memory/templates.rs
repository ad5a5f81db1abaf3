//! In-memory template store.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::assignment::{
    domain::{AssignmentTemplate, AssignmentType, RoleName},
    ports::{AssignmentTemplateRepository, TemplateRepositoryError, TemplateRepositoryResult},
};

/// Thread-safe in-memory template store. Later registrations win when two
/// active templates serve the same routing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateRepository {
    templates: Arc<RwLock<Vec<AssignmentTemplate>>>,
}

impl InMemoryTemplateRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `templates`.
    #[must_use]
    pub fn with_templates(templates: impl IntoIterator<Item = AssignmentTemplate>) -> Self {
        Self {
            templates: Arc::new(RwLock::new(templates.into_iter().collect())),
        }
    }

    /// Registers a template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateRepositoryError::Persistence`] when the store lock
    /// is poisoned.
    pub fn register(&self, template: AssignmentTemplate) -> TemplateRepositoryResult<()> {
        let mut templates = self.templates.write().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        templates.push(template);
        Ok(())
    }
}

#[async_trait]
impl AssignmentTemplateRepository for InMemoryTemplateRepository {
    async fn find_active(
        &self,
        assignment_type: AssignmentType,
        from_role: &RoleName,
        to_role: &RoleName,
    ) -> TemplateRepositoryResult<Option<AssignmentTemplate>> {
        let templates = self.templates.read().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(templates
            .iter()
            .rev()
            .find(|template| {
                template.is_active() && template.routes(assignment_type, from_role, to_role)
            })
            .cloned())
    }
}
