//! Read-only port for assignment templates.

use crate::assignment::domain::{AssignmentTemplate, AssignmentType, RoleName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for template lookups.
pub type TemplateRepositoryResult<T> = Result<T, TemplateRepositoryError>;

/// Template lookup contract.
#[async_trait]
pub trait AssignmentTemplateRepository: Send + Sync {
    /// Finds the active template for a routing.
    ///
    /// Returns `None` when no active template matches.
    async fn find_active(
        &self,
        assignment_type: AssignmentType,
        from_role: &RoleName,
        to_role: &RoleName,
    ) -> TemplateRepositoryResult<Option<AssignmentTemplate>>;
}

/// Errors returned by template repositories.
#[derive(Debug, Clone, Error)]
pub enum TemplateRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TemplateRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
