//! Port for mapping organizational roles to users.

use crate::assignment::domain::{ContextData, RoleName, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for role resolution.
pub type RoleResolutionResult<T> = Result<T, RoleResolutionError>;

/// Directory of role membership.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Picks the user who should receive work routed to `role` for the given
    /// context.
    ///
    /// Returns `None` when no active user holds the role.
    ///
    /// # Errors
    ///
    /// Returns [`RoleResolutionError::Unavailable`] when the directory cannot
    /// be queried.
    async fn resolve(
        &self,
        role: &RoleName,
        context: &ContextData,
    ) -> RoleResolutionResult<Option<UserId>>;

    /// Lists the roles `user` holds. Unknown users hold no roles.
    ///
    /// # Errors
    ///
    /// Returns [`RoleResolutionError::Unavailable`] when the directory cannot
    /// be queried.
    async fn roles_of(&self, user: UserId) -> RoleResolutionResult<Vec<RoleName>>;
}

/// Errors returned by role resolvers.
#[derive(Debug, Clone, Error)]
pub enum RoleResolutionError {
    /// The directory backend failed.
    #[error("role directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RoleResolutionError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
