//! Repository port for assignment persistence and its audit trail.

use crate::assignment::domain::{Assignment, AssignmentFilter, AssignmentHistory, AssignmentId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for assignment repository operations.
pub type AssignmentRepositoryResult<T> = Result<T, AssignmentRepositoryError>;

/// Assignment persistence contract.
///
/// Every write stores the assignment row and its history entry in one unit
/// of work: either both are visible afterwards or neither is.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Stores a new assignment together with its `created` history entry.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRepositoryError::DuplicateAssignment`] when the
    /// identifier already exists.
    async fn insert(
        &self,
        assignment: &Assignment,
        history: &AssignmentHistory,
    ) -> AssignmentRepositoryResult<()>;

    /// Replaces a stored assignment and appends one history entry, provided
    /// the stored revision still equals `expected_revision`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRepositoryError::NotFound`] when the assignment
    /// does not exist and [`AssignmentRepositoryError::StaleRevision`] when
    /// another writer got there first.
    async fn update(
        &self,
        assignment: &Assignment,
        expected_revision: u64,
        history: &AssignmentHistory,
    ) -> AssignmentRepositoryResult<()>;

    /// Finds an assignment by identifier.
    ///
    /// Returns `None` when the assignment does not exist.
    async fn find_by_id(&self, id: AssignmentId) -> AssignmentRepositoryResult<Option<Assignment>>;

    /// Returns all assignments matching `filter`, in no particular order.
    async fn list(&self, filter: &AssignmentFilter) -> AssignmentRepositoryResult<Vec<Assignment>>;

    /// Returns the audit trail of an assignment, oldest first.
    async fn history(&self, id: AssignmentId)
    -> AssignmentRepositoryResult<Vec<AssignmentHistory>>;
}

/// Errors returned by assignment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AssignmentRepositoryError {
    /// An assignment with the same identifier already exists.
    #[error("duplicate assignment identifier: {0}")]
    DuplicateAssignment(AssignmentId),

    /// The assignment was not found.
    #[error("assignment not found: {0}")]
    NotFound(AssignmentId),

    /// The stored revision differs from the one the caller read.
    #[error("assignment {id} changed concurrently: expected revision {expected}, found {actual}")]
    StaleRevision {
        /// Assignment being written.
        id: AssignmentId,
        /// Revision the caller read.
        expected: u64,
        /// Revision currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssignmentRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
