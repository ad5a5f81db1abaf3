//! In-memory repository for assignments and their audit trail.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::assignment::{
    domain::{Assignment, AssignmentFilter, AssignmentHistory, AssignmentId},
    ports::{AssignmentRepository, AssignmentRepositoryError, AssignmentRepositoryResult},
};

/// Thread-safe in-memory assignment repository.
///
/// Each write holds the lock across both the assignment row and the history
/// append, so readers never see one without the other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentRepository {
    state: Arc<RwLock<InMemoryAssignmentState>>,
}

#[derive(Debug, Default)]
struct InMemoryAssignmentState {
    assignments: HashMap<AssignmentId, Assignment>,
    history: HashMap<AssignmentId, Vec<AssignmentHistory>>,
}

impl InMemoryAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> AssignmentRepositoryResult<RwLockWriteGuard<'_, InMemoryAssignmentState>> {
        self.state.write().map_err(|err| {
            AssignmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_with<T>(
        &self,
        read: impl FnOnce(&InMemoryAssignmentState) -> T,
    ) -> AssignmentRepositoryResult<T> {
        let state = self.state.read().map_err(|err| {
            AssignmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(read(&state))
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn insert(
        &self,
        assignment: &Assignment,
        history: &AssignmentHistory,
    ) -> AssignmentRepositoryResult<()> {
        let mut state = self.write()?;
        if state.assignments.contains_key(&assignment.id()) {
            return Err(AssignmentRepositoryError::DuplicateAssignment(
                assignment.id(),
            ));
        }

        state
            .assignments
            .insert(assignment.id(), assignment.clone());
        state
            .history
            .entry(assignment.id())
            .or_default()
            .push(history.clone());
        Ok(())
    }

    async fn update(
        &self,
        assignment: &Assignment,
        expected_revision: u64,
        history: &AssignmentHistory,
    ) -> AssignmentRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .assignments
            .get_mut(&assignment.id())
            .ok_or(AssignmentRepositoryError::NotFound(assignment.id()))?;
        if stored.revision() != expected_revision {
            return Err(AssignmentRepositoryError::StaleRevision {
                id: assignment.id(),
                expected: expected_revision,
                actual: stored.revision(),
            });
        }

        *stored = assignment.clone();
        state
            .history
            .entry(assignment.id())
            .or_default()
            .push(history.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AssignmentId) -> AssignmentRepositoryResult<Option<Assignment>> {
        self.read_with(|state| state.assignments.get(&id).cloned())
    }

    async fn list(&self, filter: &AssignmentFilter) -> AssignmentRepositoryResult<Vec<Assignment>> {
        self.read_with(|state| {
            state
                .assignments
                .values()
                .filter(|assignment| filter.matches(assignment))
                .cloned()
                .collect()
        })
    }

    async fn history(
        &self,
        id: AssignmentId,
    ) -> AssignmentRepositoryResult<Vec<AssignmentHistory>> {
        self.read_with(|state| state.history.get(&id).cloned().unwrap_or_default())
    }
}
