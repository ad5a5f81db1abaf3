//! In-memory role directory.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::assignment::{
    domain::{ContextData, RoleName, UserId},
    ports::{RoleResolutionError, RoleResolutionResult, RoleResolver},
};

const REPORT_OWNER_ROLE: &str = "Report Owner";
const REPORT_ID_KEY: &str = "report_id";

/// Role membership held in memory.
///
/// `Report Owner` resolves to the owner registered for the context's
/// `report_id` when that owner is active. Every other lookup picks the
/// lowest-id active user holding the role.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: BTreeMap<UserId, DirectoryUser>,
    report_owners: HashMap<String, UserId>,
}

#[derive(Debug)]
struct DirectoryUser {
    roles: Vec<RoleName>,
    active: bool,
}

impl DirectoryUser {
    fn holds(&self, role: &RoleName) -> bool {
        self.roles
            .iter()
            .any(|held| held.as_str().eq_ignore_ascii_case(role.as_str()))
    }
}

impl InMemoryRoleDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active user holding `roles`, replacing any previous
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`RoleResolutionError::Unavailable`] when the directory lock
    /// is poisoned.
    pub fn add_user(
        &self,
        user: UserId,
        roles: impl IntoIterator<Item = RoleName>,
    ) -> RoleResolutionResult<()> {
        let entry = DirectoryUser {
            roles: roles.into_iter().collect(),
            active: true,
        };
        self.with_state(|state| {
            state.users.insert(user, entry);
        })
    }

    /// Marks a user inactive so resolution skips them.
    ///
    /// # Errors
    ///
    /// Returns [`RoleResolutionError::Unavailable`] when the directory lock
    /// is poisoned.
    pub fn deactivate(&self, user: UserId) -> RoleResolutionResult<()> {
        self.with_state(|state| {
            if let Some(entry) = state.users.get_mut(&user) {
                entry.active = false;
            }
        })
    }

    /// Records `owner` as the owner of the report identified by `report_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RoleResolutionError::Unavailable`] when the directory lock
    /// is poisoned.
    pub fn set_report_owner(
        &self,
        report_id: impl Into<Value>,
        owner: UserId,
    ) -> RoleResolutionResult<()> {
        let key = report_key(&report_id.into());
        self.with_state(|state| {
            if let Some(report) = key {
                state.report_owners.insert(report, owner);
            }
        })
    }

    fn with_state<T>(&self, apply: impl FnOnce(&mut DirectoryState) -> T) -> RoleResolutionResult<T> {
        let mut state = self.state.write().map_err(|err| {
            RoleResolutionError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(apply(&mut state))
    }

    fn read_with<T>(&self, read: impl FnOnce(&DirectoryState) -> T) -> RoleResolutionResult<T> {
        let state = self.state.read().map_err(|err| {
            RoleResolutionError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(read(&state))
    }
}

impl DirectoryState {
    fn report_owner(&self, context: &ContextData) -> Option<UserId> {
        let report = context.get(REPORT_ID_KEY).and_then(report_key)?;
        let owner = self.report_owners.get(&report).copied()?;
        self.users
            .get(&owner)
            .is_some_and(|entry| entry.active)
            .then_some(owner)
    }

    fn first_holder(&self, role: &RoleName) -> Option<UserId> {
        self.users
            .iter()
            .find(|(_, entry)| entry.active && entry.holds(role))
            .map(|(user, _)| *user)
    }
}

/// Normalizes numeric and textual report identifiers to one key.
fn report_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[async_trait]
impl RoleResolver for InMemoryRoleDirectory {
    async fn resolve(
        &self,
        role: &RoleName,
        context: &ContextData,
    ) -> RoleResolutionResult<Option<UserId>> {
        let owner_lookup = role.as_str().eq_ignore_ascii_case(REPORT_OWNER_ROLE);
        self.read_with(|state| {
            owner_lookup
                .then(|| state.report_owner(context))
                .flatten()
                .or_else(|| state.first_holder(role))
        })
    }

    async fn roles_of(&self, user: UserId) -> RoleResolutionResult<Vec<RoleName>> {
        self.read_with(|state| {
            state
                .users
                .get(&user)
                .filter(|entry| entry.active)
                .map(|entry| entry.roles.clone())
                .unwrap_or_default()
        })
    }
}
