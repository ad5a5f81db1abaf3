//! The user performing an engine call, with the roles they hold.

use super::{RoleName, UserId};

/// Acting user together with the roles resolved for them.
///
/// Actions whose authority depends on role membership (claiming, approval,
/// cancellation by an administrator) take an `Actor`; the others only need
/// the user identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    roles: Vec<RoleName>,
}

impl Actor {
    /// Creates an actor holding the given roles.
    #[must_use]
    pub fn new(user_id: UserId, roles: impl IntoIterator<Item = RoleName>) -> Self {
        Self {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the roles the actor holds.
    #[must_use]
    pub fn roles(&self) -> &[RoleName] {
        &self.roles
    }

    /// Returns `true` when the actor holds `role`, ignoring ASCII case.
    #[must_use]
    pub fn holds(&self, role: &RoleName) -> bool {
        self.roles
            .iter()
            .any(|held| held.as_str().eq_ignore_ascii_case(role.as_str()))
    }
}
