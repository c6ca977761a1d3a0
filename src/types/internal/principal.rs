use crate::types::db::{role, user};
use crate::types::internal::permission::Permission;

/// Whoever is acting on a request
#[derive(Debug, Clone)]
pub enum Principal {
    /// No signed-in user. Can never do anything.
    Anonymous,
    Member {
        user: user::Model,
        role: Option<role::Model>,
    },
}

impl Principal {
    pub fn member(user: user::Model, role: Option<role::Model>) -> Self {
        Principal::Member { user, role }
    }

    /// A user without a role holds no permissions.
    pub fn can(&self, perm: Permission) -> bool {
        match self {
            Principal::Anonymous => false,
            Principal::Member { role, .. } => role
                .as_ref()
                .is_some_and(|role| role.has_permission(perm)),
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.can(Permission::Admin)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    pub fn user(&self) -> Option<&user::Model> {
        match self {
            Principal::Anonymous => None,
            Principal::Member { user, .. } => Some(user),
        }
    }
}
