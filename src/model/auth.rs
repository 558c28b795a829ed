//! Caller identity for permission checks.

use hashbrown::HashSet;

/// Caller's permission set plus admin flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub user_permissions: HashSet<String>,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn admin() -> Self {
        Self {
            user_permissions: HashSet::new(),
            is_admin: true,
        }
    }

    pub fn with_permissions(perms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            user_permissions: perms.into_iter().map(Into::into).collect(),
            is_admin: false,
        }
    }
}
