//! Permission gate — a pure predicate consulted by the engine and
//! the query planner before any entity crosses the boundary to a caller.

use crate::model::AuthContext;

/// Anything with a permission set: `Node` and `Relationship` both qualify.
pub trait Permissioned {
    fn permission_set(&self) -> &hashbrown::HashSet<String>;
}

impl Permissioned for crate::model::Node {
    fn permission_set(&self) -> &hashbrown::HashSet<String> {
        &self.permissions
    }
}

impl Permissioned for crate::model::Relationship {
    fn permission_set(&self) -> &hashbrown::HashSet<String> {
        &self.permissions
    }
}

/// `true` iff the caller may see/mutate `entity`: admins always pass,
/// entities with no declared permissions are public, otherwise the caller
/// needs at least one permission in common.
pub fn can_access(entity: &impl Permissioned, ctx: &AuthContext) -> bool {
    if ctx.is_admin {
        return true;
    }
    let required = entity.permission_set();
    if required.is_empty() {
        return true;
    }
    !required.is_disjoint(&ctx.user_permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    #[test]
    fn admin_bypasses_every_restriction() {
        let node = Node::new("n1", "secret").with_permissions(["classified"]);
        assert!(can_access(&node, &AuthContext::admin()));
    }

    #[test]
    fn public_entity_is_visible_to_anyone() {
        let node = Node::new("n1", "public");
        assert!(can_access(&node, &AuthContext::default()));
    }

    #[test]
    fn restricted_entity_requires_overlapping_permission() {
        let node = Node::new("n1", "secret").with_permissions(["classified"]);
        let ctx = AuthContext::with_permissions(["classified"]);
        assert!(can_access(&node, &ctx));

        let ctx_unrelated = AuthContext::with_permissions(["public"]);
        assert!(!can_access(&node, &ctx_unrelated));

        assert!(!can_access(&node, &AuthContext::default()));
    }
}
