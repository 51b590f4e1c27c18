//! Group roles
//!
//! A role belongs to one group type (entity type + bundle) and holds a set of
//! group permissions. Admin roles hold every permission of the group.

use serde::{Deserialize, Serialize};

use og_rbac::{CacheableDependency, PermissionSet};

/// Role held by users without an active membership.
pub const NON_MEMBER: &str = "non-member";

/// Role held by every active member.
pub const MEMBER: &str = "member";

/// Default admin role of a group type.
pub const ADMINISTRATOR: &str = "administrator";

/// How a role is assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Assigned implicitly (member, non-member)
    Required,

    /// Assigned explicitly to memberships
    #[default]
    Standard,
}

/// A role within a group type.
///
/// # Examples
///
/// ```
/// use og_membership::Role;
///
/// let role = Role::new("node", "article", "editor")
///     .with_permission("update group")
///     .with_permission("view group");
/// assert_eq!(role.id, "node-article-editor");
/// assert!(role.has_permission("update group"));
///
/// let admin = Role::new("node", "article", "administrator").with_admin(true);
/// assert!(admin.has_permission("anything at all"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Role id, `{group_type}-{group_bundle}-{name}`
    pub id: String,

    /// Entity type id of the group type this role belongs to
    pub group_type: String,

    /// Bundle of the group type this role belongs to
    pub group_bundle: String,

    /// Machine name (e.g., "member")
    pub name: String,

    /// Human-readable label
    pub label: Option<String>,

    /// Permissions granted by this role
    #[serde(default)]
    pub permissions: PermissionSet,

    /// Whether the role grants every permission
    #[serde(default)]
    pub is_admin: bool,

    /// How the role is assigned
    #[serde(default)]
    pub role_type: RoleType,
}

impl Role {
    /// Creates a standard, non-admin role with no permissions.
    ///
    /// # Arguments
    ///
    /// * `group_type` - The group entity type id
    /// * `group_bundle` - The group bundle
    /// * `name` - The role machine name
    pub fn new(
        group_type: impl Into<String>,
        group_bundle: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let group_type = group_type.into();
        let group_bundle = group_bundle.into();
        let name = name.into();
        Self {
            id: format!("{}-{}-{}", group_type, group_bundle, name),
            group_type,
            group_bundle,
            role_type: if name == MEMBER || name == NON_MEMBER {
                RoleType::Required
            } else {
                RoleType::Standard
            },
            name,
            label: None,
            permissions: PermissionSet::new(),
            is_admin: false,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Grant a permission.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.add(permission);
        self
    }

    /// Grant several permissions.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.add_all(permissions);
        self
    }

    /// Mark the role as admin.
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// Grant a permission.
    pub fn grant_permission(&mut self, permission: impl Into<String>) {
        self.permissions.add(permission);
    }

    /// Revoke a permission.
    pub fn revoke_permission(&mut self, permission: &str) {
        self.permissions.remove(permission);
    }

    /// Check if the role grants a permission. Admin roles grant everything.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin || self.permissions.has(permission)
    }

    /// Check if the role belongs to the given group type.
    pub fn applies_to(&self, group_type: &str, group_bundle: &str) -> bool {
        self.group_type == group_type && self.group_bundle == group_bundle
    }
}

impl CacheableDependency for Role {
    fn cache_tags(&self) -> Vec<String> {
        vec![format!("og_role:{}", self.id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_id() {
        let role = Role::new("node", "article", "member");
        assert_eq!(role.id, "node-article-member");
        assert_eq!(role.role_type, RoleType::Required);
        assert_eq!(Role::new("node", "article", "editor").role_type, RoleType::Standard);
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut role = Role::new("node", "article", "editor");
        role.grant_permission("update group");
        assert!(role.has_permission("update group"));

        role.revoke_permission("update group");
        assert!(!role.has_permission("update group"));
    }

    #[test]
    fn test_admin_has_every_permission() {
        let role = Role::new("node", "article", ADMINISTRATOR).with_admin(true);
        assert!(role.permissions.is_empty());
        assert!(role.has_permission("update group"));
    }

    #[test]
    fn test_applies_to() {
        let role = Role::new("node", "article", MEMBER);
        assert!(role.applies_to("node", "article"));
        assert!(!role.applies_to("node", "page"));
    }

    #[test]
    fn test_cache_tags() {
        let role = Role::new("node", "article", MEMBER);
        assert_eq!(role.cache_tags(), vec!["og_role:node-article-member".to_string()]);
    }
}
