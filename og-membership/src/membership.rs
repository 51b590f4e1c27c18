//! Membership domain models
//!
//! This module provides the membership entity that links a user to a group.
//! A membership carries the user's roles in the group and may grant
//! permissions directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use og_rbac::{CacheableDependency, PermissionSet};

use crate::account::UserId;
use crate::entity::Entity;
use crate::roles::Role;

/// Lifecycle state of a membership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    /// Full member
    #[default]
    Active,

    /// Awaiting approval
    Pending,

    /// Banned from the group
    Blocked,
}

impl MembershipState {
    /// Parse a state from its string representation (case-insensitive).
    ///
    /// ```
    /// use og_membership::MembershipState;
    ///
    /// assert_eq!(MembershipState::parse("ACTIVE"), Some(MembershipState::Active));
    /// assert_eq!(MembershipState::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Get string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Blocked => "blocked",
        }
    }
}

/// Group membership linking a user to a group.
///
/// # Examples
///
/// ```
/// use og_membership::{Entity, Membership, Role};
///
/// let group = Entity::new("node", "article", "1");
/// let membership = Membership::new(&group, 5)
///     .with_role(Role::new("node", "article", "member").with_permission("view group"));
///
/// assert!(membership.is_active());
/// assert!(membership.has_permission("view group"));
/// assert!(!membership.has_permission("update group"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Entity type id of the group
    pub group_entity_type: String,

    /// Bundle of the group
    pub group_bundle: String,

    /// Id of the group
    pub group_id: String,

    /// User ID
    pub user_id: UserId,

    /// Membership state
    pub state: MembershipState,

    /// Roles within the group, in assignment order
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Permissions granted directly, beyond the roles
    #[serde(default)]
    pub custom_permissions: PermissionSet,

    /// When the user joined
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a new active membership with no roles.
    ///
    /// # Arguments
    ///
    /// * `group` - The group entity
    /// * `user_id` - The user ID
    pub fn new(group: &Entity, user_id: UserId) -> Self {
        Self {
            id: Uuid::now_v7(),
            group_entity_type: group.entity_type_id.clone(),
            group_bundle: group.bundle.clone(),
            group_id: group.id.clone(),
            user_id,
            state: MembershipState::Active,
            roles: Vec::new(),
            custom_permissions: PermissionSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the membership state.
    pub fn with_state(mut self, state: MembershipState) -> Self {
        self.state = state;
        self
    }

    /// Add a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.add_role(role);
        self
    }

    /// Add a role, unless one with the same id is already assigned.
    pub fn add_role(&mut self, role: Role) {
        if !self.roles.iter().any(|r| r.id == role.id) {
            self.roles.push(role);
        }
    }

    /// Remove a role by id.
    pub fn remove_role(&mut self, role_id: &str) {
        self.roles.retain(|r| r.id != role_id);
    }

    /// Check if a role with the given id is assigned.
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r.id == role_id)
    }

    /// Add a custom permission to this membership.
    pub fn add_permission(&mut self, permission: impl Into<String>) {
        self.custom_permissions.add(permission);
    }

    /// Remove a custom permission from this membership.
    pub fn remove_permission(&mut self, permission: &str) {
        self.custom_permissions.remove(permission);
    }

    /// Check if the membership grants a permission.
    ///
    /// Blocked memberships grant nothing. Otherwise the permission is granted
    /// directly or by any role, and admin roles grant every permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_blocked() {
            return false;
        }

        self.custom_permissions.has(permission)
            || self.roles.iter().any(|role| role.has_permission(permission))
    }

    /// Check if any role of this membership is an admin role.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role.is_admin)
    }

    /// Check if the membership is active.
    pub fn is_active(&self) -> bool {
        self.state == MembershipState::Active
    }

    /// Check if the membership is pending.
    pub fn is_pending(&self) -> bool {
        self.state == MembershipState::Pending
    }

    /// Check if the membership is blocked.
    pub fn is_blocked(&self) -> bool {
        self.state == MembershipState::Blocked
    }

    /// Check if this membership belongs to the given group.
    pub fn belongs_to(&self, group: &Entity) -> bool {
        self.group_entity_type == group.entity_type_id && self.group_id == group.id
    }
}

impl CacheableDependency for Membership {
    fn cache_tags(&self) -> Vec<String> {
        let mut tags = vec![format!("og_membership:{}", self.id)];
        tags.extend(self.roles.iter().flat_map(|role| role.cache_tags()));
        tags
    }
}
