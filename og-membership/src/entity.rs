//! Entity models
//!
//! Groups and group content are both plain entities: a type, a bundle and an
//! id, optionally owned by a user. Whether an entity acts as a group, as group
//! content, or as both is decided by bundle configuration outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use og_rbac::CacheableDependency;

use crate::account::UserId;

/// Entity type id of user accounts.
pub const USER_ENTITY_TYPE_ID: &str = "user";

/// A content entity that may be a group, group content, or both.
///
/// `==` compares every field except `created_at`, so two handles loaded for
/// the same stored entity are equal unless one was modified.
/// [`same_entity`](Entity::same_entity) compares identity only.
///
/// # Examples
///
/// ```
/// use og_membership::Entity;
///
/// let group = Entity::new("node", "article", "1").with_owner(7);
/// assert_eq!(group.owner_id, Some(7));
/// assert!(group.is_owned_by(7));
/// assert_eq!(group.cache_tag(), "node:1");
/// assert_eq!(group.list_cache_tag(), "node_list");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq)]
pub struct Entity {
    /// Entity type id (e.g., "node", "user")
    pub entity_type_id: String,

    /// Bundle within the entity type (e.g., "article")
    pub bundle: String,

    /// Entity id, unique within its type
    pub id: String,

    /// Owner user id, if the entity type tracks ownership
    pub owner_id: Option<UserId>,

    /// Human-readable label
    pub label: Option<String>,

    /// When the entity was created
    pub created_at: DateTime<Utc>,
}

impl Entity {
    /// Creates a new unowned entity.
    ///
    /// # Arguments
    ///
    /// * `entity_type_id` - The entity type id
    /// * `bundle` - The bundle
    /// * `id` - The entity id
    pub fn new(
        entity_type_id: impl Into<String>,
        bundle: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            entity_type_id: entity_type_id.into(),
            bundle: bundle.into(),
            id: id.into(),
            owner_id: None,
            label: None,
            created_at: Utc::now(),
        }
    }

    /// Creates the entity representing a user account.
    ///
    /// ```
    /// use og_membership::Entity;
    ///
    /// let user = Entity::user(5);
    /// assert!(user.is_user());
    /// assert_eq!(user.user_id(), Some(5));
    /// ```
    pub fn user(user_id: UserId) -> Self {
        Self::new(USER_ENTITY_TYPE_ID, USER_ENTITY_TYPE_ID, user_id.to_string())
    }

    /// Set the owner of this entity.
    pub fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Set the label of this entity.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Change the owner of this entity.
    pub fn set_owner(&mut self, owner_id: Option<UserId>) {
        self.owner_id = owner_id;
    }

    /// Check if the entity has an owner and it is `user_id`.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Check if this entity is a user account.
    pub fn is_user(&self) -> bool {
        self.entity_type_id == USER_ENTITY_TYPE_ID
    }

    /// The user id of a user entity.
    ///
    /// # Returns
    ///
    /// `None` for non-user entities and for user entities whose id is not numeric
    pub fn user_id(&self) -> Option<UserId> {
        if self.is_user() {
            self.id.parse().ok()
        } else {
            None
        }
    }

    /// The `type:id` tag invalidated when this entity changes.
    pub fn cache_tag(&self) -> String {
        format!("{}:{}", self.entity_type_id, self.id)
    }

    /// The `type_list` tag invalidated when any entity of this type changes.
    pub fn list_cache_tag(&self) -> String {
        format!("{}_list", self.entity_type_id)
    }

    /// List cache tags for this entity's type.
    pub fn list_cache_tags(&self) -> Vec<String> {
        vec![self.list_cache_tag()]
    }

    /// Check if two handles refer to the same stored entity, whatever their
    /// other fields hold.
    pub fn same_entity(&self, other: &Entity) -> bool {
        self.entity_type_id == other.entity_type_id && self.id == other.id
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.same_entity(other)
            && self.bundle == other.bundle
            && self.owner_id == other.owner_id
            && self.label == other.label
    }
}

impl CacheableDependency for Entity {
    fn cache_tags(&self) -> Vec<String> {
        vec![self.cache_tag()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let entity = Entity::new("node", "article", "42").with_label("Hello");
        assert_eq!(entity.entity_type_id, "node");
        assert_eq!(entity.bundle, "article");
        assert_eq!(entity.id, "42");
        assert_eq!(entity.label.as_deref(), Some("Hello"));
        assert!(entity.owner_id.is_none());
    }

    #[test]
    fn test_ownership() {
        let mut entity = Entity::new("node", "article", "1");
        assert!(!entity.is_owned_by(3));

        entity.set_owner(Some(3));
        assert!(entity.is_owned_by(3));
        assert!(!entity.is_owned_by(4));
    }

    #[test]
    fn test_user_entity() {
        let user = Entity::user(9);
        assert_eq!(user.user_id(), Some(9));
        assert_eq!(Entity::new("node", "article", "9").user_id(), None);
        assert_eq!(Entity::new("user", "user", "abc").user_id(), None);
    }

    #[test]
    fn test_cache_tags() {
        let entity = Entity::new("node", "article", "1");
        assert_eq!(entity.cache_tags(), vec!["node:1".to_string()]);
        assert_eq!(entity.list_cache_tags(), vec!["node_list".to_string()]);
    }

    #[test]
    fn test_equality_ignores_creation_time() {
        let mut first = Entity::new("node", "article", "1").with_owner(2);
        first.created_at = first.created_at - chrono::Duration::seconds(30);
        let second = Entity::new("node", "article", "1").with_owner(2);
        assert_eq!(first, second);

        assert_ne!(first, second.clone().with_label("Renamed"));
        assert_ne!(first, Entity::new("node", "article", "1"));
    }

    #[test]
    fn test_same_entity_ignores_bundle_and_owner() {
        let a = Entity::new("node", "article", "1").with_owner(2);
        let b = Entity::new("node", "article", "1");
        assert!(a.same_entity(&b));
        assert!(!a.same_entity(&Entity::new("node", "article", "2")));
    }
}
