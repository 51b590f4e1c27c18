//! Per-request permission cache.
//!
//! Aggregated group permissions are memoized per `(group type, group id,
//! user id)` in two tiers:
//!
//! - **Pre-alter**: the raw union of the user's role permissions. Independent
//!   of the operation being checked.
//! - **Post-alter**: the permissions after the alteration callbacks ran for a
//!   particular operation.
//!
//! The cache lives exactly as long as the [`AccessSession`] that owns it. It
//! has no TTL and is never persisted; [`PermissionCache::reset`] is the only
//! way to invalidate it.
//!
//! [`AccessSession`]: crate::access::AccessSession

use serde::Serialize;
use std::collections::HashMap;

use og_membership::{Entity, UserId};
use og_rbac::{CacheableMetadata, PermissionSet};

/// Which snapshot of the permissions an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// Before alteration callbacks ran
    PreAlter,

    /// After alteration callbacks ran
    PostAlter,
}

/// Cache key: a group, a user and a tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionCacheKey {
    /// Entity type id of the group
    pub group_entity_type: String,
    /// Id of the group
    pub group_id: String,
    /// The user the permissions were computed for
    pub user_id: UserId,
    /// The snapshot
    pub tier: CacheTier,
}

impl PermissionCacheKey {
    /// Creates the key for a group, user and tier.
    pub fn new(group: &Entity, user_id: UserId, tier: CacheTier) -> Self {
        Self {
            group_entity_type: group.entity_type_id.clone(),
            group_id: group.id.clone(),
            user_id,
            tier,
        }
    }
}

/// Aggregated permissions of one user in one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PermissionCacheEntry {
    /// Permissions held
    pub permissions: PermissionSet,
    /// Whether the user holds an admin role in the group
    pub is_admin: bool,
    /// Everything the permissions were derived from
    pub cacheability: CacheableMetadata,
    /// Operation the alteration callbacks last ran for (post-alter tier only)
    pub altered_for: Option<String>,
}

impl PermissionCacheEntry {
    /// Creates an entry.
    pub fn new(
        permissions: PermissionSet,
        is_admin: bool,
        cacheability: CacheableMetadata,
    ) -> Self {
        Self {
            permissions,
            is_admin,
            cacheability,
            altered_for: None,
        }
    }

    /// Whether the entry already answers `operation` without another
    /// alteration pass.
    pub fn reflects(&self, operation: &str) -> bool {
        self.permissions.has(operation) || self.altered_for.as_deref() == Some(operation)
    }
}

/// In-memory, request-scoped permission cache.
///
/// # Example
///
/// ```
/// use og_access::cache::{CacheTier, PermissionCache};
/// use og_membership::Entity;
/// use og_rbac::{CacheableMetadata, PermissionSet};
///
/// let group = Entity::new("node", "article", "1");
/// let mut cache = PermissionCache::new();
///
/// let permissions = PermissionSet::from_strings(&["view group"]);
/// cache.set(&group, 5, CacheTier::PreAlter, permissions, false, CacheableMetadata::new());
/// assert!(cache.get(&group, 5, CacheTier::PreAlter).is_some());
/// assert!(cache.get(&group, 5, CacheTier::PostAlter).is_none());
///
/// cache.reset();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct PermissionCache {
    entries: HashMap<PermissionCacheKey, PermissionCacheEntry>,
}

impl PermissionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Retrieves an entry.
    ///
    /// Returns `None` if nothing was computed for this key since the last reset.
    pub fn get(
        &self,
        group: &Entity,
        user_id: UserId,
        tier: CacheTier,
    ) -> Option<&PermissionCacheEntry> {
        self.entries.get(&PermissionCacheKey::new(group, user_id, tier))
    }

    /// Retrieves an entry, or an empty one if absent.
    pub fn get_or_default(
        &self,
        group: &Entity,
        user_id: UserId,
        tier: CacheTier,
    ) -> PermissionCacheEntry {
        self.get(group, user_id, tier).cloned().unwrap_or_default()
    }

    /// Checks if an entry exists.
    pub fn contains(&self, group: &Entity, user_id: UserId, tier: CacheTier) -> bool {
        self.entries
            .contains_key(&PermissionCacheKey::new(group, user_id, tier))
    }

    /// Stores an entry, replacing any previous one for the key.
    ///
    /// Returns the stored entry so callers can annotate it.
    pub fn set(
        &mut self,
        group: &Entity,
        user_id: UserId,
        tier: CacheTier,
        permissions: PermissionSet,
        is_admin: bool,
        cacheability: CacheableMetadata,
    ) -> &mut PermissionCacheEntry {
        let slot = self
            .entries
            .entry(PermissionCacheKey::new(group, user_id, tier))
            .or_default();
        *slot = PermissionCacheEntry::new(permissions, is_admin, cacheability);
        slot
    }

    /// Clears all entries.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries across both tiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str) -> Entity {
        Entity::new("node", "article", id)
    }

    #[test]
    fn test_tiers_are_separate() {
        let mut cache = PermissionCache::new();
        cache.set(
            &group("1"),
            5,
            CacheTier::PreAlter,
            PermissionSet::from_strings(&["view group"]),
            false,
            CacheableMetadata::new(),
        );
        cache.set(
            &group("1"),
            5,
            CacheTier::PostAlter,
            PermissionSet::from_strings(&["view group", "subscribe"]),
            false,
            CacheableMetadata::new(),
        );

        assert_eq!(cache.len(), 2);
        let pre = cache.get(&group("1"), 5, CacheTier::PreAlter).unwrap();
        assert_eq!(pre.permissions.len(), 1);
        let post = cache.get(&group("1"), 5, CacheTier::PostAlter).unwrap();
        assert_eq!(post.permissions.len(), 2);
    }

    #[test]
    fn test_keys_include_group_and_user() {
        let mut cache = PermissionCache::new();
        let metadata = CacheableMetadata::new();
        cache.set(&group("1"), 5, CacheTier::PreAlter, PermissionSet::new(), true, metadata);

        let other_type = Entity::new("taxonomy_term", "tags", "1");
        assert!(cache.contains(&group("1"), 5, CacheTier::PreAlter));
        assert!(!cache.contains(&group("2"), 5, CacheTier::PreAlter));
        assert!(!cache.contains(&group("1"), 6, CacheTier::PreAlter));
        assert!(!cache.contains(&other_type, 5, CacheTier::PreAlter));
    }

    #[test]
    fn test_missing_entry_defaults_to_empty() {
        let cache = PermissionCache::new();
        let entry = cache.get_or_default(&group("1"), 5, CacheTier::PostAlter);
        assert!(entry.permissions.is_empty());
        assert!(!entry.is_admin);
        assert!(entry.altered_for.is_none());
    }

    #[test]
    fn test_set_replaces_and_clears_annotation() {
        let mut cache = PermissionCache::new();
        let tier = CacheTier::PostAlter;
        cache
            .set(&group("1"), 5, tier, PermissionSet::new(), false, CacheableMetadata::new())
            .altered_for = Some("view group".to_string());
        assert!(cache.get(&group("1"), 5, tier).unwrap().reflects("view group"));

        cache.set(&group("1"), 5, tier, PermissionSet::new(), false, CacheableMetadata::new());
        assert!(!cache.get(&group("1"), 5, tier).unwrap().reflects("view group"));
    }

    #[test]
    fn test_reflects_held_permission() {
        let entry = PermissionCacheEntry::new(
            PermissionSet::from_strings(&["subscribe"]),
            false,
            CacheableMetadata::new(),
        );
        assert!(entry.reflects("subscribe"));
        assert!(!entry.reflects("view group"));
    }

    #[test]
    fn test_reset() {
        let mut cache = PermissionCache::new();
        let metadata = CacheableMetadata::new();
        cache.set(&group("1"), 5, CacheTier::PreAlter, PermissionSet::new(), false, metadata);
        cache.reset();
        assert!(cache.is_empty());
        assert!(cache.get(&group("1"), 5, CacheTier::PreAlter).is_none());
    }

    #[test]
    fn test_entry_serializes_for_diagnostics() {
        let mut cacheability = CacheableMetadata::new();
        cacheability.add_cache_tags(["og_role:node-club-member"]);
        let permissions = PermissionSet::from_strings(&["subscribe"]);
        let mut entry = PermissionCacheEntry::new(permissions, false, cacheability);
        entry.altered_for = Some("view group".to_string());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["permissions"]["permissions"], serde_json::json!(["subscribe"]));
        assert_eq!(json["is_admin"], false);
        let tags = serde_json::json!(["og_role:node-club-member"]);
        assert_eq!(json["cacheability"]["tags"], tags);
        assert_eq!(json["cacheability"]["max_age"], -1);
        assert_eq!(json["altered_for"], "view group");

        assert_eq!(serde_json::to_value(CacheTier::PostAlter).unwrap(), "post_alter");
    }
}
