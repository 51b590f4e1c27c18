//! In-memory collaborator backend.
//!
//! [`InMemoryGroupStore`] implements [`GroupTypeManager`],
//! [`MembershipManager`] and [`PermissionManager`] over plain collections.
//! It suits tests, demos and hosts that load their group configuration at
//! startup.
//!
//! Groups are returned grouped by entity type id in sorted order, and in
//! registration order within a type.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use og_membership::{Entity, Membership, Role, UserId};
use og_rbac::operations::default_entity_operation_permissions;
use og_rbac::GroupContentOperationPermission;

use crate::error::OgResult;
use crate::traits::{BundleMap, GroupMap, GroupTypeManager, MembershipManager, PermissionManager};

type BundleKey = (String, String);
type EntityKey = (String, String);

fn bundle_key(entity_type_id: &str, bundle: &str) -> BundleKey {
    (entity_type_id.to_string(), bundle.to_string())
}

fn entity_key(entity: &Entity) -> EntityKey {
    (entity.entity_type_id.clone(), entity.id.clone())
}

#[derive(Debug, Default)]
struct StoreState {
    group_bundles: BTreeSet<BundleKey>,
    group_content_bundles: BTreeSet<BundleKey>,
    groups: HashMap<EntityKey, Entity>,
    memberships: Vec<Membership>,
    non_member_roles: HashMap<BundleKey, Role>,
    group_content: HashMap<EntityKey, Vec<Entity>>,
    entity_operation_permissions: HashMap<BundleKey, Vec<GroupContentOperationPermission>>,
}

impl StoreState {
    fn resolve_group(&self, membership: &Membership) -> Entity {
        self.groups
            .get(&(membership.group_entity_type.clone(), membership.group_id.clone()))
            .cloned()
            .unwrap_or_else(|| {
                Entity::new(
                    membership.group_entity_type.as_str(),
                    membership.group_bundle.as_str(),
                    membership.group_id.as_str(),
                )
            })
    }
}

fn group_map(groups: impl IntoIterator<Item = Entity>) -> GroupMap {
    let mut map = GroupMap::new();
    for group in groups {
        let list = map.entry(group.entity_type_id.clone()).or_default();
        if !list.iter().any(|existing: &Entity| existing.same_entity(&group)) {
            list.push(group);
        }
    }
    map
}

/// Group configuration and memberships held in memory.
///
/// # Example
///
/// ```
/// use og_access::memory::InMemoryGroupStore;
/// use og_access::traits::{GroupTypeManager, MembershipManager};
/// use og_membership::{Entity, Membership};
///
/// let store = InMemoryGroupStore::new();
/// store.add_group_bundle("node", "club");
/// store.add_group_content_bundle("node", "article");
///
/// let club = Entity::new("node", "club", "1");
/// let article = Entity::new("node", "article", "2");
/// store.add_group(club.clone());
/// store.add_group_content(&article, &club);
/// store.add_membership(Membership::new(&club, 5));
///
/// assert!(store.is_group("node", "club").unwrap());
/// assert_eq!(store.get_groups(&article).unwrap()["node"].len(), 1);
/// assert!(store.get_membership(&club, 5).unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGroupStore {
    state: RwLock<StoreState>,
}

impl InMemoryGroupStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configure a bundle as a group type.
    pub fn add_group_bundle(&self, entity_type_id: &str, bundle: &str) {
        self.write()
            .group_bundles
            .insert(bundle_key(entity_type_id, bundle));
    }

    /// Configure a bundle as group content.
    pub fn add_group_content_bundle(&self, entity_type_id: &str, bundle: &str) {
        self.write()
            .group_content_bundles
            .insert(bundle_key(entity_type_id, bundle));
    }

    /// Register a group entity, replacing an earlier registration of the
    /// same entity.
    pub fn add_group(&self, group: Entity) {
        self.write().groups.insert(entity_key(&group), group);
    }

    /// Store a membership, replacing the user's existing membership in the
    /// same group.
    pub fn add_membership(&self, membership: Membership) {
        let mut state = self.write();
        state.memberships.retain(|existing| {
            !(existing.user_id == membership.user_id
                && existing.group_entity_type == membership.group_entity_type
                && existing.group_id == membership.group_id)
        });
        state.memberships.push(membership);
    }

    /// Remove the user's membership in a group.
    ///
    /// # Returns
    ///
    /// `true` if a membership was removed
    pub fn remove_membership(&self, group: &Entity, user_id: UserId) -> bool {
        let mut state = self.write();
        let before = state.memberships.len();
        state
            .memberships
            .retain(|m| !(m.user_id == user_id && m.belongs_to(group)));
        state.memberships.len() != before
    }

    /// Modify the user's membership in a group in place.
    ///
    /// # Returns
    ///
    /// `true` if the membership exists
    pub fn update_membership<F>(&self, group: &Entity, user_id: UserId, update: F) -> bool
    where
        F: FnOnce(&mut Membership),
    {
        let mut state = self.write();
        match state
            .memberships
            .iter_mut()
            .find(|m| m.user_id == user_id && m.belongs_to(group))
        {
            Some(membership) => {
                update(membership);
                true
            }
            None => false,
        }
    }

    /// Set the role non-members of a group type hold.
    pub fn set_non_member_role(&self, role: Role) {
        let key = bundle_key(&role.group_type, &role.group_bundle);
        self.write().non_member_roles.insert(key, role);
    }

    /// Record that `content` belongs to `group`.
    pub fn add_group_content(&self, content: &Entity, group: &Entity) {
        let mut state = self.write();
        let groups = state.group_content.entry(entity_key(content)).or_default();
        if !groups.iter().any(|existing| existing.same_entity(group)) {
            groups.push(group.clone());
        }
    }

    /// Replace the generated entity-operation permissions of a group type.
    pub fn set_entity_operation_permissions(
        &self,
        group_entity_type: &str,
        group_bundle: &str,
        permissions: Vec<GroupContentOperationPermission>,
    ) {
        self.write()
            .entity_operation_permissions
            .insert(bundle_key(group_entity_type, group_bundle), permissions);
    }
}

impl GroupTypeManager for InMemoryGroupStore {
    fn is_group(&self, entity_type_id: &str, bundle: &str) -> OgResult<bool> {
        Ok(self
            .read()
            .group_bundles
            .contains(&bundle_key(entity_type_id, bundle)))
    }

    fn is_group_content(&self, entity_type_id: &str, bundle: &str) -> OgResult<bool> {
        Ok(self
            .read()
            .group_content_bundles
            .contains(&bundle_key(entity_type_id, bundle)))
    }
}

impl MembershipManager for InMemoryGroupStore {
    fn get_membership(&self, group: &Entity, user_id: UserId) -> OgResult<Option<Membership>> {
        Ok(self
            .read()
            .memberships
            .iter()
            .find(|m| m.user_id == user_id && m.belongs_to(group))
            .cloned())
    }

    fn get_groups(&self, entity: &Entity) -> OgResult<GroupMap> {
        let state = self.read();
        let groups = state
            .group_content
            .get(&entity_key(entity))
            .cloned()
            .unwrap_or_default();
        Ok(group_map(groups))
    }

    fn get_user_groups(&self, user_id: UserId) -> OgResult<GroupMap> {
        let state = self.read();
        let groups: Vec<Entity> = state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.is_active())
            .map(|m| state.resolve_group(m))
            .collect();
        Ok(group_map(groups))
    }

    fn non_member_role(&self, group: &Entity) -> OgResult<Option<Role>> {
        Ok(self
            .read()
            .non_member_roles
            .get(&bundle_key(&group.entity_type_id, &group.bundle))
            .cloned())
    }
}

impl PermissionManager for InMemoryGroupStore {
    fn get_default_entity_operation_permissions(
        &self,
        group_entity_type: &str,
        group_bundle: &str,
        group_content_bundles: &BundleMap,
    ) -> OgResult<Vec<GroupContentOperationPermission>> {
        let state = self.read();
        match state
            .entity_operation_permissions
            .get(&bundle_key(group_entity_type, group_bundle))
        {
            Some(permissions) => Ok(permissions
                .iter()
                .filter(|permission| applies_to_bundles(permission, group_content_bundles))
                .cloned()
                .collect()),
            None => Ok(default_entity_operation_permissions(group_content_bundles)),
        }
    }
}

/// Unscoped permissions apply to every bundle.
fn applies_to_bundles(permission: &GroupContentOperationPermission, bundles: &BundleMap) -> bool {
    match (&permission.entity_type, &permission.bundle) {
        (Some(entity_type), Some(bundle)) => bundles
            .get(entity_type)
            .is_some_and(|list| list.contains(bundle)),
        (Some(entity_type), None) => bundles.contains_key(entity_type),
        _ => true,
    }
}
