//! Traits for the collaborators the access engine consults.
//!
//! All collaborators are synchronous. Failures are returned as [`OgError`]
//! and propagated by the engine as-is.
//!
//! [`OgError`]: crate::error::OgError

use std::collections::BTreeMap;

use og_membership::{Entity, Membership, Role, UserId};
use og_rbac::operations::default_entity_operation_permissions;
use og_rbac::GroupContentOperationPermission;

use crate::error::OgResult;

/// Groups keyed by entity type id, each list in the collaborator's order.
pub type GroupMap = BTreeMap<String, Vec<Entity>>;

/// Content bundles keyed by content entity type id.
pub type BundleMap = BTreeMap<String, Vec<String>>;

/// Knows which entity type / bundle pairs are groups or group content.
pub trait GroupTypeManager: Send + Sync {
    /// Checks if the bundle is configured as a group.
    fn is_group(&self, entity_type_id: &str, bundle: &str) -> OgResult<bool>;

    /// Checks if the bundle is configured as group content.
    fn is_group_content(&self, entity_type_id: &str, bundle: &str) -> OgResult<bool>;
}

/// Membership storage operations needed by the engine.
pub trait MembershipManager: Send + Sync {
    /// Gets the user's membership in a group, in any state.
    fn get_membership(&self, group: &Entity, user_id: UserId) -> OgResult<Option<Membership>>;

    /// Gets the groups a content entity belongs to.
    fn get_groups(&self, entity: &Entity) -> OgResult<GroupMap>;

    /// Gets the groups a user is an active member of.
    fn get_user_groups(&self, user_id: UserId) -> OgResult<GroupMap>;

    /// Gets the role granted to users without an active membership.
    ///
    /// Default implementation returns `None`: non-members hold no group
    /// permissions.
    fn non_member_role(&self, _group: &Entity) -> OgResult<Option<Role>> {
        Ok(None)
    }
}

/// Registry of entity-operation permissions.
pub trait PermissionManager: Send + Sync {
    /// Gets the entity-operation permissions a group type defines for the
    /// given content bundles.
    fn get_default_entity_operation_permissions(
        &self,
        group_entity_type: &str,
        group_bundle: &str,
        group_content_bundles: &BundleMap,
    ) -> OgResult<Vec<GroupContentOperationPermission>>;
}

/// Permission registry that generates the standard create / update / delete
/// permissions for every content bundle, identically for all group types.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPermissionManager;

impl PermissionManager for DefaultPermissionManager {
    fn get_default_entity_operation_permissions(
        &self,
        _group_entity_type: &str,
        _group_bundle: &str,
        group_content_bundles: &BundleMap,
    ) -> OgResult<Vec<GroupContentOperationPermission>> {
        Ok(default_entity_operation_permissions(group_content_bundles))
    }
}
