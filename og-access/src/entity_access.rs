//! Access checks on arbitrary entities.
//!
//! An entity may be a group, group content, both, or neither. Group content
//! is reachable through every group it belongs to: access granted by any one
//! of those groups grants access to the content, even when the entity is
//! itself a group that denies the operation.

use tracing::{debug, instrument, trace};

use og_membership::{Account, Entity};
use og_rbac::cacheability::USER_CACHE_CONTEXT;
use og_rbac::{AccessResult, CacheableMetadata};

use crate::access::{AccessSession, MEMBERSHIP_LIST_CACHE_TAG};
use crate::error::OgResult;
use crate::traits::{BundleMap, GroupMap};

impl<'a> AccessSession<'a> {
    /// Check whether a user may perform `operation` on an entity.
    ///
    /// Groups are checked with [`user_access`](Self::user_access). Group
    /// content is checked against each of its groups, first through the
    /// entity-operation permissions and then through the plain group
    /// permission. User entities are group content of the groups the user is
    /// an active member of.
    ///
    /// # Returns
    ///
    /// - `Allowed` on the first group that allows, carrying the entity's list
    ///   cache tags
    /// - `Forbidden` when the entity is a group that denies, or group content
    ///   whose groups all deny
    /// - `Neutral` for orphaned content and for entities that are neither
    ///
    /// # Errors
    ///
    /// Collaborator failures only. A user entity whose id is not numeric
    /// belongs to no group.
    #[instrument(
        level = "debug",
        skip_all,
        fields(operation = %operation, entity = %entity.cache_tag())
    )]
    pub fn user_access_entity(
        &mut self,
        operation: &str,
        entity: &Entity,
        user: Option<&Account>,
    ) -> OgResult<AccessResult> {
        let engine = self.engine;
        let group_types = engine.group_types();

        let mut result = AccessResult::neutral();
        if group_types.is_group(&entity.entity_type_id, &entity.bundle)? {
            let group_access = self.user_access(entity, operation, user)?;
            if group_access.is_allowed() {
                return Ok(group_access);
            }
            debug!("Group denies the operation, checking group content path");
            result = AccessResult::forbidden().inherit_cacheability(&group_access);
        }

        if !group_types.is_group_content(&entity.entity_type_id, &entity.bundle)? {
            return Ok(result);
        }

        let list_tags = entity.list_cache_tags();
        let groups = self.groups_of(entity)?;
        if groups.values().all(Vec::is_empty) {
            debug!("Group content belongs to no group");
            return Ok(result.add_cache_tags(list_tags));
        }

        let mut forbidden = AccessResult::forbidden()
            .add_cache_tags(list_tags.iter().cloned())
            .inherit_cacheability(&result);

        for group in groups.values().flatten() {
            let operation_access =
                self.user_access_group_content_entity_operation(operation, group, entity, user)?;
            if operation_access.is_allowed() {
                trace!(group = %group.cache_tag(), "Allowed by entity operation permission");
                return Ok(operation_access.add_cache_tags(list_tags));
            }

            let group_access = self.user_access(group, operation, user)?;
            if group_access.is_allowed() {
                trace!(group = %group.cache_tag(), "Allowed by group permission");
                return Ok(group_access.add_cache_tags(list_tags));
            }

            forbidden = forbidden
                .inherit_cacheability(&operation_access)
                .inherit_cacheability(&group_access);
        }

        debug!("No group allows the operation");
        Ok(forbidden)
    }

    /// Check whether a user may perform an entity operation (`create`,
    /// `update`, `delete`) on a piece of group content, through the
    /// entity-operation permissions of one group.
    ///
    /// `own` permissions count only when the user owns the content; `any`
    /// permissions always count. Only an active membership can hold them.
    #[instrument(
        level = "debug",
        skip_all,
        fields(operation = %operation, group = %group.cache_tag(), entity = %content.cache_tag())
    )]
    pub fn user_access_group_content_entity_operation(
        &self,
        operation: &str,
        group: &Entity,
        content: &Entity,
        user: Option<&Account>,
    ) -> OgResult<AccessResult> {
        let user = self.effective_user(user);

        let mut cacheability = CacheableMetadata::new();
        cacheability.add_dependency(content);
        if self.is_current_user(&user) {
            cacheability.add_cache_contexts([USER_CACHE_CONTEXT]);
        }

        let is_owner = content.is_owned_by(user.id);
        let bundles = BundleMap::from([(
            content.entity_type_id.clone(),
            vec![content.bundle.clone()],
        )]);
        let candidates: Vec<_> = self
            .engine
            .permission_manager()
            .get_default_entity_operation_permissions(
                &group.entity_type_id,
                &group.bundle,
                &bundles,
            )?
            .into_iter()
            .filter(|permission| permission.matches(operation, is_owner))
            .collect();
        trace!(is_owner, candidates = candidates.len(), "Entity operation permissions");

        match self.engine.memberships().get_membership(group, user.id)? {
            Some(membership) => {
                cacheability.add_dependency(&membership);
                let held = membership.is_active()
                    && candidates
                        .iter()
                        .any(|permission| membership.has_permission(&permission.name));
                Ok(AccessResult::allowed_if(held).with_cacheability(&cacheability))
            }
            None => {
                cacheability.add_cache_tags([MEMBERSHIP_LIST_CACHE_TAG]);
                Ok(AccessResult::neutral().with_cacheability(&cacheability))
            }
        }
    }

    /// Groups an entity belongs to. A user entity belongs to the groups the
    /// user is a member of.
    fn groups_of(&self, entity: &Entity) -> OgResult<GroupMap> {
        let memberships = self.engine.memberships();
        if !entity.is_user() {
            return memberships.get_groups(entity);
        }
        match entity.user_id() {
            Some(user_id) => memberships.get_user_groups(user_id),
            None => {
                debug!(id = %entity.id, "User entity id is not a user id");
                Ok(GroupMap::new())
            }
        }
    }
}
