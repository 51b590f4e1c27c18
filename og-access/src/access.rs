//! Group access resolution.
//!
//! [`OgAccess`] holds the collaborators, the settings and the alteration
//! pipeline. It is immutable, `Send + Sync`, and meant to be shared by every
//! worker. Each request opens its own [`AccessSession`], which owns the
//! permission cache for the lifetime of that request.
//!
//! # Decision order for [`AccessSession::user_access`]
//!
//! ```text
//! not a group ─────────────────────────→ Neutral
//! superuser ───────────────────────────→ Allowed
//! site "administer group" ─────────────→ Allowed   (unless ignore_admin)
//! "edit" → "update group"
//! owner + group_manager_full_access ───→ Allowed   (unless ignore_admin)
//! pre-alter permissions (cached)
//! alteration pipeline (cached per operation, unless skip_alter)
//! admin role or permission held ───────→ Allowed, otherwise Forbidden
//! ```
//!
//! Every result, including early returns, carries the cacheability of all the
//! inputs consulted up to that point.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use og_membership::{Account, Entity, OgSettings};
use og_rbac::cacheability::{USER_CACHE_CONTEXT, USER_PERMISSIONS_CACHE_CONTEXT};
use og_rbac::permissions::normalize_group_operation;
use og_rbac::{AccessResult, CacheableMetadata, PermissionSet, ADMINISTER_GROUP_PERMISSION};

use crate::alter::{AlterContext, AlterationPipeline, UserAccessAlter};
use crate::cache::{CacheTier, PermissionCache, PermissionCacheEntry};
use crate::error::{OgError, OgResult};
use crate::traits::{
    DefaultPermissionManager, GroupTypeManager, MembershipManager, PermissionManager,
};

/// Tag invalidated whenever any membership is created or removed.
pub const MEMBERSHIP_LIST_CACHE_TAG: &str = "og_membership_list";

/// Flags for [`AccessSession::user_access_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessOptions {
    /// Do not run the alteration pipeline
    pub skip_alter: bool,
    /// Ignore site admin, owner and admin-role shortcuts
    pub ignore_admin: bool,
}

impl AccessOptions {
    /// Default options: alteration runs, admin shortcuts apply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypass the alteration pipeline.
    pub fn with_skip_alter(mut self, skip_alter: bool) -> Self {
        self.skip_alter = skip_alter;
        self
    }

    /// Bypass the admin shortcuts.
    pub fn with_ignore_admin(mut self, ignore_admin: bool) -> Self {
        self.ignore_admin = ignore_admin;
        self
    }
}

/// The access engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use og_access::memory::InMemoryGroupStore;
/// use og_access::OgAccess;
/// use og_membership::{Account, Entity, Membership, Role};
///
/// let store = Arc::new(InMemoryGroupStore::new());
/// store.add_group_bundle("node", "article");
///
/// let group = Entity::new("node", "article", "1");
/// store.add_membership(
///     Membership::new(&group, 5)
///         .with_role(Role::new("node", "article", "member").with_permission("view group")),
/// );
///
/// let engine = OgAccess::builder().with_store(store).build().unwrap();
/// let mut session = engine.session(Account::new(5));
///
/// assert!(session.user_access(&group, "view group", None).unwrap().is_allowed());
/// assert!(session.user_access(&group, "update group", None).unwrap().is_forbidden());
/// ```
pub struct OgAccess {
    group_types: Arc<dyn GroupTypeManager>,
    memberships: Arc<dyn MembershipManager>,
    permissions: Arc<dyn PermissionManager>,
    settings: OgSettings,
    alterations: AlterationPipeline,
}

impl fmt::Debug for OgAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OgAccess")
            .field("settings", &self.settings)
            .field("alterations", &self.alterations)
            .finish()
    }
}

impl OgAccess {
    /// Start building an engine.
    pub fn builder() -> OgAccessBuilder {
        OgAccessBuilder::default()
    }

    /// Open a request-scoped session acting on behalf of `current_user`.
    pub fn session(&self, current_user: Account) -> AccessSession<'_> {
        AccessSession {
            engine: self,
            current_user,
            cache: PermissionCache::new(),
        }
    }

    /// The settings in effect.
    pub fn settings(&self) -> &OgSettings {
        &self.settings
    }

    /// The registered alteration callbacks.
    pub fn alterations(&self) -> &AlterationPipeline {
        &self.alterations
    }

    pub(crate) fn group_types(&self) -> &dyn GroupTypeManager {
        self.group_types.as_ref()
    }

    pub(crate) fn memberships(&self) -> &dyn MembershipManager {
        self.memberships.as_ref()
    }

    pub(crate) fn permission_manager(&self) -> &dyn PermissionManager {
        self.permissions.as_ref()
    }
}

/// Builder for [`OgAccess`].
#[derive(Default)]
pub struct OgAccessBuilder {
    group_types: Option<Arc<dyn GroupTypeManager>>,
    memberships: Option<Arc<dyn MembershipManager>>,
    permissions: Option<Arc<dyn PermissionManager>>,
    settings: OgSettings,
    alterations: AlterationPipeline,
}

impl OgAccessBuilder {
    /// Use `store` for every collaborator it implements.
    pub fn with_store<S>(self, store: Arc<S>) -> Self
    where
        S: GroupTypeManager + MembershipManager + PermissionManager + 'static,
    {
        self.with_group_types(store.clone())
            .with_memberships(store.clone())
            .with_permission_manager(store)
    }

    /// Set the group type manager.
    pub fn with_group_types(mut self, group_types: Arc<dyn GroupTypeManager>) -> Self {
        self.group_types = Some(group_types);
        self
    }

    /// Set the membership manager.
    pub fn with_memberships(mut self, memberships: Arc<dyn MembershipManager>) -> Self {
        self.memberships = Some(memberships);
        self
    }

    /// Set the permission registry. Defaults to [`DefaultPermissionManager`].
    pub fn with_permission_manager(mut self, permissions: Arc<dyn PermissionManager>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Set the settings.
    pub fn with_settings(mut self, settings: OgSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Register an alteration closure.
    pub fn with_alter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut PermissionSet, &mut CacheableMetadata, &AlterContext<'_>)
            + Send
            + Sync
            + 'static,
    {
        self.alterations.register(callback);
        self
    }

    /// Register a shared alteration callback.
    pub fn with_alter_hook(mut self, callback: Arc<dyn UserAccessAlter>) -> Self {
        self.alterations.register_alter(callback);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// [`OgError::MissingCollaborator`] if no group type manager or
    /// membership manager was set.
    pub fn build(self) -> OgResult<OgAccess> {
        Ok(OgAccess {
            group_types: self
                .group_types
                .ok_or(OgError::MissingCollaborator("group type manager"))?,
            memberships: self
                .memberships
                .ok_or(OgError::MissingCollaborator("membership manager"))?,
            permissions: self
                .permissions
                .unwrap_or_else(|| Arc::new(DefaultPermissionManager)),
            settings: self.settings,
            alterations: self.alterations,
        })
    }
}

/// Request-scoped access checks.
///
/// Owns the permission cache. Open one per request (or per worker) and drop
/// it when the request is done; sessions never share state.
pub struct AccessSession<'a> {
    pub(crate) engine: &'a OgAccess,
    pub(crate) current_user: Account,
    pub(crate) cache: PermissionCache,
}

impl fmt::Debug for AccessSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessSession")
            .field("current_user", &self.current_user.id)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<'a> AccessSession<'a> {
    /// The user this session acts for when no user is passed.
    pub fn current_user(&self) -> &Account {
        &self.current_user
    }

    /// The permission cache.
    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Forget every cached permission.
    pub fn reset(&mut self) {
        debug!(entries = self.cache.len(), "Resetting permission cache");
        self.cache.reset();
    }

    /// Check whether a user may perform `operation` on a group.
    ///
    /// `user` defaults to the session's current user.
    pub fn user_access(
        &mut self,
        group: &Entity,
        operation: &str,
        user: Option<&Account>,
    ) -> OgResult<AccessResult> {
        self.user_access_with(group, operation, user, AccessOptions::default())
    }

    /// [`user_access`](Self::user_access) with explicit options.
    #[instrument(
        level = "debug",
        skip_all,
        fields(operation = %operation, group = %group.cache_tag(), user_id)
    )]
    pub fn user_access_with(
        &mut self,
        group: &Entity,
        operation: &str,
        user: Option<&Account>,
        options: AccessOptions,
    ) -> OgResult<AccessResult> {
        let engine = self.engine;
        let mut cacheability = CacheableMetadata::new();
        cacheability.add_dependency(&engine.settings);

        if !engine
            .group_types()
            .is_group(&group.entity_type_id, &group.bundle)?
        {
            debug!("Entity is not a group");
            return Ok(AccessResult::neutral().with_cacheability(&cacheability));
        }

        let user = self.effective_user(user);
        tracing::Span::current().record("user_id", user.id);
        if self.is_current_user(&user) {
            cacheability.add_cache_contexts([USER_CACHE_CONTEXT]);
        }

        if user.is_superuser() {
            debug!("Superuser bypass");
            return Ok(AccessResult::allowed().with_cacheability(&cacheability));
        }

        if !options.ignore_admin {
            cacheability.add_cache_contexts([USER_PERMISSIONS_CACHE_CONTEXT]);
            if user.has_permission(ADMINISTER_GROUP_PERMISSION) {
                debug!("User administers all groups");
                return Ok(AccessResult::allowed().with_cacheability(&cacheability));
            }
        }

        let operation = normalize_group_operation(operation);

        if !options.ignore_admin
            && engine.settings.group_manager_full_access
            && user.is_authenticated()
        {
            // Ownership may change, so the group is a dependency whether or not
            // it has an owner yet.
            cacheability.add_dependency(group);
            if group.owner_id == Some(user.id) {
                debug!("Group owner has full access");
                return Ok(AccessResult::allowed().with_cacheability(&cacheability));
            }
        }

        self.ensure_pre_alter(group, &user)?;

        let reflected = self
            .cache
            .get(group, user.id, CacheTier::PostAlter)
            .is_some_and(|entry| entry.reflects(operation));
        if !options.skip_alter && !reflected {
            self.alter_permissions(group, &user, operation, &cacheability);
        } else {
            trace!(skip_alter = options.skip_alter, "Post-alter permissions reused");
        }

        let entry = self.decision_entry(group, &user, options);
        let allowed =
            (entry.is_admin && !options.ignore_admin) || entry.permissions.has(operation);
        debug!(allowed, is_admin = entry.is_admin, "Group access decided");

        let result = if allowed {
            AccessResult::allowed()
        } else {
            AccessResult::forbidden()
        };
        Ok(result
            .with_cacheability(&cacheability)
            .with_cacheability(&entry.cacheability))
    }

    pub(crate) fn effective_user(&self, user: Option<&Account>) -> Account {
        user.cloned().unwrap_or_else(|| self.current_user.clone())
    }

    pub(crate) fn is_current_user(&self, user: &Account) -> bool {
        user.id == self.current_user.id
    }

    /// Aggregate the user's role permissions into the pre-alter tier, unless
    /// already cached.
    fn ensure_pre_alter(&mut self, group: &Entity, user: &Account) -> OgResult<()> {
        if self.cache.contains(group, user.id, CacheTier::PreAlter) {
            trace!("Pre-alter permissions cache hit");
            return Ok(());
        }
        trace!("Pre-alter permissions cache miss");

        let memberships = self.engine.memberships();
        let mut permissions = PermissionSet::new();
        let mut is_admin = false;
        let mut cacheability = CacheableMetadata::new();

        match memberships.get_membership(group, user.id)? {
            Some(membership) if membership.is_active() => {
                cacheability.add_dependency(&membership);
                permissions.merge(&membership.custom_permissions);
                for role in &membership.roles {
                    if role.is_admin {
                        is_admin = true;
                        break;
                    }
                    permissions.merge(&role.permissions);
                }
            }
            Some(membership) if membership.is_blocked() => {
                cacheability.add_dependency(&membership);
            }
            membership => {
                match &membership {
                    Some(pending) => cacheability.add_dependency(pending),
                    None => cacheability.add_cache_tags([MEMBERSHIP_LIST_CACHE_TAG]),
                };
                if let Some(role) = memberships.non_member_role(group)? {
                    cacheability.add_dependency(&role);
                    permissions.merge(&role.permissions);
                }
            }
        }

        self.cache.set(
            group,
            user.id,
            CacheTier::PreAlter,
            permissions,
            is_admin,
            cacheability,
        );
        Ok(())
    }

    /// Run the alteration pipeline on a copy of the pre-alter tier and store
    /// the outcome as the post-alter tier for `operation`.
    fn alter_permissions(
        &mut self,
        group: &Entity,
        user: &Account,
        operation: &str,
        request_cacheability: &CacheableMetadata,
    ) {
        let pre_alter = self.cache.get_or_default(group, user.id, CacheTier::PreAlter);
        let mut permissions = pre_alter.permissions;
        let mut cacheability = pre_alter.cacheability;
        cacheability.merge(request_cacheability);

        trace!(
            callbacks = self.engine.alterations.len(),
            "Invoking og_user_access alterations"
        );
        self.engine.alterations.invoke(
            &mut permissions,
            &mut cacheability,
            &AlterContext {
                operation,
                group,
                user,
            },
        );

        self.cache
            .set(
                group,
                user.id,
                CacheTier::PostAlter,
                permissions,
                pre_alter.is_admin,
                cacheability,
            )
            .altered_for = Some(operation.to_string());
    }

    /// The tier the final decision reads from. With `skip_alter` and no
    /// post-alter tier yet, the raw pre-alter tier answers.
    fn decision_entry(
        &self,
        group: &Entity,
        user: &Account,
        options: AccessOptions,
    ) -> PermissionCacheEntry {
        match self.cache.get(group, user.id, CacheTier::PostAlter) {
            Some(entry) => entry.clone(),
            None if options.skip_alter => {
                self.cache.get_or_default(group, user.id, CacheTier::PreAlter)
            }
            None => PermissionCacheEntry::default(),
        }
    }
}
