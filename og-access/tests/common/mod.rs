//! Shared fixture for the og-access integration tests.
//!
//! Group type: `node` / `club`. Group content: `node` / `article` and user
//! accounts. The current user of every session is [`MEMBER_ID`] unless a test
//! opens its own.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use og_access::memory::InMemoryGroupStore;
use og_access::{
    AlterContext, GroupMap, GroupTypeManager, MembershipManager, OgAccess, OgAccessBuilder,
    OgError, OgResult,
};
use og_membership::{Account, Entity, Membership, OgSettings, Role, UserId};
use og_rbac::{CacheableMetadata, PermissionSet};

pub const GROUP_TYPE: &str = "node";
pub const GROUP_BUNDLE: &str = "club";
pub const CONTENT_BUNDLE: &str = "article";

pub const MEMBER_ID: UserId = 5;
pub const OTHER_ID: UserId = 6;
pub const OWNER_ID: UserId = 2;

/// An in-memory store with the club group type configured.
pub struct TestFixture {
    /// Backend shared with every engine built from this fixture
    pub store: Arc<InMemoryGroupStore>,
}

impl TestFixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryGroupStore::new());
        store.add_group_bundle(GROUP_TYPE, GROUP_BUNDLE);
        store.add_group_content_bundle(GROUP_TYPE, CONTENT_BUNDLE);
        store.add_group_content_bundle("user", "user");
        Self { store }
    }

    /// Register a club owned by [`OWNER_ID`].
    pub fn club(&self, id: &str) -> Entity {
        let club = Entity::new(GROUP_TYPE, GROUP_BUNDLE, id).with_owner(OWNER_ID);
        self.store.add_group(club.clone());
        club
    }

    /// An article posted in `clubs`.
    pub fn article(&self, id: &str, owner_id: UserId, clubs: &[&Entity]) -> Entity {
        let article = Entity::new(GROUP_TYPE, CONTENT_BUNDLE, id).with_owner(owner_id);
        for club in clubs {
            self.store.add_group_content(&article, club);
        }
        article
    }

    /// Make `user_id` an active member of `group` holding a role with
    /// `permissions`.
    pub fn join(&self, group: &Entity, user_id: UserId, permissions: &[&str]) {
        self.store
            .add_membership(Membership::new(group, user_id).with_role(member_role(permissions)));
    }

    pub fn builder(&self) -> OgAccessBuilder {
        OgAccess::builder().with_store(Arc::clone(&self.store))
    }

    pub fn engine(&self) -> OgAccess {
        self.builder().build().unwrap()
    }

    pub fn engine_with_settings(&self, settings: OgSettings) -> OgAccess {
        self.builder().with_settings(settings).build().unwrap()
    }
}

pub fn member_role(permissions: &[&str]) -> Role {
    Role::new(GROUP_TYPE, GROUP_BUNDLE, "member").with_permissions(permissions.iter().copied())
}

pub fn admin_role() -> Role {
    Role::new(GROUP_TYPE, GROUP_BUNDLE, "administrator").with_admin(true)
}

pub fn member() -> Account {
    Account::new(MEMBER_ID)
}

/// An alteration callback that counts its invocations.
pub fn counting_alter(
    counter: Arc<AtomicUsize>,
) -> impl Fn(&mut PermissionSet, &mut CacheableMetadata, &AlterContext<'_>) + Send + Sync + 'static
{
    move |_: &mut PermissionSet, _: &mut CacheableMetadata, _: &AlterContext<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collaborator whose every call fails.
pub struct FailingBackend;

impl GroupTypeManager for FailingBackend {
    fn is_group(&self, _: &str, _: &str) -> OgResult<bool> {
        Err(OgError::collaborator("group type manager", "bundle info unavailable"))
    }

    fn is_group_content(&self, _: &str, _: &str) -> OgResult<bool> {
        Err(OgError::collaborator("group type manager", "bundle info unavailable"))
    }
}

impl MembershipManager for FailingBackend {
    fn get_membership(&self, _: &Entity, _: UserId) -> OgResult<Option<Membership>> {
        Err(OgError::collaborator("membership manager", "storage offline"))
    }

    fn get_groups(&self, _: &Entity) -> OgResult<GroupMap> {
        Err(OgError::collaborator("membership manager", "storage offline"))
    }

    fn get_user_groups(&self, _: UserId) -> OgResult<GroupMap> {
        Err(OgError::collaborator("membership manager", "storage offline"))
    }
}
