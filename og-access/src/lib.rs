//! # OG Access
//!
//! Group-scoped access control engine.
//!
//! ## Overview
//!
//! The og-access crate decides whether a user may perform an operation on a
//! group, or on content that lives in one or more groups. It handles:
//! - **Group access**: Superuser, site admin and owner shortcuts, then the
//!   user's role permissions in the group
//! - **Entity access**: Entities that are groups, group content, or both
//! - **Entity operations**: `create` / `update` / `delete` permissions on
//!   group content, with `own` and `any` scopes
//! - **Alteration**: Callbacks registered for `og_user_access` that adjust
//!   permissions before the decision
//! - **Caching**: Per-request permission cache, in pre-alter and post-alter
//!   tiers
//!
//! Every decision carries the cacheability metadata of what it depended on.
//!
//! ## Features
//!
//! - `memory` (default): In-memory collaborator backend
//!
//! ## Architecture
//!
//! ```text
//! OgAccess (shared, immutable)
//!   ├─ GroupTypeManager   which bundles are groups / group content
//!   ├─ MembershipManager  memberships, group relations, non-member role
//!   ├─ PermissionManager  entity-operation permission registry
//!   ├─ OgSettings         og.settings
//!   └─ AlterationPipeline og_user_access callbacks
//!
//! AccessSession (one per request)
//!   ├─ PermissionCache
//!   ├─ user_access / user_access_with
//!   ├─ user_access_entity
//!   ├─ user_access_group_content_entity_operation
//!   └─ reset
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use og_access::memory::InMemoryGroupStore;
//! use og_access::OgAccess;
//! use og_membership::{Account, Entity, Membership, OgSettings, Role};
//!
//! let store = Arc::new(InMemoryGroupStore::new());
//! store.add_group_bundle("node", "club");
//! store.add_group_content_bundle("node", "article");
//!
//! let club = Entity::new("node", "club", "1").with_owner(2);
//! let article = Entity::new("node", "article", "7").with_owner(5);
//! store.add_group(club.clone());
//! store.add_group_content(&article, &club);
//! store.add_membership(
//!     Membership::new(&club, 5).with_role(
//!         Role::new("node", "club", "member")
//!             .with_permissions(["view group", "update own article content"]),
//!     ),
//! );
//!
//! let engine = OgAccess::builder()
//!     .with_store(store)
//!     .with_settings(OgSettings::default().with_group_manager_full_access(true))
//!     .with_alter(|permissions, _, context| {
//!         if context.operation == "subscribe" {
//!             permissions.add("subscribe");
//!         }
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut session = engine.session(Account::new(5));
//! assert!(session.user_access(&club, "view group", None).unwrap().is_allowed());
//! assert!(session.user_access(&club, "subscribe", None).unwrap().is_allowed());
//! assert!(session.user_access(&club, "edit", None).unwrap().is_forbidden());
//! assert!(session.user_access_entity("update", &article, None).unwrap().is_allowed());
//!
//! // The group owner has full access.
//! let owner = Account::new(2);
//! assert!(session.user_access(&club, "edit", Some(&owner)).unwrap().is_allowed());
//! ```

pub mod access;
pub mod alter;
pub mod cache;
pub mod entity_access;
pub mod error;
pub mod traits;

#[cfg(feature = "memory")]
pub mod memory;

// Re-export main types
pub use access::{
    AccessOptions, AccessSession, OgAccess, OgAccessBuilder, MEMBERSHIP_LIST_CACHE_TAG,
};
pub use alter::{AlterContext, AlterationPipeline, UserAccessAlter, USER_ACCESS_ALTER_HOOK};
pub use cache::{CacheTier, PermissionCache, PermissionCacheEntry, PermissionCacheKey};
pub use error::{OgError, OgResult};
pub use traits::{
    BundleMap, DefaultPermissionManager, GroupMap, GroupTypeManager, MembershipManager,
    PermissionManager,
};

#[cfg(feature = "memory")]
pub use memory::InMemoryGroupStore;
