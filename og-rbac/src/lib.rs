//! # OG RBAC
//!
//! Permission vocabulary for group-scoped access control.
//!
//! ## Overview
//!
//! The og-rbac crate handles:
//! - **Permissions**: Plain permission strings and [`PermissionSet`]
//! - **Entity operations**: `create` / `update` / `delete` on group content,
//!   scoped by [`Ownership`]
//! - **Cacheability**: Tags, contexts and max-age attached to every decision
//! - **Access results**: `Allowed`, `Forbidden` or `Neutral`, plus cacheability
//!
//! ## Architecture
//!
//! ```text
//! Group permission           = "view group", "update group", "subscribe"
//! Entity-operation permission = operation + ownership + bundle
//!
//! Examples:
//!   "create article content"       - create, any
//!   "update own article content"   - update, own
//!   "delete any article content"   - delete, any
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use og_rbac::{AccessResult, PermissionSet};
//!
//! let set = PermissionSet::from_strings(&["view group"]);
//! let result = AccessResult::allowed_if(set.has("view group"))
//!     .add_cache_tags(["config:og.settings"]);
//!
//! assert!(result.is_allowed());
//! ```

pub mod access_result;
pub mod cacheability;
pub mod operations;
pub mod permissions;

// Re-export main types for convenience
pub use access_result::{AccessOutcome, AccessResult};
pub use cacheability::{CacheableDependency, CacheableMetadata, PERMANENT};
pub use operations::{EntityOperation, GroupContentOperationPermission, Ownership};
pub use permissions::{
    PermissionSet, ADMINISTER_GROUP_PERMISSION, EDIT_OPERATION, UPDATE_GROUP_PERMISSION,
};
