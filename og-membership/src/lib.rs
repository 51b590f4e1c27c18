//! # OG Membership
//!
//! Group-side domain model for group-scoped access control.
//!
//! ## Overview
//!
//! The og-membership crate handles:
//! - **Accounts**: The acting user and their site-wide permissions
//! - **Entities**: Groups and group content, with optional owners
//! - **Roles**: Per group type permission sets, optionally admin
//! - **Memberships**: User-group relationships carrying roles
//! - **Settings**: The `og.settings` configuration object
//!
//! ## Architecture
//!
//! ```text
//! Account
//!   └─ Membership ─→ Group (Entity)
//!        ├─ State (active / pending / blocked)
//!        ├─ Roles ─→ PermissionSet
//!        └─ Custom permissions
//!
//! Group content (Entity) ─→ one or more groups
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use og_membership::{Account, Entity, Membership, Role};
//!
//! let group = Entity::new("node", "article", "1").with_owner(2);
//! let user = Account::new(5);
//!
//! let membership = Membership::new(&group, user.id)
//!     .with_role(Role::new("node", "article", "member").with_permission("view group"));
//! assert!(membership.has_permission("view group"));
//! ```

pub mod account;
pub mod entity;
pub mod error;
pub mod membership;
pub mod roles;
pub mod settings;

// Re-export main types for convenience
pub use account::{Account, UserId, ANONYMOUS_USER_ID, SUPERUSER_ID};
pub use entity::{Entity, USER_ENTITY_TYPE_ID};
pub use error::{SettingsError, SettingsResult};
pub use membership::{Membership, MembershipState};
pub use roles::{Role, RoleType};
pub use settings::OgSettings;
