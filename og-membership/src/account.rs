//! User accounts
//!
//! This module provides the Account type, the acting user of an access check,
//! carrying the site-wide permissions the user holds outside of any group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entity::Entity;

/// Numeric user id.
pub type UserId = u64;

/// Id of the anonymous user.
pub const ANONYMOUS_USER_ID: UserId = 0;

/// Id of the superuser, who bypasses every group access check.
pub const SUPERUSER_ID: UserId = 1;

/// A user account acting in an access check.
///
/// # Examples
///
/// ```
/// use og_membership::Account;
///
/// let user = Account::new(5).with_permission("administer group");
/// assert!(user.is_authenticated());
/// assert!(user.has_permission("administer group"));
///
/// let anonymous = Account::anonymous();
/// assert!(anonymous.is_anonymous());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// User ID
    pub id: UserId,

    /// Display name
    pub name: Option<String>,

    /// Site-wide permissions granted through site roles
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Account {
    /// Creates an account with no site-wide permissions.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            permissions: BTreeSet::new(),
        }
    }

    /// The anonymous user.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER_ID)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Grant a site-wide permission.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Check if the user holds a site-wide permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Check if this is the anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }

    /// Check if the user is logged in.
    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous()
    }

    /// Check if this is the superuser.
    pub fn is_superuser(&self) -> bool {
        self.id == SUPERUSER_ID
    }

    /// The user entity for this account.
    pub fn to_entity(&self) -> Entity {
        Entity::user(self.id)
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::anonymous()
    }
}
