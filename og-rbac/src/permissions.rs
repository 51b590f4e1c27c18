//! # Permissions
//!
//! Group permissions are plain strings such as `"view group"` or
//! `"update own article content"`. A [`PermissionSet`] is the collection a
//! role, a membership, or a cached permission tier holds.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Site-wide permission that grants access to every group.
pub const ADMINISTER_GROUP_PERMISSION: &str = "administer group";

/// Group permission checked whenever a group is edited.
pub const UPDATE_GROUP_PERMISSION: &str = "update group";

/// Generic operation name remapped to [`UPDATE_GROUP_PERMISSION`] on groups.
pub const EDIT_OPERATION: &str = "edit";

/// Normalize an operation requested on a group entity.
///
/// The generic `edit` operation is always answered by the special
/// [`UPDATE_GROUP_PERMISSION`]; every other operation is returned unchanged.
///
/// # Example
///
/// ```
/// use og_rbac::permissions::normalize_group_operation;
///
/// assert_eq!(normalize_group_operation("edit"), "update group");
/// assert_eq!(normalize_group_operation("view group"), "view group");
/// ```
pub fn normalize_group_operation(operation: &str) -> &str {
    if operation == EDIT_OPERATION {
        UPDATE_GROUP_PERMISSION
    } else {
        operation
    }
}

/// A deduplicated set of permission strings.
///
/// # Example
///
/// ```
/// use og_rbac::permissions::PermissionSet;
///
/// let mut set = PermissionSet::new();
/// set.add("view group");
/// set.add("subscribe");
/// set.add("view group");
///
/// assert!(set.has("view group"));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: HashSet<String>,
}

impl PermissionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Add a permission to the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was not already present
    pub fn add(&mut self, permission: impl Into<String>) -> bool {
        self.permissions.insert(permission.into())
    }

    /// Add every permission yielded by `permissions`.
    pub fn add_all<I, S>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
    }

    /// Remove a permission from the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was present, `false` otherwise
    pub fn remove(&mut self, permission: &str) -> bool {
        self.permissions.remove(permission)
    }

    /// Check if the set contains a permission.
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Check if the set contains at least one of the given permissions.
    pub fn has_any<'a, I>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        permissions.into_iter().any(|perm| self.has(perm))
    }

    /// Iterate over the permissions in the set, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// All permissions, sorted. Useful for stable output.
    pub fn sorted(&self) -> Vec<&str> {
        let mut perms: Vec<&str> = self.iter().collect();
        perms.sort_unstable();
        perms
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Build a set from string literals.
    ///
    /// ```
    /// use og_rbac::permissions::PermissionSet;
    ///
    /// let set = PermissionSet::from_strings(&["view group", "subscribe"]);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn from_strings(perms: &[&str]) -> Self {
        perms.iter().copied().collect()
    }

    /// Number of distinct permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Checks if the set holds no permission.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Revoke everything.
    pub fn clear(&mut self) {
        self.permissions.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        set.add_all(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for PermissionSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.add_all(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_is_remapped_to_update_group() {
        assert_eq!(normalize_group_operation("edit"), UPDATE_GROUP_PERMISSION);
        assert_eq!(normalize_group_operation("update group"), UPDATE_GROUP_PERMISSION);
        assert_eq!(normalize_group_operation("Edit"), "Edit");
    }

    #[test]
    fn test_permission_set_deduplicates() {
        let mut set = PermissionSet::new();
        assert!(set.add("view group"));
        assert!(!set.add("view group"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_permission_set_remove() {
        let mut set = PermissionSet::from_strings(&["view group"]);
        assert!(set.remove("view group"));
        assert!(!set.remove("view group"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_permission_set_merge() {
        let mut set1 = PermissionSet::from_strings(&["view group"]);
        let set2 = PermissionSet::from_strings(&["subscribe", "view group"]);

        set1.merge(&set2);
        assert_eq!(set1.sorted(), vec!["subscribe", "view group"]);
        assert_eq!(set2.len(), 2);
    }

    #[test]
    fn test_permission_set_has_any() {
        let set = PermissionSet::from_strings(&["update own article content"]);
        assert!(set.has_any(["update any article content", "update own article content"]));
        assert!(!set.has_any(["delete any article content"]));
        assert!(!set.has_any(std::iter::empty()));
    }

    #[test]
    fn test_sorted_is_stable() {
        let set: PermissionSet = ["b", "c", "a"].into_iter().collect();
        assert_eq!(set.sorted(), vec!["a", "b", "c"]);
    }
}
