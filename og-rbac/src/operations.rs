//! # Entity operations
//!
//! Operations that can be performed on group content, and the permissions
//! that grant them. Each permission is scoped by ownership: `own` applies
//! only to content the user owns, `any` applies to all content of a bundle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Operations on group content entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityOperation {
    /// Create new content inside a group.
    Create,

    /// Modify existing content.
    Update,

    /// Remove content.
    Delete,
}

impl EntityOperation {
    /// Get the string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityOperation::Create => "create",
            EntityOperation::Update => "update",
            EntityOperation::Delete => "delete",
        }
    }

    /// Parse an operation from its string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use og_rbac::operations::EntityOperation;
    ///
    /// assert_eq!(EntityOperation::parse("update"), Some(EntityOperation::Update));
    /// assert_eq!(EntityOperation::parse("DELETE"), Some(EntityOperation::Delete));
    /// assert_eq!(EntityOperation::parse("view"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(EntityOperation::Create),
            "update" => Some(EntityOperation::Update),
            "delete" => Some(EntityOperation::Delete),
            _ => None,
        }
    }

    /// Get all operations.
    pub fn all() -> [Self; 3] {
        [
            EntityOperation::Create,
            EntityOperation::Update,
            EntityOperation::Delete,
        ]
    }

    /// Whether permissions for this operation are split by ownership.
    ///
    /// Content that does not exist yet has no owner, so `create` is only
    /// ever granted for `any`.
    pub fn is_ownership_sensitive(&self) -> bool {
        !matches!(self, EntityOperation::Create)
    }
}

impl fmt::Display for EntityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which content an entity-operation permission applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Only content owned by the acting user.
    Own,

    /// All content, regardless of owner.
    Any,
}

impl Ownership {
    /// Get the string representation of the ownership scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ownership::Own => "own",
            Ownership::Any => "any",
        }
    }

    /// Parse an ownership scope (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "own" => Some(Ownership::Own),
            "any" => Some(Ownership::Any),
            _ => None,
        }
    }

    /// Check if a permission with this scope applies to a user.
    ///
    /// `any` always applies; `own` applies only when the user owns the content.
    pub fn applies_to(&self, is_owner: bool) -> bool {
        match self {
            Ownership::Any => true,
            Ownership::Own => is_owner,
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission that grants an operation on group content.
///
/// # Example
///
/// ```
/// use og_rbac::operations::{GroupContentOperationPermission, Ownership};
///
/// let perm = GroupContentOperationPermission::new(
///     "update own article content",
///     "update",
///     Ownership::Own,
/// );
/// assert!(perm.matches("update", true));
/// assert!(!perm.matches("update", false));
/// assert!(!perm.matches("delete", true));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GroupContentOperationPermission {
    /// Machine name of the permission (e.g., "update any article content").
    pub name: String,

    /// Operation the permission grants (e.g., "update").
    pub operation: String,

    /// Ownership scope.
    pub ownership: Ownership,

    /// Content entity type the permission applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    /// Content bundle the permission applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
}

impl GroupContentOperationPermission {
    /// Create a new permission description.
    pub fn new(
        name: impl Into<String>,
        operation: impl Into<String>,
        ownership: Ownership,
    ) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            ownership,
            entity_type: None,
            bundle: None,
        }
    }

    /// Scope the permission to a content entity type and bundle.
    pub fn for_bundle(mut self, entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.bundle = Some(bundle.into());
        self
    }

    /// Check if this permission grants `operation` to a user with the given ownership.
    pub fn matches(&self, operation: &str, is_owner: bool) -> bool {
        self.operation == operation && self.ownership.applies_to(is_owner)
    }
}

/// Build the standard permission name for an operation on a content bundle.
///
/// ```
/// use og_rbac::operations::{permission_name, EntityOperation, Ownership};
///
/// let create = permission_name(EntityOperation::Create, Ownership::Any, "article");
/// assert_eq!(create, "create article content");
///
/// let update = permission_name(EntityOperation::Update, Ownership::Own, "article");
/// assert_eq!(update, "update own article content");
/// ```
pub fn permission_name(operation: EntityOperation, ownership: Ownership, bundle: &str) -> String {
    if operation.is_ownership_sensitive() {
        format!("{} {} {} content", operation, ownership, bundle)
    } else {
        format!("{} {} content", operation, bundle)
    }
}

/// Generate the default entity-operation permissions for content bundles.
///
/// `group_content_bundles` maps a content entity type id to its bundles.
/// For each bundle this yields `create` (any) plus `update` and `delete`
/// in both `own` and `any` flavours.
pub fn default_entity_operation_permissions(
    group_content_bundles: &BTreeMap<String, Vec<String>>,
) -> Vec<GroupContentOperationPermission> {
    let mut permissions = Vec::new();

    for (entity_type, bundles) in group_content_bundles {
        for bundle in bundles {
            for operation in EntityOperation::all() {
                let ownerships: &[Ownership] = if operation.is_ownership_sensitive() {
                    &[Ownership::Own, Ownership::Any]
                } else {
                    &[Ownership::Any]
                };

                for ownership in ownerships {
                    permissions.push(
                        GroupContentOperationPermission::new(
                            permission_name(operation, *ownership, bundle),
                            operation.as_str(),
                            *ownership,
                        )
                        .for_bundle(entity_type.as_str(), bundle.as_str()),
                    );
                }
            }
        }
    }

    permissions
}
