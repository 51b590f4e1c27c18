//! Alteration pipeline for user permissions.
//!
//! External code may adjust a user's group permissions before the final
//! decision is made, by registering callbacks for the `og_user_access`
//! alteration point. Callbacks run in registration order and receive the
//! permissions, the cacheability metadata, and the check's context.
//!
//! Callbacks receive plain data, not the session that invoked them, so they
//! cannot touch that session's cache. Nothing stops a callback from holding
//! its own engine handle and running further access checks in a fresh
//! session. Such a callback must not check the same group and user, or it
//! recurses without bound.

use std::fmt;
use std::sync::Arc;

use og_membership::{Account, Entity};
use og_rbac::{CacheableMetadata, PermissionSet};

/// Name of the alteration point.
pub const USER_ACCESS_ALTER_HOOK: &str = "og_user_access";

/// What an alteration callback is being asked about.
#[derive(Debug, Clone, Copy)]
pub struct AlterContext<'a> {
    /// The operation being checked, after normalization
    pub operation: &'a str,
    /// The group
    pub group: &'a Entity,
    /// The user whose permissions are altered
    pub user: &'a Account,
}

/// A callback registered for the `og_user_access` alteration point.
///
/// Closures with the matching signature implement this trait.
pub trait UserAccessAlter: Send + Sync {
    /// Add or remove permissions, and extend the cacheability to cover
    /// whatever the change depended on.
    fn alter(
        &self,
        permissions: &mut PermissionSet,
        cacheability: &mut CacheableMetadata,
        context: &AlterContext<'_>,
    );
}

impl<F> UserAccessAlter for F
where
    F: Fn(&mut PermissionSet, &mut CacheableMetadata, &AlterContext<'_>) + Send + Sync,
{
    fn alter(
        &self,
        permissions: &mut PermissionSet,
        cacheability: &mut CacheableMetadata,
        context: &AlterContext<'_>,
    ) {
        self(permissions, cacheability, context)
    }
}

/// Ordered list of alteration callbacks.
///
/// # Example
///
/// ```
/// use og_access::alter::{AlterContext, AlterationPipeline};
/// use og_membership::{Account, Entity};
/// use og_rbac::{CacheableMetadata, PermissionSet};
///
/// let mut pipeline = AlterationPipeline::new();
/// pipeline.register(|permissions, cacheability, context| {
///     if context.operation == "subscribe" {
///         permissions.add("subscribe");
///         cacheability.add_cache_tags(["subscriptions"]);
///     }
/// });
///
/// let group = Entity::new("node", "article", "1");
/// let user = Account::new(5);
/// let mut permissions = PermissionSet::new();
/// let mut cacheability = CacheableMetadata::new();
/// pipeline.invoke(
///     &mut permissions,
///     &mut cacheability,
///     &AlterContext { operation: "subscribe", group: &group, user: &user },
/// );
///
/// assert!(permissions.has("subscribe"));
/// assert!(cacheability.has_tag("subscriptions"));
/// ```
#[derive(Clone, Default)]
pub struct AlterationPipeline {
    hooks: Vec<Arc<dyn UserAccessAlter>>,
}

impl fmt::Debug for AlterationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlterationPipeline")
            .field("hook", &USER_ACCESS_ALTER_HOOK)
            .field("registered", &self.hooks.len())
            .finish()
    }
}

impl AlterationPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a closure. It runs after every callback registered before it.
    pub fn register<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut PermissionSet, &mut CacheableMetadata, &AlterContext<'_>)
            + Send
            + Sync
            + 'static,
    {
        self.hooks.push(Arc::new(callback));
        self
    }

    /// Register a shared callback object.
    pub fn register_alter(&mut self, callback: Arc<dyn UserAccessAlter>) -> &mut Self {
        self.hooks.push(callback);
        self
    }

    /// Run every callback, in registration order.
    pub fn invoke(
        &self,
        permissions: &mut PermissionSet,
        cacheability: &mut CacheableMetadata,
        context: &AlterContext<'_>,
    ) {
        for hook in &self.hooks {
            hook.alter(permissions, cacheability, context);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Checks if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
