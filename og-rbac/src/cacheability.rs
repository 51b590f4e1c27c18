//! # Cacheability
//!
//! Every access decision records what it depends on so an upstream page or
//! HTTP cache can store it safely:
//!
//! - **Cache tags**: invalidation keys such as `node:42` or `config:og.settings`
//! - **Cache contexts**: request dimensions the result varies by, such as `user`
//! - **Max-age**: seconds the result stays valid, [`PERMANENT`] for no limit
//!
//! Merging two sets of metadata unions tags and contexts and keeps the
//! shorter max-age.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Max-age value meaning "never expires on its own".
pub const PERMANENT: i32 = -1;

/// Cache context for results that vary by the acting user.
pub const USER_CACHE_CONTEXT: &str = "user";

/// Cache context for results that vary by the acting user's site permissions.
pub const USER_PERMISSIONS_CACHE_CONTEXT: &str = "user.permissions";

/// Something a computed result can depend on.
///
/// Implemented by configuration, entities, memberships and roles so their
/// cacheability can be folded into an access result.
pub trait CacheableDependency {
    /// Invalidation tags for this dependency.
    fn cache_tags(&self) -> Vec<String>;

    /// Request contexts this dependency varies by.
    fn cache_contexts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Max-age of this dependency in seconds.
    fn cache_max_age(&self) -> i32 {
        PERMANENT
    }
}

/// Cache tags, contexts and max-age describing what a result depends on.
///
/// # Example
///
/// ```
/// use og_rbac::cacheability::CacheableMetadata;
///
/// let mut metadata = CacheableMetadata::new();
/// metadata.add_cache_tags(["node:1"]);
///
/// let mut other = CacheableMetadata::new();
/// other.add_cache_contexts(["user"]);
/// other.set_max_age(60);
///
/// metadata.merge(&other);
/// assert!(metadata.has_tag("node:1"));
/// assert!(metadata.has_context("user"));
/// assert_eq!(metadata.max_age(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheableMetadata {
    #[serde(default)]
    tags: BTreeSet<String>,

    #[serde(default)]
    contexts: BTreeSet<String>,

    #[serde(default = "permanent")]
    max_age: i32,
}

fn permanent() -> i32 {
    PERMANENT
}

impl Default for CacheableMetadata {
    fn default() -> Self {
        Self {
            tags: BTreeSet::new(),
            contexts: BTreeSet::new(),
            max_age: PERMANENT,
        }
    }
}

impl CacheableMetadata {
    /// Create empty, permanent metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add cache tags.
    pub fn add_cache_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add cache contexts.
    pub fn add_cache_contexts<I, S>(&mut self, contexts: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contexts.extend(contexts.into_iter().map(Into::into));
        self
    }

    /// Lower the max-age to `max_age` if it is shorter than the current one.
    pub fn merge_max_age(&mut self, max_age: i32) -> &mut Self {
        self.max_age = merge_max_ages(self.max_age, max_age);
        self
    }

    /// Overwrite the max-age.
    pub fn set_max_age(&mut self, max_age: i32) -> &mut Self {
        self.max_age = max_age;
        self
    }

    /// Fold a dependency's cacheability into this metadata.
    pub fn add_dependency(&mut self, dependency: &dyn CacheableDependency) -> &mut Self {
        self.add_cache_tags(dependency.cache_tags());
        self.add_cache_contexts(dependency.cache_contexts());
        self.merge_max_age(dependency.cache_max_age())
    }

    /// Merge other metadata into this one.
    pub fn merge(&mut self, other: &CacheableMetadata) -> &mut Self {
        self.tags.extend(other.tags.iter().cloned());
        self.contexts.extend(other.contexts.iter().cloned());
        self.merge_max_age(other.max_age)
    }

    /// Cache tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Cache contexts, sorted.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().map(String::as_str)
    }

    /// Max-age in seconds, [`PERMANENT`] for no limit.
    pub fn max_age(&self) -> i32 {
        self.max_age
    }

    /// Check for a cache tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Check for a cache context.
    pub fn has_context(&self, context: &str) -> bool {
        self.contexts.contains(context)
    }

    /// Whether the result may be cached at all.
    pub fn is_cacheable(&self) -> bool {
        self.max_age != 0
    }
}

impl CacheableDependency for CacheableMetadata {
    fn cache_tags(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }

    fn cache_contexts(&self) -> Vec<String> {
        self.contexts.iter().cloned().collect()
    }

    fn cache_max_age(&self) -> i32 {
        self.max_age
    }
}

/// The shorter of two max-ages, treating [`PERMANENT`] as infinite.
pub fn merge_max_ages(a: i32, b: i32) -> i32 {
    match (a, b) {
        (PERMANENT, other) | (other, PERMANENT) => other,
        (a, b) => a.min(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Config;

    impl CacheableDependency for Config {
        fn cache_tags(&self) -> Vec<String> {
            vec!["config:og.settings".to_string()]
        }

        fn cache_max_age(&self) -> i32 {
            300
        }
    }

    #[test]
    fn test_new_metadata_is_permanent_and_empty() {
        let metadata = CacheableMetadata::new();
        assert_eq!(metadata.max_age(), PERMANENT);
        assert_eq!(metadata.tags().count(), 0);
        assert_eq!(metadata.contexts().count(), 0);
        assert!(metadata.is_cacheable());
    }

    #[test]
    fn test_merge_max_ages() {
        assert_eq!(merge_max_ages(PERMANENT, PERMANENT), PERMANENT);
        assert_eq!(merge_max_ages(PERMANENT, 60), 60);
        assert_eq!(merge_max_ages(60, PERMANENT), 60);
        assert_eq!(merge_max_ages(60, 30), 30);
        assert_eq!(merge_max_ages(0, 30), 0);
    }

    #[test]
    fn test_add_dependency() {
        let mut metadata = CacheableMetadata::new();
        metadata.add_dependency(&Config);

        assert!(metadata.has_tag("config:og.settings"));
        assert_eq!(metadata.max_age(), 300);
    }

    #[test]
    fn test_merge_unions_tags_and_contexts() {
        let mut a = CacheableMetadata::new();
        a.add_cache_tags(["node:1"]).add_cache_contexts(["user"]);

        let mut b = CacheableMetadata::new();
        b.add_cache_tags(["node:1", "node_list"]).set_max_age(10);

        a.merge(&b);
        assert_eq!(a.tags().collect::<Vec<_>>(), vec!["node:1", "node_list"]);
        assert_eq!(a.contexts().collect::<Vec<_>>(), vec!["user"]);
        assert_eq!(a.max_age(), 10);
    }

    #[test]
    fn test_serde_defaults_to_permanent() {
        let metadata: CacheableMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata, CacheableMetadata::new());
    }
}
