//! # Access results
//!
//! The outcome of an access check together with the cacheability metadata of
//! everything consulted to reach it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cacheability::{CacheableDependency, CacheableMetadata};

/// The three possible outcomes of an access check.
///
/// - **Allowed**: access is granted
/// - **Forbidden**: access is denied
/// - **Neutral**: no opinion, other checks decide
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Access is granted.
    Allowed,

    /// Access is denied.
    Forbidden,

    /// No opinion.
    Neutral,
}

impl AccessOutcome {
    /// Get the string representation of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Allowed => "allowed",
            AccessOutcome::Forbidden => "forbidden",
            AccessOutcome::Neutral => "neutral",
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An access outcome carrying the cacheability of its inputs.
///
/// # Example
///
/// ```
/// use og_rbac::AccessResult;
///
/// let result = AccessResult::forbidden()
///     .add_cache_tags(["node:1"])
///     .add_cache_contexts(["user"]);
///
/// assert!(result.is_forbidden());
/// assert!(result.cacheability().has_tag("node:1"));
/// assert!(result.cacheability().has_context("user"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResult {
    outcome: AccessOutcome,
    cacheability: CacheableMetadata,
}

impl AccessResult {
    /// Create a result with the given outcome and no dependencies.
    pub fn new(outcome: AccessOutcome) -> Self {
        Self {
            outcome,
            cacheability: CacheableMetadata::new(),
        }
    }

    /// An allowed result.
    pub fn allowed() -> Self {
        Self::new(AccessOutcome::Allowed)
    }

    /// A forbidden result.
    pub fn forbidden() -> Self {
        Self::new(AccessOutcome::Forbidden)
    }

    /// A neutral result.
    pub fn neutral() -> Self {
        Self::new(AccessOutcome::Neutral)
    }

    /// Allowed if `condition` holds, neutral otherwise.
    pub fn allowed_if(condition: bool) -> Self {
        if condition {
            Self::allowed()
        } else {
            Self::neutral()
        }
    }

    /// The outcome.
    pub fn outcome(&self) -> AccessOutcome {
        self.outcome
    }

    /// Check if access is allowed.
    pub fn is_allowed(&self) -> bool {
        self.outcome == AccessOutcome::Allowed
    }

    /// Check if access is forbidden.
    pub fn is_forbidden(&self) -> bool {
        self.outcome == AccessOutcome::Forbidden
    }

    /// Check if the result is neutral.
    pub fn is_neutral(&self) -> bool {
        self.outcome == AccessOutcome::Neutral
    }

    /// The cacheability metadata attached to this result.
    pub fn cacheability(&self) -> &CacheableMetadata {
        &self.cacheability
    }

    /// Add cache tags.
    pub fn add_cache_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cacheability.add_cache_tags(tags);
        self
    }

    /// Add cache contexts.
    pub fn add_cache_contexts<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cacheability.add_cache_contexts(contexts);
        self
    }

    /// Fold a dependency's cacheability into this result.
    pub fn add_cacheable_dependency(mut self, dependency: &dyn CacheableDependency) -> Self {
        self.cacheability.add_dependency(dependency);
        self
    }

    /// Merge metadata into this result.
    pub fn with_cacheability(mut self, metadata: &CacheableMetadata) -> Self {
        self.cacheability.merge(metadata);
        self
    }

    /// Take over the cacheability of another result, keeping this outcome.
    pub fn inherit_cacheability(mut self, other: &AccessResult) -> Self {
        self.cacheability.merge(&other.cacheability);
        self
    }

    /// Split into outcome and cacheability.
    pub fn into_parts(self) -> (AccessOutcome, CacheableMetadata) {
        (self.outcome, self.cacheability)
    }
}

impl CacheableDependency for AccessResult {
    fn cache_tags(&self) -> Vec<String> {
        self.cacheability.cache_tags()
    }

    fn cache_contexts(&self) -> Vec<String> {
        self.cacheability.cache_contexts()
    }

    fn cache_max_age(&self) -> i32 {
        self.cacheability.cache_max_age()
    }
}
