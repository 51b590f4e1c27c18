//! Settings for group access
//!
//! This module provides the `og.settings` configuration object. Every access
//! decision on a group depends on it, so it is also a cacheable dependency.

use serde::{Deserialize, Serialize};

use og_rbac::CacheableDependency;

use crate::error::SettingsResult;

/// Name of the configuration object.
pub const SETTINGS_NAME: &str = "og.settings";

/// Group access settings.
///
/// # Examples
///
/// ```
/// use og_membership::OgSettings;
///
/// let settings = OgSettings::default();
/// assert!(!settings.group_manager_full_access);
///
/// let settings = OgSettings::from_json(r#"{"group_manager_full_access": true}"#).unwrap();
/// assert!(settings.group_manager_full_access);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OgSettings {
    /// Group owners get full access to their groups
    #[serde(default)]
    pub group_manager_full_access: bool,
}

impl OgSettings {
    /// Parse settings from a JSON document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enable or disable full access for group owners.
    pub fn with_group_manager_full_access(mut self, enabled: bool) -> Self {
        self.group_manager_full_access = enabled;
        self
    }

    /// The tag invalidated when the settings change.
    pub fn cache_tag() -> String {
        format!("config:{}", SETTINGS_NAME)
    }
}

impl CacheableDependency for OgSettings {
    fn cache_tags(&self) -> Vec<String> {
        vec![Self::cache_tag()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;

    #[test]
    fn test_defaults() {
        let settings = OgSettings::from_json("{}").unwrap();
        assert_eq!(settings, OgSettings::default());
    }

    #[test]
    fn test_builder() {
        let settings = OgSettings::default().with_group_manager_full_access(true);
        assert!(settings.group_manager_full_access);
    }

    #[test]
    fn test_invalid_json() {
        let err = OgSettings::from_json("{not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
        assert!(err.to_string().starts_with("Invalid settings"));
    }

    #[test]
    fn test_cache_tag() {
        assert_eq!(OgSettings::default().cache_tags(), vec!["config:og.settings".to_string()]);
    }
}
