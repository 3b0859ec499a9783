//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.

use crate::error::{EngineError, EngineResult};
use audit_diff::DiffRules;
use audit_model::PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Diff engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fields rendered as human dates
    pub date_fields: BTreeSet<String>,
    /// Comma-separated fields normalized before comparison
    pub list_fields: BTreeSet<String>,
    /// Rendering of empty values
    pub placeholder: String,
    /// Role reported when the actor holds no assignable role
    pub default_role: String,
    /// How long the ACL backfill waits for the person prefetch
    pub prefetch_timeout_ms: u64,
    /// Maximum number of resolved stubs kept in memory
    pub object_cache_capacity: u64,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and validate
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML or fails validation
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub async fn from_toml_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::io(path, e))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml(&self) -> EngineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values that would make the engine misbehave
    ///
    /// # Errors
    /// Returns error for a zero timeout or an empty placeholder
    pub fn validate(&self) -> EngineResult<()> {
        if self.prefetch_timeout_ms == 0 {
            return Err(EngineError::config("prefetch_timeout_ms must be positive"));
        }
        if self.placeholder.is_empty() {
            return Err(EngineError::config("placeholder must not be empty"));
        }
        Ok(())
    }

    /// Formatting rules handed to the differs
    #[must_use]
    pub fn rules(&self) -> DiffRules {
        DiffRules {
            date_fields: self.date_fields.clone(),
            list_fields: self.list_fields.clone(),
            placeholder: self.placeholder.clone(),
        }
    }

    /// Prefetch timeout as a duration
    #[inline]
    #[must_use]
    pub fn prefetch_timeout(&self) -> Duration {
        Duration::from_millis(self.prefetch_timeout_ms)
    }

    /// With default role
    #[inline]
    #[must_use]
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = role.into();
        self
    }

    /// With prefetch timeout
    #[inline]
    #[must_use]
    pub fn with_prefetch_timeout(mut self, timeout: Duration) -> Self {
        self.prefetch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With placeholder
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// With extra date field
    #[must_use]
    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_fields.insert(field.into());
        self
    }

    /// With extra list field
    #[must_use]
    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_fields.insert(field.into());
        self
    }

    /// With stub cache capacity
    #[inline]
    #[must_use]
    pub fn with_object_cache_capacity(mut self, capacity: u64) -> Self {
        self.object_cache_capacity = capacity;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let rules = DiffRules::default();
        Self {
            date_fields: rules.date_fields,
            list_fields: rules.list_fields,
            placeholder: PLACEHOLDER.to_string(),
            default_role: "none".to_string(),
            prefetch_timeout_ms: 30_000,
            object_cache_capacity: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            "default_role = \"Reader\"\nlist_fields = [\"recipients\", \"cc\"]\nprefetch_timeout_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.default_role, "Reader");
        assert!(config.list_fields.contains("cc"));
        assert_eq!(config.prefetch_timeout(), Duration::from_millis(250));
        assert_eq!(config.placeholder, PLACEHOLDER);
        assert!(config.date_fields.contains("verified_date"));
    }

    #[test]
    fn rejects_zero_timeout_and_empty_placeholder() {
        assert!(matches!(
            EngineConfig::from_toml_str("prefetch_timeout_ms = 0"),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("placeholder = \"\""),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("placeholder = 3"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn toml_output_parses_back() {
        let config = EngineConfig::new()
            .with_default_role("Auditor")
            .with_date_field("due_on");
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rules_mirror_config() {
        let rules = EngineConfig::new().with_list_field("cc").with_placeholder("n/a").rules();
        assert!(rules.is_list_field("cc"));
        assert!(rules.is_date_field("created_at"));
        assert_eq!(rules.placeholder, "n/a");
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = EngineConfig::from_toml_file("/nonexistent/audit.toml")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/audit.toml"));
    }
}
