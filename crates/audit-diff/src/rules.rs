//! Per-field formatting rules

use audit_model::PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which fields get date or list formatting, and how empties render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRules {
    /// Fields rendered as human dates
    pub date_fields: BTreeSet<String>,
    /// Comma-separated fields normalized before comparison
    pub list_fields: BTreeSet<String>,
    /// Rendering of empty values
    pub placeholder: String,
}

impl DiffRules {
    /// Date fields known to the backend
    pub const DEFAULT_DATE_FIELDS: [&'static str; 7] = [
        "created_at",
        "updated_at",
        "start_date",
        "end_date",
        "requested_on",
        "finished_date",
        "verified_date",
    ];

    /// Comma-list fields known to the backend
    pub const DEFAULT_LIST_FIELDS: [&'static str; 1] = ["recipients"];

    /// Whether `field` renders as a date
    #[inline]
    #[must_use]
    pub fn is_date_field(&self, field: &str) -> bool {
        self.date_fields.contains(field)
    }

    /// Whether `field` is a comma list
    #[inline]
    #[must_use]
    pub fn is_list_field(&self, field: &str) -> bool {
        self.list_fields.contains(field)
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

    /// With placeholder
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

impl Default for DiffRules {
    fn default() -> Self {
        Self {
            date_fields: Self::DEFAULT_DATE_FIELDS.iter().map(|s| s.to_string()).collect(),
            list_fields: Self::DEFAULT_LIST_FIELDS.iter().map(|s| s.to_string()).collect(),
            placeholder: PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let rules = DiffRules::default();
        assert!(rules.is_date_field("verified_date"));
        assert!(rules.is_list_field("recipients"));
        assert!(!rules.is_list_field("title"));
        assert_eq!(rules.placeholder, "—");
    }

    #[test]
    fn builders_extend_defaults() {
        let rules = DiffRules::default()
            .with_date_field("last_deprecated_date")
            .with_list_field("tags")
            .with_placeholder("-");
        assert!(rules.is_date_field("last_deprecated_date"));
        assert!(rules.is_date_field("start_date"));
        assert!(rules.is_list_field("tags"));
        assert_eq!(rules.placeholder, "-");
    }
}
