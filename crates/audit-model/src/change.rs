//! Diff output types
//!
//! What the engine hands to the rendering layer: [`DiffEntry`] rows for
//! object snapshots, [`MappingChange`] rows for relationships, merged into
//! [`HistoryEntry`] and displayed newest first.

use crate::person::PersonRef;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Rendered stand-in for an empty value
pub const PLACEHOLDER: &str = "—";

/// Rendered field value: a string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Scalar rendering
    Text(String),
    /// List rendering, compared as a multiset
    List(Vec<String>),
}

impl FieldValue {
    /// Text value
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Default placeholder
    #[inline]
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Text(PLACEHOLDER.to_string())
    }

    /// Whether two renderings differ
    ///
    /// Lists are compared order-independently, anything else by its
    /// string form.
    #[must_use]
    pub fn differs(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => {
                let mut a = a.clone();
                let mut b = b.clone();
                a.sort();
                b.sort();
                a != b
            }
            _ => self.to_string() != other.to_string(),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One changed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Display name of the field
    pub field_name: String,
    /// Value before
    pub orig_val: FieldValue,
    /// Value after
    pub new_val: FieldValue,
}

impl FieldChange {
    /// Create change
    #[inline]
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        orig_val: impl Into<FieldValue>,
        new_val: impl Into<FieldValue>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            orig_val: orig_val.into(),
            new_val: new_val.into(),
        }
    }
}

/// Change in the people assigned to one role
///
/// Starts out loading with empty lists; emails are filled in once the
/// person prefetch settles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessControlRoleDiff {
    /// Role name
    pub field_name: String,
    /// Emails assigned before
    pub orig_val: Vec<String>,
    /// Emails assigned after
    pub new_val: Vec<String>,
    /// Emails not resolved yet
    pub is_loading: bool,
    /// Why the emails could not be loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl AccessControlRoleDiff {
    /// Loading diff for role
    #[inline]
    #[must_use]
    pub fn loading(role_name: impl Into<String>) -> Self {
        Self {
            field_name: role_name.into(),
            orig_val: Vec::new(),
            new_val: Vec::new(),
            is_loading: true,
            load_error: None,
        }
    }

    /// Fill both sides and stop loading
    pub fn resolve(&mut self, orig_val: Vec<String>, new_val: Vec<String>) {
        self.orig_val = orig_val;
        self.new_val = new_val;
        self.is_loading = false;
        self.load_error = None;
    }

    /// Stop loading with an error
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.is_loading = false;
        self.load_error = Some(reason.into());
    }
}

/// Role diff shared between the returned entry and the backfill task
pub type SharedRoleDiff = Arc<RwLock<AccessControlRoleDiff>>;

/// One item of a [`DiffEntry`]
#[derive(Debug, Clone)]
pub enum Change {
    /// Plain or custom attribute field
    Field(FieldChange),
    /// Role membership, filled asynchronously
    AccessControl(SharedRoleDiff),
}

impl Change {
    /// Display name of the changed field or role
    #[must_use]
    pub fn field_name(&self) -> String {
        match self {
            Self::Field(change) => change.field_name.clone(),
            Self::AccessControl(diff) => diff.read().field_name.clone(),
        }
    }

    /// Field change, if this is one
    #[must_use]
    pub fn as_field(&self) -> Option<&FieldChange> {
        match self {
            Self::Field(change) => Some(change),
            Self::AccessControl(_) => None,
        }
    }

    /// Role diff handle, if this is one
    #[must_use]
    pub fn as_access_control(&self) -> Option<&SharedRoleDiff> {
        match self {
            Self::AccessControl(diff) => Some(diff),
            Self::Field(_) => None,
        }
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(change) => change.serialize(serializer),
            Self::AccessControl(diff) => diff.read().serialize(serializer),
        }
    }
}

/// Changes between two adjacent snapshots of the subject object
#[derive(Debug, Clone, Serialize)]
pub struct DiffEntry {
    /// Acting person
    pub made_by: Option<PersonRef>,
    /// Timestamp of the newer snapshot
    pub updated_at: DateTime<Utc>,
    /// Actor's role at that time
    pub role: String,
    /// Field, custom attribute and role changes in that order
    pub changes: Vec<Change>,
    /// Lower-cased new review status when it changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_was_changed: Option<String>,
}

/// Narrative for a system-generated relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomappingNote {
    /// Synthesized sentence
    pub title: String,
}

/// Change of a single relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingChange {
    /// Acting person; absent for automapped relationships
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub made_by: Option<PersonRef>,
    /// When the relationship changed
    pub updated_at: DateTime<Utc>,
    /// Actor's role at that time
    pub role: String,
    /// The relationship change
    pub changes: FieldChange,
    /// Present when the relationship was automapped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automapping: Option<AutomappingNote>,
}

/// One row of the merged history
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// Object snapshot diff
    Object(DiffEntry),
    /// Relationship change
    Mapping(MappingChange),
}

impl HistoryEntry {
    /// Sort key
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Object(entry) => entry.updated_at,
            Self::Mapping(change) => change.updated_at,
        }
    }

    /// Object diff, if this is one
    #[must_use]
    pub fn as_object(&self) -> Option<&DiffEntry> {
        match self {
            Self::Object(entry) => Some(entry),
            Self::Mapping(_) => None,
        }
    }

    /// Mapping change, if this is one
    #[must_use]
    pub fn as_mapping(&self) -> Option<&MappingChange> {
        match self {
            Self::Mapping(change) => Some(change),
            Self::Object(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(items: &[&str]) -> FieldValue {
        FieldValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn lists_compare_as_multisets() {
        assert!(!list(&["a", "b"]).differs(&list(&["b", "a"])));
        assert!(list(&["a", "b"]).differs(&list(&["a", "a", "b"])));
        assert!(list(&["a"]).differs(&FieldValue::text("b")));
        assert!(!list(&["a", "b"]).differs(&FieldValue::text("a, b")));
    }

    #[test]
    fn field_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&FieldValue::text("x")).unwrap(), r#""x""#);
        assert_eq!(serde_json::to_string(&list(&["x", "y"])).unwrap(), r#"["x","y"]"#);
    }

    #[test]
    fn role_diff_lifecycle() {
        let shared: SharedRoleDiff = Arc::new(RwLock::new(AccessControlRoleDiff::loading("Admin")));
        let change = Change::AccessControl(Arc::clone(&shared));
        assert!(shared.read().is_loading);

        shared.write().resolve(vec!["a@x".into()], vec!["b@x".into()]);
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["is_loading"], false);
        assert_eq!(json["new_val"][0], "b@x");
        assert_eq!(change.field_name(), "Admin");

        shared.write().fail("timed out");
        assert_eq!(shared.read().load_error.as_deref(), Some("timed out"));
    }

    #[test]
    fn history_entry_is_tagged() {
        let entry = HistoryEntry::Mapping(MappingChange {
            made_by: None,
            updated_at: DateTime::<Utc>::default(),
            role: "none".into(),
            changes: FieldChange::new("Mapping to Risk: R1", PLACEHOLDER, "Created"),
            automapping: None,
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "mapping");
        assert!(json.get("made_by").is_none());
        assert_eq!(json["changes"]["new_val"], "Created");
    }
}
