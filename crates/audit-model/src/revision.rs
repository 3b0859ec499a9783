//! Revision snapshots
//!
//! A [`Revision`] is an immutable point-in-time copy of a governed entity, a
//! [`RelationshipRevision`] the same for a mapping between two objects.
//! Content is kept as raw JSON; structured parts (ACL, custom attributes,
//! automapping) are decoded on demand.

use crate::acl::AclEntry;
use crate::attribute::{CustomAttributeDefinition, CustomAttributeValue};
use crate::error::{ModelError, ModelResult};
use crate::ids::RevisionId;
use crate::object::{ObjectKey, ObjectRef};
use crate::person::PersonRef;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Raw snapshot content, field name → value
pub type Content = Map<String, Value>;

/// Well-known content keys
pub mod keys {
    /// Role → person assignments
    pub const ACCESS_CONTROL_LIST: &str = "access_control_list";
    /// Custom attribute values
    pub const CUSTOM_ATTRIBUTE_VALUES: &str = "custom_attribute_values";
    /// Custom attribute definitions in force at snapshot time
    pub const CUSTOM_ATTRIBUTE_DEFINITIONS: &str = "custom_attribute_definitions";
    /// Relationship attributes
    pub const ATTRS: &str = "attrs";
    /// Assignee type relationship attribute
    pub const ASSIGNEE_TYPE: &str = "AssigneeType";
    /// Automapping origin of a relationship
    pub const AUTOMAPPING: &str = "automapping";
    /// Review state of an object
    pub const REVIEW_STATUS: &str = "review_status";
}

/// What the backend did to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionAction {
    /// Resource was created
    Created,
    /// Resource was modified
    #[default]
    Modified,
    /// Resource was deleted
    Deleted,
}

impl RevisionAction {
    /// Capitalized label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
        }
    }
}

/// Snapshot of a governed entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Revision row id
    #[serde(default)]
    pub id: RevisionId,
    /// Snapshotted model type
    pub resource_type: String,
    /// Snapshotted object id
    #[serde(default)]
    pub resource_id: u64,
    /// Field values at that point in time
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Content,
    /// Acting person
    #[serde(default)]
    pub modified_by: Option<PersonRef>,
    /// When the snapshot was taken
    pub updated_at: DateTime<Utc>,
    /// What happened
    #[serde(default)]
    pub action: RevisionAction,
}

impl Revision {
    /// Create revision with empty content
    #[must_use]
    pub fn new(
        id: impl Into<RevisionId>,
        resource_type: impl Into<String>,
        resource_id: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            resource_id,
            content: Content::new(),
            modified_by: None,
            updated_at,
            action: RevisionAction::Modified,
        }
    }

    /// Synthetic empty baseline used before the first real snapshot
    #[must_use]
    pub fn empty(resource_type: impl Into<String>) -> Self {
        Self::new(RevisionId::default(), resource_type, 0, DateTime::<Utc>::default())
    }

    /// Set one content field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.content.insert(name.into(), value);
        self
    }

    /// Replace content; non-object values yield empty content
    #[must_use]
    pub fn with_content(mut self, content: Value) -> Self {
        self.content = match content {
            Value::Object(map) => map,
            _ => Content::new(),
        };
        self
    }

    /// Set acting person
    #[must_use]
    pub fn by(mut self, person: PersonRef) -> Self {
        self.modified_by = Some(person);
        self
    }

    /// Set action
    #[must_use]
    pub fn with_action(mut self, action: RevisionAction) -> Self {
        self.action = action;
        self
    }

    /// Raw field value
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.get(name)
    }

    /// Access-control assignments; absent means none
    ///
    /// # Errors
    /// Returns error if the list is present but malformed
    pub fn access_control_list(&self) -> ModelResult<Vec<AclEntry>> {
        decode_list(&self.content, keys::ACCESS_CONTROL_LIST)
    }

    /// Custom attribute values; absent means none
    ///
    /// # Errors
    /// Returns error if the list is present but malformed
    pub fn custom_attribute_values(&self) -> ModelResult<Vec<CustomAttributeValue>> {
        decode_list(&self.content, keys::CUSTOM_ATTRIBUTE_VALUES)
    }

    /// Custom attribute definitions; absent means none
    ///
    /// # Errors
    /// Returns error if the list is present but malformed
    pub fn custom_attribute_definitions(&self) -> ModelResult<Vec<CustomAttributeDefinition>> {
        decode_list(&self.content, keys::CUSTOM_ATTRIBUTE_DEFINITIONS)
    }
}

/// Endpoints of a relationship created as a side effect of another mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automapping {
    /// Source of the triggering mapping
    pub source: ObjectRef,
    /// Destination of the triggering mapping
    pub destination: ObjectRef,
}

/// Snapshot of a relationship between two objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRevision {
    /// Revision row id
    #[serde(default)]
    pub id: RevisionId,
    /// Relationship id
    #[serde(default)]
    pub resource_id: u64,
    /// Source endpoint
    pub source: ObjectRef,
    /// Destination endpoint
    pub destination: ObjectRef,
    /// Relationship fields
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Content,
    /// Acting person
    #[serde(default)]
    pub modified_by: Option<PersonRef>,
    /// When the snapshot was taken
    pub updated_at: DateTime<Utc>,
    /// What happened to the relationship
    #[serde(default)]
    pub action: RevisionAction,
}

impl RelationshipRevision {
    /// Create relationship revision with empty content
    #[must_use]
    pub fn new(
        id: impl Into<RevisionId>,
        source: ObjectRef,
        destination: ObjectRef,
        action: RevisionAction,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_id: 0,
            source,
            destination,
            content: Content::new(),
            modified_by: None,
            updated_at,
            action,
        }
    }

    /// Set relationship id
    #[must_use]
    pub fn for_relationship(mut self, resource_id: u64) -> Self {
        self.resource_id = resource_id;
        self
    }

    /// Set acting person
    #[must_use]
    pub fn by(mut self, person: PersonRef) -> Self {
        self.modified_by = Some(person);
        self
    }

    /// Set the `AssigneeType` relationship attribute
    #[must_use]
    pub fn with_assignee_type(mut self, assignee_type: impl Into<String>) -> Self {
        let mut attrs = Map::new();
        attrs.insert(keys::ASSIGNEE_TYPE.to_string(), Value::String(assignee_type.into()));
        self.content.insert(keys::ATTRS.to_string(), Value::Object(attrs));
        self
    }

    /// Mark as automapped from the given mapping
    #[must_use]
    pub fn automapped_from(mut self, source: ObjectRef, destination: ObjectRef) -> Self {
        let origin = Automapping {
            source,
            destination,
        };
        if let Ok(value) = serde_json::to_value(origin) {
            self.content.insert(keys::AUTOMAPPING.to_string(), value);
        }
        self
    }

    /// Non-empty `AssigneeType` attribute, if any
    #[must_use]
    pub fn assignee_type(&self) -> Option<&str> {
        self.content
            .get(keys::ATTRS)?
            .get(keys::ASSIGNEE_TYPE)?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Automapping origin, if this relationship was system generated
    ///
    /// # Errors
    /// Returns error if the automapping payload is malformed
    pub fn automapping(&self) -> ModelResult<Option<Automapping>> {
        match self.content.get(keys::AUTOMAPPING) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ModelError::decode(keys::AUTOMAPPING, e)),
        }
    }

    /// The endpoint that is not `subject`
    #[must_use]
    pub fn other_side(&self, subject: &ObjectKey) -> &ObjectRef {
        if self.destination.is(subject) {
            &self.source
        } else {
            &self.destination
        }
    }
}

fn decode_list<T: DeserializeOwned>(content: &Content, field: &'static str) -> ModelResult<Vec<T>> {
    match content.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| ModelError::decode(field, e))
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Content, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Content>::deserialize(deserializer)?.unwrap_or_default())
}
