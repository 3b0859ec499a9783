//! Attribute metadata and custom attribute values

use crate::ids::CustomAttributeId;
use crate::object::ObjectRef;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Friendly alias for a raw content field
///
/// Fields of a registered type without an alias are hidden from diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrDef {
    /// Raw field name inside revision content
    pub attr_name: String,
    /// Name shown to users
    pub display_name: String,
}

impl AttrDef {
    /// Create alias
    #[inline]
    #[must_use]
    pub fn new(attr_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            attr_name: attr_name.into(),
            display_name: display_name.into(),
        }
    }
}

/// Kind of a custom attribute, drives value rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttributeType {
    /// Single line text
    #[default]
    Text,
    /// Rich text
    #[serde(rename = "Rich Text")]
    RichText,
    /// Dropdown choice
    Dropdown,
    /// Checkbox stored as `"0"`/`"1"`
    Checkbox,
    /// Date
    Date,
    /// Reference to a person
    #[serde(rename = "Map:Person")]
    MapPerson,
    /// Any type this crate doesn't render specially
    #[serde(other)]
    Other,
}

/// Custom attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttributeDefinition {
    /// Definition id
    pub id: CustomAttributeId,
    /// Title, used as the field name of changes
    pub title: String,
    /// Value kind
    #[serde(default)]
    pub attribute_type: AttributeType,
}

impl CustomAttributeDefinition {
    /// Create definition
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<CustomAttributeId>,
        title: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            attribute_type,
        }
    }
}

/// Stored custom attribute value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomAttributeValue {
    /// Definition this value belongs to
    pub custom_attribute_id: CustomAttributeId,
    /// Raw stored value
    #[serde(default, deserialize_with = "lenient_string")]
    pub attribute_value: Option<String>,
    /// Referenced object for mapping types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_object: Option<ObjectRef>,
}

impl CustomAttributeValue {
    /// Plain value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<CustomAttributeId>, value: impl Into<String>) -> Self {
        Self {
            custom_attribute_id: id.into(),
            attribute_value: Some(value.into()),
            attribute_object: None,
        }
    }

    /// Attach referenced object
    #[inline]
    #[must_use]
    pub fn with_object(mut self, object: ObjectRef) -> Self {
        self.attribute_object = Some(object);
        self
    }
}

/// Accepts strings, numbers and booleans; `null` becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(if b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    })
}
