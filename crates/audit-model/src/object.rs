//! References to related objects
//!
//! Relationship revisions point at their endpoints with an [`ObjectRef`].
//! The backend often sends only `{id, type}` (a stub); the display fields
//! are filled in once the stub is resolved.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Type + id identity of an object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Model type, e.g. `Control`
    #[serde(rename = "type")]
    pub kind: String,
    /// Object id
    pub id: u64,
}

impl ObjectKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}

/// Stub or fully resolved reference to another object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object id
    pub id: u64,
    /// Model type
    #[serde(rename = "type")]
    pub kind: String,
    /// Title field of the object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Human display type, e.g. `Control` or `Org Group`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

impl ObjectRef {
    /// Bare stub
    #[inline]
    #[must_use]
    pub fn stub(kind: impl Into<String>, id: u64) -> Self {
        Self {
            id,
            kind: kind.into(),
            title: None,
            display_name: None,
            display_type: None,
        }
    }

    /// Set title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set display name and type
    #[inline]
    #[must_use]
    pub fn with_display(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self.display_type = Some(kind.into());
        self
    }

    /// Identity of the referenced object
    #[inline]
    #[must_use]
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.kind.clone(), self.id)
    }

    /// Whether `key` names this object
    #[inline]
    #[must_use]
    pub fn is(&self, key: &ObjectKey) -> bool {
        self.id == key.id && self.kind == key.kind
    }

    /// True when no display field has been loaded yet
    #[inline]
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.title.is_none() && self.display_name.is_none()
    }

    /// Display name, falling back to title and then to `type #id`
    #[must_use]
    pub fn display_name_or_default(&self) -> String {
        self.display_name
            .as_deref()
            .or(self.title.as_deref())
            .filter(|s| !s.is_empty())
            .map_or_else(|| self.key().to_string(), str::to_string)
    }

    /// Display type, falling back to the model type
    #[must_use]
    pub fn display_type_or_default(&self) -> &str {
        self.display_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.kind)
    }

    /// Title, falling back to the display name and then to `type #id`
    #[must_use]
    pub fn title_or_default(&self) -> String {
        self.title
            .as_deref()
            .or(self.display_name.as_deref())
            .filter(|s| !s.is_empty())
            .map_or_else(|| self.key().to_string(), str::to_string)
    }
}
