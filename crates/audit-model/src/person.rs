//! People referenced by revisions and access-control lists

use crate::ids::PersonId;
use serde::{Deserialize, Serialize};

/// Fully loaded person record, as held by the person cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Person id
    pub id: PersonId,
    /// Display name (may be blank)
    #[serde(default)]
    pub name: Option<String>,
    /// Email address
    pub email: String,
}

impl Person {
    /// Create person
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<PersonId>, name: Option<&str>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
            email: email.into(),
        }
    }

    /// Name if set, otherwise email
    #[must_use]
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Reference to a person inside a revision payload
///
/// Usually just `{id}`; name and email are only present when the backend
/// inlines them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    /// Person id
    pub id: PersonId,
    /// Inlined name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inlined email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PersonRef {
    /// Bare reference
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
        }
    }

    /// Inlined name if non-empty, else inlined email
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.email.as_deref().filter(|e| !e.is_empty()))
    }
}

impl From<&Person> for PersonRef {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            email: Some(person.email.clone()),
        }
    }
}
