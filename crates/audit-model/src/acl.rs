//! Access-control list entries and roles

use crate::ids::{PersonId, RoleId};
use crate::person::PersonRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Assignable access-control role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id
    pub id: RoleId,
    /// Role name, used as the field name of role diffs
    pub name: String,
}

impl Role {
    /// Create role
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One `{role, person}` assignment inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// Assigned role
    #[serde(rename = "ac_role_id", alias = "role_id")]
    pub role_id: RoleId,
    /// Assigned person
    pub person: PersonRef,
}

impl AclEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(role_id: impl Into<RoleId>, person_id: impl Into<PersonId>) -> Self {
        Self {
            role_id: role_id.into(),
            person: PersonRef::new(person_id),
        }
    }
}

/// Ids of everyone assigned `role` in `entries`
#[must_use]
pub fn people_with_role(entries: &[AclEntry], role: RoleId) -> BTreeSet<PersonId> {
    entries
        .iter()
        .filter(|e| e.role_id == role)
        .map(|e| e.person.id)
        .collect()
}

/// Ids of every role `person` holds in `entries`
#[must_use]
pub fn roles_of(entries: &[AclEntry], person: PersonId) -> BTreeSet<RoleId> {
    entries
        .iter()
        .filter(|e| e.person.id == person)
        .map(|e| e.role_id)
        .collect()
}
