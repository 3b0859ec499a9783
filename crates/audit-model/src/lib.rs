//! Audit Revision Model
//!
//! Immutable snapshots of governed entities and the rendered change records
//! derived from them.
//!
//! # Core Concepts
//!
//! - [`Revision`]: point-in-time copy of an object's fields, ACL and custom attributes
//! - [`RelationshipRevision`]: point-in-time copy of a mapping between two objects
//! - [`ObjectRef`]: stub or resolved reference to a related object
//! - [`FieldChange`]: one rendered `{field_name, orig_val, new_val}` difference
//! - [`DiffEntry`] / [`MappingChange`]: rows of the merged [`HistoryEntry`] list
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_model::{Revision, keys};
//!
//! let rev: Revision = serde_json::from_str(payload)?;
//! for entry in rev.access_control_list()? {
//!     println!("{} holds role {}", entry.person.id, entry.role_id);
//! }
//! ```

#![warn(unreachable_pub)]

mod acl;
mod attribute;
mod change;
mod error;
mod ids;
mod object;
mod person;
mod revision;

pub use acl::{people_with_role, roles_of, AclEntry, Role};
pub use attribute::{AttrDef, AttributeType, CustomAttributeDefinition, CustomAttributeValue};
pub use change::{
    AccessControlRoleDiff, AutomappingNote, Change, DiffEntry, FieldChange, FieldValue,
    HistoryEntry, MappingChange, SharedRoleDiff, PLACEHOLDER,
};
pub use error::{ModelError, ModelResult};
pub use ids::{CustomAttributeId, PersonId, RevisionId, RoleId};
pub use object::{ObjectKey, ObjectRef};
pub use person::{Person, PersonRef};
pub use revision::{keys, Automapping, Content, RelationshipRevision, Revision, RevisionAction};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
