//! Audit Differs
//!
//! The four differs that turn adjacent revisions into rendered changes.
//!
//! # Core Concepts
//!
//! - [`FieldDiffer`]: plain content fields, alias-gated, with date and comma-list formatting
//! - [`CustomAttributeDiffer`]: custom attribute values rendered per attribute type
//! - [`AccessControlDiffer`]: role membership, resolved to emails after the person prefetch
//! - [`MappingDiffer`]: one row per relationship revision, with automapping narratives
//! - [`DiffRules`]: which fields are dates or lists, and the empty-value placeholder
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_diff::{DiffRules, FieldDiffer};
//!
//! let differ = FieldDiffer::new(Arc::new(DiffRules::default()), ctx.dates.clone());
//! let diff = differ.diff(&prev, &next, ctx.attributes.definitions_for(&next.resource_type));
//! for change in diff.changes {
//!     println!("{}: {} → {}", change.field_name, change.orig_val, change.new_val);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod access_control;
mod custom_attributes;
mod fields;
mod mapping;
mod rules;

pub use access_control::{acl_or_empty, AccessControlDiffer, PendingRoleDiff};
pub use custom_attributes::{CustomAttributeDiffer, CHECKMARK};
pub use fields::{normalize_list, FieldDiff, FieldDiffer};
pub use mapping::{MappingDiffer, UNKNOWN_ACTOR};
pub use rules::DiffRules;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
