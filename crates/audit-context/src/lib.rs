//! Audit Diff Context
//!
//! The collaborators revision diffing reads from, injected explicitly
//! rather than looked up from globals.
//!
//! # Collaborators
//!
//! - **People**: [`PersonCache`] over a [`PersonSource`], synchronous lookups
//!   plus one batched async fetch
//! - **Field aliases**: [`AttributeRegistry`]
//! - **Roles**: [`RoleRegistry`] and [`ActorRoleResolver`]
//! - **Dates**: [`DateFormatter`]
//! - **Stubs**: [`ObjectResolver`], optionally wrapped in [`CachedObjectResolver`]
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_context::{DiffContext, InMemoryObjectResolver, InMemoryPersonSource};
//!
//! let ctx = DiffContext::new(
//!     Arc::new(InMemoryPersonSource::new()),
//!     Arc::new(InMemoryObjectResolver::new()),
//! )
//! .with_attributes(Arc::new(attributes))
//! .with_roles(Arc::new(roles));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod error;
pub mod format;
pub mod people;
pub mod registry;
pub mod resolver;

pub use context::DiffContext;
pub use error::{ContextError, ContextResult};
pub use format::{DateFormatter, HumanDateFormatter};
pub use people::{InMemoryPersonSource, PersonCache, PersonSource};
pub use registry::{
    AclRoleResolver, ActorRoleResolver, AttributeRegistry, RoleRegistry, StaticAttributeRegistry,
    StaticRoleRegistry,
};
pub use resolver::{CachedObjectResolver, InMemoryObjectResolver, ObjectResolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring a diff context
    pub use crate::context::DiffContext;
    pub use crate::error::{ContextError, ContextResult};
    pub use crate::people::{PersonCache, PersonSource};
    pub use crate::registry::{ActorRoleResolver, AttributeRegistry, RoleRegistry};
    pub use crate::resolver::ObjectResolver;
}
