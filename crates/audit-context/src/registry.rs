//! Attribute and role registries
//!
//! Provides the per-type metadata the differs consult:
//! - [`AttributeRegistry`]: field aliases per model type
//! - [`RoleRegistry`]: assignable access-control roles per model type
//! - [`ActorRoleResolver`]: the acting person's role at a point in time

use audit_model::{roles_of, AclEntry, AttrDef, PersonRef, Role};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Field alias lookup by model type
pub trait AttributeRegistry: Send + Sync + Debug {
    /// Aliases for `resource_type`; `None` when the type has no metadata
    fn definitions_for(&self, resource_type: &str) -> Option<&[AttrDef]>;
}

/// Assignable roles by model type
pub trait RoleRegistry: Send + Sync + Debug {
    /// Roles for `object_type`, highest priority first
    fn assignable_roles(&self, object_type: &str) -> Vec<Role>;
}

/// Resolves what role an actor held when a change was made
pub trait ActorRoleResolver: Send + Sync + Debug {
    /// Role name of `actor` given the ACL in force at the time; `None`
    /// lets the caller apply its default role
    fn role_at(
        &self,
        actor: Option<&PersonRef>,
        object_type: &str,
        acl: &[AclEntry],
    ) -> Option<String>;
}

/// Registry of field aliases held in memory
#[derive(Debug, Default, Clone)]
pub struct StaticAttributeRegistry {
    definitions: HashMap<String, Vec<AttrDef>>,
}

impl StaticAttributeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register aliases for a model type, replacing earlier ones
    pub fn register(&mut self, resource_type: impl Into<String>, defs: Vec<AttrDef>) {
        self.definitions.insert(resource_type.into(), defs);
    }

    /// Builder form of [`Self::register`]
    #[must_use]
    pub fn with(mut self, resource_type: impl Into<String>, defs: Vec<AttrDef>) -> Self {
        self.register(resource_type, defs);
        self
    }

    /// Whether `resource_type` has metadata
    #[inline]
    #[must_use]
    pub fn contains(&self, resource_type: &str) -> bool {
        self.definitions.contains_key(resource_type)
    }

    /// Number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no type is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl AttributeRegistry for StaticAttributeRegistry {
    fn definitions_for(&self, resource_type: &str) -> Option<&[AttrDef]> {
        self.definitions.get(resource_type).map(Vec::as_slice)
    }
}

/// Registry of roles held in memory
#[derive(Debug, Default, Clone)]
pub struct StaticRoleRegistry {
    roles: HashMap<String, Vec<Role>>,
}

impl StaticRoleRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register roles for a model type in priority order
    pub fn register(&mut self, object_type: impl Into<String>, roles: Vec<Role>) {
        self.roles.insert(object_type.into(), roles);
    }

    /// Builder form of [`Self::register`]
    #[must_use]
    pub fn with(mut self, object_type: impl Into<String>, roles: Vec<Role>) -> Self {
        self.register(object_type, roles);
        self
    }
}

impl RoleRegistry for StaticRoleRegistry {
    fn assignable_roles(&self, object_type: &str) -> Vec<Role> {
        self.roles.get(object_type).cloned().unwrap_or_default()
    }
}

/// Picks the actor's highest-priority role from the ACL snapshot
#[derive(Debug, Clone)]
pub struct AclRoleResolver {
    roles: Arc<dyn RoleRegistry>,
}

impl AclRoleResolver {
    /// Create resolver over `roles`
    #[inline]
    #[must_use]
    pub fn new(roles: Arc<dyn RoleRegistry>) -> Self {
        Self { roles }
    }
}

impl ActorRoleResolver for AclRoleResolver {
    fn role_at(
        &self,
        actor: Option<&PersonRef>,
        object_type: &str,
        acl: &[AclEntry],
    ) -> Option<String> {
        let held = roles_of(acl, actor?.id);
        if held.is_empty() {
            return None;
        }

        self.roles
            .assignable_roles(object_type)
            .into_iter()
            .find(|role| held.contains(&role.id))
            .map(|role| role.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Arc<dyn RoleRegistry> {
        Arc::new(StaticRoleRegistry::new().with(
            "Control",
            vec![Role::new(1, "Admin"), Role::new(2, "Assignee"), Role::new(3, "Verifier")],
        ))
    }

    #[test]
    fn attribute_registry_lookup() {
        let registry = StaticAttributeRegistry::new()
            .with("Control", vec![AttrDef::new("title", "Object Name")]);
        assert!(registry.contains("Control"));
        assert_eq!(registry.definitions_for("Control").unwrap().len(), 1);
        assert!(registry.definitions_for("Relationship").is_none());
    }

    #[test]
    fn role_registry_unknown_type_is_empty() {
        assert!(roles().assignable_roles("Risk").is_empty());
        assert_eq!(roles().assignable_roles("Control").len(), 3);
    }

    #[test]
    fn resolver_picks_highest_priority_role() {
        let resolver = AclRoleResolver::new(roles());
        let acl = vec![AclEntry::new(3, 7), AclEntry::new(2, 7), AclEntry::new(1, 8)];
        let actor = PersonRef::new(7);
        assert_eq!(resolver.role_at(Some(&actor), "Control", &acl).as_deref(), Some("Assignee"));
    }

    #[test]
    fn resolver_yields_nothing_without_a_match() {
        let resolver = AclRoleResolver::new(roles());
        let acl = vec![AclEntry::new(1, 8)];
        assert_eq!(resolver.role_at(None, "Control", &acl), None);
        assert_eq!(resolver.role_at(Some(&PersonRef::new(7)), "Control", &acl), None);
        assert_eq!(resolver.role_at(Some(&PersonRef::new(8)), "Risk", &acl), None);
    }
}
