//! Collaborator bundle passed into every differ

use crate::format::{DateFormatter, HumanDateFormatter};
use crate::people::{PersonCache, PersonSource};
use crate::registry::{
    AclRoleResolver, ActorRoleResolver, AttributeRegistry, RoleRegistry, StaticAttributeRegistry,
    StaticRoleRegistry,
};
use crate::resolver::ObjectResolver;
use std::fmt;
use std::sync::Arc;

/// Everything the differs read besides the revisions themselves
///
/// Cheap to clone; all members are shared.
#[derive(Clone)]
pub struct DiffContext {
    /// Person-by-id cache
    pub people: Arc<PersonCache>,
    /// Field aliases
    pub attributes: Arc<dyn AttributeRegistry>,
    /// Assignable roles
    pub roles: Arc<dyn RoleRegistry>,
    /// Actor role lookup
    pub actor_roles: Arc<dyn ActorRoleResolver>,
    /// Date rendering
    pub dates: Arc<dyn DateFormatter>,
    /// Stub resolution
    pub objects: Arc<dyn ObjectResolver>,
}

impl DiffContext {
    /// Create context with empty registries and default formatting
    #[must_use]
    pub fn new(people: Arc<dyn PersonSource>, objects: Arc<dyn ObjectResolver>) -> Self {
        let roles: Arc<dyn RoleRegistry> = Arc::new(StaticRoleRegistry::new());
        Self {
            people: Arc::new(PersonCache::new(people)),
            attributes: Arc::new(StaticAttributeRegistry::new()),
            actor_roles: Arc::new(AclRoleResolver::new(Arc::clone(&roles))),
            roles,
            dates: Arc::new(HumanDateFormatter::default()),
            objects,
        }
    }

    /// Share an existing person cache
    #[inline]
    #[must_use]
    pub fn with_person_cache(mut self, people: Arc<PersonCache>) -> Self {
        self.people = people;
        self
    }

    /// With field aliases
    #[inline]
    #[must_use]
    pub fn with_attributes(mut self, attributes: Arc<dyn AttributeRegistry>) -> Self {
        self.attributes = attributes;
        self
    }

    /// With role registry; also rebuilds the default actor role resolver
    #[inline]
    #[must_use]
    pub fn with_roles(mut self, roles: Arc<dyn RoleRegistry>) -> Self {
        self.actor_roles = Arc::new(AclRoleResolver::new(Arc::clone(&roles)));
        self.roles = roles;
        self
    }

    /// With actor role resolver
    #[inline]
    #[must_use]
    pub fn with_actor_roles(mut self, actor_roles: Arc<dyn ActorRoleResolver>) -> Self {
        self.actor_roles = actor_roles;
        self
    }

    /// With date formatter
    #[inline]
    #[must_use]
    pub fn with_dates(mut self, dates: Arc<dyn DateFormatter>) -> Self {
        self.dates = dates;
        self
    }

    /// With stub resolver
    #[inline]
    #[must_use]
    pub fn with_objects(mut self, objects: Arc<dyn ObjectResolver>) -> Self {
        self.objects = objects;
        self
    }
}

impl fmt::Debug for DiffContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffContext")
            .field("people", &self.people)
            .field("attributes", &self.attributes)
            .field("roles", &self.roles)
            .field("actor_roles", &self.actor_roles)
            .field("dates", &self.dates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::InMemoryPersonSource;
    use crate::resolver::InMemoryObjectResolver;
    use audit_model::{AclEntry, PersonRef, Role};

    #[test]
    fn with_roles_rewires_actor_resolver() {
        let ctx = DiffContext::new(
            Arc::new(InMemoryPersonSource::new()),
            Arc::new(InMemoryObjectResolver::new()),
        );
        let acl = vec![AclEntry::new(1, 4)];
        assert_eq!(ctx.actor_roles.role_at(Some(&PersonRef::new(4)), "Control", &acl), None);

        let ctx = ctx.with_roles(Arc::new(
            StaticRoleRegistry::new().with("Control", vec![Role::new(1, "Admin")]),
        ));
        assert_eq!(
            ctx.actor_roles
                .role_at(Some(&PersonRef::new(4)), "Control", &acl)
                .as_deref(),
            Some("Admin")
        );
        assert_eq!(ctx.roles.assignable_roles("Control").len(), 1);
    }
}
