//! Role membership differences
//!
//! Detecting a change only needs person ids, so it happens immediately.
//! Rendering needs emails, which may not be cached yet: each detected
//! change is returned as a [`PendingRoleDiff`] whose shared cell starts out
//! loading and is filled once the person prefetch settles.

use audit_context::{PersonCache, RoleRegistry};
use audit_model::{
    people_with_role, AccessControlRoleDiff, AclEntry, PersonId, Revision, SharedRoleDiff,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Role diff waiting for person data
#[derive(Debug, Clone)]
pub struct PendingRoleDiff {
    /// Cell handed out in the diff entry
    pub diff: SharedRoleDiff,
    /// People holding the role before
    pub before: Vec<PersonId>,
    /// People holding the role after
    pub after: Vec<PersonId>,
}

impl PendingRoleDiff {
    /// Every person id this diff needs rendered
    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.before.iter().chain(self.after.iter()).copied()
    }

    /// Fill both sides with emails from `people`
    pub fn fill(&self, people: &PersonCache, placeholder: &str) {
        let orig_val = emails(&self.before, people, placeholder);
        let new_val = emails(&self.after, people, placeholder);
        self.diff.write().resolve(orig_val, new_val);
    }

    /// Stop loading with an error
    pub fn fail(&self, reason: &str) {
        self.diff.write().fail(reason);
    }
}

/// Emails of the resolved `ids`; unresolved ids are left out, and a side
/// with none resolved is a lone placeholder
fn emails(ids: &[PersonId], people: &PersonCache, placeholder: &str) -> Vec<String> {
    let mut resolved: Vec<String> = ids
        .iter()
        .filter_map(|id| people.find_by_id(*id))
        .map(|p| p.email)
        .collect();

    if resolved.len() < ids.len() {
        tracing::warn!(
            "Resolved {} of {} people for role diff",
            resolved.len(),
            ids.len()
        );
    }
    if resolved.is_empty() {
        return vec![placeholder.to_string()];
    }
    resolved.sort();
    resolved
}

/// Diffs role assignments between snapshots
#[derive(Debug, Clone)]
pub struct AccessControlDiffer {
    roles: Arc<dyn RoleRegistry>,
}

impl AccessControlDiffer {
    /// Create differ
    #[inline]
    #[must_use]
    pub fn new(roles: Arc<dyn RoleRegistry>) -> Self {
        Self { roles }
    }

    /// Roles whose membership changed from `prev` to `next`
    ///
    /// Returns nothing when `entity_type` is empty, since no roles can be
    /// looked up without it.
    #[must_use]
    pub fn diff(&self, prev: &Revision, next: &Revision, entity_type: &str) -> Vec<PendingRoleDiff> {
        if entity_type.is_empty() {
            return Vec::new();
        }

        let prev_acl = acl_or_empty(prev);
        let next_acl = acl_or_empty(next);

        self.roles
            .assignable_roles(entity_type)
            .into_iter()
            .filter_map(|role| {
                let before = people_with_role(&prev_acl, role.id);
                let after = people_with_role(&next_acl, role.id);
                if before.symmetric_difference(&after).next().is_none() {
                    return None;
                }
                Some(PendingRoleDiff {
                    diff: Arc::new(RwLock::new(AccessControlRoleDiff::loading(role.name))),
                    before: before.into_iter().collect(),
                    after: after.into_iter().collect(),
                })
            })
            .collect()
    }
}

/// ACL of `revision`, treating malformed lists as empty
pub fn acl_or_empty(revision: &Revision) -> Vec<AclEntry> {
    revision.access_control_list().unwrap_or_else(|e| {
        tracing::warn!("Ignoring access control list of revision {}: {}", revision.id, e);
        Vec::new()
    })
}
