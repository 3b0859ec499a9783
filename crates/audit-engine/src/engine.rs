//! Revision diff orchestrator
//!
//! One [`RevisionDiffEngine::compute`] call:
//! 1. Spawns a batch fetch of every ACL person not yet cached
//! 2. Diffs adjacent object snapshots (fields, custom attributes, roles)
//! 3. Describes every relationship revision
//! 4. Merges both row kinds newest first

use crate::backfill::{AclBackfill, PrefetchHandle};
use crate::config::EngineConfig;
use crate::types::{RevisionDiffReport, RevisionHistory};
use audit_context::{CachedObjectResolver, DiffContext, ObjectResolver};
use audit_diff::{
    acl_or_empty, AccessControlDiffer, CustomAttributeDiffer, FieldDiffer, MappingDiffer,
    PendingRoleDiff,
};
use audit_model::{
    Change, CustomAttributeDefinition, CustomAttributeValue, DiffEntry, HistoryEntry, ObjectKey,
    PersonId, PersonRef, RelationshipRevision, Revision,
};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Turns a revision history into rendered change rows
#[derive(Debug)]
pub struct RevisionDiffEngine {
    ctx: DiffContext,
    config: Arc<EngineConfig>,
    generation: Arc<AtomicU64>,
    fields: FieldDiffer,
    custom_attributes: CustomAttributeDiffer,
    access_control: AccessControlDiffer,
    mappings: MappingDiffer,
}

impl RevisionDiffEngine {
    /// Create engine over `ctx`
    ///
    /// The context's stub resolver is wrapped in a bounded cache.
    #[must_use]
    pub fn new(ctx: DiffContext, config: EngineConfig) -> Self {
        let objects: Arc<dyn ObjectResolver> = Arc::new(CachedObjectResolver::new(
            Arc::clone(&ctx.objects),
            config.object_cache_capacity,
        ));
        let ctx = ctx.with_objects(objects);
        let rules = Arc::new(config.rules());

        Self {
            fields: FieldDiffer::new(rules, Arc::clone(&ctx.dates)),
            custom_attributes: CustomAttributeDiffer::new(
                Arc::clone(&ctx.people),
                Arc::clone(&ctx.dates),
                config.placeholder.clone(),
            ),
            access_control: AccessControlDiffer::new(Arc::clone(&ctx.roles)),
            mappings: MappingDiffer::new(
                Arc::clone(&ctx.objects),
                Arc::clone(&ctx.people),
                config.placeholder.clone(),
            ),
            ctx,
            config: Arc::new(config),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Collaborators in use
    #[inline]
    #[must_use]
    pub fn context(&self) -> &DiffContext {
        &self.ctx
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generation of the most recent computation; 0 before the first
    #[inline]
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Diff a whole history
    ///
    /// Returns immediately with role diffs still loading; run the report's
    /// backfill to fill them. Starting another computation supersedes the
    /// backfill of this one.
    pub async fn compute(&self, history: &RevisionHistory) -> RevisionDiffReport {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            "Computing history of {} (generation {}): {} snapshots, {} mapping revisions",
            history.subject,
            generation,
            history.object.len(),
            history.mappings.len()
        );

        let mut snapshots = history.object.clone();
        snapshots.sort_by_key(|r| r.updated_at);

        // 1. Person prefetch
        let prefetch = self.prefetch_people(&snapshots, &history.revisions_for_compare);

        // 2. Object changes
        let baseline = history.baseline();
        let (mut entries, pending) = self.object_entries(&baseline, &snapshots);

        // 3. Mapping changes
        entries.extend(self.mapping_entries(history, &baseline, &snapshots).await);

        // 4. Merge, newest first; stable so ties keep input order
        entries.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));

        tracing::debug!(
            "Generation {}: {} rows, {} role diffs pending",
            generation,
            entries.len(),
            pending.len()
        );

        RevisionDiffReport {
            generation,
            entries,
            backfill: AclBackfill::new(
                generation,
                Arc::clone(&self.generation),
                pending,
                Arc::clone(&self.ctx.people),
                self.config.placeholder.clone(),
                self.config.prefetch_timeout(),
                prefetch,
            ),
        }
    }

    /// Spawn one batch fetch of uncached ACL people, if any
    fn prefetch_people(
        &self,
        snapshots: &[Revision],
        compare: &[Revision],
    ) -> Option<PrefetchHandle> {
        let referenced = snapshots
            .iter()
            .chain(compare)
            .flat_map(|r| acl_or_empty(r).into_iter().map(|e| e.person.id));
        let missing: Vec<PersonId> = self.ctx.people.missing(referenced);
        if missing.is_empty() {
            return None;
        }

        tracing::debug!("Prefetching {} people", missing.len());
        let people = Arc::clone(&self.ctx.people);
        Some(tokio::spawn(async move {
            people.enqueue_and_fetch(&missing).await
        }))
    }

    fn object_entries(
        &self,
        baseline: &Revision,
        snapshots: &[Revision],
    ) -> (Vec<HistoryEntry>, Vec<PendingRoleDiff>) {
        let mut entries = Vec::new();
        let mut pending = Vec::new();

        let mut prev = baseline;
        for next in snapshots {
            if let Some((entry, roles)) = self.object_entry(prev, next) {
                entries.push(HistoryEntry::Object(entry));
                pending.extend(roles);
            }
            prev = next;
        }
        (entries, pending)
    }

    /// Diff of one adjacent pair; `None` when nothing visible changed
    fn object_entry(
        &self,
        prev: &Revision,
        next: &Revision,
    ) -> Option<(DiffEntry, Vec<PendingRoleDiff>)> {
        let entity_type = next.resource_type.as_str();

        let fields = self
            .fields
            .diff(prev, next, self.ctx.attributes.definitions_for(entity_type));
        let (old_values, old_defs) = custom_attributes_of(prev);
        let (new_values, new_defs) = custom_attributes_of(next);
        let custom = self
            .custom_attributes
            .diff(&old_values, &old_defs, &new_values, &new_defs);
        let roles = self.access_control.diff(prev, next, entity_type);

        let changes: Vec<Change> = fields
            .changes
            .into_iter()
            .chain(custom)
            .map(Change::Field)
            .chain(roles.iter().map(|r| Change::AccessControl(Arc::clone(&r.diff))))
            .collect();
        if changes.is_empty() {
            tracing::trace!("Revision {} changed nothing visible", next.id);
            return None;
        }

        let role = self.role_at(next.modified_by.as_ref(), entity_type, next);
        let entry = DiffEntry {
            made_by: next.modified_by.clone(),
            updated_at: next.updated_at,
            role,
            changes,
            review_was_changed: fields.review_status,
        };
        Some((entry, roles))
    }

    async fn mapping_entries(
        &self,
        history: &RevisionHistory,
        baseline: &Revision,
        snapshots: &[Revision],
    ) -> Vec<HistoryEntry> {
        let subject = &history.subject;
        let previous = predecessors(&history.mappings, subject);

        let rows = history.mappings.iter().enumerate().map(|(idx, revision)| {
            let previous = previous[idx].map(|p| &history.mappings[p]);
            let snapshot = snapshots
                .iter()
                .rev()
                .find(|r| r.updated_at <= revision.updated_at)
                .unwrap_or(baseline);
            let role = self.role_at(revision.modified_by.as_ref(), &subject.kind, snapshot);
            self.mappings.diff(revision, previous, subject, role)
        });

        join_all(rows)
            .await
            .into_iter()
            .map(HistoryEntry::Mapping)
            .collect()
    }

    /// Actor's role under the ACL of `snapshot`, else the default role
    fn role_at(&self, actor: Option<&PersonRef>, entity_type: &str, snapshot: &Revision) -> String {
        self.ctx
            .actor_roles
            .role_at(actor, entity_type, &acl_or_empty(snapshot))
            .unwrap_or_else(|| self.config.default_role.clone())
    }
}

/// Index of each mapping revision's predecessor in its chain
///
/// Chains group revisions by the object on the other side of the subject
/// and are ordered by timestamp; ties keep input order.
fn predecessors(mappings: &[RelationshipRevision], subject: &ObjectKey) -> Vec<Option<usize>> {
    let mut chains: HashMap<ObjectKey, Vec<usize>> = HashMap::new();
    for (idx, revision) in mappings.iter().enumerate() {
        chains
            .entry(revision.other_side(subject).key())
            .or_default()
            .push(idx);
    }

    let mut previous = vec![None; mappings.len()];
    for chain in chains.values_mut() {
        chain.sort_by_key(|idx| mappings[*idx].updated_at);
        for pair in chain.windows(2) {
            previous[pair[1]] = Some(pair[0]);
        }
    }
    previous
}

/// Custom attribute values and definitions, empty when undecodable
fn custom_attributes_of(
    revision: &Revision,
) -> (Vec<CustomAttributeValue>, Vec<CustomAttributeDefinition>) {
    let values = revision.custom_attribute_values().unwrap_or_else(|e| {
        tracing::warn!("Ignoring custom attribute values of revision {}: {}", revision.id, e);
        Vec::new()
    });
    let defs = revision.custom_attribute_definitions().unwrap_or_else(|e| {
        tracing::warn!(
            "Ignoring custom attribute definitions of revision {}: {}",
            revision.id,
            e
        );
        Vec::new()
    });
    (values, defs)
}
