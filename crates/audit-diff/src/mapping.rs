//! Relationship (mapping) changes
//!
//! Turns one relationship revision into a "Mapping to {type}: {name}" row.
//! Relationships the backend created automatically as a side effect of
//! another mapping get a narrative sentence instead of an actor.

use audit_context::{ObjectResolver, PersonCache};
use audit_model::{
    AutomappingNote, FieldChange, MappingChange, ObjectKey, ObjectRef, RelationshipRevision,
    RevisionAction,
};
use std::sync::Arc;

/// Actor label used when a revision has no acting person
pub const UNKNOWN_ACTOR: &str = "\"unknown\" user";

/// Diffs relationship revisions
#[derive(Clone)]
pub struct MappingDiffer {
    objects: Arc<dyn ObjectResolver>,
    people: Arc<PersonCache>,
    placeholder: String,
}

impl MappingDiffer {
    /// Create differ
    #[inline]
    #[must_use]
    pub fn new(
        objects: Arc<dyn ObjectResolver>,
        people: Arc<PersonCache>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            objects,
            people,
            placeholder: placeholder.into(),
        }
    }

    /// Change record for `revision`
    ///
    /// # Arguments
    /// * `revision` - Relationship revision to describe
    /// * `previous` - Revision just before this one in its relationship's chain
    /// * `subject` - Object whose history is being shown
    /// * `role` - Actor's role at the time
    pub async fn diff(
        &self,
        revision: &RelationshipRevision,
        previous: Option<&RelationshipRevision>,
        subject: &ObjectKey,
        role: String,
    ) -> MappingChange {
        let other = self.resolve(revision.other_side(subject)).await;
        let changes = FieldChange::new(
            format!(
                "Mapping to {}: {}",
                other.display_type_or_default(),
                other.display_name_or_default()
            ),
            self.orig_val(revision, previous),
            new_val(revision),
        );

        let origin = revision.automapping().unwrap_or_else(|e| {
            tracing::warn!("Ignoring automapping of revision {}: {}", revision.id, e);
            None
        });

        match origin {
            Some(origin) => {
                let (source, destination) = futures::join!(
                    self.resolve(&origin.source),
                    self.resolve(&origin.destination)
                );
                let title = format!(
                    "(automapping triggered after {} mapped {} \"{}\" to {} \"{}\")",
                    self.actor_label(revision),
                    destination.kind,
                    destination.title_or_default(),
                    source.kind,
                    source.title_or_default(),
                );
                MappingChange {
                    made_by: None,
                    updated_at: revision.updated_at,
                    role,
                    changes,
                    automapping: Some(AutomappingNote { title }),
                }
            }
            None => MappingChange {
                made_by: revision.modified_by.clone(),
                updated_at: revision.updated_at,
                role,
                changes,
                automapping: None,
            },
        }
    }

    /// Resolve a stub, falling back to the stub itself
    async fn resolve(&self, object: &ObjectRef) -> ObjectRef {
        if !object.is_stub() {
            return object.clone();
        }
        match self.objects.resolve(object).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("Could not resolve {}: {}", object.key(), e);
                object.clone()
            }
        }
    }

    /// Assignee type of the previous revision, if any
    fn orig_val(
        &self,
        revision: &RelationshipRevision,
        previous: Option<&RelationshipRevision>,
    ) -> String {
        match previous.and_then(RelationshipRevision::assignee_type) {
            Some(assignee_type) => assignee_type.to_string(),
            None if revision.action == RevisionAction::Deleted => {
                RevisionAction::Created.label().to_string()
            }
            None => self.placeholder.clone(),
        }
    }

    fn actor_label(&self, revision: &RelationshipRevision) -> String {
        let Some(actor) = revision.modified_by.as_ref() else {
            return UNKNOWN_ACTOR.to_string();
        };
        actor
            .label()
            .map(str::to_string)
            .or_else(|| self.people.find_by_id(actor.id).map(|p| p.label().to_string()))
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
    }
}

/// Assignee type for live relationships carrying one, else the action
fn new_val(revision: &RelationshipRevision) -> String {
    match revision.assignee_type() {
        Some(assignee_type) if revision.action != RevisionAction::Deleted => {
            assignee_type.to_string()
        }
        _ => revision.action.label().to_string(),
    }
}

impl std::fmt::Debug for MappingDiffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingDiffer")
            .field("people", &self.people)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_context::{InMemoryObjectResolver, InMemoryPersonSource};
    use audit_model::{Person, PersonRef};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn subject() -> ObjectKey {
        ObjectKey::new("Control", 1)
    }

    fn differ() -> MappingDiffer {
        let objects = InMemoryObjectResolver::with_objects([
            ObjectRef::stub("Risk", 2).with_title("R2").with_display("Risk two", "Risk"),
            ObjectRef::stub("Program", 3).with_title("Prog"),
            ObjectRef::stub("Control", 1).with_title("Ctl"),
        ]);
        let people = PersonCache::new(Arc::new(InMemoryPersonSource::new()));
        people.insert(Person::new(9, Some("Cached Name"), "cached@example.com"));
        MappingDiffer::new(Arc::new(objects), Arc::new(people), "—")
    }

    fn rel(id: u64, action: RevisionAction, secs: i64) -> RelationshipRevision {
        RelationshipRevision::new(
            id,
            ObjectRef::stub("Control", 1),
            ObjectRef::stub("Risk", 2),
            action,
            at(secs),
        )
        .for_relationship(50)
    }

    #[tokio::test]
    async fn created_mapping() {
        let revision = rel(1, RevisionAction::Created, 10).by(PersonRef::new(9));
        let change = differ()
            .diff(&revision, None, &subject(), "Admin".into())
            .await;

        assert_eq!(
            change.changes,
            FieldChange::new("Mapping to Risk: Risk two", "—", "Created")
        );
        assert_eq!(change.made_by, Some(PersonRef::new(9)));
        assert_eq!(change.role, "Admin");
        assert!(change.automapping.is_none());
    }

    #[tokio::test]
    async fn deleted_mapping_uses_previous_assignee_type() {
        let first = rel(1, RevisionAction::Created, 10).with_assignee_type("X");
        let second = rel(2, RevisionAction::Deleted, 20).with_assignee_type("X");
        let change = differ()
            .diff(&second, Some(&first), &subject(), "none".into())
            .await;
        assert_eq!(change.changes.orig_val.to_string(), "X");
        assert_eq!(change.changes.new_val.to_string(), "Deleted");
    }

    #[tokio::test]
    async fn deleted_without_history_reads_created() {
        let revision = rel(2, RevisionAction::Deleted, 20);
        let change = differ()
            .diff(&revision, None, &subject(), "none".into())
            .await;
        assert_eq!(change.changes.orig_val.to_string(), "Created");
    }

    #[tokio::test]
    async fn assignee_type_replaces_action() {
        let first = rel(1, RevisionAction::Created, 10).with_assignee_type("Creator");
        let second = rel(2, RevisionAction::Modified, 20).with_assignee_type("Assignee,Verifier");
        let change = differ()
            .diff(&second, Some(&first), &subject(), "none".into())
            .await;
        assert_eq!(
            change.changes,
            FieldChange::new("Mapping to Risk: Risk two", "Creator", "Assignee,Verifier")
        );
    }

    #[tokio::test]
    async fn other_side_when_subject_is_destination() {
        let revision = RelationshipRevision::new(
            1,
            ObjectRef::stub("Program", 3),
            ObjectRef::stub("Control", 1),
            RevisionAction::Created,
            at(5),
        );
        let change = differ()
            .diff(&revision, None, &subject(), "none".into())
            .await;
        assert_eq!(change.changes.field_name, "Mapping to Program: Prog");
    }

    #[tokio::test]
    async fn unresolvable_stub_falls_back_to_key() {
        let revision = RelationshipRevision::new(
            1,
            ObjectRef::stub("Control", 1),
            ObjectRef::stub("Market", 77),
            RevisionAction::Created,
            at(5),
        );
        let change = differ()
            .diff(&revision, None, &subject(), "none".into())
            .await;
        assert_eq!(change.changes.field_name, "Mapping to Market: Market #77");
    }

    #[tokio::test]
    async fn automapping_narrative() {
        let revision = rel(1, RevisionAction::Created, 10)
            .by(PersonRef::new(9))
            .automapped_from(ObjectRef::stub("Program", 3), ObjectRef::stub("Control", 1));
        let change = differ()
            .diff(&revision, None, &subject(), "none".into())
            .await;

        assert!(change.made_by.is_none());
        assert_eq!(
            change.automapping.unwrap().title,
            "(automapping triggered after Cached Name mapped Control \"Ctl\" to Program \"Prog\")"
        );
        assert_eq!(change.changes.new_val.to_string(), "Created");
    }

    #[tokio::test]
    async fn automapping_without_actor() {
        let revision = rel(1, RevisionAction::Created, 10)
            .automapped_from(ObjectRef::stub("Program", 3), ObjectRef::stub("Control", 1));
        let change = differ()
            .diff(&revision, None, &subject(), "none".into())
            .await;
        assert!(change
            .automapping
            .unwrap()
            .title
            .starts_with("(automapping triggered after \"unknown\" user mapped"));
    }
}
