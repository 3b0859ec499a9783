//! Testing utilities for the audit history workspace
//!
//! Shared fixtures and misbehaving collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use audit_context::{
    ContextError, ContextResult, DiffContext, InMemoryObjectResolver, InMemoryPersonSource,
    PersonSource, StaticAttributeRegistry, StaticRoleRegistry,
};
use audit_model::{
    keys, AclEntry, AttrDef, CustomAttributeDefinition, CustomAttributeValue, ObjectKey,
    ObjectRef, Person, PersonId, PersonRef, RelationshipRevision, Revision, RevisionAction, Role,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SUBJECT_TYPE: &str = "Control";
pub const SUBJECT_ID: u64 = 1;

pub const ADMIN: u64 = 1;
pub const ASSIGNEE: u64 = 2;
pub const VERIFIER: u64 = 3;

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

pub fn subject() -> ObjectKey {
    ObjectKey::new(SUBJECT_TYPE, SUBJECT_ID)
}

/// Snapshot of the subject control at `secs`
pub fn control_revision(id: u64, secs: i64) -> Revision {
    Revision::new(id, SUBJECT_TYPE, SUBJECT_ID, at(secs))
}

/// `access_control_list` content for `(role, person)` pairs
pub fn acl(entries: &[(u64, u64)]) -> Value {
    let entries: Vec<AclEntry> = entries.iter().map(|(r, p)| AclEntry::new(*r, *p)).collect();
    serde_json::to_value(entries).unwrap()
}

/// Revision with its ACL set
pub fn with_acl(revision: Revision, entries: &[(u64, u64)]) -> Revision {
    revision.with_field(keys::ACCESS_CONTROL_LIST, acl(entries))
}

/// Revision with custom attribute values and definitions set
pub fn with_custom_attributes(
    revision: Revision,
    values: &[CustomAttributeValue],
    defs: &[CustomAttributeDefinition],
) -> Revision {
    revision
        .with_field(keys::CUSTOM_ATTRIBUTE_VALUES, serde_json::to_value(values).unwrap())
        .with_field(keys::CUSTOM_ATTRIBUTE_DEFINITIONS, serde_json::to_value(defs).unwrap())
}

/// Relationship between the subject and `other`
pub fn mapping(
    id: u64,
    other: ObjectRef,
    action: RevisionAction,
    secs: i64,
) -> RelationshipRevision {
    RelationshipRevision::new(
        id,
        ObjectRef::stub(SUBJECT_TYPE, SUBJECT_ID),
        other,
        action,
        at(secs),
    )
}

pub fn person_ref(id: u64) -> PersonRef {
    PersonRef::new(id)
}

pub fn people() -> Vec<Person> {
    vec![
        Person::new(10, Some("Alice"), "alice@example.com"),
        Person::new(11, Some("Bob"), "bob@example.com"),
        Person::new(12, None, "carol@example.com"),
    ]
}

pub fn control_roles() -> StaticRoleRegistry {
    StaticRoleRegistry::new().with(
        SUBJECT_TYPE,
        vec![
            Role::new(ADMIN, "Admin"),
            Role::new(ASSIGNEE, "Assignee"),
            Role::new(VERIFIER, "Verifier"),
        ],
    )
}

pub fn control_attributes() -> StaticAttributeRegistry {
    StaticAttributeRegistry::new().with(
        SUBJECT_TYPE,
        vec![
            AttrDef::new("title", "Object Name"),
            AttrDef::new("recipients", "Recipients"),
            AttrDef::new("review_status", "Review State"),
            AttrDef::new("start_date", "Start Date"),
        ],
    )
}

pub fn objects() -> InMemoryObjectResolver {
    InMemoryObjectResolver::with_objects([
        ObjectRef::stub(SUBJECT_TYPE, SUBJECT_ID).with_title("Access reviews"),
        ObjectRef::stub("Risk", 2)
            .with_title("Data loss")
            .with_display("Data loss", "Risk"),
        ObjectRef::stub("Program", 3)
            .with_title("SOX")
            .with_display("SOX", "Program"),
    ])
}

/// Context over `source` with the control fixtures registered
pub fn context_with(source: Arc<dyn PersonSource>) -> DiffContext {
    DiffContext::new(source, Arc::new(objects()))
        .with_attributes(Arc::new(control_attributes()))
        .with_roles(Arc::new(control_roles()))
}

/// Context whose person backend knows [`people`]
pub fn context() -> DiffContext {
    context_with(Arc::new(InMemoryPersonSource::with_people(people())))
}

/// Backend that always fails
#[derive(Debug, Default)]
pub struct FailingPersonSource;

#[async_trait]
impl PersonSource for FailingPersonSource {
    async fn fetch_people(&self, _ids: &[PersonId]) -> ContextResult<Vec<Person>> {
        Err(ContextError::PersonFetch("backend unavailable".into()))
    }
}

/// Backend that answers after a delay and counts calls
#[derive(Debug)]
pub struct SlowPersonSource {
    delay: Duration,
    inner: InMemoryPersonSource,
    calls: AtomicUsize,
}

impl SlowPersonSource {
    pub fn new(delay: Duration, people: Vec<Person>) -> Self {
        Self {
            delay,
            inner: InMemoryPersonSource::with_people(people),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonSource for SlowPersonSource {
    async fn fetch_people(&self, ids: &[PersonId]) -> ContextResult<Vec<Person>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_people(ids).await
    }
}
