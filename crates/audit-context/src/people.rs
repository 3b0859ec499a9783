//! Shared person cache
//!
//! Read-mostly map of people populated by batch fetches. Lookups are
//! synchronous so the differs can render names without suspending; only
//! [`PersonCache::enqueue_and_fetch`] talks to the backend.

use crate::error::ContextResult;
use async_trait::async_trait;
use audit_model::{Person, PersonId};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Backend that loads people by id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonSource: Send + Sync {
    /// Load the given people; unknown ids are simply absent from the result
    async fn fetch_people(&self, ids: &[PersonId]) -> ContextResult<Vec<Person>>;
}

/// In-memory person backend
#[derive(Debug, Default)]
pub struct InMemoryPersonSource {
    people: DashMap<PersonId, Person>,
}

impl InMemoryPersonSource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create source holding `people`
    #[must_use]
    pub fn with_people(people: impl IntoIterator<Item = Person>) -> Self {
        let source = Self::new();
        for person in people {
            source.insert(person);
        }
        source
    }

    /// Add or replace a person
    #[inline]
    pub fn insert(&self, person: Person) {
        self.people.insert(person.id, person);
    }
}

#[async_trait]
impl PersonSource for InMemoryPersonSource {
    async fn fetch_people(&self, ids: &[PersonId]) -> ContextResult<Vec<Person>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.people.get(id).map(|p| p.value().clone()))
            .collect())
    }
}

/// Person cache backed by a [`PersonSource`]
pub struct PersonCache {
    people: DashMap<PersonId, Person>,
    source: Arc<dyn PersonSource>,
}

impl PersonCache {
    /// Create empty cache over `source`
    #[inline]
    #[must_use]
    pub fn new(source: Arc<dyn PersonSource>) -> Self {
        Self {
            people: DashMap::new(),
            source,
        }
    }

    /// Cached person
    #[inline]
    #[must_use]
    pub fn find_by_id(&self, id: PersonId) -> Option<Person> {
        self.people.get(&id).map(|p| p.value().clone())
    }

    /// Whether `id` is cached
    #[inline]
    #[must_use]
    pub fn contains(&self, id: PersonId) -> bool {
        self.people.contains_key(&id)
    }

    /// Add or replace a person
    #[inline]
    pub fn insert(&self, person: Person) {
        self.people.insert(person.id, person);
    }

    /// Distinct ids from `ids` that are not cached, ascending
    #[must_use]
    pub fn missing(&self, ids: impl IntoIterator<Item = PersonId>) -> Vec<PersonId> {
        ids.into_iter()
            .filter(|id| !self.contains(*id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Fetch every uncached id in one batch and cache the result
    ///
    /// Returns the number of people loaded. No backend call is made when
    /// everything is already cached.
    ///
    /// # Errors
    /// Returns error if the backend fetch fails
    pub async fn enqueue_and_fetch(&self, ids: &[PersonId]) -> ContextResult<usize> {
        let missing = self.missing(ids.iter().copied());
        if missing.is_empty() {
            return Ok(0);
        }

        tracing::debug!("Fetching {} people", missing.len());
        let people = self.source.fetch_people(&missing).await?;
        let loaded = people.len();
        for person in people {
            self.insert(person);
        }

        if loaded < missing.len() {
            tracing::warn!(
                "Person fetch returned {} of {} requested people",
                loaded,
                missing.len()
            );
        }
        Ok(loaded)
    }

    /// Number of cached people
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    /// Whether nothing is cached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl fmt::Debug for PersonCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonCache")
            .field("cached", &self.people.len())
            .finish_non_exhaustive()
    }
}
