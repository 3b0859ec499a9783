//! Stub resolution for related objects
//!
//! Relationship revisions usually carry `{id, type}` stubs. An
//! [`ObjectResolver`] loads the display fields; [`CachedObjectResolver`]
//! keeps resolved objects in a bounded moka cache so one history page
//! resolves each endpoint once.

use crate::error::{ContextError, ContextResult};
use async_trait::async_trait;
use audit_model::{ObjectKey, ObjectRef};
use dashmap::DashMap;
use moka::future::Cache;
use std::fmt;
use std::sync::Arc;

/// Loads full display fields for a stub
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    /// Resolved form of `stub`
    async fn resolve(&self, stub: &ObjectRef) -> ContextResult<ObjectRef>;
}

/// Resolver over a fixed set of objects
#[derive(Debug, Default)]
pub struct InMemoryObjectResolver {
    objects: DashMap<ObjectKey, ObjectRef>,
}

impl InMemoryObjectResolver {
    /// Create empty resolver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create resolver holding `objects`
    #[must_use]
    pub fn with_objects(objects: impl IntoIterator<Item = ObjectRef>) -> Self {
        let resolver = Self::new();
        for object in objects {
            resolver.insert(object);
        }
        resolver
    }

    /// Add or replace an object
    #[inline]
    pub fn insert(&self, object: ObjectRef) {
        self.objects.insert(object.key(), object);
    }
}

#[async_trait]
impl ObjectResolver for InMemoryObjectResolver {
    async fn resolve(&self, stub: &ObjectRef) -> ContextResult<ObjectRef> {
        self.objects
            .get(&stub.key())
            .map(|o| o.value().clone())
            .ok_or_else(|| ContextError::ObjectNotFound(stub.key()))
    }
}

/// Caching wrapper around another resolver
///
/// Already-resolved references are returned as is. Failures are not
/// cached.
#[derive(Clone)]
pub struct CachedObjectResolver {
    inner: Arc<dyn ObjectResolver>,
    cache: Cache<ObjectKey, ObjectRef>,
}

impl CachedObjectResolver {
    /// Create wrapper with max capacity
    #[inline]
    #[must_use]
    pub fn new(inner: Arc<dyn ObjectResolver>, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_capacity),
        }
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop every cached object
    #[inline]
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl ObjectResolver for CachedObjectResolver {
    async fn resolve(&self, stub: &ObjectRef) -> ContextResult<ObjectRef> {
        if !stub.is_stub() {
            return Ok(stub.clone());
        }

        let key = stub.key();
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let resolved = self.inner.resolve(stub).await?;
        self.cache.insert(key, resolved.clone()).await;
        Ok(resolved)
    }
}

impl fmt::Debug for CachedObjectResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedObjectResolver")
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
