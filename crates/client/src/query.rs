//! Cached reads and cache-invalidating mutations.
//!
//! [`QueryCache`] is the single client-side store of fetched data. Entries
//! are keyed by `(resource, scope)` and held type-erased in a
//! [`moka::future::Cache`]; [`ResourceQuery`] reads them back through
//! typed accessors.
//!
//! Freshness: an entry younger than the stale time is served as is. An
//! older entry is still served, and a background refetch replaces it. A
//! missing entry is fetched in the foreground. A successful mutation drops
//! every entry of its resource; a failed one leaves the cache untouched.
//!
//! Each resource carries a generation that every invalidation bumps. A
//! fetch that started before an invalidation returns its data to the
//! caller but does not store it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use quill_core::error::CoreError;
use quill_core::models::Resource;
use quill_core::pagination::ListParams;
use quill_core::types::RecordId;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::RequestBody;
use crate::service::ResourceService;

type Erased = Arc<dyn Any + Send + Sync>;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// What a cached query covers within one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryScope {
    List(ListParams),
    Detail(RecordId),
    Slug(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Collection path of the resource (e.g. `"blogs/"`).
    pub resource: &'static str,
    pub scope: QueryScope,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct CacheEntry {
    value: Erased,
    fetched_at: Instant,
}

#[derive(Debug, Clone)]
enum FetchStatus {
    Loading,
    Failed(String),
}

/// A typed value read from the cache.
#[derive(Debug)]
pub struct Cached<T> {
    pub value: Arc<T>,
    pub is_stale: bool,
}

/// Point-in-time view of one query.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
    pub is_stale: bool,
}

struct CacheInner {
    entries: Cache<QueryKey, CacheEntry>,
    status: RwLock<HashMap<QueryKey, FetchStatus>>,
    generations: RwLock<HashMap<String, u64>>,
    stale_time: Duration,
}

/// Shared query cache. Cheap to clone.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(max_capacity: u64, stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Cache::new(max_capacity),
                status: RwLock::new(HashMap::new()),
                generations: RwLock::new(HashMap::new()),
                stale_time,
            }),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.query_cache_capacity, config.stale_time())
    }

    pub fn stale_time(&self) -> Duration {
        self.inner.stale_time
    }

    /// Typed read. `None` when absent or stored under another type.
    pub async fn get<T: Any + Send + Sync>(&self, key: &QueryKey) -> Option<Cached<T>> {
        let entry = self.inner.entries.get(key).await?;
        let is_stale = entry.fetched_at.elapsed() >= self.inner.stale_time;
        let value = entry.value.downcast::<T>().ok()?;
        Some(Cached { value, is_stale })
    }

    pub async fn insert<T: Any + Send + Sync>(&self, key: QueryKey, value: Arc<T>) {
        self.store(key, value).await;
    }

    async fn store(&self, key: QueryKey, value: Erased) {
        self.inner.status.write().await.remove(&key);
        self.inner
            .entries
            .insert(
                key,
                CacheEntry {
                    value,
                    fetched_at: Instant::now(),
                },
            )
            .await;
    }

    /// Store a fetch result unless the resource was invalidated after
    /// `generation` was read. Returns whether the value was stored.
    async fn store_fetched(&self, key: QueryKey, value: Erased, generation: u64) -> bool {
        // Guard held across the insert; invalidation waits on it.
        let generations = self.inner.generations.read().await;
        if generations.get(key.resource).copied().unwrap_or(0) != generation {
            drop(generations);
            self.inner.status.write().await.remove(&key);
            return false;
        }
        self.store(key, value).await;
        true
    }

    async fn generation(&self, resource: &str) -> u64 {
        self.inner
            .generations
            .read()
            .await
            .get(resource)
            .copied()
            .unwrap_or(0)
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.inner.entries.invalidate(key).await;
        self.inner.status.write().await.remove(key);
    }

    /// Drop every entry of a resource. Returns how many were dropped.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let mut generations = self.inner.generations.write().await;
        *generations.entry(resource.to_string()).or_insert(0) += 1;

        let keys: Vec<Arc<QueryKey>> = self
            .inner
            .entries
            .iter()
            .filter(|(key, _)| key.resource == resource)
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            self.inner.entries.invalidate(key.as_ref()).await;
        }
        self.inner
            .status
            .write()
            .await
            .retain(|key, _| key.resource != resource);
        drop(generations);
        keys.len()
    }

    pub async fn snapshot<T: Any + Send + Sync>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        let cached = self.get::<T>(key).await;
        let status = self.inner.status.read().await.get(key).cloned();
        let error = match &status {
            Some(FetchStatus::Failed(msg)) => Some(msg.clone()),
            _ => None,
        };
        QuerySnapshot {
            is_stale: cached.as_ref().is_some_and(|c| c.is_stale),
            data: cached.map(|c| c.value),
            is_loading: matches!(status, Some(FetchStatus::Loading)),
            is_error: error.is_some(),
            error,
        }
    }

    /// Mark `key` as loading. Returns `false` when a load is already
    /// running.
    async fn begin_loading(&self, key: &QueryKey) -> bool {
        let mut status = self.inner.status.write().await;
        if matches!(status.get(key), Some(FetchStatus::Loading)) {
            return false;
        }
        status.insert(key.clone(), FetchStatus::Loading);
        true
    }

    async fn mark_loading(&self, key: &QueryKey) {
        self.inner
            .status
            .write()
            .await
            .insert(key.clone(), FetchStatus::Loading);
    }

    async fn mark_failed(&self, key: &QueryKey, message: String) {
        self.inner
            .status
            .write()
            .await
            .insert(key.clone(), FetchStatus::Failed(message));
    }
}

// ---------------------------------------------------------------------------
// ResourceQuery
// ---------------------------------------------------------------------------

/// Cached access to one resource plus mutations that keep the cache honest.
pub struct ResourceQuery<R> {
    service: ResourceService<R>,
    cache: QueryCache,
}

impl<R> Clone for ResourceQuery<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: Resource> ResourceQuery<R> {
    pub fn new(service: ResourceService<R>, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    pub fn service(&self) -> &ResourceService<R> {
        &self.service
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn key(scope: QueryScope) -> QueryKey {
        QueryKey {
            resource: R::PATH,
            scope,
        }
    }

    // -- reads ---------------------------------------------------------------

    pub async fn list(&self, params: &ListParams) -> Result<Arc<Vec<R>>, ApiError> {
        self.read(QueryScope::List(params.clone())).await
    }

    pub async fn detail(&self, id: &RecordId) -> Result<Arc<R>, ApiError> {
        self.read(QueryScope::Detail(id.clone())).await
    }

    pub async fn by_slug(&self, slug: &str) -> Result<Arc<R>, ApiError> {
        self.read(QueryScope::Slug(slug.to_string())).await
    }

    pub async fn list_snapshot(&self, params: &ListParams) -> QuerySnapshot<Vec<R>> {
        self.cache
            .snapshot(&Self::key(QueryScope::List(params.clone())))
            .await
    }

    /// Fetch now, bypassing freshness, and store the result.
    pub async fn refetch(&self, scope: QueryScope) -> Result<(), ApiError> {
        self.fetch(&Self::key(scope)).await.map(|_| ())
    }

    // -- mutations -----------------------------------------------------------

    pub async fn create(&self, body: RequestBody) -> Result<R, ApiError> {
        let created = self.service.create(body).await?;
        self.after_mutation("create", created.id()).await;
        Ok(created)
    }

    pub async fn update(&self, id: &RecordId, body: RequestBody) -> Result<R, ApiError> {
        let updated = self.service.update(id, body).await?;
        self.after_mutation("update", id).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.service.delete(id).await?;
        self.after_mutation("delete", id).await;
        Ok(())
    }

    // ---- private helpers ----

    async fn after_mutation(&self, action: &'static str, id: &RecordId) {
        let dropped = self.cache.invalidate_resource(R::PATH).await;
        tracing::info!(entity = R::ENTITY, action, %id, dropped, "Mutation succeeded");
    }

    async fn read<T: Any + Send + Sync>(&self, scope: QueryScope) -> Result<Arc<T>, ApiError> {
        let key = Self::key(scope);
        if let Some(cached) = self.cache.get::<T>(&key).await {
            if cached.is_stale {
                self.spawn_refresh(key).await;
            }
            return Ok(cached.value);
        }

        self.fetch(&key).await?.downcast::<T>().map_err(|_| {
            ApiError::Core(CoreError::Internal(format!(
                "Cached value for {} has an unexpected type",
                R::ENTITY
            )))
        })
    }

    /// Load a key from the backend with the resource's retry budget and
    /// record the outcome in the cache.
    async fn fetch(&self, key: &QueryKey) -> Result<Erased, ApiError> {
        self.cache.mark_loading(key).await;
        self.fetch_marked(key).await
    }

    /// As [`fetch`](Self::fetch), for a key already marked as loading.
    async fn fetch_marked(&self, key: &QueryKey) -> Result<Erased, ApiError> {
        let generation = self.cache.generation(key.resource).await;
        let mut attempt = 0;
        let result = loop {
            match self.load(&key.scope).await {
                Ok(value) => break Ok(value),
                Err(e) if attempt < R::QUERY_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        entity = R::ENTITY,
                        attempt,
                        error = %e,
                        "Query failed, retrying"
                    );
                }
                Err(e) => break Err(e),
            }
        };

        match &result {
            Ok(value) => {
                let stored = self
                    .cache
                    .store_fetched(key.clone(), value.clone(), generation)
                    .await;
                if !stored {
                    tracing::debug!(entity = R::ENTITY, "Dropped a fetch that raced a mutation");
                }
            }
            Err(e) => self.cache.mark_failed(key, e.report().message).await,
        }
        result
    }

    async fn load(&self, scope: &QueryScope) -> Result<Erased, ApiError> {
        let value = match scope {
            QueryScope::List(params) => Arc::new(self.service.list(params).await?) as Erased,
            QueryScope::Detail(id) => Arc::new(self.service.get(id).await?) as Erased,
            QueryScope::Slug(slug) => Arc::new(self.service.get_by_slug(slug).await?) as Erased,
        };
        Ok(value)
    }

    async fn spawn_refresh(&self, key: QueryKey) {
        if !self.cache.begin_loading(&key).await {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.fetch_marked(&key).await {
                tracing::warn!(entity = R::ENTITY, error = %e, "Background refetch failed");
            }
        });
    }
}
