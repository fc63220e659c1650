//! Caching resolver façade.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{HostResolver, SystemResolver};
use crate::context::LookupContext;
use crate::error::{BoxError, DnsCacheError, Result};
use crate::store::{CacheKey, CacheStore, EntrySnapshot};

const TRACING_TARGET: &str = "horizon_lattice_dnscache::resolver";
const REFRESH_TARGET: &str = "horizon_lattice_dnscache::refresh";

/// Callback fired before the backend is queried on a cache miss.
pub type MissHook = Arc<dyn Fn() + Send + Sync>;

/// DNS resolver that caches answers and refreshes them in sweeps.
///
/// Lookups are answered from the cache when possible. Misses are forwarded
/// to the backend and their answers stored. [`refresh`](Self::refresh)
/// re-resolves every entry that was read since the previous sweep and, when
/// asked to, evicts the ones that were not.
///
/// # Example
///
/// ```ignore
/// use horizon_lattice_dnscache::{LookupContext, Resolver};
///
/// let resolver = Resolver::system()?;
///
/// let addrs = resolver.lookup_host(&LookupContext::background(), "example.com").await?;
/// println!("Resolved: {:?}", addrs);
///
/// // Periodically, from the owning process:
/// resolver.refresh(true).await;
/// ```
pub struct Resolver<B = SystemResolver> {
    backend: B,
    store: CacheStore,
    on_cache_miss: Option<MissHook>,
    refresh_timeout: Option<Duration>,
}

impl Resolver<SystemResolver> {
    /// Create a caching resolver using system DNS settings.
    pub fn system() -> Result<Self> {
        Ok(Self::new(SystemResolver::system()?))
    }
}

impl<B: HostResolver> Resolver<B> {
    /// Create a caching resolver in front of `backend`.
    pub fn new(backend: B) -> Self {
        Self::builder(backend).build()
    }

    /// Start building a caching resolver in front of `backend`.
    pub fn builder(backend: B) -> ResolverBuilder<B> {
        ResolverBuilder::new(backend)
    }

    /// Get the resolution backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the underlying cache store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Resolve `host` to literal addresses, serving from the cache when possible.
    ///
    /// `host` and `host.` share one cache entry. On a miss the backend is
    /// queried under `ctx`; if the backend fails, or `ctx` ends first, the
    /// cache is left untouched.
    pub async fn lookup_host(&self, ctx: &LookupContext, host: &str) -> Result<Vec<String>> {
        let key = CacheKey::host(host);
        if key.name().is_empty() {
            return Err(DnsCacheError::InvalidHost(host.to_string()));
        }
        self.lookup(ctx, key).await
    }

    /// Resolve a literal address to the names pointing at it.
    ///
    /// Answers are cached and refreshed like forward lookups.
    pub async fn lookup_addr(&self, ctx: &LookupContext, addr: &str) -> Result<Vec<String>> {
        let key = CacheKey::addr(addr);
        if key.name().is_empty() {
            return Err(DnsCacheError::InvalidHost(addr.to_string()));
        }
        self.lookup(ctx, key).await
    }

    /// Resolve `host` with a context that never ends.
    pub async fn resolve(&self, host: &str) -> Result<Vec<String>> {
        self.lookup_host(&LookupContext::background(), host).await
    }

    async fn lookup(&self, ctx: &LookupContext, key: CacheKey) -> Result<Vec<String>> {
        if let Some(addresses) = self.store.load(&key) {
            tracing::trace!(target: TRACING_TARGET, key = %key, "Cache hit");
            return Ok(addresses);
        }

        tracing::debug!(target: TRACING_TARGET, key = %key, "Cache miss");
        if let Some(hook) = &self.on_cache_miss {
            hook();
        }

        let addresses = self.query(ctx, &key).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            count = addresses.len(),
            "Caching lookup result"
        );
        self.store.store(key, addresses.clone());
        Ok(addresses)
    }

    /// Ask the backend for `key` under `ctx`; an empty answer is a failure.
    async fn query(&self, ctx: &LookupContext, key: &CacheKey) -> Result<Vec<String>> {
        let addresses = ctx
            .run(self.backend_query(key))
            .await?
            .map_err(|source| DnsCacheError::resolution_failed(key.name(), source))?;

        if addresses.is_empty() {
            return Err(DnsCacheError::resolution_failed(
                key.name(),
                "no addresses returned",
            ));
        }
        Ok(addresses)
    }

    async fn backend_query(&self, key: &CacheKey) -> std::result::Result<Vec<String>, BoxError> {
        match key {
            CacheKey::Host(host) => self.backend.lookup_host(host).await,
            CacheKey::Addr(addr) => self.backend.lookup_addr(addr).await,
        }
    }

    /// Sweep the cache.
    ///
    /// Entries read since the previous sweep are re-resolved and their used
    /// flag cleared. Entries that were not read are evicted when
    /// `clear_unused` is set, and re-resolved otherwise. When re-resolution
    /// fails or returns nothing, the previous answer is kept.
    pub async fn refresh(&self, clear_unused: bool) {
        let snapshot = self.store.snapshot();
        tracing::debug!(
            target: REFRESH_TARGET,
            entries = snapshot.len(),
            clear_unused,
            "Starting refresh sweep"
        );

        for (key, used) in snapshot {
            if !used && clear_unused {
                if self.store.remove_if_unused(&key) {
                    tracing::debug!(target: REFRESH_TARGET, key = %key, "Evicted unused entry");
                }
                continue;
            }

            match self.refresh_entry(&key).await {
                Ok(addresses) => {
                    if self.store.replace(&key, addresses) {
                        tracing::trace!(target: REFRESH_TARGET, key = %key, "Refreshed entry");
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        target: REFRESH_TARGET,
                        key = %key,
                        error = %err,
                        "Refresh failed, keeping stale entry"
                    );
                }
            }
        }
    }

    async fn refresh_entry(&self, key: &CacheKey) -> Result<Vec<String>> {
        let ctx = match self.refresh_timeout {
            Some(timeout) => LookupContext::with_timeout(timeout),
            None => LookupContext::background(),
        };
        self.query(&ctx, key).await
    }

    /// Check whether an answer for `host` is cached.
    pub fn contains_host(&self, host: &str) -> bool {
        self.store.contains(&CacheKey::host(host))
    }

    /// Inspect the cached entry for `host` without marking it used.
    pub fn peek_host(&self, host: &str) -> Option<EntrySnapshot> {
        self.store.peek(&CacheKey::host(host))
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drop every cached entry, forcing subsequent lookups to miss.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl<B> std::fmt::Debug for Resolver<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("entries", &self.store.len())
            .field("has_miss_hook", &self.on_cache_miss.is_some())
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Resolver`].
pub struct ResolverBuilder<B> {
    backend: B,
    on_cache_miss: Option<MissHook>,
    refresh_timeout: Option<Duration>,
}

impl<B: HostResolver> ResolverBuilder<B> {
    /// Create a builder for a resolver in front of `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            on_cache_miss: None,
            refresh_timeout: None,
        }
    }

    /// Install a callback fired once per cache miss, before the backend is queried.
    pub fn on_cache_miss<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_cache_miss = Some(Arc::new(hook));
        self
    }

    /// Bound each re-resolution performed by a refresh sweep.
    ///
    /// A re-resolution that times out is treated like a failed one.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Build the resolver with an empty cache.
    pub fn build(self) -> Resolver<B> {
        Resolver {
            backend: self.backend,
            store: CacheStore::new(),
            on_cache_miss: self.on_cache_miss,
            refresh_timeout: self.refresh_timeout,
        }
    }
}
