//! Concurrent storage for cached lookup results.
//!
//! The store is a sharded concurrent map, so mutations only lock the shard
//! that owns a key and never serialize lookups of unrelated names.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

/// Key under which a lookup result is cached.
///
/// Forward and reverse lookups share one store but never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Forward lookup of a host name.
    Host(String),
    /// Reverse lookup of a literal address.
    Addr(String),
}

impl CacheKey {
    /// Build a normalized host key.
    ///
    /// The name is lower-cased and a single trailing root-label dot is
    /// removed, so `"Example.com."` and `"example.com"` map to one entry.
    pub fn host(name: &str) -> Self {
        Self::Host(normalize_host(name))
    }

    /// Build a normalized address key.
    ///
    /// Parseable IP literals are stored in their canonical textual form.
    pub fn addr(addr: &str) -> Self {
        let trimmed = addr.trim();
        let canonical = match trimmed.parse::<IpAddr>() {
            Ok(ip) => ip.to_string(),
            Err(_) => trimmed.to_ascii_lowercase(),
        };
        Self::Addr(canonical)
    }

    /// The normalized name or address carried by the key.
    pub fn name(&self) -> &str {
        match self {
            Self::Host(name) | Self::Addr(name) => name,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(name) => write!(f, "host:{name}"),
            Self::Addr(addr) => write!(f, "addr:{addr}"),
        }
    }
}

/// Strip one trailing root-label dot and lower-case the name.
pub fn normalize_host(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

/// A cached lookup result.
///
/// The address list is shared immutably; replacing it swaps in a new list
/// under the shard's write lock, so readers never observe a partial update.
#[derive(Debug)]
struct CacheEntry {
    addresses: Arc<[String]>,
    used: AtomicBool,
}

impl CacheEntry {
    fn new(addresses: Vec<String>) -> Self {
        Self {
            addresses: addresses.into(),
            used: AtomicBool::new(true),
        }
    }
}

/// Read-only view of an entry, as returned by [`CacheStore::peek`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    /// The cached addresses (or names, for reverse lookups).
    pub addresses: Vec<String>,
    /// Whether the entry was read since it was created or last refreshed.
    pub used: bool,
}

/// Concurrent map from normalized keys to cached results.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl CacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, marking the entry as used on a hit.
    ///
    /// Returns an owned copy of the cached addresses.
    pub fn load(&self, key: &CacheKey) -> Option<Vec<String>> {
        let entry = self.entries.get(key)?;
        entry.used.store(true, Ordering::Release);
        Some(entry.addresses.to_vec())
    }

    /// Insert a fresh entry for `key`, replacing any existing one.
    ///
    /// Empty address lists are never stored; returns `false` in that case.
    pub fn store(&self, key: CacheKey, addresses: Vec<String>) -> bool {
        if addresses.is_empty() {
            return false;
        }
        self.entries.insert(key, CacheEntry::new(addresses));
        true
    }

    /// Replace the addresses of an existing entry and clear its used flag.
    ///
    /// Returns `false` if the entry was removed in the meantime or if
    /// `addresses` is empty; the store is left untouched in both cases.
    pub fn replace(&self, key: &CacheKey, addresses: Vec<String>) -> bool {
        if addresses.is_empty() {
            return false;
        }
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.addresses = addresses.into();
                entry.used.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Remove `key` if its entry has not been used since the last sweep.
    ///
    /// The flag is checked under the shard lock, so a lookup that marks the
    /// entry concurrently keeps it alive.
    pub fn remove_if_unused(&self, key: &CacheKey) -> bool {
        self.entries
            .remove_if(key, |_, entry| !entry.used.load(Ordering::Acquire))
            .is_some()
    }

    /// Remove `key` unconditionally.
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Snapshot every key together with its used flag.
    ///
    /// Entries inserted while the snapshot is taken may or may not appear.
    pub fn snapshot(&self) -> Vec<(CacheKey, bool)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.used.load(Ordering::Acquire)))
            .collect()
    }

    /// Inspect an entry without marking it used.
    pub fn peek(&self, key: &CacheKey) -> Option<EntrySnapshot> {
        self.entries.get(key).map(|entry| EntrySnapshot {
            addresses: entry.addresses.to_vec(),
            used: entry.used.load(Ordering::Acquire),
        })
    }

    /// Check whether an entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
