//! Verification result cache.
//!
//! [`RealmCache`] holds at most one verified identity per principal, in two
//! independent partitions:
//!
//! - the *authenticated* partition, keyed by principal and gated on the
//!   fingerprint of the secret that verified at caching time;
//! - the *lookup* partition, keyed by principal only.
//!
//! Hits clone the stored `Arc`, so callers see the same identity instance
//! until the entry is replaced or invalidated. A reload of either backing
//! store clears both partitions wholesale, since stores cannot report which
//! principals changed, so differential invalidation is never attempted.
//!
//! All operations are synchronous and take only a short-lived lock per
//! partition: cache hits return immediately, and [`invalidate_all`] has taken
//! effect by the time it returns.
//!
//! [`invalidate_all`]: RealmCache::invalidate_all

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::hasher::Fingerprint;
use crate::identity::UserIdentity;

// =============================================================================
// Cache Entry
// =============================================================================

struct CacheEntry {
    /// Fingerprint of the verifying secret. `None` for lookup entries.
    fingerprint: Option<Fingerprint>,
    identity: Arc<UserIdentity>,
    inserted_at: Instant,
}

type Partition = RwLock<IndexMap<String, CacheEntry>>;

fn read(partition: &Partition) -> RwLockReadGuard<'_, IndexMap<String, CacheEntry>> {
    partition.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(partition: &Partition) -> RwLockWriteGuard<'_, IndexMap<String, CacheEntry>> {
    partition.write().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Realm Cache
// =============================================================================

/// Two-partition cache of verified identities.
///
/// Only successful verifications and successful existence lookups are ever
/// stored; failures of any kind never populate the cache. Each partition is
/// bounded at `max_entries` (oldest entry evicted first) and optionally
/// age-bounded by a TTL.
pub struct RealmCache {
    authenticated: Partition,
    lookup: Partition,
    max_entries: usize,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl RealmCache {
    /// Creates an empty cache.
    ///
    /// `max_entries` bounds each partition independently; `ttl` of `None`
    /// disables age-based expiry.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self {
            authenticated: Partition::default(),
            lookup: Partition::default(),
            max_entries,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Looks up a cached authentication for `principal`.
    ///
    /// A hit requires a live entry whose stored fingerprint equals the
    /// presented one; a mismatched fingerprint is a plain miss and the caller
    /// must re-run full verification. The entry itself is left in place: it
    /// still answers for the secret it was verified with.
    #[must_use]
    pub fn get_authenticated(
        &self,
        principal: &str,
        fingerprint: &Fingerprint,
    ) -> Option<Arc<UserIdentity>> {
        let guard = read(&self.authenticated);
        let identity = guard.get(principal).and_then(|entry| {
            if self.expired(entry) || entry.fingerprint.as_ref() != Some(fingerprint) {
                None
            } else {
                Some(Arc::clone(&entry.identity))
            }
        });
        drop(guard);
        self.record(principal, "authenticated", identity.is_some());
        identity
    }

    /// Looks up a cached lookup result for `principal`.
    #[must_use]
    pub fn get_lookup(&self, principal: &str) -> Option<Arc<UserIdentity>> {
        let guard = read(&self.lookup);
        let identity = guard.get(principal).and_then(|entry| {
            if self.expired(entry) {
                None
            } else {
                Some(Arc::clone(&entry.identity))
            }
        });
        drop(guard);
        self.record(principal, "lookup", identity.is_some());
        identity
    }

    /// Stores or replaces the authentication entry for `principal`.
    pub fn put_authenticated(
        &self,
        principal: &str,
        fingerprint: Fingerprint,
        identity: Arc<UserIdentity>,
    ) {
        Self::insert(
            &self.authenticated,
            self.max_entries,
            principal,
            Some(fingerprint),
            identity,
        );
    }

    /// Stores or replaces the lookup entry for `principal`.
    pub fn put_lookup(&self, principal: &str, identity: Arc<UserIdentity>) {
        Self::insert(&self.lookup, self.max_entries, principal, None, identity);
    }

    /// Clears both partitions.
    ///
    /// Infallible and synchronous: when this returns, no subsequent get can
    /// observe a pre-invalidation entry. A get racing with the clear sees
    /// either the old population or the empty one, never a hybrid.
    pub fn invalidate_all(&self) {
        let authenticated = {
            let mut guard = write(&self.authenticated);
            let len = guard.len();
            guard.clear();
            len
        };
        let lookup = {
            let mut guard = write(&self.lookup);
            let len = guard.len();
            guard.clear();
            len
        };
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(authenticated, lookup, "realm cache invalidated");
    }

    /// Point-in-time cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            authenticated_entries: read(&self.authenticated).len(),
            lookup_entries: read(&self.lookup).len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    fn insert(
        partition: &Partition,
        max_entries: usize,
        principal: &str,
        fingerprint: Option<Fingerprint>,
        identity: Arc<UserIdentity>,
    ) {
        let mut guard = write(partition);
        if !guard.contains_key(principal) && guard.len() >= max_entries {
            if let Some((evicted, _)) = guard.shift_remove_index(0) {
                tracing::debug!(principal = %evicted, "evicted oldest cache entry");
            }
        }
        guard.insert(
            principal.to_string(),
            CacheEntry {
                fingerprint,
                identity,
                inserted_at: Instant::now(),
            },
        );
    }

    fn expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() > ttl)
    }

    fn record(&self, principal: &str, partition: &'static str, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(principal, partition, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(principal, partition, "cache miss");
        }
    }
}

// =============================================================================
// Cache Statistics
// =============================================================================

/// Snapshot of cache state and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries in the authenticated partition.
    pub authenticated_entries: usize,
    /// Live entries in the lookup partition.
    pub lookup_entries: usize,
    /// Total hits across both partitions.
    pub hits: u64,
    /// Total misses across both partitions.
    pub misses: u64,
    /// Number of wholesale invalidations.
    pub invalidations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::HashAlgo;
    use crate::identity::Secret;

    fn identity(principal: &str) -> Arc<UserIdentity> {
        Arc::new(UserIdentity::new(
            principal,
            vec!["role1".into(), "role2".into()],
        ))
    }

    fn fingerprint(secret: &str) -> Fingerprint {
        HashAlgo::Sha256.fingerprint(&Secret::new(secret))
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = RealmCache::new(16, None);
        assert!(cache.get_authenticated("user1", &fingerprint("test123")).is_none());
        assert!(cache.get_lookup("user1").is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_authenticated_hit_is_same_instance() {
        let cache = RealmCache::new(16, None);
        let stored = identity("user1");
        cache.put_authenticated("user1", fingerprint("test123"), Arc::clone(&stored));

        let first = cache.get_authenticated("user1", &fingerprint("test123")).unwrap();
        let second = cache.get_authenticated("user1", &fingerprint("test123")).unwrap();
        assert!(Arc::ptr_eq(&first, &stored));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_fingerprint_mismatch_is_miss_and_entry_survives() {
        let cache = RealmCache::new(16, None);
        cache.put_authenticated("user1", fingerprint("test123"), identity("user1"));

        assert!(cache.get_authenticated("user1", &fingerprint("wrong")).is_none());
        // The original entry still answers for its own secret.
        assert!(cache.get_authenticated("user1", &fingerprint("test123")).is_some());
    }

    #[test]
    fn test_cross_algorithm_fingerprint_is_miss() {
        let cache = RealmCache::new(16, None);
        let secret = Secret::new("test123");
        cache.put_authenticated(
            "user1",
            HashAlgo::Sha256.fingerprint(&secret),
            identity("user1"),
        );

        assert!(
            cache
                .get_authenticated("user1", &HashAlgo::Sha512.fingerprint(&secret))
                .is_none()
        );
    }

    #[test]
    fn test_put_replaces_single_entry_per_principal() {
        let cache = RealmCache::new(16, None);
        let first = identity("user1");
        let second = identity("user1");
        cache.put_authenticated("user1", fingerprint("old"), Arc::clone(&first));
        cache.put_authenticated("user1", fingerprint("new"), Arc::clone(&second));

        assert_eq!(cache.stats().authenticated_entries, 1);
        assert!(cache.get_authenticated("user1", &fingerprint("old")).is_none());
        let hit = cache.get_authenticated("user1", &fingerprint("new")).unwrap();
        assert!(Arc::ptr_eq(&hit, &second));
    }

    #[test]
    fn test_partitions_are_independent() {
        let cache = RealmCache::new(16, None);
        cache.put_authenticated("user1", fingerprint("test123"), identity("user1"));

        // Populating the authenticated partition must not satisfy lookups.
        assert!(cache.get_lookup("user1").is_none());

        cache.put_lookup("user1", identity("user1"));
        let from_lookup = cache.get_lookup("user1").unwrap();
        let from_auth = cache.get_authenticated("user1", &fingerprint("test123")).unwrap();
        assert!(!Arc::ptr_eq(&from_lookup, &from_auth));
    }

    #[test]
    fn test_invalidate_all_clears_both_partitions() {
        let cache = RealmCache::new(16, None);
        cache.put_authenticated("user1", fingerprint("test123"), identity("user1"));
        cache.put_lookup("user2", identity("user2"));

        cache.invalidate_all();

        assert!(cache.get_authenticated("user1", &fingerprint("test123")).is_none());
        assert!(cache.get_lookup("user2").is_none());
        let stats = cache.stats();
        assert_eq!(stats.authenticated_entries, 0);
        assert_eq!(stats.lookup_entries, 0);
        assert_eq!(stats.invalidations, 1);
    }

    #[test]
    fn test_ttl_expiry_is_a_miss() {
        let cache = RealmCache::new(16, Some(Duration::from_millis(10)));
        cache.put_lookup("user1", identity("user1"));
        assert!(cache.get_lookup("user1").is_some());

        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get_lookup("user1").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = RealmCache::new(2, None);
        cache.put_lookup("user1", identity("user1"));
        cache.put_lookup("user2", identity("user2"));
        cache.put_lookup("user3", identity("user3"));

        assert_eq!(cache.stats().lookup_entries, 2);
        assert!(cache.get_lookup("user1").is_none());
        assert!(cache.get_lookup("user2").is_some());
        assert!(cache.get_lookup("user3").is_some());
    }

    #[test]
    fn test_replacing_at_capacity_does_not_evict() {
        let cache = RealmCache::new(2, None);
        cache.put_lookup("user1", identity("user1"));
        cache.put_lookup("user2", identity("user2"));
        cache.put_lookup("user2", identity("user2"));

        assert!(cache.get_lookup("user1").is_some());
        assert!(cache.get_lookup("user2").is_some());
    }

    #[test]
    fn test_hit_and_miss_counters() {
        let cache = RealmCache::new(16, None);
        cache.put_authenticated("user1", fingerprint("test123"), identity("user1"));

        let _ = cache.get_authenticated("user1", &fingerprint("test123"));
        let _ = cache.get_authenticated("user1", &fingerprint("wrong"));
        let _ = cache.get_lookup("user1");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_concurrent_use_is_race_free() {
        let cache = Arc::new(RealmCache::new(64, None));
        let mut handles = Vec::new();

        for worker in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                let principal = format!("user{worker}");
                for round in 0..200 {
                    cache.put_authenticated(
                        &principal,
                        fingerprint("test123"),
                        identity(&principal),
                    );
                    if let Some(hit) =
                        cache.get_authenticated(&principal, &fingerprint("test123"))
                    {
                        // Never a torn entry: a hit always carries the full identity.
                        assert_eq!(hit.principal(), principal);
                        assert_eq!(hit.roles().len(), 2);
                    }
                    if round % 50 == 0 {
                        cache.invalidate_all();
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
