//! Caching realm orchestration.
//!
//! [`CachingRealm`] ties the pieces together: it derives a fingerprint of the
//! presented secret, consults the [`RealmCache`], delegates to the
//! [`CredentialStore`] and [`RoleStore`] on a miss, and subscribes to both
//! stores' reload notifications so either signal clears the whole cache.
//!
//! Identity instances are shared: a cache hit returns the same
//! `Arc<UserIdentity>` as the call that populated the entry, so hosts can
//! detect staleness with `Arc::ptr_eq` instead of re-deriving equality.

use std::sync::Arc;

use serde::Serialize;

use crate::RealmResult;
use crate::cache::{CacheStats, RealmCache};
use crate::config::RealmConfig;
use crate::error::RealmError;
use crate::identity::{PasswordCredentials, UserIdentity};
use crate::store::reload::{ReloadNotifier, Subscription};
use crate::store::{CredentialStore, RoleStore, Verification};

// =============================================================================
// Realm Usage
// =============================================================================

/// Point-in-time usage snapshot of a realm.
///
/// `size` is the backing credential population, queried from the credential
/// store on every call; it is deliberately not served from the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealmUsage {
    /// Configured realm name.
    pub name: String,
    /// Configured realm order.
    pub order: i32,
    /// Current credential store population.
    pub size: usize,
}

// =============================================================================
// Caching Realm
// =============================================================================

/// Authentication realm backed by reloadable credential and role stores.
///
/// The realm registers a reload listener with both stores at construction;
/// the listeners are released when the realm is dropped. Either store's
/// reload signal invalidates both cache partitions before the notification
/// returns, so no call issued after a reload can observe pre-reload data.
pub struct CachingRealm {
    config: RealmConfig,
    credential_store: Arc<dyn CredentialStore>,
    role_store: Arc<dyn RoleStore>,
    cache: Arc<RealmCache>,
    _reload_subscriptions: [Subscription; 2],
}

impl std::fmt::Debug for CachingRealm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingRealm")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CachingRealm {
    /// Builds a realm over the given stores.
    ///
    /// # Errors
    ///
    /// Returns [`RealmError::Configuration`] if the configuration fails
    /// validation.
    pub fn new(
        config: RealmConfig,
        credential_store: Arc<dyn CredentialStore>,
        role_store: Arc<dyn RoleStore>,
    ) -> RealmResult<Self> {
        config.validate()?;
        let cache = Arc::new(RealmCache::new(config.cache.max_entries, config.cache.ttl));
        let subscriptions = [
            Self::invalidate_on_reload(credential_store.reload_notifier(), &cache),
            Self::invalidate_on_reload(role_store.reload_notifier(), &cache),
        ];
        tracing::debug!(realm = %config.name, order = config.order, "realm constructed");
        Ok(Self {
            config,
            credential_store,
            role_store,
            cache,
            _reload_subscriptions: subscriptions,
        })
    }

    /// The configured realm name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The configured realm order.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.config.order
    }

    /// Authenticates a principal with a secret.
    ///
    /// On a cache hit the stored identity is returned unchanged (same
    /// instance); neither store is consulted. On a miss the credential store
    /// performs the full verification, roles are fetched, and the fresh
    /// identity is cached keyed by principal and secret fingerprint. Failed
    /// verification caches nothing.
    ///
    /// # Errors
    ///
    /// [`RealmError::InvalidCredentials`] if the secret does not verify;
    /// [`RealmError::StoreUnavailable`] if either store cannot answer.
    pub async fn authenticate(
        &self,
        credentials: &PasswordCredentials,
    ) -> RealmResult<Arc<UserIdentity>> {
        let fingerprint = self
            .config
            .cache
            .hash_algo
            .fingerprint(credentials.secret());
        if let Some(identity) = self
            .cache
            .get_authenticated(credentials.principal(), &fingerprint)
        {
            return Ok(identity);
        }

        match self
            .credential_store
            .verify(credentials.principal(), credentials.secret())
            .await?
        {
            Verification::Verified { principal } => {
                let roles = self.role_store.roles(&principal).await?;
                let identity = Arc::new(UserIdentity::new(principal, roles));
                self.cache.put_authenticated(
                    credentials.principal(),
                    fingerprint,
                    Arc::clone(&identity),
                );
                tracing::debug!(
                    realm = %self.config.name,
                    principal = identity.principal(),
                    roles = identity.roles().len(),
                    "principal authenticated"
                );
                Ok(identity)
            }
            Verification::Rejected => {
                tracing::debug!(
                    realm = %self.config.name,
                    principal = credentials.principal(),
                    "credentials rejected"
                );
                Err(RealmError::invalid_credentials(credentials.principal()))
            }
        }
    }

    /// Looks up a principal without verifying a secret.
    ///
    /// Served from the lookup partition when possible. An absent principal
    /// yields `Ok(None)` and is never cached; it is re-queried on every
    /// call, so a principal added before the next reload becomes visible
    /// immediately.
    ///
    /// # Errors
    ///
    /// [`RealmError::StoreUnavailable`] if either store cannot answer.
    pub async fn lookup_user(&self, principal: &str) -> RealmResult<Option<Arc<UserIdentity>>> {
        if let Some(identity) = self.cache.get_lookup(principal) {
            return Ok(Some(identity));
        }

        if !self.credential_store.exists(principal).await? {
            return Ok(None);
        }
        let roles = self.role_store.roles(principal).await?;
        let identity = Arc::new(UserIdentity::new(principal, roles));
        self.cache.put_lookup(principal, Arc::clone(&identity));
        Ok(Some(identity))
    }

    /// Reports the realm's usage snapshot.
    ///
    /// # Errors
    ///
    /// [`RealmError::StoreUnavailable`] if the credential store cannot report
    /// its population.
    pub async fn usage_stats(&self) -> RealmResult<RealmUsage> {
        Ok(RealmUsage {
            name: self.config.name.clone(),
            order: self.config.order,
            size: self.credential_store.count().await?,
        })
    }

    /// Snapshot of the realm cache's counters and sizes.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn invalidate_on_reload(notifier: &ReloadNotifier, cache: &Arc<RealmCache>) -> Subscription {
        // Weak: a store outliving the realm must not keep its cache alive.
        let cache = Arc::downgrade(cache);
        notifier.subscribe(move || {
            if let Some(cache) = cache.upgrade() {
                cache.invalidate_all();
            }
        })
    }
}
