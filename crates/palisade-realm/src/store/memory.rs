//! In-memory reference stores.
//!
//! Concurrent map-backed implementations of [`CredentialStore`] and
//! [`RoleStore`], used by the test suite and suitable for embedded hosts.
//! Passwords are held as Argon2id PHC hashes and verified through the
//! `argon2` crate, the expensive comparison the realm cache exists to avoid.
//!
//! Mutations do not fire reload notifications on their own; a host applies a
//! batch of changes and then calls `notify_reload()`, the same way a
//! file-backed store notifies once per file change.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use crate::RealmResult;
use crate::error::RealmError;
use crate::identity::Secret;
use crate::store::reload::ReloadNotifier;
use crate::store::{CredentialStore, RoleStore, Verification};

// =============================================================================
// Memory Credential Store
// =============================================================================

/// In-memory [`CredentialStore`] keyed by principal.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, String>>,
    notifier: ReloadNotifier,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a principal, hashing the secret with Argon2id.
    ///
    /// # Errors
    ///
    /// Returns [`RealmError::Internal`] if hashing fails.
    pub fn insert_user(&self, principal: impl Into<String>, secret: &Secret) -> RealmResult<()> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.expose().as_bytes(), &salt)
            .map_err(|e| RealmError::internal(format!("password hashing failed: {e}")))?;
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(principal.into(), hash.to_string());
        Ok(())
    }

    /// Removes a principal. Returns whether it was present.
    pub fn remove_user(&self, principal: &str) -> bool {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(principal)
            .is_some()
    }

    /// Fires the reload notification, as a host does after swapping in a
    /// freshly loaded credential set.
    pub fn notify_reload(&self) {
        self.notifier.notify();
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn exists(&self, principal: &str) -> RealmResult<bool> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(principal))
    }

    async fn verify(&self, principal: &str, secret: &Secret) -> RealmResult<Verification> {
        let stored = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(principal)
            .cloned();
        let Some(stored) = stored else {
            return Ok(Verification::Rejected);
        };
        let parsed = PasswordHash::new(&stored).map_err(|e| {
            RealmError::store_unavailable("credential", format!("malformed stored hash: {e}"))
        })?;
        match Argon2::default().verify_password(secret.expose().as_bytes(), &parsed) {
            Ok(()) => Ok(Verification::verified(principal)),
            Err(argon2::password_hash::Error::Password) => Ok(Verification::Rejected),
            Err(e) => Err(RealmError::store_unavailable(
                "credential",
                format!("verification failed: {e}"),
            )),
        }
    }

    async fn count(&self) -> RealmResult<usize> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len())
    }

    fn reload_notifier(&self) -> &ReloadNotifier {
        &self.notifier
    }
}

// =============================================================================
// Memory Role Store
// =============================================================================

/// In-memory [`RoleStore`] keyed by principal.
#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<HashMap<String, Vec<String>>>,
    notifier: ReloadNotifier,
}

impl MemoryRoleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns roles to a principal, replacing any previous assignment.
    pub fn assign_roles(&self, principal: impl Into<String>, roles: Vec<String>) {
        self.roles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(principal.into(), roles);
    }

    /// Fires the reload notification.
    pub fn notify_reload(&self) {
        self.notifier.notify();
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn roles(&self, principal: &str) -> RealmResult<Vec<String>> {
        Ok(self
            .roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(principal)
            .cloned()
            .unwrap_or_default())
    }

    fn reload_notifier(&self) -> &ReloadNotifier {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_verify_correct_secret() {
        let store = MemoryCredentialStore::new();
        store.insert_user("user1", &Secret::new("test123")).unwrap();

        let outcome = store.verify("user1", &Secret::new("test123")).await.unwrap();
        assert_eq!(outcome, Verification::verified("user1"));
    }

    #[tokio::test]
    async fn test_verify_wrong_secret_rejected() {
        let store = MemoryCredentialStore::new();
        store.insert_user("user1", &Secret::new("test123")).unwrap();

        let outcome = store.verify("user1", &Secret::new("nope")).await.unwrap();
        assert_eq!(outcome, Verification::Rejected);
    }

    #[tokio::test]
    async fn test_verify_unknown_principal_rejected() {
        let store = MemoryCredentialStore::new();
        let outcome = store.verify("ghost", &Secret::new("test123")).await.unwrap();
        assert_eq!(outcome, Verification::Rejected);
    }

    #[tokio::test]
    async fn test_exists_and_count() {
        let store = MemoryCredentialStore::new();
        store.insert_user("user1", &Secret::new("a")).unwrap();
        store.insert_user("user2", &Secret::new("b")).unwrap();

        assert!(store.exists("user1").await.unwrap());
        assert!(!store.exists("user3").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 2);

        assert!(store.remove_user("user1"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_roles_for_unknown_principal_empty() {
        let store = MemoryRoleStore::new();
        assert!(store.roles("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roles_preserve_assignment_order() {
        let store = MemoryRoleStore::new();
        store.assign_roles("user1", vec!["role2".into(), "role1".into()]);
        assert_eq!(store.roles("user1").await.unwrap(), ["role2", "role1"]);
    }

    #[test]
    fn test_notify_reload_reaches_subscribers() {
        let store = MemoryCredentialStore::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let _subscription = store.reload_notifier().subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.notify_reload();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
