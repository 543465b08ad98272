//! Backing store contracts.
//!
//! A realm authenticates against two externally-maintained stores: a
//! [`CredentialStore`] answering existence and secret-verification queries,
//! and a [`RoleStore`] answering role-assignment queries. Both are reloaded
//! out-of-band and expose a [`ReloadNotifier`] so dependent caches can be
//! invalidated the moment their data changes.
//!
//! Concrete backends live with the host (file-backed stores behind a watcher,
//! databases, ...). The in-memory implementations in [`memory`] serve as the
//! reference backend for tests and embedded use.

use async_trait::async_trait;

use crate::RealmResult;
use crate::identity::Secret;

pub mod memory;
pub mod reload;

pub use memory::{MemoryCredentialStore, MemoryRoleStore};
pub use reload::{ReloadListener, ReloadNotifier, Subscription};

// =============================================================================
// Verification
// =============================================================================

/// Outcome of a secret verification.
///
/// Rejection is an expected outcome, not an error: store failures are
/// reported through `Err` instead, so callers can always tell a bad secret
/// from an unavailable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The secret verified. Carries the canonical principal the store knows
    /// the entity by; the realm builds the identity from it.
    Verified {
        /// Canonical principal.
        principal: String,
    },
    /// The secret did not verify, or the principal is unknown.
    Rejected,
}

impl Verification {
    /// Convenience constructor for the verified outcome.
    #[must_use]
    pub fn verified(principal: impl Into<String>) -> Self {
        Self::Verified {
            principal: principal.into(),
        }
    }

    /// Returns `true` if the secret verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

// =============================================================================
// Credential Store
// =============================================================================

/// Password-side backing store.
///
/// Implementations perform the actual (potentially expensive) secret
/// comparison; the realm caches successful outcomes so this work is not
/// repeated per request.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns whether the principal exists in the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RealmError::StoreUnavailable`] if the store cannot
    /// answer.
    async fn exists(&self, principal: &str) -> RealmResult<bool>;

    /// Verifies a secret for a principal.
    ///
    /// An unknown principal or a non-matching secret yields
    /// [`Verification::Rejected`], never an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RealmError::StoreUnavailable`] if the store cannot
    /// answer.
    async fn verify(&self, principal: &str, secret: &Secret) -> RealmResult<Verification>;

    /// The current size of the credential population.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RealmError::StoreUnavailable`] if the store cannot
    /// answer.
    async fn count(&self) -> RealmResult<usize>;

    /// The notifier fired whenever the store's underlying data is reloaded.
    fn reload_notifier(&self) -> &ReloadNotifier;
}

// =============================================================================
// Role Store
// =============================================================================

/// Role-assignment backing store.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Role names assigned to the principal, in store order. A principal with
    /// no assignments yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RealmError::StoreUnavailable`] if the store cannot
    /// answer.
    async fn roles(&self, principal: &str) -> RealmResult<Vec<String>>;

    /// The notifier fired whenever the store's underlying data is reloaded.
    fn reload_notifier(&self) -> &ReloadNotifier;
}
