//! # palisade-realm
//!
//! Caching authentication realm for the Palisade server.
//!
//! This crate provides:
//! - A realm that authenticates principals against a reloadable credential
//!   store and role store
//! - A two-partition verification cache with identity-stable hits
//! - One-way secret fingerprinting for cache keys (no recoverable secret is
//!   ever retained)
//! - Reload-driven wholesale cache invalidation from either backing store
//! - In-memory reference store implementations
//!
//! ## Overview
//!
//! Credential verification is expensive by design (Argon2 and friends), so
//! the realm caches successful outcomes. The cache holds at most one identity
//! per principal per partition, keyed on the authentication side by a
//! fingerprint of the verifying secret. Hosts reload the backing stores
//! out-of-band (typically from watched files); each reload signal clears the
//! whole cache before the notification returns.
//!
//! ```
//! use std::sync::Arc;
//! use palisade_realm::{
//!     CachingRealm, MemoryCredentialStore, MemoryRoleStore, PasswordCredentials,
//!     RealmConfig, Secret,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), palisade_realm::RealmError> {
//! let credential_store = Arc::new(MemoryCredentialStore::new());
//! credential_store.insert_user("user1", &Secret::new("test123"))?;
//! let role_store = Arc::new(MemoryRoleStore::new());
//! role_store.assign_roles("user1", vec!["role1".into(), "role2".into()]);
//!
//! let realm = CachingRealm::new(
//!     RealmConfig::new("file-realm", 0),
//!     credential_store.clone(),
//!     role_store.clone(),
//! )?;
//!
//! let identity = realm
//!     .authenticate(&PasswordCredentials::new("user1", "test123"))
//!     .await?;
//! assert_eq!(identity.roles(), ["role1", "role2"]);
//!
//! // A store reload invalidates every cached verification.
//! credential_store.notify_reload();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Realm and cache configuration
//! - [`error`] - Realm error taxonomy
//! - [`identity`] - Identity and credential types
//! - [`hasher`] - Secret fingerprint derivation
//! - [`cache`] - The two-partition verification cache
//! - [`store`] - Backing store contracts, reload notification, in-memory
//!   reference stores
//! - [`realm`] - Realm orchestration

pub mod cache;
pub mod config;
pub mod error;
pub mod hasher;
pub mod identity;
pub mod realm;
pub mod store;

pub use cache::{CacheStats, RealmCache};
pub use config::{CacheConfig, RealmConfig};
pub use error::{ErrorCategory, RealmError};
pub use hasher::{Fingerprint, HashAlgo};
pub use identity::{PasswordCredentials, Secret, UserIdentity};
pub use realm::{CachingRealm, RealmUsage};
pub use store::{
    CredentialStore, MemoryCredentialStore, MemoryRoleStore, ReloadListener, ReloadNotifier,
    RoleStore, Subscription, Verification,
};

/// Type alias for realm operation results.
pub type RealmResult<T> = Result<T, RealmError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use palisade_realm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::RealmResult;
    pub use crate::cache::{CacheStats, RealmCache};
    pub use crate::config::{CacheConfig, RealmConfig};
    pub use crate::error::{ErrorCategory, RealmError};
    pub use crate::hasher::{Fingerprint, HashAlgo};
    pub use crate::identity::{PasswordCredentials, Secret, UserIdentity};
    pub use crate::realm::{CachingRealm, RealmUsage};
    pub use crate::store::{
        CredentialStore, MemoryCredentialStore, MemoryRoleStore, ReloadNotifier, RoleStore,
        Subscription, Verification,
    };
}
