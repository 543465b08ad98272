//! Realm configuration.
//!
//! Configuration types for a caching realm: the realm's display name, its
//! relative order among realms, and the tuning of its verification cache.
//!
//! # Example (TOML)
//!
//! ```toml
//! name = "file-realm"
//! order = 3
//!
//! [cache]
//! hash_algo = "sha256"
//! max_entries = 50000
//! ttl = "20m"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RealmError;
use crate::hasher::HashAlgo;

/// Root realm configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RealmConfig {
    /// Display identifier of the realm. Reported in usage statistics.
    pub name: String,

    /// Relative priority among realms. Lower values are consulted first by
    /// the host; the realm itself only reports the value.
    pub order: i32,

    /// Verification cache tuning.
    pub cache: CacheConfig,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            name: "file".to_string(),
            order: 0,
            cache: CacheConfig::default(),
        }
    }
}

impl RealmConfig {
    /// Creates a configuration with the given name and order and default
    /// cache tuning.
    #[must_use]
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RealmError::Configuration`] if the realm name is empty or
    /// the cache capacity is zero.
    pub fn validate(&self) -> Result<(), RealmError> {
        if self.name.trim().is_empty() {
            return Err(RealmError::configuration("realm name must not be empty"));
        }
        if self.cache.max_entries == 0 {
            return Err(RealmError::configuration(
                "cache.max_entries must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Verification cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Hash algorithm protecting cached secret fingerprints.
    pub hash_algo: HashAlgo,

    /// Maximum number of entries per cache partition. The oldest entry is
    /// evicted when a new principal is cached into a full partition.
    pub max_entries: usize,

    /// How long a cached entry stays valid. `None` disables age-based expiry;
    /// reload-driven invalidation applies regardless.
    #[serde(with = "humantime_serde")]
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hash_algo: HashAlgo::default(),
            max_entries: 100_000,
            ttl: Some(Duration::from_secs(20 * 60)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RealmConfig::default();
        assert_eq!(config.name, "file");
        assert_eq!(config.order, 0);
        assert_eq!(config.cache.hash_algo, HashAlgo::Sha256);
        assert_eq!(config.cache.max_entries, 100_000);
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(1200)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_src = r#"
            name = "file-realm"
            order = 3

            [cache]
            hash_algo = "sha512"
            max_entries = 500
            ttl = "5m"
        "#;
        let config: RealmConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.name, "file-realm");
        assert_eq!(config.order, 3);
        assert_eq!(config.cache.hash_algo, HashAlgo::Sha512);
        assert_eq!(config.cache.max_entries, 500);
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RealmConfig = toml::from_str(r#"name = "file-realm""#).unwrap();
        assert_eq!(config.name, "file-realm");
        assert_eq!(config.order, 0);
        assert_eq!(config.cache.max_entries, 100_000);
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let config = RealmConfig::new("  ", 0);
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = RealmConfig::new("file-realm", 0);
        config.cache.max_entries = 0;
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration_error());
    }
}
