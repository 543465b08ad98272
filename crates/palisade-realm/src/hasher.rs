//! Secret fingerprint derivation.
//!
//! Cached authentication entries must never retain a recoverable secret, so
//! the realm compares one-way fingerprints instead. [`HashAlgo`] selects the
//! digest the realm is configured with (`cache.hash_algo`), and
//! [`Fingerprint`] carries the algorithm tag alongside the full digest:
//! fingerprints derived under different algorithms are structurally unequal,
//! which turns an algorithm change into plain cache misses rather than false
//! positives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::error::RealmError;
use crate::identity::Secret;

// =============================================================================
// Hash Algorithm
// =============================================================================

/// Fingerprint algorithm protecting cached secret material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgo {
    /// SHA-256 (default).
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
}

impl HashAlgo {
    /// The configuration name of the algorithm.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Derives the fingerprint of a secret under this algorithm.
    ///
    /// Deterministic for equal inputs under the same algorithm selection.
    #[must_use]
    pub fn fingerprint(&self, secret: &Secret) -> Fingerprint {
        let digest = match self {
            Self::Sha256 => Sha256::digest(secret.expose().as_bytes()).to_vec(),
            Self::Sha512 => Sha512::digest(secret.expose().as_bytes()).to_vec(),
        };
        Fingerprint {
            algo: *self,
            digest,
        }
    }
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgo {
    type Err = RealmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(RealmError::configuration(format!(
                "unsupported hash algorithm: {other}"
            ))),
        }
    }
}

// =============================================================================
// Fingerprint
// =============================================================================

/// One-way fingerprint of a secret, safe to retain for cache comparison.
///
/// Equality compares the algorithm tag and the entire digest. There is no
/// prefix or partial comparison path.
#[derive(Clone, PartialEq, Eq)]
pub struct Fingerprint {
    algo: HashAlgo,
    digest: Vec<u8>,
}

impl Fingerprint {
    /// The algorithm that derived this fingerprint.
    #[must_use]
    pub fn algo(&self) -> HashAlgo {
        self.algo
    }

    /// Hex encoding of the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}:{})", self.algo, self.to_hex())
    }
}
