//! Realm error types.
//!
//! This module defines all error types that can occur while authenticating
//! or looking up principals through a realm.

use std::fmt;

/// Errors that can occur during realm operations.
///
/// Expected negative outcomes are modelled explicitly: a secret that does not
/// verify is [`RealmError::InvalidCredentials`], while a backing store that
/// cannot answer is [`RealmError::StoreUnavailable`]. Callers can branch on
/// the predicates below without matching every variant. A principal that is
/// simply absent during lookup is not an error at all: lookups return
/// `Ok(None)` for that case.
#[derive(Debug, thiserror::Error)]
pub enum RealmError {
    /// The presented secret did not verify for the principal.
    #[error("invalid credentials for principal: {principal}")]
    InvalidCredentials {
        /// The principal whose credentials were rejected.
        principal: String,
    },

    /// A backing store could not answer (e.g., not yet loaded).
    #[error("{store} store unavailable: {message}")]
    StoreUnavailable {
        /// Which store failed ("credential" or "role").
        store: String,
        /// Description of the failure.
        message: String,
    },

    /// The realm configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl RealmError {
    /// Creates a new `InvalidCredentials` error.
    #[must_use]
    pub fn invalid_credentials(principal: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            principal: principal.into(),
        }
    }

    /// Creates a new `StoreUnavailable` error.
    #[must_use]
    pub fn store_unavailable(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a credential rejection.
    ///
    /// Rejections are expected outcomes a caller may retry with different
    /// credentials; they carry no information about store health.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::InvalidCredentials { .. })
    }

    /// Returns `true` if a backing store failed to answer.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Returns `true` if the realm was misconfigured.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCredentials { .. } => ErrorCategory::Authentication,
            Self::StoreUnavailable { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of realm errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential verification failures.
    Authentication,
    /// Backing store failures.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
