//! Identity and credential types.
//!
//! A [`UserIdentity`] is the immutable result of a successful authentication
//! or lookup: the principal plus its assigned roles. Realms hand identities
//! out as `Arc<UserIdentity>` so repeated cache hits return the same
//! allocation, and callers can detect staleness with [`std::sync::Arc::ptr_eq`].

use std::fmt;

use serde::Serialize;

// =============================================================================
// Secret
// =============================================================================

/// A secret credential value supplied transiently by a caller.
///
/// The wrapper exists so secret material never leaks through `Debug` or
/// `Display` formatting. Realms retain only a one-way fingerprint of the
/// secret; the plaintext lives exactly as long as the caller's value.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the underlying secret for verification or fingerprinting.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Password Credentials
// =============================================================================

/// A principal together with the secret presented to prove its identity.
#[derive(Debug, Clone)]
pub struct PasswordCredentials {
    principal: String,
    secret: Secret,
}

impl PasswordCredentials {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(principal: impl Into<String>, secret: impl Into<Secret>) -> Self {
        Self {
            principal: principal.into(),
            secret: secret.into(),
        }
    }

    /// The principal being authenticated. Case-sensitive and opaque.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// The presented secret.
    #[must_use]
    pub fn secret(&self) -> &Secret {
        &self.secret
    }
}

// =============================================================================
// User Identity
// =============================================================================

/// An authenticated identity: a principal plus its assigned role names.
///
/// Roles preserve the order the role store reported them in. The value is
/// immutable once constructed; the realm replaces rather than mutates cached
/// identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    principal: String,
    roles: Vec<String>,
}

impl UserIdentity {
    /// Builds an identity from a principal and its roles.
    #[must_use]
    pub fn new(principal: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            principal: principal.into(),
            roles,
        }
    }

    /// The authenticated principal.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Role names assigned to the principal, in store-reported order.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns `true` if the identity carries the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.principal, self.roles.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_redacted_in_debug_and_display() {
        let secret = Secret::new("test123");
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
        assert_eq!(secret.to_string(), "<redacted>");
        assert_eq!(secret.expose(), "test123");
    }

    #[test]
    fn test_credentials_accessors() {
        let credentials = PasswordCredentials::new("user1", "test123");
        assert_eq!(credentials.principal(), "user1");
        assert_eq!(credentials.secret().expose(), "test123");
    }

    #[test]
    fn test_identity_roles_preserve_order() {
        let identity = UserIdentity::new("user1", vec!["role2".into(), "role1".into()]);
        assert_eq!(identity.roles(), ["role2", "role1"]);
        assert!(identity.has_role("role1"));
        assert!(!identity.has_role("role3"));
    }

    #[test]
    fn test_identity_display() {
        let identity = UserIdentity::new("user1", vec!["role1".into(), "role2".into()]);
        assert_eq!(identity.to_string(), "user1[role1,role2]");
    }

    #[test]
    fn test_identity_serializes_fields() {
        let identity = UserIdentity::new("user1", vec!["role1".into()]);
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"principal": "user1", "roles": ["role1"]})
        );
    }
}
