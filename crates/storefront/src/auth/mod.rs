//! Identity provider seam.
//!
//! Sign-in and sign-out are owned entirely by the external identity
//! provider. The storefront only asks it two things: who is signed in, and
//! a bearer token for authenticated API calls (fetched on demand, since the
//! provider may refresh it).

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

use barely_used_core::UserId;

/// Errors from the identity seam.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The operation requires a signed-in user.
    #[error("You must be signed in to continue")]
    NotSignedIn,

    /// The provider failed to mint a token.
    #[error("Failed to obtain identity token: {0}")]
    Token(String),

    /// The signed-in user does not own the resource.
    #[error("You don't have permission to {0}")]
    Forbidden(String),
}

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Provider UID; doubles as the marketplace user id.
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Principal {
    /// Name shown on listings and reviews, falling back to the email's
    /// local part, then to the uid.
    #[must_use]
    pub fn display_name_or_fallback(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        if let Some(local) = self
            .email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|l| !l.is_empty())
        {
            return local.to_string();
        }
        self.uid.to_string()
    }
}

/// Source of the current principal and bearer tokens.
pub trait IdentityProvider: Send + Sync + 'static {
    /// The signed-in user, if any.
    fn current_principal(&self) -> Option<Principal>;

    /// A bearer token for the signed-in user, or `None` when signed out.
    fn id_token(&self) -> impl Future<Output = Result<Option<SecretString>, AuthError>> + Send;
}

/// Require a signed-in user.
///
/// # Errors
///
/// Returns [`AuthError::NotSignedIn`] if nobody is signed in.
pub fn require_principal<I: IdentityProvider>(identity: &I) -> Result<Principal, AuthError> {
    identity.current_principal().ok_or(AuthError::NotSignedIn)
}

/// Nobody signed in. Authenticated calls go out without a bearer header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current_principal(&self) -> Option<Principal> {
        None
    }

    async fn id_token(&self) -> Result<Option<SecretString>, AuthError> {
        Ok(None)
    }
}

/// A fixed principal and token, e.g. supplied through configuration by a
/// provider-side login flow.
#[derive(Clone)]
pub struct StaticIdentity {
    principal: Principal,
    token: SecretString,
}

impl std::fmt::Debug for StaticIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticIdentity")
            .field("principal", &self.principal)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl StaticIdentity {
    /// Create an identity from a principal and its bearer token.
    #[must_use]
    pub const fn new(principal: Principal, token: SecretString) -> Self {
        Self { principal, token }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_principal(&self) -> Option<Principal> {
        Some(self.principal.clone())
    }

    async fn id_token(&self) -> Result<Option<SecretString>, AuthError> {
        Ok(Some(self.token.clone()))
    }
}

/// Either provider, chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredIdentity {
    Anonymous(Anonymous),
    Static(StaticIdentity),
}

impl IdentityProvider for ConfiguredIdentity {
    fn current_principal(&self) -> Option<Principal> {
        match self {
            Self::Anonymous(a) => a.current_principal(),
            Self::Static(s) => s.current_principal(),
        }
    }

    async fn id_token(&self) -> Result<Option<SecretString>, AuthError> {
        match self {
            Self::Anonymous(a) => a.id_token().await,
            Self::Static(s) => s.id_token().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn principal() -> Principal {
        Principal {
            uid: UserId::new("uid-12345"),
            email: Some("rafi@example.com".to_string()),
            display_name: None,
        }
    }

    #[test]
    fn test_require_principal() {
        assert!(matches!(
            require_principal(&Anonymous),
            Err(AuthError::NotSignedIn)
        ));

        let identity = StaticIdentity::new(principal(), SecretString::from("tok"));
        assert_eq!(require_principal(&identity).unwrap().uid.as_str(), "uid-12345");
    }

    #[tokio::test]
    async fn test_tokens() {
        assert!(Anonymous.id_token().await.unwrap().is_none());

        let identity = StaticIdentity::new(principal(), SecretString::from("tok"));
        let token = identity.id_token().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "tok");
        assert!(!format!("{identity:?}").contains("tok\""));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut p = principal();
        assert_eq!(p.display_name_or_fallback(), "rafi");

        p.display_name = Some("  Rafi H.  ".to_string());
        assert_eq!(p.display_name_or_fallback(), "Rafi H.");

        p.display_name = None;
        p.email = None;
        assert_eq!(p.display_name_or_fallback(), "uid-12345");
    }
}
