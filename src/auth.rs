//! Credential acquisition boundary.
//!
//! The authentication handshake itself lives outside this crate. Everything
//! here treats the identity provider as a capability that yields a bearer
//! credential for a requested set of permission scopes; a provider that
//! cannot produce one silently fails with [`AuthError`], which callers fold
//! into their own error domain (a failed directory search, a failed submit
//! step) rather than a distinct UI state.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::error::AuthError;

/// Directory read permission for people lookups.
pub const SCOPE_USER_READ: &str = "User.Read.All";
/// Mailbox settings write permission for auto-reply and inbox rules.
pub const SCOPE_MAILBOX_SETTINGS: &str = "MailboxSettings.ReadWrite";
/// Calendar write permission for blocking events and declining meetings.
pub const SCOPE_CALENDARS: &str = "Calendars.ReadWrite";

/// A bearer credential. The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expires_at: None,
        }
    }

    pub fn with_expiry(secret: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret,
            expires_at: Some(expires_at),
        }
    }

    /// The raw bearer secret for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether the token is still usable `leeway` from now.
    pub fn is_fresh(&self, leeway: Duration) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + leeway < at,
            None => true,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Yields a bearer credential scoped to the requested permissions.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError>;
}

/// Serves one pre-issued token regardless of scopes.
///
/// The deployment wires a real identity client here; tests and the CLI host
/// run with a token minted out of band.
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(secret: String) -> Self {
        Self {
            token: AccessToken::new(secret),
        }
    }

    /// Read the token from the given environment variable.
    pub fn from_env(variable: &'static str) -> Result<Self, AuthError> {
        let secret =
            std::env::var(variable).map_err(|_| AuthError::MissingCredential { variable })?;
        Ok(Self::new(secret))
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire_token(&self, _scopes: &[&str]) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}

/// Caches the inner provider's token until it is close to expiry.
///
/// Every directory lookup and every submit step acquires a credential, so
/// without this the identity provider would be hit once per keystroke burst.
pub struct CachingTokenProvider<P> {
    inner: P,
    cached: Mutex<Option<AccessToken>>,
    leeway: Duration,
}

impl<P: TokenProvider> CachingTokenProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
            leeway: Duration::minutes(5),
        }
    }
}

#[async_trait]
impl<P: TokenProvider> TokenProvider for CachingTokenProvider<P> {
    async fn acquire_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(self.leeway) {
                return Ok(token.clone());
            }
        }
        let token = self.inner.acquire_token(scopes).await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn debug_redacts_the_secret() {
        let token = AccessToken::new("very-secret-bearer".into());
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("very-secret-bearer"));
        assert!(rendered.contains("<redacted>"));
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn acquire_token(&self, _scopes: &[&str]) -> Result<AccessToken, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::with_expiry(
                "t".into(),
                Utc::now() + Duration::hours(1),
            ))
        }
    }

    #[tokio::test]
    async fn caching_provider_acquires_once_while_fresh() {
        let provider = CachingTokenProvider::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        for _ in 0..3 {
            provider
                .acquire_token(&[SCOPE_USER_READ])
                .await
                .expect("token");
        }
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed() {
        let provider = CachingTokenProvider::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        {
            let mut cached = provider.cached.lock().await;
            *cached = Some(AccessToken::with_expiry(
                "stale".into(),
                Utc::now() - Duration::minutes(1),
            ));
        }
        let token = provider
            .acquire_token(&[SCOPE_USER_READ])
            .await
            .expect("token");
        assert_eq!(token.secret(), "t");
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }
}
