//! Bearer credential lifecycle.
//!
//! The store exchanges the configured refresh secret for an access token on
//! first use and again once the cached token enters its renewal window.
//! Concurrent callers that all observe an expired token share a single
//! issuance: the refresh runs under an async mutex and re-checks the cache
//! after acquiring it.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::backend::TokenIssuer;
use crate::error::AuthError;

/// Value shipped in sample configuration files; never a real secret.
pub const PLACEHOLDER_SECRET: &str = "your-offline-token-here";
pub const DEFAULT_CLIENT_ID: &str = "rhsm-api";
pub const DEFAULT_RENEWAL_BUFFER: Duration = Duration::from_secs(60);

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: Instant,
    renew_at: Instant,
}

impl Credential {
    /// The renewal buffer is capped at half the token lifetime, so a fresh
    /// credential is always usable for a while.
    fn issued(token: String, expires_in: Duration, buffer: Duration, now: Instant) -> Self {
        let expires_at = now + expires_in;
        let renew_at = expires_at - buffer.min(expires_in / 2);
        Self {
            token,
            expires_at,
            renew_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// True while `now < expiry - buffer`.
    pub fn is_usable_at(&self, now: Instant) -> bool {
        now < self.renew_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("renew_at", &self.renew_at)
            .finish()
    }
}

pub struct CredentialStore<I> {
    issuer: I,
    client_id: String,
    refresh_secret: Option<String>,
    renewal_buffer: Duration,
    cached: RwLock<Option<Credential>>,
    refresh_lock: Mutex<()>,
}

impl<I: TokenIssuer> CredentialStore<I> {
    pub fn new(
        issuer: I,
        client_id: impl Into<String>,
        refresh_secret: Option<String>,
        renewal_buffer: Duration,
    ) -> Self {
        let refresh_secret = refresh_secret
            .map(|secret| secret.trim().to_string())
            .filter(|secret| !secret.is_empty() && secret != PLACEHOLDER_SECRET);
        Self {
            issuer,
            client_id: client_id.into(),
            refresh_secret,
            renewal_buffer,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// A refresh secret is present, non-blank and not the sample placeholder.
    pub fn is_configured(&self) -> bool {
        self.refresh_secret.is_some()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Return a credential that is still inside its usable window, issuing a
    /// new one when needed. Failures commit nothing.
    pub async fn get_token(&self) -> Result<Credential, AuthError> {
        let Some(secret) = self.refresh_secret.as_deref() else {
            return Err(AuthError::NotConfigured);
        };

        if let Some(credential) = self.usable_cached() {
            return Ok(credential);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(credential) = self.usable_cached() {
            return Ok(credential);
        }

        tracing::debug!(client_id = %self.client_id, "refreshing access token");
        let issued = match self.issuer.issue_token(&self.client_id, secret).await {
            Ok(issued) => issued,
            Err(err) => {
                tracing::warn!(error = %err, "access token refresh failed");
                return Err(err);
            }
        };
        if issued.access_token.trim().is_empty() {
            return Err(AuthError::Malformed("empty access_token".to_string()));
        }
        if issued.expires_in == 0 {
            return Err(AuthError::Malformed("access token expires immediately".to_string()));
        }

        let credential = Credential::issued(
            issued.access_token,
            Duration::from_secs(issued.expires_in),
            self.renewal_buffer,
            Instant::now(),
        );
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        tracing::info!(expires_in = issued.expires_in, "access token refreshed");
        Ok(credential)
    }

    /// Drop the cached credential so the next call issues a fresh one.
    pub fn invalidate(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Currently cached credential regardless of validity.
    pub fn cached(&self) -> Option<Credential> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn usable_cached(&self) -> Option<Credential> {
        let now = Instant::now();
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|credential| credential.is_usable_at(now))
            .cloned()
    }
}
