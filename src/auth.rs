//! Client-credentials token lifecycle for the Spotify Web API.

use std::{
    cmp::{max, min},
    sync::Arc,
    time::Duration,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use tokio::{sync::RwLock, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use crate::{
    config::PluginOptions,
    error::{PluginError, Result},
    types::TokenResponse,
};

/// Renew this many seconds before the token's notional expiry.
const RENEWAL_BUFFER_SECS: u64 = 240;

/// Initial delay between renewal retries after a failure.
const RETRY_BACKOFF_START: Duration = Duration::from_secs(10);

/// Ceiling for the renewal retry backoff.
const RETRY_BACKOFF_MAX: Duration = Duration::from_secs(300);

/// Floor for the sleep between successful renewals. A token whose lifetime
/// is shorter than the renewal buffer would otherwise come due immediately
/// and spin the renewal task against the identity endpoint.
const MIN_RENEWAL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct BearerToken {
    /// Full header value, `Bearer <token>`.
    header: String,
    obtained_at: u64,
    expires_in: u64,
}

impl BearerToken {
    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.obtained_at + self.expires_in.saturating_sub(RENEWAL_BUFFER_SECS)
    }
}

/// Owns the OAuth client-credentials token for one plugin instance.
///
/// The token lives behind an async `RwLock`; readers always see the latest
/// value at call time and a renewal overlapping an in-flight catalog request
/// is acceptable because the header swap is atomic. There is one manager per
/// plugin, never process-wide state.
///
/// # Contract
///
/// [`CredentialManager::ensure_valid_token`] guarantees a usable bearer
/// header before returning. If the identity endpoint rejects the client or
/// returns an incomplete response, no catalog call proceeds and the error
/// surfaces as [`PluginError::InvalidCredentials`].
pub struct CredentialManager {
    http: Client,
    token_url: String,
    /// Derived `Basic base64(client_id:client_secret)` header value.
    authorization: String,
    token: RwLock<Option<BearerToken>>,
}

impl CredentialManager {
    pub fn new(options: &PluginOptions, http: Client) -> Self {
        let credentials = format!("{}:{}", options.client_id, options.client_secret);
        CredentialManager {
            http,
            token_url: options.token_url.clone(),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            token: RwLock::new(None),
        }
    }

    /// Returns the current `Bearer <token>` header value, requesting a fresh
    /// token first when none is set or the stored one is about to expire.
    pub async fn ensure_valid_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref() {
                if !token.is_expired() {
                    return Ok(token.header.clone());
                }
            }
        }

        self.renew().await?;

        let token = self.token.read().await;
        token
            .as_ref()
            .map(|token| token.header.clone())
            .ok_or_else(|| PluginError::InvalidCredentials("token renewal yielded no token".to_string()))
    }

    /// Requests a token via the client-credentials grant and stores it.
    /// Returns the reported lifetime in seconds.
    pub async fn renew(&self) -> Result<u64> {
        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PluginError::InvalidCredentials(e.to_string()))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| PluginError::InvalidCredentials(e.to_string()))?;

        let (access_token, expires_in) = match (body.access_token, body.expires_in) {
            (Some(token), Some(expires_in)) if !token.is_empty() => (token, expires_in),
            _ => {
                return Err(PluginError::InvalidCredentials(
                    "token endpoint returned no access_token or expires_in".to_string(),
                ));
            }
        };

        let mut slot = self.token.write().await;
        *slot = Some(BearerToken {
            header: format!("Bearer {access_token}"),
            obtained_at: Utc::now().timestamp() as u64,
            expires_in,
        });

        debug!(expires_in, "renewed Spotify access token");
        Ok(expires_in)
    }

    /// Spawns the background renewal task. It renews shortly before each
    /// expiry for the life of the plugin; failures are logged and retried
    /// with capped exponential backoff instead of silently terminating the
    /// chain. The caller owns the handle and aborts it on shutdown.
    pub fn spawn_auto_renew(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut backoff = RETRY_BACKOFF_START;
            loop {
                sleep(self.time_until_renewal().await).await;
                match self.renew().await {
                    Ok(_) => backoff = RETRY_BACKOFF_START,
                    Err(err) => {
                        warn!(error = %err, "token renewal failed, retrying");
                        sleep(backoff).await;
                        backoff = min(backoff * 2, RETRY_BACKOFF_MAX);
                    }
                }
            }
        })
    }

    async fn time_until_renewal(&self) -> Duration {
        let token = self.token.read().await;
        match token.as_ref() {
            Some(token) => {
                let now = Utc::now().timestamp() as u64;
                let due = token.obtained_at + token.expires_in.saturating_sub(RENEWAL_BUFFER_SECS);
                max(
                    Duration::from_secs(due.saturating_sub(now)),
                    MIN_RENEWAL_INTERVAL,
                )
            }
            // no token yet, renew right away
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_is_basic_base64() {
        let options = PluginOptions::new("my-id", "my-secret");
        let manager = CredentialManager::new(&options, Client::new());
        assert_eq!(
            manager.authorization,
            format!("Basic {}", STANDARD.encode("my-id:my-secret"))
        );
    }

    #[tokio::test]
    async fn short_lived_token_still_waits_between_renewals() {
        let options = PluginOptions::new("id", "secret");
        let manager = CredentialManager::new(&options, Client::new());
        {
            let mut slot = manager.token.write().await;
            *slot = Some(BearerToken {
                header: "Bearer x".to_string(),
                obtained_at: Utc::now().timestamp() as u64,
                // shorter than the renewal buffer, so the token is due
                // for renewal the moment it is obtained
                expires_in: 60,
            });
        }

        assert!(manager.time_until_renewal().await >= MIN_RENEWAL_INTERVAL);
    }

    #[tokio::test]
    async fn missing_token_is_renewed_immediately() {
        let options = PluginOptions::new("id", "secret");
        let manager = CredentialManager::new(&options, Client::new());
        assert_eq!(manager.time_until_renewal().await, Duration::ZERO);
    }

    #[test]
    fn token_expires_with_renewal_buffer() {
        let now = Utc::now().timestamp() as u64;
        let fresh = BearerToken {
            header: "Bearer x".to_string(),
            obtained_at: now,
            expires_in: 3600,
        };
        assert!(!fresh.is_expired());

        let stale = BearerToken {
            header: "Bearer x".to_string(),
            obtained_at: now - 3600 + RENEWAL_BUFFER_SECS,
            expires_in: 3600,
        };
        assert!(stale.is_expired());
    }
}
