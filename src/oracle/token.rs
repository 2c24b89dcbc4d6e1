// src/oracle/token.rs
// Bearer credential cache for the oracle API, refreshed on expiry

use crate::error::{IntakeError, Result};
use crate::oracle::http_client::OracleHttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Grant type for exchanging an API key for an access token
const API_KEY_GRANT: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Token lifetime assumed when the endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Access token as returned by the credential endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

/// Something that can mint a fresh access token
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken>;
}

/// API-key grant against the credential endpoint
pub struct ApiKeyCredentialSource {
    http: OracleHttpClient,
    url: String,
    api_key: String,
}

impl ApiKeyCredentialSource {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: OracleHttpClient::default(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for ApiKeyCredentialSource {
    async fn fetch(&self) -> Result<AccessToken> {
        let request_id = Uuid::new_v4().to_string();
        let form = [("grant_type", API_KEY_GRANT), ("apikey", self.api_key.as_str())];

        let body = self
            .http
            .post_form(&request_id, &self.url, &form, TOKEN_REQUEST_TIMEOUT)
            .await
            .map_err(|e| IntakeError::Oracle(format!("token request failed: {e}")))?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    /// `None` when the declared lifetime is past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn issued(value: String, issued_at: Instant, expires_in: u64) -> Self {
        Self {
            value,
            expires_at: issued_at.checked_add(Duration::from_secs(expires_in)),
        }
    }

    /// Usable until `margin` before the declared expiry
    fn is_fresh(&self, now: Instant, margin: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            return true;
        };
        now.checked_add(margin).is_some_and(|cutoff| cutoff < expires_at)
    }
}

/// Process-wide token cache.
///
/// Check-then-refresh without holding a lock across the network call: two
/// concurrent callers may both refresh, and the later write wins.
pub struct TokenCache {
    source: Arc<dyn CredentialSource>,
    margin: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn CredentialSource>, margin: Duration) -> Self {
        Self {
            source,
            margin,
            cached: RwLock::new(None),
        }
    }

    /// Return a valid bearer token, refreshing if the cached one is stale
    pub async fn bearer(&self) -> Result<String> {
        if let Some(token) = self.current(Instant::now()) {
            return Ok(token);
        }

        debug!("Fetching new oracle access token");
        let fresh = self.source.fetch().await?;
        let cached =
            CachedToken::issued(fresh.access_token.clone(), Instant::now(), fresh.expires_in);
        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(cached);
        }
        info!(expires_in = fresh.expires_in, "Oracle access token refreshed");
        Ok(fresh.access_token)
    }

    /// Drop the cached token so the next call refreshes
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
    }

    fn current(&self, now: Instant) -> Option<String> {
        let guard = self.cached.read().ok()?;
        guard
            .as_ref()
            .filter(|t| t.is_fresh(now, self.margin))
            .map(|t| t.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        expires_in: u64,
    }

    impl CountingSource {
        fn new(expires_in: u64) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                expires_in,
            })
        }
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn fetch(&self) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken {
                access_token: format!("token-{n}"),
                expires_in: self.expires_in,
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CredentialSource for FailingSource {
        async fn fetch(&self) -> Result<AccessToken> {
            Err(IntakeError::Oracle("credential endpoint down".into()))
        }
    }

    #[test]
    fn test_cached_token_margin() {
        let now = Instant::now();
        let token = CachedToken::issued("t".into(), now, 90);
        assert!(token.is_fresh(now, Duration::from_secs(60)));
        assert!(!token.is_fresh(now + Duration::from_secs(30), Duration::from_secs(60)));
        assert!(!token.is_fresh(now + Duration::from_secs(45), Duration::from_secs(60)));
    }

    #[test]
    fn test_huge_lifetime_and_margin_do_not_overflow() {
        let now = Instant::now();
        let forever = CachedToken::issued("t".into(), now, u64::MAX);
        assert!(forever.expires_at.is_none());
        assert!(forever.is_fresh(now, Duration::from_secs(u64::MAX)));

        let hour = CachedToken::issued("t".into(), now, 3600);
        assert!(!hour.is_fresh(now, Duration::from_secs(u64::MAX)));
    }

    #[tokio::test]
    async fn test_unbounded_expiry_is_cached() {
        let source = CountingSource::new(u64::MAX);
        let cache = TokenCache::new(source.clone(), Duration::from_secs(60));

        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_huge_margin_refreshes_instead_of_panicking() {
        let source = CountingSource::new(3600);
        let cache = TokenCache::new(source.clone(), Duration::from_secs(u64::MAX));

        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(cache.bearer().await.unwrap(), "token-2");
    }

    #[test]
    fn test_access_token_default_expiry() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let source = CountingSource::new(3600);
        let cache = TokenCache::new(source.clone(), Duration::from_secs(60));

        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_inside_margin_is_refreshed() {
        // Declared lifetime shorter than the margin: never considered fresh
        let source = CountingSource::new(30);
        let cache = TokenCache::new(source.clone(), Duration::from_secs(60));

        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(cache.bearer().await.unwrap(), "token-2");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let source = CountingSource::new(3600);
        let cache = TokenCache::new(source.clone(), Duration::from_secs(60));

        cache.bearer().await.unwrap();
        cache.invalidate();
        assert_eq!(cache.bearer().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let cache = TokenCache::new(Arc::new(FailingSource), Duration::from_secs(60));
        let err = cache.bearer().await.unwrap_err();
        assert!(err.is_transient());
    }
}
