use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey};
use moka::sync::Cache;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::types::AuthError;
use super::validator::KeyResolver;

/// Upper bound on a JWKS document we are willing to read.
const MAX_JWKS_BYTES: u64 = 512 * 1024;

/// Unknown `kid`s trigger at most one key set fetch per interval.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// RSA signing keys published by the identity provider, cached by `kid`.
#[derive(Clone)]
pub struct JwksProvider {
    cache: Cache<String, Arc<DecodingKey>>,
    client: Client,
    jwks_uri: Url,
    last_refresh: Arc<Mutex<Option<Instant>>>,
    min_refresh_interval: Duration,
}

impl JwksProvider {
    pub fn new(jwks_uri: Url) -> Result<Self> {
        Ok(Self {
            cache: Cache::builder()
                .max_capacity(100)
                .time_to_live(Duration::from_secs(3600))
                .build(),
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .context("failed to build JWKS HTTP client")?,
            jwks_uri,
            last_refresh: Arc::new(Mutex::new(None)),
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        })
    }

    #[cfg(test)]
    fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Key for `kid`. A cache miss fetches the key set again unless a fetch
    /// already happened within the minimum refresh interval.
    pub async fn get_key(&self, kid: &str) -> Result<Option<Arc<DecodingKey>>> {
        if let Some(key) = self.cache.get(kid) {
            return Ok(Some(key));
        }

        // Held across the fetch so concurrent misses wait for one refresh.
        let mut last_refresh = self.last_refresh.lock().await;
        if let Some(key) = self.cache.get(kid) {
            return Ok(Some(key));
        }
        if let Some(at) = *last_refresh {
            if at.elapsed() < self.min_refresh_interval {
                tracing::debug!(kid, "Unknown kid, key set refreshed recently");
                return Ok(None);
            }
        }

        *last_refresh = Some(Instant::now());
        self.refresh().await?;
        Ok(self.cache.get(kid))
    }

    async fn refresh(&self) -> Result<()> {
        tracing::info!(uri = %self.jwks_uri, "Refreshing signing keys");
        let resp = self
            .client
            .get(self.jwks_uri.clone())
            .send()
            .await
            .context("JWKS request failed")?
            .error_for_status()
            .context("JWKS endpoint returned an error")?;

        if let Some(len) = resp.content_length() {
            if len > MAX_JWKS_BYTES {
                anyhow::bail!("JWKS response too large: {} bytes", len);
            }
        }

        let jwks: JwksResponse = resp.json().await.context("Failed to parse JWKS")?;

        for key in jwks.keys {
            if key.kty != "RSA" {
                continue;
            }
            if let (Some(n), Some(e)) = (&key.n, &key.e) {
                match DecodingKey::from_rsa_components(n, e) {
                    Ok(decoding_key) => self.cache.insert(key.kid.clone(), Arc::new(decoding_key)),
                    Err(err) => tracing::warn!(kid = %key.kid, "Skipping unusable JWK: {}", err),
                }
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyResolver for JwksProvider {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    async fn decoding_key(&self, kid: Option<&str>) -> Result<Arc<DecodingKey>, AuthError> {
        let kid = kid.ok_or(AuthError::UnknownKey(None))?;
        self.get_key(kid)
            .await
            .map_err(AuthError::KeyFetch)?
            .ok_or_else(|| AuthError::UnknownKey(Some(kid.to_string())))
    }
}
